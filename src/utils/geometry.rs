//! Projective transforms between an ideal module grid and image space

use crate::models::Point;

/// Homogeneous 3x3 mapping between two planes
///
/// Points are treated as row vectors: `[x', y', w] = [x, y, 1] * M`, so
/// `a13`/`a23` carry the projective terms and `a31`/`a32` the translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveTransform {
    a11: f32,
    a12: f32,
    a13: f32,
    a21: f32,
    a22: f32,
    a23: f32,
    a31: f32,
    a32: f32,
    a33: f32,
}

impl PerspectiveTransform {
    #[allow(clippy::too_many_arguments)]
    fn from_coefficients(
        a11: f32,
        a21: f32,
        a31: f32,
        a12: f32,
        a22: f32,
        a32: f32,
        a13: f32,
        a23: f32,
        a33: f32,
    ) -> Self {
        Self {
            a11,
            a12,
            a13,
            a21,
            a22,
            a23,
            a31,
            a32,
            a33,
        }
    }

    /// Transform mapping quadrilateral `from` onto quadrilateral `to`,
    /// corner for corner
    pub fn quadrilateral_to_quadrilateral(from: &[Point; 4], to: &[Point; 4]) -> Self {
        let q_to_s = Self::quadrilateral_to_square(from);
        let s_to_q = Self::square_to_quadrilateral(to);
        s_to_q.times(&q_to_s)
    }

    /// Transform mapping the unit square corners (0,0), (1,0), (1,1), (0,1)
    /// onto `quad`
    pub fn square_to_quadrilateral(quad: &[Point; 4]) -> Self {
        let [p0, p1, p2, p3] = *quad;
        let dx3 = p0.x - p1.x + p2.x - p3.x;
        let dy3 = p0.y - p1.y + p2.y - p3.y;
        if dx3 == 0.0 && dy3 == 0.0 {
            // Parallelogram: the mapping is affine
            return Self::from_coefficients(
                p1.x - p0.x,
                p2.x - p1.x,
                p0.x,
                p1.y - p0.y,
                p2.y - p1.y,
                p0.y,
                0.0,
                0.0,
                1.0,
            );
        }

        let dx1 = p1.x - p2.x;
        let dx2 = p3.x - p2.x;
        let dy1 = p1.y - p2.y;
        let dy2 = p3.y - p2.y;
        let denominator = dx1 * dy2 - dx2 * dy1;
        let a13 = (dx3 * dy2 - dx2 * dy3) / denominator;
        let a23 = (dx1 * dy3 - dx3 * dy1) / denominator;
        Self::from_coefficients(
            p1.x - p0.x + a13 * p1.x,
            p3.x - p0.x + a23 * p3.x,
            p0.x,
            p1.y - p0.y + a13 * p1.y,
            p3.y - p0.y + a23 * p3.y,
            p0.y,
            a13,
            a23,
            1.0,
        )
    }

    /// Transform mapping `quad` onto the unit square
    pub fn quadrilateral_to_square(quad: &[Point; 4]) -> Self {
        Self::square_to_quadrilateral(quad).adjoint()
    }

    /// Adjoint matrix; equal to the inverse up to a scale factor, which is
    /// all a projective transform needs
    pub fn adjoint(&self) -> Self {
        Self::from_coefficients(
            self.a22 * self.a33 - self.a23 * self.a32,
            self.a23 * self.a31 - self.a21 * self.a33,
            self.a21 * self.a32 - self.a22 * self.a31,
            self.a13 * self.a32 - self.a12 * self.a33,
            self.a11 * self.a33 - self.a13 * self.a31,
            self.a12 * self.a31 - self.a11 * self.a32,
            self.a12 * self.a23 - self.a13 * self.a22,
            self.a13 * self.a21 - self.a11 * self.a23,
            self.a11 * self.a22 - self.a12 * self.a21,
        )
    }

    /// Inverse mapping (destination back to source)
    pub fn inverse(&self) -> Self {
        self.adjoint()
    }

    /// Matrix product: applying the result equals applying `other` first,
    /// then `self`
    pub fn times(&self, other: &Self) -> Self {
        Self::from_coefficients(
            self.a11 * other.a11 + self.a21 * other.a12 + self.a31 * other.a13,
            self.a11 * other.a21 + self.a21 * other.a22 + self.a31 * other.a23,
            self.a11 * other.a31 + self.a21 * other.a32 + self.a31 * other.a33,
            self.a12 * other.a11 + self.a22 * other.a12 + self.a32 * other.a13,
            self.a12 * other.a21 + self.a22 * other.a22 + self.a32 * other.a23,
            self.a12 * other.a31 + self.a22 * other.a32 + self.a32 * other.a33,
            self.a13 * other.a11 + self.a23 * other.a12 + self.a33 * other.a13,
            self.a13 * other.a21 + self.a23 * other.a22 + self.a33 * other.a23,
            self.a13 * other.a31 + self.a23 * other.a32 + self.a33 * other.a33,
        )
    }

    /// Transform interleaved `x, y` pairs in place
    pub fn transform_points(&self, points: &mut [f32]) {
        for pair in points.chunks_exact_mut(2) {
            let (x, y) = (pair[0], pair[1]);
            let denominator = self.a13 * x + self.a23 * y + self.a33;
            pair[0] = (self.a11 * x + self.a21 * y + self.a31) / denominator;
            pair[1] = (self.a12 * x + self.a22 * y + self.a32) / denominator;
        }
    }

    /// Transform separate x and y coordinate slices in place
    pub fn transform_points_xy(&self, x_values: &mut [f32], y_values: &mut [f32]) {
        for (px, py) in x_values.iter_mut().zip(y_values.iter_mut()) {
            let (x, y) = (*px, *py);
            let denominator = self.a13 * x + self.a23 * y + self.a33;
            *px = (self.a11 * x + self.a21 * y + self.a31) / denominator;
            *py = (self.a12 * x + self.a22 * y + self.a32) / denominator;
        }
    }

    /// Map a single point
    pub fn transform(&self, p: &Point) -> Point {
        let mut pair = [p.x, p.y];
        self.transform_points(&mut pair);
        Point::new(pair[0], pair[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(p: Point, x: f32, y: f32) {
        assert!(
            (p.x - x).abs() < 1e-3 && (p.y - y).abs() < 1e-3,
            "got ({}, {}), expected ({}, {})",
            p.x,
            p.y,
            x,
            y
        );
    }

    #[test]
    fn test_square_to_quadrilateral_maps_corners() {
        let quad = [
            Point::new(10.0, 20.0),
            Point::new(110.0, 25.0),
            Point::new(120.0, 140.0),
            Point::new(5.0, 130.0),
        ];
        let t = PerspectiveTransform::square_to_quadrilateral(&quad);
        assert_close(t.transform(&Point::new(0.0, 0.0)), 10.0, 20.0);
        assert_close(t.transform(&Point::new(1.0, 0.0)), 110.0, 25.0);
        assert_close(t.transform(&Point::new(1.0, 1.0)), 120.0, 140.0);
        assert_close(t.transform(&Point::new(0.0, 1.0)), 5.0, 130.0);
    }

    #[test]
    fn test_quadrilateral_to_quadrilateral() {
        let from = [
            Point::new(3.5, 3.5),
            Point::new(17.5, 3.5),
            Point::new(17.5, 17.5),
            Point::new(3.5, 17.5),
        ];
        let to = [
            Point::new(40.0, 30.0),
            Point::new(160.0, 42.0),
            Point::new(150.0, 170.0),
            Point::new(35.0, 150.0),
        ];
        let t = PerspectiveTransform::quadrilateral_to_quadrilateral(&from, &to);
        for (f, d) in from.iter().zip(&to) {
            assert_close(t.transform(f), d.x, d.y);
        }

        // The inverse maps the image corners back onto the grid
        let inv = t.inverse();
        for (f, d) in from.iter().zip(&to) {
            let p = inv.transform(d);
            assert!((p.x - f.x).abs() < 1e-2 && (p.y - f.y).abs() < 1e-2);
        }
    }

    #[test]
    fn test_affine_scale() {
        let from = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        let to = [
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(50.0, 50.0),
            Point::new(0.0, 50.0),
        ];
        let t = PerspectiveTransform::quadrilateral_to_quadrilateral(&from, &to);
        assert_close(t.transform(&Point::new(50.0, 50.0)), 25.0, 25.0);

        let mut xs = [10.0, 90.0];
        let mut ys = [20.0, 40.0];
        t.transform_points_xy(&mut xs, &mut ys);
        assert!((xs[0] - 5.0).abs() < 1e-3 && (ys[1] - 20.0).abs() < 1e-3);
    }
}
