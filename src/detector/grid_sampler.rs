use log::trace;

use crate::error::{Error, Result};
use crate::models::{BitMatrix, Point};
use crate::utils::geometry::PerspectiveTransform;

/// Reads module values from a possibly skewed quadrilateral of a binarized
/// image into a rectangular grid
///
/// Decoders receive the sampler they should use explicitly; the crate-wide
/// [`default_grid_sampler`] is an immutable value, so swapping strategies
/// never races with decodes already in flight.
pub trait GridSampler: Send + Sync {
    /// Sample a `dimension_x` x `dimension_y` grid, mapping the grid-space
    /// quadrilateral `dst` onto the image-space quadrilateral `src` corner
    /// for corner
    fn sample_grid(
        &self,
        image: &BitMatrix,
        dimension_x: usize,
        dimension_y: usize,
        dst: &[Point; 4],
        src: &[Point; 4],
    ) -> Result<BitMatrix> {
        let transform = PerspectiveTransform::quadrilateral_to_quadrilateral(dst, src);
        self.sample_grid_with_transform(image, dimension_x, dimension_y, &transform)
    }

    /// Sample a grid whose cell centres are mapped into the image by
    /// `transform`
    fn sample_grid_with_transform(
        &self,
        image: &BitMatrix,
        dimension_x: usize,
        dimension_y: usize,
        transform: &PerspectiveTransform,
    ) -> Result<BitMatrix>;
}

/// Nearest-pixel sampler at each cell centre
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultGridSampler;

static DEFAULT_GRID_SAMPLER: DefaultGridSampler = DefaultGridSampler;

/// Shared default sampler
pub fn default_grid_sampler() -> &'static dyn GridSampler {
    &DEFAULT_GRID_SAMPLER
}

impl GridSampler for DefaultGridSampler {
    fn sample_grid_with_transform(
        &self,
        image: &BitMatrix,
        dimension_x: usize,
        dimension_y: usize,
        transform: &PerspectiveTransform,
    ) -> Result<BitMatrix> {
        if dimension_x == 0 || dimension_y == 0 {
            return Err(Error::NotFound("empty sampling grid"));
        }
        let (width, height) = (image.width() as i64, image.height() as i64);
        let mut bits = BitMatrix::new(dimension_x, dimension_y);
        let mut points = vec![0f32; 2 * dimension_x];

        for y in 0..dimension_y {
            let center_y = y as f32 + 0.5;
            for (x, pair) in points.chunks_exact_mut(2).enumerate() {
                pair[0] = x as f32 + 0.5;
                pair[1] = center_y;
            }
            transform.transform_points(&mut points);
            check_and_nudge_points(image, &mut points)?;

            for (x, pair) in points.chunks_exact(2).enumerate() {
                let (px, py) = (pair[0] as i64, pair[1] as i64);
                if px < 0 || py < 0 || px >= width || py >= height {
                    return Err(Error::NotFound("sample point outside image"));
                }
                if image.get(px as usize, py as usize) {
                    bits.set(x, y, true);
                }
            }
        }
        Ok(bits)
    }
}

/// Snap sample points lying just off the image back onto its edge
///
/// `points` holds interleaved x, y image coordinates. Only the ends of a
/// sampling row can stray off the image, so each direction stops at the
/// first point that needs no adjustment. A point more than one pixel
/// outside is a hard not-found.
///
/// A `y` equal to the height is kept as-is by the forward pass and snapped
/// to `height - 1` by the backward pass.
pub fn check_and_nudge_points(image: &BitMatrix, points: &mut [f32]) -> Result<()> {
    let (width, height) = (image.width() as i64, image.height() as i64);
    let pairs = points.len() / 2;

    let mut nudged = true;
    let mut i = 0;
    while i < pairs && nudged {
        nudged = nudge_point(points, i, width, height, height)?;
        i += 1;
    }

    nudged = true;
    let mut i = pairs;
    while i > 0 && nudged {
        i -= 1;
        nudged = nudge_point(points, i, width, height, height - 1)?;
    }
    Ok(())
}

fn nudge_point(points: &mut [f32], index: usize, width: i64, height: i64, bottom_edge: i64) -> Result<bool> {
    let (fx, fy) = (points[2 * index], points[2 * index + 1]);
    if !fx.is_finite() || !fy.is_finite() {
        return Err(Error::NotFound("degenerate transform"));
    }
    let (x, y) = (fx as i64, fy as i64);
    if x < -1 || x > width || y < -1 || y > height {
        return Err(Error::NotFound("sample point outside image"));
    }

    let mut nudged = false;
    if x == -1 {
        points[2 * index] = 0.0;
        nudged = true;
    } else if x == width {
        points[2 * index] = (width - 1) as f32;
        nudged = true;
    }
    if y == -1 {
        points[2 * index + 1] = 0.0;
        nudged = true;
    } else if y == height {
        points[2 * index + 1] = bottom_edge as f32;
        nudged = true;
    }
    if nudged {
        trace!("nudged sample point ({fx}, {fy}) onto image edge");
    }
    Ok(nudged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f32) -> [Point; 4] {
        [
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ]
    }

    fn modules() -> BitMatrix {
        let mut matrix = BitMatrix::new(21, 21);
        for y in 0..21 {
            for x in 0..21 {
                matrix.set(x, y, (x * 7 + y * 3) % 5 < 2);
            }
        }
        matrix
    }

    fn expand(src: &BitMatrix, factor: usize) -> BitMatrix {
        let mut dst = BitMatrix::new(src.width() * factor, src.height() * factor);
        for y in 0..src.height() {
            for x in 0..src.width() {
                if src.get(x, y) {
                    dst.set_region(x * factor, y * factor, factor, factor).unwrap();
                }
            }
        }
        dst
    }

    #[test]
    fn test_nudge_x() {
        let image = BitMatrix::new(10, 10);
        let mut points = [-1.5, 5.0];
        check_and_nudge_points(&image, &mut points).unwrap();
        assert_eq!(points, [0.0, 5.0]);

        let mut points = [10.2, 5.0];
        check_and_nudge_points(&image, &mut points).unwrap();
        assert_eq!(points, [9.0, 5.0]);

        assert!(matches!(
            check_and_nudge_points(&image, &mut [-2.0, 5.0]),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            check_and_nudge_points(&image, &mut [11.0, 5.0]),
            Err(Error::NotFound(_))
        ));
        assert!(check_and_nudge_points(&image, &mut [f32::NAN, 5.0]).is_err());
    }

    #[test]
    fn test_nudge_y() {
        let image = BitMatrix::new(10, 10);
        let mut points = [5.0, -1.0];
        check_and_nudge_points(&image, &mut points).unwrap();
        assert_eq!(points, [5.0, 0.0]);

        // forward pass keeps y == height, backward pass clamps it
        let mut points = [5.0, 10.0];
        check_and_nudge_points(&image, &mut points).unwrap();
        assert_eq!(points, [5.0, 9.0]);

        // the backward pass stops at an in-bounds last point
        let mut points = [5.0, 10.0, 5.0, 5.0];
        check_and_nudge_points(&image, &mut points).unwrap();
        assert_eq!(points, [5.0, 10.0, 5.0, 5.0]);

        assert!(check_and_nudge_points(&image, &mut [5.0, 11.0]).is_err());
        assert!(check_and_nudge_points(&image, &mut [5.0, -2.0]).is_err());
    }

    #[test]
    fn test_nudge_stops_at_first_clean_point() {
        let image = BitMatrix::new(10, 10);
        // the middle point is clean so the far point is left to the
        // backward pass
        let mut points = [-1.0, 1.0, 5.0, 5.0, 10.0, 1.0];
        check_and_nudge_points(&image, &mut points).unwrap();
        assert_eq!(points, [0.0, 1.0, 5.0, 5.0, 9.0, 1.0]);
    }

    #[test]
    fn test_identity_sampling() {
        let image = modules();
        let bits = DefaultGridSampler
            .sample_grid(&image, 21, 21, &square(21.0), &square(21.0))
            .unwrap();
        assert_eq!(bits, image);
    }

    #[test]
    fn test_scaled_sampling() {
        let image = modules();
        let big = expand(&image, 2);
        let bits = default_grid_sampler()
            .sample_grid(&big, 21, 21, &square(21.0), &square(42.0))
            .unwrap();
        assert_eq!(bits.to_string(), image.to_string());
    }

    #[test]
    fn test_rotated_sampling() {
        let image = modules();
        let big = expand(&image, 2);
        let src = [
            Point::new(42.0, 0.0),
            Point::new(42.0, 42.0),
            Point::new(0.0, 42.0),
            Point::new(0.0, 0.0),
        ];
        let bits = DefaultGridSampler
            .sample_grid(&big, 21, 21, &square(21.0), &src)
            .unwrap();
        for gy in 0..21 {
            for gx in 0..21 {
                assert_eq!(bits.get(gx, gy), image.get(20 - gy, gx), "module ({gx}, {gy})");
            }
        }
    }

    #[test]
    fn test_sampling_outside_image_fails() {
        let image = modules();
        let result = DefaultGridSampler.sample_grid(&image, 21, 21, &square(21.0), &square(40.0));
        assert!(matches!(result, Err(Error::NotFound(_))));

        let identity = PerspectiveTransform::square_to_quadrilateral(&square(1.0));
        assert!(DefaultGridSampler.sample_grid_with_transform(&image, 0, 5, &identity).is_err());
    }

    #[test]
    fn test_row_on_bottom_edge_is_clamped() {
        let image = BitMatrix::new(4, 4);
        let transform = PerspectiveTransform::quadrilateral_to_quadrilateral(
            &square(4.0),
            &[
                Point::new(0.0, 3.5),
                Point::new(4.0, 3.5),
                Point::new(4.0, 7.5),
                Point::new(0.0, 7.5),
            ],
        );
        // every centre of the row lands on y == height, so the backward pass
        // walks the whole row and clamps it
        let bits = DefaultGridSampler.sample_grid_with_transform(&image, 4, 1, &transform);
        assert!(bits.is_ok());
    }
}
