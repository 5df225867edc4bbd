use log::{debug, trace};

use super::Binarizer;
use crate::config;
use crate::error::{Error, Result};
use crate::luminance::SharedSource;
use crate::models::{BitArray, BitMatrix};

/// Significant bits kept from each luminance value when bucketing
pub const LUMINANCE_BITS: u32 = 5;
/// Shift mapping a luminance value to its histogram bucket
pub const LUMINANCE_SHIFT: u32 = 8 - LUMINANCE_BITS;
/// Number of histogram buckets (each covers `1 << LUMINANCE_SHIFT` levels)
pub const LUMINANCE_BUCKETS: usize = 1 << LUMINANCE_BITS;

/// Peaks this many buckets apart or closer count as a single tone
const MIN_PEAK_SEPARATION: usize = 1;

/// Binarizer picking one black point from a luminance histogram
///
/// Fast and suited to low-end devices, but a single threshold cannot cope
/// with strong shadows or gradients. Rows are sharpened before
/// thresholding, which helps 1D readers on blurry input.
#[derive(Clone)]
pub struct GlobalHistogramBinarizer {
    source: SharedSource,
}

impl GlobalHistogramBinarizer {
    /// Bind a new binarizer to `source`
    pub fn new(source: SharedSource) -> Self {
        Self { source }
    }
}

fn reuse_row(row: Option<BitArray>, width: usize) -> BitArray {
    match row {
        Some(mut row) if row.len() >= width => {
            row.clear();
            row
        }
        _ => BitArray::new(width),
    }
}

impl Binarizer for GlobalHistogramBinarizer {
    fn luminance_source(&self) -> &SharedSource {
        &self.source
    }

    fn black_row(&self, y: usize, row: Option<BitArray>) -> Result<BitArray> {
        let width = self.source.width();
        let mut row = reuse_row(row, width);

        let mut luminances = Vec::with_capacity(width);
        self.source.row(y, &mut luminances)?;
        let mut buckets = [0u32; LUMINANCE_BUCKETS];
        for &pixel in &luminances {
            buckets[(pixel >> LUMINANCE_SHIFT) as usize] += 1;
        }
        let black_point = estimate_black_point(&buckets)?;
        trace!("row {y}: black point {black_point}");

        if width < 3 {
            // Too narrow for the sharpening filter
            for (x, &pixel) in luminances.iter().enumerate() {
                if u32::from(pixel) < black_point {
                    row.set(x, true);
                }
            }
        } else {
            let black_point = black_point as i32;
            let mut left = i32::from(luminances[0]);
            let mut center = i32::from(luminances[1]);
            for x in 1..width - 1 {
                let right = i32::from(luminances[x + 1]);
                // -1 4 -1 box filter with a weight of 2
                if (center * 4 - left - right) / 2 < black_point {
                    row.set(x, true);
                }
                left = center;
                center = right;
            }
        }
        Ok(row)
    }

    fn black_matrix(&self) -> Result<BitMatrix> {
        let (width, height) = (self.source.width(), self.source.height());
        if width < 1 || height < 1 {
            return Err(Error::NotFound("image too small to binarize"));
        }

        // Histogram a band of rows from the middle of the image; the whole
        // image costs more and rarely moves the black point
        let mut buckets = [0u32; LUMINANCE_BUCKETS];
        let mut luminances = Vec::with_capacity(width);
        let rows = config::histogram_rows();
        let (left, right) = (width / 5, width * 4 / 5);
        for k in 1..=rows {
            let y = height * k / (rows + 1);
            self.source.row(y, &mut luminances)?;
            for &pixel in &luminances[left..right] {
                buckets[(pixel >> LUMINANCE_SHIFT) as usize] += 1;
            }
        }
        let black_point = estimate_black_point(&buckets)?;
        debug!("global histogram black point {black_point} for {width}x{height}");

        let luminances = self.source.matrix();
        let mut matrix = BitMatrix::new(width, height);
        for (y, line) in luminances.chunks_exact(width).enumerate() {
            for (x, &pixel) in line.iter().enumerate() {
                if u32::from(pixel) < black_point {
                    matrix.set(x, y, true);
                }
            }
        }
        Ok(matrix)
    }

    fn create_binarizer(&self, source: SharedSource) -> Box<dyn Binarizer> {
        Box::new(Self::new(source))
    }
}

/// Luminance threshold separating the two dominant tones of `buckets`
///
/// Finds the tallest bucket, then a second peak scored by height times
/// squared distance from the first, and returns the deepest valley between
/// them (biased away from both peaks) shifted back to a luminance value.
/// Fails with not-found when the peaks are too close to form two classes.
pub fn estimate_black_point(buckets: &[u32]) -> Result<u32> {
    let mut max_bucket_count = 0;
    let mut first_peak = 0;
    let mut first_peak_size = 0;
    for (x, &count) in buckets.iter().enumerate() {
        if count > first_peak_size {
            first_peak = x;
            first_peak_size = count;
        }
        max_bucket_count = max_bucket_count.max(count);
    }

    let mut second_peak = 0;
    let mut second_peak_score = 0u64;
    for (x, &count) in buckets.iter().enumerate() {
        let distance = x.abs_diff(first_peak) as u64;
        let score = u64::from(count) * distance * distance;
        if score > second_peak_score {
            second_peak = x;
            second_peak_score = score;
        }
    }

    // A single populated bucket leaves nothing to score against
    if second_peak_score == 0 || second_peak == first_peak {
        return Err(Error::NotFound("single-peak histogram"));
    }

    let (first_peak, second_peak) = if first_peak > second_peak {
        (second_peak, first_peak)
    } else {
        (first_peak, second_peak)
    };

    // Adjacent peaks are one tone split across a bucket boundary
    if second_peak - first_peak <= MIN_PEAK_SEPARATION {
        return Err(Error::NotFound("no contrast between histogram peaks"));
    }

    let mut best_valley = second_peak - 1;
    let mut best_valley_score = -1i64;
    for x in (first_peak + 1..second_peak).rev() {
        let from_first = (x - first_peak) as i64;
        let score = from_first
            * from_first
            * (second_peak - x) as i64
            * i64::from(max_bucket_count - buckets[x]);
        if score > best_valley_score {
            best_valley = x;
            best_valley_score = score;
        }
    }

    Ok((best_valley as u32) << LUMINANCE_SHIFT)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::binarizer::fixtures::{alternating_gradient, solid};

    #[test]
    fn test_binds_source() {
        let src = alternating_gradient(32);
        let ghb = GlobalHistogramBinarizer::new(src.clone());
        assert!(Arc::ptr_eq(ghb.luminance_source(), &src));
        assert_eq!((ghb.width(), ghb.height()), (32, 32));
    }

    #[test]
    fn test_estimate_black_point() {
        // single peak
        let buckets = [0, 0, 0, 15, 12, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(estimate_black_point(&buckets), Err(Error::NotFound(_))));

        let buckets = [0, 0, 0, 15, 12, 12, 5, 14, 16, 19, 20, 18, 0, 0, 0, 0];
        assert_eq!(estimate_black_point(&buckets).unwrap(), 6 << LUMINANCE_SHIFT);

        // scaling every bucket does not move the valley
        let scaled: Vec<u32> = buckets.iter().map(|c| c * 7).collect();
        assert_eq!(estimate_black_point(&scaled).unwrap(), 6 << LUMINANCE_SHIFT);

        assert!(estimate_black_point(&[]).is_err());
    }

    #[test]
    fn test_single_bucket_is_not_found() {
        for bucket in [0, 5, 16, 31] {
            let mut buckets = [0u32; LUMINANCE_BUCKETS];
            buckets[bucket] = 256;
            assert!(
                matches!(estimate_black_point(&buckets), Err(Error::NotFound(_))),
                "bucket {bucket}"
            );
        }
    }

    #[test]
    fn test_peaks_two_buckets_apart() {
        let mut buckets = [0u32; LUMINANCE_BUCKETS];
        buckets[10] = 100;
        buckets[12] = 90;
        assert_eq!(estimate_black_point(&buckets).unwrap(), 11 << LUMINANCE_SHIFT);

        buckets[12] = 0;
        buckets[11] = 90;
        assert!(matches!(estimate_black_point(&buckets), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_solid_bright_source_is_not_found() {
        for value in [120, 200, 0xFF] {
            let ghb = GlobalHistogramBinarizer::new(solid(16, value));
            assert!(matches!(ghb.black_row(0, None), Err(Error::NotFound(_))), "luminance {value}");
            assert!(matches!(ghb.black_matrix(), Err(Error::NotFound(_))), "luminance {value}");
        }
    }

    #[test]
    fn test_every_row_alternates() {
        let ghb = GlobalHistogramBinarizer::new(alternating_gradient(32));
        for y in 0..32 {
            let row = ghb.black_row(y, None).unwrap();
            // the sharpening filter never marks the first and last pixel
            assert!(!row.get(0) && !row.get(31), "row {y}");
            for x in 1..31 {
                assert_eq!(row.get(x), (x + y) % 2 == 0, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_black_row() {
        let ghb = GlobalHistogramBinarizer::new(alternating_gradient(16));
        let row = ghb.black_row(1, None).unwrap();
        assert_eq!(row.to_string(), " .X.X.X.X .X.X.X..");

        // solid image has no contrast
        let ghb = ghb.create_binarizer(solid(16, 0));
        assert!(matches!(ghb.black_row(0, Some(row)), Err(Error::NotFound(_))));

        // small image skips the sharpening filter
        let ghb = ghb.create_binarizer(alternating_gradient(2));
        let row = ghb.black_row(0, None).unwrap();
        assert_eq!(row.to_string(), " X.");
    }

    #[test]
    fn test_black_row_reuses_buffer() {
        let ghb = GlobalHistogramBinarizer::new(alternating_gradient(16));
        let mut reusable = BitArray::new(40);
        reusable.set(39, true);
        let row = ghb.black_row(2, Some(reusable)).unwrap();
        assert_eq!(row.len(), 40);
        assert!(!row.get(39));
        assert!(ghb.black_row(16, None).is_err());
    }

    #[test]
    fn test_black_matrix() {
        let ghb = GlobalHistogramBinarizer::new(alternating_gradient(0));
        assert!(ghb.black_matrix().is_err());

        let ghb = GlobalHistogramBinarizer::new(solid(16, 0));
        assert!(matches!(ghb.black_matrix(), Err(Error::NotFound(_))));

        let src = alternating_gradient(16);
        let raw = src.matrix();
        let ghb = GlobalHistogramBinarizer::new(src);
        let matrix = ghb.black_matrix().unwrap();
        for y in 0..matrix.height() {
            for x in 0..matrix.width() {
                assert_eq!(matrix.get(x, y), raw[y * 16 + x] < 128, "pixel ({x}, {y})");
            }
        }
    }
}
