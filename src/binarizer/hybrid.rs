use std::sync::OnceLock;

use log::debug;

use super::{Binarizer, GlobalHistogramBinarizer};
use crate::config;
use crate::error::Result;
use crate::luminance::SharedSource;
use crate::models::{BitArray, BitMatrix};

const BLOCK_SIZE_POWER: usize = 3;
const BLOCK_SIZE: usize = 1 << BLOCK_SIZE_POWER;
const BLOCK_SIZE_MASK: usize = BLOCK_SIZE - 1;
const MINIMUM_DIMENSION: usize = BLOCK_SIZE * 5;

/// Local-threshold binarizer for 2D codes under uneven lighting
///
/// The image is split into 8x8 blocks; each block is thresholded against
/// the average black point of the 5x5 blocks around it. Images smaller than
/// 40 pixels on either side, and all single rows, use the global histogram
/// algorithm instead. The matrix is computed once and cached.
pub struct HybridBinarizer {
    global: GlobalHistogramBinarizer,
    matrix: OnceLock<BitMatrix>,
}

impl HybridBinarizer {
    /// Bind a new binarizer to `source`
    pub fn new(source: SharedSource) -> Self {
        Self {
            global: GlobalHistogramBinarizer::new(source),
            matrix: OnceLock::new(),
        }
    }

    fn compute_matrix(&self) -> Result<BitMatrix> {
        let source = self.global.luminance_source();
        let (width, height) = (source.width(), source.height());
        if width < MINIMUM_DIMENSION || height < MINIMUM_DIMENSION {
            debug!("{width}x{height} too small for block thresholds, using global histogram");
            return self.global.black_matrix();
        }

        let luminances = source.matrix();
        let sub_width = blocks_for(width);
        let sub_height = blocks_for(height);
        let black_points = calculate_black_points(&luminances, sub_width, sub_height, width, height);
        let mut matrix = BitMatrix::new(width, height);
        calculate_threshold_for_block(
            &luminances,
            sub_width,
            sub_height,
            width,
            height,
            &black_points,
            &mut matrix,
        );
        Ok(matrix)
    }
}

impl Binarizer for HybridBinarizer {
    fn luminance_source(&self) -> &SharedSource {
        self.global.luminance_source()
    }

    fn black_row(&self, y: usize, row: Option<BitArray>) -> Result<BitArray> {
        self.global.black_row(y, row)
    }

    fn black_matrix(&self) -> Result<BitMatrix> {
        if let Some(matrix) = self.matrix.get() {
            return Ok(matrix.clone());
        }
        let matrix = self.compute_matrix()?;
        Ok(self.matrix.get_or_init(|| matrix).clone())
    }

    fn create_binarizer(&self, source: SharedSource) -> Box<dyn Binarizer> {
        Box::new(Self::new(source))
    }
}

fn blocks_for(pixels: usize) -> usize {
    let mut blocks = pixels >> BLOCK_SIZE_POWER;
    if pixels & BLOCK_SIZE_MASK != 0 {
        blocks += 1;
    }
    blocks
}

/// Clamp a block index so its 5x5 neighborhood stays inside the grid
fn cap(value: usize, max: usize) -> usize {
    if value < 2 { 2 } else { value.min(max) }
}

/// Threshold every block against the mean black point of its neighborhood
fn calculate_threshold_for_block(
    luminances: &[u8],
    sub_width: usize,
    sub_height: usize,
    width: usize,
    height: usize,
    black_points: &[u32],
    matrix: &mut BitMatrix,
) {
    let max_y_offset = height - BLOCK_SIZE;
    let max_x_offset = width - BLOCK_SIZE;
    for y in 0..sub_height {
        let y_offset = (y << BLOCK_SIZE_POWER).min(max_y_offset);
        let top = cap(y, sub_height - 3);
        for x in 0..sub_width {
            let x_offset = (x << BLOCK_SIZE_POWER).min(max_x_offset);
            let left = cap(x, sub_width - 3);
            let mut sum = 0u32;
            for row in top - 2..=top + 2 {
                let start = row * sub_width + left - 2;
                sum += black_points[start..start + 5].iter().sum::<u32>();
            }
            let average = sum / 25;
            threshold_block(luminances, x_offset, y_offset, average, width, matrix);
        }
    }
}

fn threshold_block(
    luminances: &[u8],
    x_offset: usize,
    y_offset: usize,
    threshold: u32,
    stride: usize,
    matrix: &mut BitMatrix,
) {
    for y in 0..BLOCK_SIZE {
        let offset = (y_offset + y) * stride + x_offset;
        for x in 0..BLOCK_SIZE {
            // Comparing with <= keeps solid white blocks white
            if u32::from(luminances[offset + x]) <= threshold {
                matrix.set(x_offset + x, y_offset + y, true);
            }
        }
    }
}

/// Black point per block: the mean luminance, or a guess for flat blocks
fn calculate_black_points(
    luminances: &[u8],
    sub_width: usize,
    sub_height: usize,
    width: usize,
    height: usize,
) -> Vec<u32> {
    let min_dynamic_range = config::min_dynamic_range();
    let max_y_offset = height - BLOCK_SIZE;
    let max_x_offset = width - BLOCK_SIZE;
    let mut black_points = vec![0u32; sub_width * sub_height];

    for y in 0..sub_height {
        let y_offset = (y << BLOCK_SIZE_POWER).min(max_y_offset);
        for x in 0..sub_width {
            let x_offset = (x << BLOCK_SIZE_POWER).min(max_x_offset);
            let mut sum = 0u32;
            let mut min = 0xFFu32;
            let mut max = 0u32;
            let mut yy = 0;
            while yy < BLOCK_SIZE {
                let offset = (y_offset + yy) * width + x_offset;
                let block_row = &luminances[offset..offset + BLOCK_SIZE];
                for &pixel in block_row {
                    let pixel = u32::from(pixel);
                    sum += pixel;
                    min = min.min(pixel);
                    max = max.max(pixel);
                }
                yy += 1;
                // Once the range is known to be wide, only the sum matters
                if max - min > min_dynamic_range {
                    while yy < BLOCK_SIZE {
                        let offset = (y_offset + yy) * width + x_offset;
                        sum += luminances[offset..offset + BLOCK_SIZE]
                            .iter()
                            .map(|&p| u32::from(p))
                            .sum::<u32>();
                        yy += 1;
                    }
                }
            }

            let mut average = sum >> (BLOCK_SIZE_POWER * 2);
            if max - min <= min_dynamic_range {
                // Flat block: assume it is background unless the neighbors
                // say otherwise, in which case it is probably inside a dark
                // module and shares their black point
                average = min / 2;
                if y > 0 && x > 0 {
                    let neighbors = (black_points[(y - 1) * sub_width + x]
                        + 2 * black_points[y * sub_width + x - 1]
                        + black_points[(y - 1) * sub_width + x - 1])
                        / 4;
                    if min < neighbors {
                        average = neighbors;
                    }
                }
            }
            black_points[y * sub_width + x] = average;
        }
    }
    black_points
}
