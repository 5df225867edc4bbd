//! lumagrid - pixel to symbol front end for barcode readers
//!
//! Converts raw pixels into luminance sources, binarizes them with a global
//! histogram or a block-local threshold, and samples module grids out of
//! perspective-distorted symbols. Format-specific detection and decoding
//! build on top of these pieces.
//!
//! ```
//! use lumagrid::{BinaryBitmap, GrayLuminanceSource, HybridBinarizer};
//! use std::sync::Arc;
//!
//! let pixels: Vec<u8> = (0..64 * 64).map(|i| if (i % 64) / 8 % 2 == 0 { 20 } else { 230 }).collect();
//! let source = Arc::new(GrayLuminanceSource::new(pixels, 64, 64).unwrap());
//! let bitmap = BinaryBitmap::new(Box::new(HybridBinarizer::new(source)));
//! let matrix = bitmap.black_matrix().unwrap();
//! assert!(matrix.get(0, 0));
//! assert!(!matrix.get(8, 0));
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Binarization strategies (global histogram, hybrid block thresholds)
pub mod binarizer;
/// Cached binarized view of an image
pub mod binary_bitmap;
mod config;
/// Grid sampling of located symbols
pub mod detector;
/// Error type and result alias
pub mod error;
/// Luminance sources (grayscale buffers, RGB, `image` crate adapters)
pub mod luminance;
/// Core data structures (BitArray, BitMatrix, Point)
pub mod models;
/// Utility functions (grayscale, geometry)
pub mod utils;

pub use binarizer::{Binarizer, GlobalHistogramBinarizer, HybridBinarizer};
pub use binary_bitmap::BinaryBitmap;
pub use detector::grid_sampler::{DefaultGridSampler, GridSampler, default_grid_sampler};
pub use error::{Error, Result};
pub use luminance::{GrayLuminanceSource, InvertedLuminanceSource, LuminanceSource, SharedSource};
pub use models::{BitArray, BitMatrix, Point};
pub use utils::geometry::PerspectiveTransform;

use std::sync::Arc;

/// Binarize an RGB image with block-local thresholds
///
/// # Arguments
/// * `image` - Raw RGB bytes (3 bytes per pixel)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// Images under 40 pixels on a side use the global histogram instead.
pub fn binarize(image: &[u8], width: usize, height: usize) -> Result<BitMatrix> {
    let source = GrayLuminanceSource::from_rgb(image, width, height)?;
    binarize_source(Arc::new(source))
}

/// Binarize an 8-bit grayscale image with block-local thresholds
///
/// # Arguments
/// * `image` - Luminance bytes (1 byte per pixel)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
pub fn binarize_grayscale(image: &[u8], width: usize, height: usize) -> Result<BitMatrix> {
    let source = GrayLuminanceSource::new(image.to_vec(), width, height)?;
    binarize_source(Arc::new(source))
}

fn binarize_source(source: SharedSource) -> Result<BitMatrix> {
    let bitmap = BinaryBitmap::new(Box::new(HybridBinarizer::new(source)));
    bitmap.black_matrix().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binarize_empty() {
        let image = vec![0u8; 300]; // 10x10 RGB, all black
        assert!(matches!(binarize(&image, 10, 10), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_binarize_size_mismatch() {
        let image = vec![0u8; 299];
        assert!(matches!(binarize(&image, 10, 10), Err(Error::InvalidArgument(_))));
        assert!(binarize_grayscale(&image, 10, 10).is_err());
        assert!(matches!(binarize(&[], usize::MAX / 2, 3), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_binarize_checkerboard() {
        let (width, height) = (64, 48);
        let mut rgb = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                let v = if (x / 8 + y / 8) % 2 == 0 { 25 } else { 220 };
                rgb.extend_from_slice(&[v, v, v]);
            }
        }
        let matrix = binarize(&rgb, width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                assert_eq!(matrix.get(x, y), (x / 8 + y / 8) % 2 == 0, "pixel ({x}, {y})");
            }
        }
    }
}
