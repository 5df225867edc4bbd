//! Constructors for sources built from packed color pixels

use super::GrayLuminanceSource;
use crate::error::{Error, Result};
use crate::utils::grayscale::{rgb_to_grayscale, rgba_to_grayscale};

fn check_len(len: usize, width: usize, height: usize, channels: usize) -> Result<()> {
    let expected = width.checked_mul(height).and_then(|pixels| pixels.checked_mul(channels));
    if expected != Some(len) {
        return Err(Error::InvalidArgument(format!(
            "{len} bytes do not hold a {width}x{height} image with {channels} channels"
        )));
    }
    Ok(())
}

impl GrayLuminanceSource {
    /// Build a source from packed RGB bytes (3 per pixel)
    pub fn from_rgb(rgb: &[u8], width: usize, height: usize) -> Result<Self> {
        check_len(rgb.len(), width, height, 3)?;
        Self::new(rgb_to_grayscale(rgb, width, height), width, height)
    }

    /// Build a source from packed RGBA bytes (4 per pixel); alpha is ignored
    pub fn from_rgba(rgba: &[u8], width: usize, height: usize) -> Result<Self> {
        check_len(rgba.len(), width, height, 4)?;
        Self::new(rgba_to_grayscale(rgba, width, height), width, height)
    }
}
