//! Adapters from the `image` crate

use ::image::{DynamicImage, GrayImage};

use super::GrayLuminanceSource;
use crate::error::{Error, Result};
use crate::utils::grayscale::rgba_to_grayscale;

impl GrayLuminanceSource {
    /// Build a source from any decoded image
    ///
    /// Color pixels go through the same weighting as
    /// [`GrayLuminanceSource::from_rgb`]; fully transparent pixels read as
    /// white.
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        if let DynamicImage::ImageLuma8(gray) = image {
            return Self::from_luma(gray);
        }
        let rgba = image.to_rgba8();
        let (width, height) = (rgba.width() as usize, rgba.height() as usize);
        let raw = rgba.as_raw();
        let mut data = rgba_to_grayscale(raw, width, height);
        for (value, px) in data.iter_mut().zip(raw.chunks_exact(4)) {
            if px[3] == 0 {
                *value = 0xFF;
            }
        }
        Self::new(data, width, height)
    }

    /// Build a source from an 8-bit grayscale image without conversion
    pub fn from_luma(image: &GrayImage) -> Result<Self> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        Self::new(image.as_raw().clone(), width, height)
    }
}

impl TryFrom<&DynamicImage> for GrayLuminanceSource {
    type Error = Error;

    fn try_from(image: &DynamicImage) -> Result<Self> {
        Self::from_image(image)
    }
}
