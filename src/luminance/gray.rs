use std::sync::Arc;

use log::trace;

use super::{LuminanceSource, SharedSource, check_crop, invert_source};
use crate::error::{Error, Result};

/// Luminance source over an 8-bit grayscale buffer
///
/// The backing buffer is shared between every view cropped or inverted from
/// it and is never mutated after construction. Rotation materializes a new
/// buffer.
#[derive(Debug, Clone)]
pub struct GrayLuminanceSource {
    data: Arc<[u8]>,
    data_width: usize,
    left: usize,
    top: usize,
    width: usize,
    height: usize,
}

impl GrayLuminanceSource {
    /// Wrap a `width` x `height` luminance buffer
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> Result<Self> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(Error::InvalidArgument(format!(
                "buffer of {} bytes does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            data: data.into(),
            data_width: width,
            left: 0,
            top: 0,
            width,
            height,
        })
    }

    /// Wrap a buffer and expose only the given sub-rectangle
    pub fn with_region(
        data: Vec<u8>,
        data_width: usize,
        data_height: usize,
        left: usize,
        top: usize,
        width: usize,
        height: usize,
    ) -> Result<Self> {
        let full = Self::new(data, data_width, data_height)?;
        check_crop(left, top, width, height, data_width, data_height)?;
        Ok(Self {
            left,
            top,
            width,
            height,
            ..full
        })
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        (self.top + y) * self.data_width + self.left + x
    }
}

impl LuminanceSource for GrayLuminanceSource {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn row(&self, y: usize, row: &mut Vec<u8>) -> Result<()> {
        if y >= self.height {
            return Err(Error::InvalidArgument(format!(
                "requested row {y} is outside the image (height {})",
                self.height
            )));
        }
        let offset = self.offset(0, y);
        row.clear();
        row.extend_from_slice(&self.data[offset..offset + self.width]);
        Ok(())
    }

    fn matrix(&self) -> Vec<u8> {
        let area = self.width * self.height;
        // A view spanning whole buffer rows is one contiguous slice
        if self.width == self.data_width {
            let start = self.offset(0, 0);
            return self.data[start..start + area].to_vec();
        }
        let mut matrix = Vec::with_capacity(area);
        for y in 0..self.height {
            let offset = self.offset(0, y);
            matrix.extend_from_slice(&self.data[offset..offset + self.width]);
        }
        matrix
    }

    fn is_crop_supported(&self) -> bool {
        true
    }

    fn crop(self: Arc<Self>, left: usize, top: usize, width: usize, height: usize) -> Result<SharedSource> {
        check_crop(left, top, width, height, self.width, self.height)?;
        Ok(Arc::new(Self {
            data: Arc::clone(&self.data),
            data_width: self.data_width,
            left: self.left + left,
            top: self.top + top,
            width,
            height,
        }))
    }

    fn invert(self: Arc<Self>) -> SharedSource {
        invert_source(self)
    }

    fn is_rotate_supported(&self) -> bool {
        true
    }

    fn rotate_counter_clockwise(&self) -> Result<SharedSource> {
        let (new_width, new_height) = (self.height, self.width);
        trace!("rotating {}x{} source counter-clockwise", self.width, self.height);
        let mut rotated = vec![0u8; new_width * new_height];
        for y in 0..new_height {
            let old_x = self.width - 1 - y;
            for x in 0..new_width {
                rotated[y * new_width + x] = self.data[self.offset(old_x, x)];
            }
        }
        Ok(Arc::new(Self::new(rotated, new_width, new_height)?))
    }
}
