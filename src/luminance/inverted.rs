use std::sync::Arc;

use super::{LuminanceSource, SharedSource, invert_source};
use crate::error::Result;

/// View of another source with every luminance value inverted
///
/// Nothing is copied; values are flipped as rows and matrices are read.
/// Inverting this view again hands back the wrapped source.
pub struct InvertedLuminanceSource {
    delegate: SharedSource,
}

impl InvertedLuminanceSource {
    /// Wrap `delegate`
    pub fn new(delegate: SharedSource) -> Self {
        Self { delegate }
    }
}

impl LuminanceSource for InvertedLuminanceSource {
    fn width(&self) -> usize {
        self.delegate.width()
    }

    fn height(&self) -> usize {
        self.delegate.height()
    }

    fn row(&self, y: usize, row: &mut Vec<u8>) -> Result<()> {
        self.delegate.row(y, row)?;
        for value in row.iter_mut() {
            *value = 255 - *value;
        }
        Ok(())
    }

    fn matrix(&self) -> Vec<u8> {
        let mut matrix = self.delegate.matrix();
        for value in matrix.iter_mut() {
            *value = 255 - *value;
        }
        matrix
    }

    fn is_crop_supported(&self) -> bool {
        self.delegate.is_crop_supported()
    }

    fn crop(self: Arc<Self>, left: usize, top: usize, width: usize, height: usize) -> Result<SharedSource> {
        let cropped = Arc::clone(&self.delegate).crop(left, top, width, height)?;
        Ok(invert_source(cropped))
    }

    fn invert(self: Arc<Self>) -> SharedSource {
        Arc::clone(&self.delegate)
    }

    fn is_rotate_supported(&self) -> bool {
        self.delegate.is_rotate_supported()
    }

    fn rotate_counter_clockwise(&self) -> Result<SharedSource> {
        Ok(invert_source(self.delegate.rotate_counter_clockwise()?))
    }

    fn rotate_counter_clockwise_45(&self) -> Result<SharedSource> {
        Ok(invert_source(self.delegate.rotate_counter_clockwise_45()?))
    }
}
