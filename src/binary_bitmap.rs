//! Binarized view of an image shared by every reader
//!
//! [`BinaryBitmap`] owns a binarizer and memoizes its output: the full black
//! matrix is computed at most once, and each black row on first request.
//! Readers hold a `&BinaryBitmap` and never mutate the bits they get back.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, OnceLock};

use log::trace;

use crate::binarizer::Binarizer;
use crate::error::Result;
use crate::models::{BitArray, BitMatrix};

/// An image after binarization, with cached rows and matrix
pub struct BinaryBitmap {
    binarizer: Box<dyn Binarizer>,
    matrix: OnceLock<BitMatrix>,
    rows: Mutex<HashMap<usize, BitArray>>,
}

impl BinaryBitmap {
    /// Wrap `binarizer`; nothing is computed until requested
    pub fn new(binarizer: Box<dyn Binarizer>) -> Self {
        Self {
            binarizer,
            matrix: OnceLock::new(),
            rows: Mutex::new(HashMap::new()),
        }
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.binarizer.width()
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.binarizer.height()
    }

    /// The binarizer backing this bitmap
    pub fn binarizer(&self) -> &dyn Binarizer {
        self.binarizer.as_ref()
    }

    /// Binarized scanline `y`, for 1D readers
    ///
    /// Failures are not cached, so a later call retries the binarizer.
    pub fn black_row(&self, y: usize) -> Result<BitArray> {
        if let Some(row) = self.cached_row(y) {
            trace!("black row {y} served from cache");
            return Ok(row);
        }
        let row = self.binarizer.black_row(y, None)?;
        if let Ok(mut rows) = self.rows.lock() {
            rows.insert(y, row.clone());
        }
        Ok(row)
    }

    fn cached_row(&self, y: usize) -> Option<BitArray> {
        self.rows.lock().ok()?.get(&y).cloned()
    }

    /// Binarized image, for 2D readers
    pub fn black_matrix(&self) -> Result<&BitMatrix> {
        if let Some(matrix) = self.matrix.get() {
            trace!("black matrix served from cache");
            return Ok(matrix);
        }
        let matrix = self.binarizer.black_matrix()?;
        Ok(self.matrix.get_or_init(|| matrix))
    }

    /// Whether the underlying source supports [`BinaryBitmap::crop`]
    pub fn is_crop_supported(&self) -> bool {
        self.binarizer.luminance_source().is_crop_supported()
    }

    /// New bitmap over the `width` x `height` rectangle at (left, top),
    /// binarized with the same strategy
    pub fn crop(&self, left: usize, top: usize, width: usize, height: usize) -> Result<BinaryBitmap> {
        let source = self.binarizer.luminance_source().clone().crop(left, top, width, height)?;
        Ok(Self::new(self.binarizer.create_binarizer(source)))
    }

    /// Whether the underlying source supports rotation
    pub fn is_rotate_supported(&self) -> bool {
        self.binarizer.luminance_source().is_rotate_supported()
    }

    /// New bitmap over the source rotated 90 degrees counter-clockwise
    pub fn rotate_counter_clockwise(&self) -> Result<BinaryBitmap> {
        let source = self.binarizer.luminance_source().rotate_counter_clockwise()?;
        Ok(Self::new(self.binarizer.create_binarizer(source)))
    }

    /// New bitmap over the source rotated 45 degrees counter-clockwise
    pub fn rotate_counter_clockwise_45(&self) -> Result<BinaryBitmap> {
        let source = self.binarizer.luminance_source().rotate_counter_clockwise_45()?;
        Ok(Self::new(self.binarizer.create_binarizer(source)))
    }
}

impl fmt::Display for BinaryBitmap {
    /// The black matrix rendering, or nothing when binarization fails
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.black_matrix() {
            Ok(matrix) => write!(f, "{matrix}"),
            Err(_) => Ok(()),
        }
    }
}

impl fmt::Debug for BinaryBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryBitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("matrix_cached", &self.matrix.get().is_some())
            .finish()
    }
}
