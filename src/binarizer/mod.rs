//! Luminance to black/white conversion strategies
//!
//! Every strategy implements [`Binarizer`] and can be swapped at any call
//! site. Callers own the retry policy: a typical reader tries
//! [`HybridBinarizer`] and falls back to [`GlobalHistogramBinarizer`] (or the
//! reverse) when a stage reports [`crate::Error::NotFound`].

use crate::error::Result;
use crate::luminance::SharedSource;
use crate::models::{BitArray, BitMatrix};

/// Single global threshold from a luminance histogram
pub mod global_histogram;
/// Per-block local thresholds for uneven lighting
pub mod hybrid;

#[cfg(test)]
pub(crate) mod fixtures;

pub use global_histogram::GlobalHistogramBinarizer;
pub use hybrid::HybridBinarizer;

/// Strategy turning a luminance source into black (set) and white bits
pub trait Binarizer: Send + Sync {
    /// The source this binarizer reads from
    fn luminance_source(&self) -> &SharedSource;

    /// Binarize scanline `y`, reusing `row` when it is large enough
    ///
    /// Fails with not-found when the row has no usable contrast.
    fn black_row(&self, y: usize, row: Option<BitArray>) -> Result<BitArray>;

    /// Binarize the whole image
    fn black_matrix(&self) -> Result<BitMatrix>;

    /// New binarizer of the same strategy bound to `source`, with no state
    /// carried over
    fn create_binarizer(&self, source: SharedSource) -> Box<dyn Binarizer>;

    /// Source width
    fn width(&self) -> usize {
        self.luminance_source().width()
    }

    /// Source height
    fn height(&self) -> usize {
        self.luminance_source().height()
    }
}
