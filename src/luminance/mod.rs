//! Grayscale pixel sources
//!
//! A [`LuminanceSource`] is an immutable rectangle of 8-bit luminance
//! values. Derived views (crop, invert, rotate) are new shared sources; the
//! shared default behaviors live in free functions below so each concrete
//! source opts into them explicitly.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// In-memory 8-bit grayscale buffers
pub mod gray;
pub mod image_source;
/// Negative view over another source
pub mod inverted;
pub mod rgb;

pub use gray::GrayLuminanceSource;
pub use inverted::InvertedLuminanceSource;

/// Shared handle to a luminance source
pub type SharedSource = Arc<dyn LuminanceSource>;

/// Rectangular buffer of luminance values in `0..=255`
pub trait LuminanceSource: Send + Sync {
    /// Width in pixels
    fn width(&self) -> usize;

    /// Height in pixels
    fn height(&self) -> usize;

    /// Fill `row` with the `width()` luminance values of scanline `y`
    fn row(&self, y: usize, row: &mut Vec<u8>) -> Result<()>;

    /// All luminance values, row-major, `width() * height()` bytes
    fn matrix(&self) -> Vec<u8>;

    /// Whether [`LuminanceSource::crop`] accepts sub-rectangles
    fn is_crop_supported(&self) -> bool {
        false
    }

    /// View of the `width` x `height` rectangle at (left, top)
    fn crop(self: Arc<Self>, left: usize, top: usize, width: usize, height: usize) -> Result<SharedSource>;

    /// View producing `255 - value` for every pixel
    fn invert(self: Arc<Self>) -> SharedSource;

    /// Whether [`LuminanceSource::rotate_counter_clockwise`] is available
    fn is_rotate_supported(&self) -> bool {
        false
    }

    /// Source rotated 90 degrees counter-clockwise
    fn rotate_counter_clockwise(&self) -> Result<SharedSource> {
        Err(Error::Unsupported("rotate_counter_clockwise"))
    }

    /// Source rotated 45 degrees counter-clockwise
    fn rotate_counter_clockwise_45(&self) -> Result<SharedSource> {
        Err(Error::Unsupported("rotate_counter_clockwise_45"))
    }
}

/// Default crop: only the full rectangle is accepted, and it yields the
/// source itself
///
/// Sources without sub-rectangle support delegate their
/// [`LuminanceSource::crop`] here and leave `is_crop_supported` false.
pub fn crop_full_only(
    source: SharedSource,
    left: usize,
    top: usize,
    width: usize,
    height: usize,
) -> Result<SharedSource> {
    if left == 0 && top == 0 && width == source.width() && height == source.height() {
        return Ok(source);
    }
    Err(Error::Unsupported("crop"))
}

/// Default invert: wrap the source in an [`InvertedLuminanceSource`]
pub fn invert_source(source: SharedSource) -> SharedSource {
    Arc::new(InvertedLuminanceSource::new(source))
}

/// Check that a crop rectangle lies inside a `width` x `height` source
pub(crate) fn check_crop(
    left: usize,
    top: usize,
    width: usize,
    height: usize,
    source_width: usize,
    source_height: usize,
) -> Result<()> {
    if left.saturating_add(width) > source_width || top.saturating_add(height) > source_height {
        return Err(Error::InvalidArgument(format!(
            "crop rectangle {left},{top} {width}x{height} does not fit inside {source_width}x{source_height}"
        )));
    }
    Ok(())
}

/// Coarse ASCII rendering: `#` darkest, then `+`, `.`, and space for the
/// brightest quarter
pub fn render(source: &dyn LuminanceSource) -> String {
    let (width, height) = (source.width(), source.height());
    let mut out = String::with_capacity(height * (width + 1));
    let mut row = Vec::with_capacity(width);
    for y in 0..height {
        if source.row(y, &mut row).is_err() {
            break;
        }
        for &luminance in &row {
            out.push(match luminance {
                0..=0x3F => '#',
                0x40..=0x7F => '+',
                0x80..=0xBF => '.',
                _ => ' ',
            });
        }
        out.push('\n');
    }
    out
}

impl fmt::Display for dyn LuminanceSource + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}
