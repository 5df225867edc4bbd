//! Pixel and coordinate helpers
//!
//! - RGB/RGBA to luminance conversion, parallel on large frames
//! - Perspective transforms between quadrilaterals

/// Homogeneous 3x3 transforms
pub mod geometry;
/// Color to luminance conversion
pub mod grayscale;
