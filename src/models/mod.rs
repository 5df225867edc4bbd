//! Bit containers and coordinates shared by every stage

/// Packed one-dimensional bit row
pub mod bit_array;
/// Packed two-dimensional bit grid
pub mod matrix;
/// Floating point image coordinates
pub mod point;

pub use bit_array::BitArray;
pub use matrix::BitMatrix;
pub use point::Point;
