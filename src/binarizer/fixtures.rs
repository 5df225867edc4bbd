use std::sync::Arc;

use crate::luminance::{GrayLuminanceSource, SharedSource};

/// Square source whose scanlines alternate between a rising dark ramp from
/// 10 and a falling bright ramp from 250, offset by one pixel per row
pub(crate) fn alternating_gradient(size: usize) -> SharedSource {
    let mut data = vec![0u8; size * size];
    for y in 0..size {
        for i in 0..size {
            let step = (50 * i / size) as u8;
            data[y * size + i] = if (y + i) % 2 == 0 { 10 + step } else { 250 - step };
        }
    }
    Arc::new(GrayLuminanceSource::new(data, size, size).unwrap())
}

/// Square source where every pixel has the same luminance
pub(crate) fn solid(size: usize, value: u8) -> SharedSource {
    Arc::new(GrayLuminanceSource::new(vec![value; size * size], size, size).unwrap())
}
