//! RGB/RGBA to luminance conversion
//!
//! Y = 0.299*R + 0.587*G + 0.114*B, using the integer approximation
//! Y = (76*R + 150*G + 29*B) >> 8. Large images are converted row by row
//! on the rayon pool.

use rayon::prelude::*;

// Rec. 601 weights in 8.8 fixed point
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

/// Pixel count from which conversion switches to the parallel path
const PARALLEL_MIN_PIXELS: usize = 256 * 256;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

fn convert_row(pixels: &[u8], channels: usize, out: &mut [u8]) {
    for (dst, px) in out.iter_mut().zip(pixels.chunks_exact(channels)) {
        *dst = luma(px[0], px[1], px[2]);
    }
}

fn convert(pixels: &[u8], channels: usize, width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if width == 0 {
        return gray;
    }
    let stride = width * channels;
    if width * height >= PARALLEL_MIN_PIXELS {
        gray.par_chunks_mut(width)
            .zip(pixels.par_chunks(stride))
            .for_each(|(row, src)| convert_row(src, channels, row));
    } else {
        for (row, src) in gray.chunks_mut(width).zip(pixels.chunks(stride)) {
            convert_row(src, channels, row);
        }
    }
    gray
}

/// Convert packed RGB (3 bytes per pixel) to luminance
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    convert(rgb, 3, width, height)
}

/// Convert packed RGBA (4 bytes per pixel) to luminance, ignoring alpha
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    convert(rgba, 4, width, height)
}

/// Luminance of a single RGB pixel
pub fn pixel_luminance(r: u8, g: u8, b: u8) -> u8 {
    luma(r, g, b)
}
