use std::fmt;

use super::BitArray;
use crate::error::{Error, Result};

/// Two-dimensional grid of bits, one per pixel or module
///
/// Rows are stored row-major, each padded to a whole number of 32-bit words
/// so a row can be copied to and from a [`BitArray`] word by word. A set bit
/// means "black".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    row_size: usize,
    bits: Vec<u32>,
}

impl BitMatrix {
    /// All-white matrix of `width` x `height` bits
    pub fn new(width: usize, height: usize) -> Self {
        let row_size = width.div_ceil(32);
        Self {
            width,
            height,
            row_size,
            bits: vec![0; row_size * height],
        }
    }

    /// Create a square matrix
    pub fn square(dimension: usize) -> Self {
        Self::new(dimension, dimension)
    }

    /// Parse a fixture such as `"X.X\n.X.\n"` where each row is a run of
    /// `set` / `unset` tokens terminated by a newline
    pub fn parse(text: &str, set: &str, unset: &str) -> Result<Self> {
        if set.is_empty() || unset.is_empty() {
            return Err(Error::InvalidArgument("empty bit token".into()));
        }
        let mut rows: Vec<Vec<bool>> = Vec::new();
        for line in text.split('\n') {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let mut row = Vec::new();
            let mut rest = line;
            while !rest.is_empty() {
                if let Some(tail) = rest.strip_prefix(set) {
                    row.push(true);
                    rest = tail;
                } else if let Some(tail) = rest.strip_prefix(unset) {
                    row.push(false);
                    rest = tail;
                } else {
                    return Err(Error::InvalidArgument(format!("illegal character in row: {line:?}")));
                }
            }
            rows.push(row);
        }

        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != width) {
            return Err(Error::InvalidArgument("row lengths do not match".into()));
        }
        let mut matrix = Self::new(width, rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, &bit) in row.iter().enumerate() {
                matrix.set(x, y, bit);
            }
        }
        Ok(matrix)
    }

    /// Columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of 32-bit words per row
    pub fn row_size(&self) -> usize {
        self.row_size
    }

    /// Bit at (x, y); `false` outside the matrix
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let offset = y * self.row_size + x / 32;
        (self.bits[offset] >> (x & 31)) & 1 == 1
    }

    /// Assign bit (x, y); writes outside the matrix are dropped
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = y * self.row_size + x / 32;
        if value {
            self.bits[offset] |= 1 << (x & 31);
        } else {
            self.bits[offset] &= !(1 << (x & 31));
        }
    }

    /// Flip bit (x, y)
    pub fn toggle(&mut self, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = y * self.row_size + x / 32;
        self.bits[offset] ^= 1 << (x & 31);
    }

    /// Reset every bit to white
    pub fn clear(&mut self) {
        self.bits.fill(0);
    }

    /// Set every bit of the `width` x `height` rectangle at (left, top)
    pub fn set_region(&mut self, left: usize, top: usize, width: usize, height: usize) -> Result<()> {
        if width < 1 || height < 1 {
            return Err(Error::InvalidArgument(
                "region width and height must be at least 1".into(),
            ));
        }
        let (right, bottom) = match (left.checked_add(width), top.checked_add(height)) {
            (Some(right), Some(bottom)) if right <= self.width && bottom <= self.height => (right, bottom),
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "region {left},{top} {width}x{height} does not fit in {}x{}",
                    self.width, self.height
                )));
            }
        };
        for y in top..bottom {
            let offset = y * self.row_size;
            for x in left..right {
                self.bits[offset + x / 32] |= 1 << (x & 31);
            }
        }
        Ok(())
    }

    /// Copy row `y` into a bit array, reusing `reusable` when it is large enough
    pub fn row(&self, y: usize, reusable: Option<BitArray>) -> Result<BitArray> {
        if y >= self.height {
            return Err(Error::InvalidArgument(format!(
                "row {y} outside matrix of height {}",
                self.height
            )));
        }
        let mut row = match reusable {
            Some(mut row) if row.len() >= self.width => {
                row.clear();
                row
            }
            _ => BitArray::new(self.width),
        };
        let offset = y * self.row_size;
        for x in 0..self.row_size {
            row.set_bulk(x * 32, self.bits[offset + x]);
        }
        Ok(row)
    }

    /// Overwrite row `y` with the leading bits of `row`
    pub fn set_row(&mut self, y: usize, row: &BitArray) -> Result<()> {
        if y >= self.height {
            return Err(Error::InvalidArgument(format!(
                "row {y} outside matrix of height {}",
                self.height
            )));
        }
        if row.len() < self.width {
            return Err(Error::InvalidArgument(format!(
                "row of {} bits is shorter than matrix width {}",
                row.len(),
                self.width
            )));
        }
        let offset = y * self.row_size;
        self.bits[offset..offset + self.row_size].copy_from_slice(&row.words()[..self.row_size]);
        // Drop any bits past the matrix width in the last word
        let tail = self.width & 31;
        if tail != 0 {
            self.bits[offset + self.row_size - 1] &= (1u32 << tail) - 1;
        }
        Ok(())
    }

    /// Rotate the matrix by 180 degrees in place
    pub fn rotate_180(&mut self) {
        let mut rotated = BitMatrix::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    rotated.set(self.width - 1 - x, self.height - 1 - y, true);
                }
            }
        }
        *self = rotated;
    }

    /// Bounding box `[left, top, width, height]` of all set bits
    pub fn enclosing_rectangle(&self) -> Option<[usize; 4]> {
        let mut left = self.width;
        let mut top = self.height;
        let mut right = 0;
        let mut bottom = 0;
        let mut found = false;

        for y in 0..self.height {
            for w in 0..self.row_size {
                let word = self.bits[y * self.row_size + w];
                if word == 0 {
                    continue;
                }
                found = true;
                top = top.min(y);
                bottom = bottom.max(y);
                left = left.min(w * 32 + word.trailing_zeros() as usize);
                right = right.max(w * 32 + 31 - word.leading_zeros() as usize);
            }
        }

        found.then(|| [left, top, right - left + 1, bottom - top + 1])
    }

    /// Coordinates of the first set bit in row-major order
    pub fn top_left_on_bit(&self) -> Option<(usize, usize)> {
        let offset = self.bits.iter().position(|&w| w != 0)?;
        let y = offset / self.row_size;
        let x = (offset % self.row_size) * 32 + self.bits[offset].trailing_zeros() as usize;
        Some((x, y))
    }

    /// Coordinates of the last set bit in row-major order
    pub fn bottom_right_on_bit(&self) -> Option<(usize, usize)> {
        let offset = self.bits.iter().rposition(|&w| w != 0)?;
        let y = offset / self.row_size;
        let x = (offset % self.row_size) * 32 + 31 - self.bits[offset].leading_zeros() as usize;
        Some((x, y))
    }
}

impl Default for BitMatrix {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl fmt::Display for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(if self.get(x, y) { 'X' } else { '.' });
            }
            out.push('\n');
        }
        f.write_str(&out)
    }
}
