use std::fmt;

use crate::error::{Error, Result};

/// Fixed-size row of bits packed into 32-bit words
///
/// Used for single binarized scanlines. Bit `i` lives in word `i / 32` at
/// position `i % 32`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitArray {
    size: usize,
    bits: Vec<u32>,
}

fn words_for(size: usize) -> usize {
    size.div_ceil(32)
}

impl BitArray {
    /// Create an array of `size` cleared bits
    pub fn new(size: usize) -> Self {
        Self {
            size,
            bits: vec![0; words_for(size)],
        }
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.size
    }

    /// True when the array holds no bits
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Get bit `i` (false when out of range)
    pub fn get(&self, i: usize) -> bool {
        if i >= self.size {
            return false;
        }
        (self.bits[i / 32] >> (i & 31)) & 1 == 1
    }

    /// Set bit `i` to `value`; out-of-range indices are ignored
    pub fn set(&mut self, i: usize, value: bool) {
        if i >= self.size {
            return;
        }
        if value {
            self.bits[i / 32] |= 1 << (i & 31);
        } else {
            self.bits[i / 32] &= !(1 << (i & 31));
        }
    }

    /// Flip bit `i`
    pub fn flip(&mut self, i: usize) {
        if i >= self.size {
            return;
        }
        self.bits[i / 32] ^= 1 << (i & 31);
    }

    /// Index of the first set bit at or after `from`, or `len()` if none
    pub fn next_set(&self, from: usize) -> usize {
        if from >= self.size {
            return self.size;
        }
        let mut offset = from / 32;
        let mut current = self.bits[offset] & (u32::MAX << (from & 31));
        while current == 0 {
            offset += 1;
            if offset == self.bits.len() {
                return self.size;
            }
            current = self.bits[offset];
        }
        (offset * 32 + current.trailing_zeros() as usize).min(self.size)
    }

    /// Index of the first cleared bit at or after `from`, or `len()` if none
    pub fn next_unset(&self, from: usize) -> usize {
        if from >= self.size {
            return self.size;
        }
        let mut offset = from / 32;
        let mut current = !self.bits[offset] & (u32::MAX << (from & 31));
        while current == 0 {
            offset += 1;
            if offset == self.bits.len() {
                return self.size;
            }
            current = !self.bits[offset];
        }
        (offset * 32 + current.trailing_zeros() as usize).min(self.size)
    }

    /// Overwrite the 32 bits starting at `i` (which must be word aligned)
    pub fn set_bulk(&mut self, i: usize, new_bits: u32) {
        if let Some(word) = self.bits.get_mut(i / 32) {
            *word = new_bits;
        }
    }

    /// Set every bit in `start..end`
    pub fn set_range(&mut self, start: usize, end: usize) -> Result<()> {
        if end < start || end > self.size {
            return Err(Error::InvalidArgument(format!(
                "range {start}..{end} outside bit array of {}",
                self.size
            )));
        }
        if start == end {
            return Ok(());
        }
        let last = end - 1;
        let (first_word, last_word) = (start / 32, last / 32);
        for w in first_word..=last_word {
            self.bits[w] |= range_mask(w, first_word, last_word, start, last);
        }
        Ok(())
    }

    /// Clear all bits
    pub fn clear(&mut self) {
        self.bits.fill(0);
    }

    /// True when every bit in `start..end` equals `value`
    pub fn is_range(&self, start: usize, end: usize, value: bool) -> Result<bool> {
        if end < start || end > self.size {
            return Err(Error::InvalidArgument(format!(
                "range {start}..{end} outside bit array of {}",
                self.size
            )));
        }
        if start == end {
            return Ok(true);
        }
        let last = end - 1;
        let (first_word, last_word) = (start / 32, last / 32);
        for w in first_word..=last_word {
            let mask = range_mask(w, first_word, last_word, start, last);
            let expected = if value { mask } else { 0 };
            if self.bits[w] & mask != expected {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Append one bit, growing the array
    pub fn append_bit(&mut self, bit: bool) {
        if self.size == self.bits.len() * 32 {
            self.bits.push(0);
        }
        self.size += 1;
        self.set(self.size - 1, bit);
    }

    /// XOR `other` into this array word by word
    pub fn xor(&mut self, other: &BitArray) -> Result<()> {
        if self.size != other.size {
            return Err(Error::InvalidArgument(format!(
                "sizes differ: {} vs {}",
                self.size, other.size
            )));
        }
        for (word, rhs) in self.bits.iter_mut().zip(&other.bits) {
            *word ^= rhs;
        }
        Ok(())
    }

    /// Reverse the order of all bits in place
    pub fn reverse(&mut self) {
        let mut reversed = vec![0u32; self.bits.len()];
        for i in 0..self.size {
            if self.get(i) {
                let j = self.size - 1 - i;
                reversed[j / 32] |= 1 << (j & 31);
            }
        }
        self.bits = reversed;
    }

    /// Backing words
    pub fn words(&self) -> &[u32] {
        &self.bits
    }
}

fn range_mask(word: usize, first_word: usize, last_word: usize, start: usize, last: usize) -> u32 {
    let first_bit = if word > first_word { 0 } else { start & 31 };
    let last_bit = if word < last_word { 31 } else { last & 31 };
    // 2 << 31 wraps to 0, which yields the full upper mask
    (2u32 << last_bit).wrapping_sub(1u32 << first_bit)
}

impl fmt::Display for BitArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(self.size + self.size / 8 + 1);
        for i in 0..self.size {
            if i & 7 == 0 {
                out.push(' ');
            }
            out.push(if self.get(i) { 'X' } else { '.' });
        }
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut array = BitArray::new(33);
        for i in 0..33 {
            assert!(!array.get(i));
            array.set(i, true);
            assert!(array.get(i));
        }
        array.set(40, true); // Should not panic
        assert!(!array.get(40));
        array.flip(32);
        assert!(!array.get(32));
    }

    #[test]
    fn test_next_set_and_unset() {
        let mut array = BitArray::new(70);
        assert_eq!(array.next_set(0), 70);
        array.set(5, true);
        array.set(64, true);
        assert_eq!(array.next_set(0), 5);
        assert_eq!(array.next_set(5), 5);
        assert_eq!(array.next_set(6), 64);
        assert_eq!(array.next_set(65), 70);
        assert_eq!(array.next_unset(5), 6);
        assert_eq!(array.next_unset(64), 65);
    }

    #[test]
    fn test_set_range_and_is_range() {
        let mut array = BitArray::new(64);
        array.set_range(28, 36).unwrap();
        assert!(!array.get(27));
        for i in 28..36 {
            assert!(array.get(i));
        }
        assert!(!array.get(36));
        assert!(array.is_range(28, 36, true).unwrap());
        assert!(!array.is_range(27, 36, true).unwrap());
        assert!(array.is_range(36, 64, false).unwrap());
        array.set_range(0, 64).unwrap();
        assert!(array.is_range(0, 64, true).unwrap());
        assert!(array.set_range(10, 65).is_err());
        assert!(array.is_range(5, 3, true).is_err());
    }

    #[test]
    fn test_reverse_and_append() {
        let mut array = BitArray::default();
        for bit in [true, false, false, true, true] {
            array.append_bit(bit);
        }
        assert_eq!(array.len(), 5);
        array.reverse();
        let bits: Vec<bool> = (0..5).map(|i| array.get(i)).collect();
        assert_eq!(bits, vec![true, true, false, false, true]);
    }

    #[test]
    fn test_xor() {
        let mut a = BitArray::new(40);
        let mut b = BitArray::new(40);
        a.set(1, true);
        b.set(1, true);
        b.set(39, true);
        a.xor(&b).unwrap();
        assert!(!a.get(1));
        assert!(a.get(39));
        assert!(a.xor(&BitArray::new(8)).is_err());
    }

    #[test]
    fn test_display() {
        let mut array = BitArray::new(10);
        array.set(1, true);
        array.set(9, true);
        assert_eq!(array.to_string(), " .X...... .X");
    }
}
