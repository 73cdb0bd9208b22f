//! Packed per-bit evaluation history for wide expressions.
//!
//! When bitwise tracking is enabled the simulator records, for every bit of
//! an expression's value, the same history it records for the scalar value.

use serde::{Deserialize, Serialize};

/// A fixed-width packed bit set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitMask {
    width: u32,
    words: Vec<u64>,
}

impl BitMask {
    /// Creates an all-zero mask of `width` bits.
    pub fn zeros(width: u32) -> Self {
        Self {
            width,
            words: vec![0; (width as usize).div_ceil(64)],
        }
    }

    /// Creates an all-one mask of `width` bits.
    pub fn ones(width: u32) -> Self {
        let mut mask = Self::zeros(width);
        for bit in 0..width {
            mask.set(bit, true);
        }
        mask
    }

    /// Returns the number of bits in the mask.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns bit `bit`; bits at or beyond the width read as zero.
    pub fn get(&self, bit: u32) -> bool {
        if bit >= self.width {
            return false;
        }
        (self.words[(bit / 64) as usize] >> (bit % 64)) & 1 == 1
    }

    /// Sets bit `bit` to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `bit` is outside the mask.
    pub fn set(&mut self, bit: u32, value: bool) {
        assert!(bit < self.width, "bit {bit} outside {}-bit mask", self.width);
        let word = &mut self.words[(bit / 64) as usize];
        if value {
            *word |= 1 << (bit % 64);
        } else {
            *word &= !(1 << (bit % 64));
        }
    }
}

/// Per-bit equivalents of an expression's supplemental bits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitHistory {
    /// Bits observed at 1.
    pub was_true: BitMask,
    /// Bits observed at 0.
    pub was_false: BitMask,
    /// Bits whose (left, right) inputs were observed at (0, 0).
    pub eval00: BitMask,
    /// Bits whose (left, right) inputs were observed at (0, 1).
    pub eval01: BitMask,
    /// Bits whose (left, right) inputs were observed at (1, 0).
    pub eval10: BitMask,
    /// Bits whose (left, right) inputs were observed at (1, 1).
    pub eval11: BitMask,
}

impl BitHistory {
    /// Creates an empty history for a `width`-bit value.
    pub fn new(width: u32) -> Self {
        Self {
            was_true: BitMask::zeros(width),
            was_false: BitMask::zeros(width),
            eval00: BitMask::zeros(width),
            eval01: BitMask::zeros(width),
            eval10: BitMask::zeros(width),
            eval11: BitMask::zeros(width),
        }
    }

    /// Returns the width the history was created for.
    pub fn width(&self) -> u32 {
        self.was_true.width()
    }
}
