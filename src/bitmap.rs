//! Packed validity bitmap.
//!
//! One bit per element, stored little-endian inside `u64` words: bit 0 of
//! word 0 is element 0. A set bit means the element is valid, a clear bit
//! means it is null. The number of nulls is cached and kept in sync by every
//! mutation so `null_count` is O(1).

/// Validity flags for one buffer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidityBitmap {
    words: Vec<u64>,
    len: usize,
    null_count: usize,
}

const WORD_BITS: usize = 64;

#[inline]
fn words_for(bits: usize) -> usize {
    (bits + WORD_BITS - 1) / WORD_BITS
}

impl ValidityBitmap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        ValidityBitmap {
            words: Vec::with_capacity(words_for(bits)),
            len: 0,
            null_count: 0,
        }
    }

    /// A bitmap of `len` valid elements.
    pub fn all_valid(len: usize) -> Self {
        let mut words = vec![u64::MAX; words_for(len)];
        let rem = len % WORD_BITS;
        if rem != 0 {
            if let Some(last) = words.last_mut() {
                *last = (1u64 << rem) - 1;
            }
        }
        ValidityBitmap {
            words,
            len,
            null_count: 0,
        }
    }

    /// A bitmap of `len` null elements.
    pub fn all_null(len: usize) -> Self {
        ValidityBitmap {
            words: vec![0; words_for(len)],
            len,
            null_count: len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cached number of clear bits.
    pub fn null_count(&self) -> usize {
        self.null_count
    }

    pub fn push(&mut self, valid: bool) {
        let bit = self.len % WORD_BITS;
        if bit == 0 {
            self.words.push(0);
        }
        if valid {
            self.words[self.len / WORD_BITS] |= 1u64 << bit;
        } else {
            self.null_count += 1;
        }
        self.len += 1;
    }

    /// Panics if `index >= len`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        assert!(
            index < self.len,
            "validity index {} out of range [0, {})",
            index,
            self.len
        );
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Panics if `index >= len`.
    #[inline]
    pub fn set(&mut self, index: usize, valid: bool) {
        assert!(
            index < self.len,
            "validity index {} out of range [0, {})",
            index,
            self.len
        );
        let word = &mut self.words[index / WORD_BITS];
        let mask = 1u64 << (index % WORD_BITS);
        let was_valid = *word & mask != 0;
        match (was_valid, valid) {
            (true, false) => {
                *word &= !mask;
                self.null_count += 1;
            }
            (false, true) => {
                *word |= mask;
                self.null_count -= 1;
            }
            _ => {}
        }
    }

    /// Number of clear bits among the first `len` bits, by popcount over words.
    ///
    /// The backing words can be wider than the logical length, so callers
    /// that only own a prefix pass its length explicitly.
    pub fn count_nulls(&self, len: usize) -> usize {
        let len = len.min(self.len);
        let full = len / WORD_BITS;
        let mut valid: usize = self.words[..full]
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum();
        let rem = len % WORD_BITS;
        if rem != 0 {
            let mask = (1u64 << rem) - 1;
            valid += (self.words[full] & mask).count_ones() as usize;
        }
        len - valid
    }

    /// `self &= other`, bit by bit; the result is null wherever either side is.
    pub fn and_inplace(&mut self, other: &ValidityBitmap) {
        assert_eq!(self.len, other.len, "validity length mismatch");
        for (w, o) in self.words.iter_mut().zip(other.words.iter()) {
            *w &= *o;
        }
        self.null_count = self.count_nulls(self.len);
    }

    /// Set every bit, making all elements valid.
    pub fn fill_valid(&mut self) {
        *self = ValidityBitmap::all_valid(self.len);
    }

    pub fn as_words(&self) -> &[u64] {
        &self.words
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }
}
