// src/utils/bitfield.rs

/// A bit range inside one 64-bit word of a fixed-size record.
///
/// Words are numbered from the start of the record and are read as
/// little-endian `u64`, so bit 0 is the least significant bit of the first
/// byte of the word. `offset + width` never exceeds 64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitField {
    pub word: usize,
    pub offset: u32,
    pub width: u32,
}

impl BitField {
    pub const fn new(word: usize, offset: u32, width: u32) -> Self {
        assert!(width > 0 && offset + width <= 64);
        BitField { word, offset, width }
    }

    /// Byte-aligned field: `count` bytes starting at byte `first` of `word`.
    pub const fn bytes(word: usize, first: u32, count: u32) -> Self {
        Self::new(word, first * 8, count * 8)
    }

    pub const fn mask(&self) -> u64 {
        if self.width == 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    /// Highest value the field can hold.
    pub const fn max_value(&self) -> u64 {
        self.mask()
    }

    pub fn overlaps(&self, other: &BitField) -> bool {
        self.word == other.word
            && self.offset < other.offset + other.width
            && other.offset < self.offset + self.width
    }

    pub fn unpack(&self, words: &[u64]) -> u64 {
        (words[self.word] >> self.offset) & self.mask()
    }

    /// Stores `value` into the field. Bits of `value` above `width` are dropped,
    /// bits outside the field are left untouched.
    pub fn pack(&self, words: &mut [u64], value: u64) {
        let mask = self.mask() << self.offset;
        let word = &mut words[self.word];
        *word = (*word & !mask) | ((value << self.offset) & mask);
    }
}
