//! Block checksum: XOR of every word in the block

use crate::types::Word;

/// Running XOR accumulator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checksum(u64);

impl Checksum {
    /// Start a new block
    pub const fn new() -> Self {
        Self(0)
    }

    /// Fold one word in
    pub fn update(&mut self, word: Word) {
        self.0 ^= word.value();
    }

    /// Fold a slice of words in
    pub fn update_all(&mut self, words: &[Word]) {
        for &word in words {
            self.update(word);
        }
    }

    /// Reset for the next block
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Accumulated value as a word
    pub const fn value(&self) -> Word {
        Word::new(self.0)
    }

    /// Compare against a trailing checksum word, ignoring tape markers
    pub fn matches(&self, word: Word) -> bool {
        word.value() == self.0
    }

    /// Checksum of a whole block
    pub fn of(words: &[Word]) -> Word {
        let mut sum = Self::new();
        sum.update_all(words);
        sum.value()
    }
}
