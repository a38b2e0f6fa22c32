//! Sixbit text packing
//!
//! Six characters per word, left-justified, each the ASCII code minus 0o40.
//! Only the range `' '..='_'` is representable; lowercase letters are folded to
//! uppercase and anything else becomes `_`.

use crate::types::Word;

/// Characters per word
pub const CHARS_PER_WORD: usize = 6;

/// True when `c` survives a sixbit round trip (after uppercasing)
pub fn is_representable(c: char) -> bool {
    matches!(c.to_ascii_uppercase(), ' '..='_')
}

fn to_code(c: char) -> u64 {
    let c = c.to_ascii_uppercase();
    if is_representable(c) {
        (c as u64 - 0o40) & 0o77
    } else {
        u64::from(b'_' - 0o40)
    }
}

/// Pack up to six characters into a word, padding with spaces
pub fn encode(text: &str) -> Word {
    let mut chars = text.chars();
    let mut word = 0u64;
    for _ in 0..CHARS_PER_WORD {
        word <<= 6;
        if let Some(c) = chars.next() {
            word |= to_code(c);
        }
    }
    Word::new(word)
}

/// Unpack all six characters of a word, trailing spaces included
pub fn decode(word: Word) -> String {
    let value = word.value();
    (0..CHARS_PER_WORD)
        .map(|i| {
            let code = (value >> (30 - 6 * i)) & 0o77;
            char::from(code as u8 + 0o40)
        })
        .collect()
}

/// Unpack a word and drop trailing spaces
pub fn decode_trimmed(word: Word) -> String {
    decode(word).trim_end().to_string()
}

/// Unpack the first `width` characters of a word, trailing spaces dropped
pub fn decode_prefix(word: Word, width: usize) -> String {
    decode(word)
        .chars()
        .take(width)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Fold `text` to what a sixbit field of `width` characters can hold
pub fn normalize(text: &str, width: usize) -> String {
    text.chars()
        .take(width)
        .map(|c| {
            let c = c.to_ascii_uppercase();
            if is_representable(c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}
