//! Text packed five 7-bit characters per word, left-justified, bit 0 unused

use super::read_fill;
use crate::types::Word;
use std::io::{self, Read, Write};

const CHARS: usize = 5;

pub(crate) fn read_word<R: Read>(reader: &mut R) -> io::Result<Option<Word>> {
    let mut buf = [0u8; CHARS];
    if read_fill(reader, &mut buf)? == 0 {
        return Ok(None);
    }
    let value = buf
        .iter()
        .fold(0u64, |acc, &c| (acc << 7) | u64::from(c & 0o177));
    Ok(Some(Word::new(value << 1)))
}

pub(crate) fn write_word<W: Write>(writer: &mut W, word: Word) -> io::Result<()> {
    let value = word.value();
    let mut out = [0u8; CHARS];
    let mut len = 0;
    for i in 0..CHARS {
        let c = ((value >> (29 - 7 * i)) & 0o177) as u8;
        // NUL pads the last word of a file
        if c != 0 {
            out[len] = c;
            len += 1;
        }
    }
    writer.write_all(&out[..len])
}
