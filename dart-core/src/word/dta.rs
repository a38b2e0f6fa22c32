//! DECtape image layout: each 18-bit half as four little-endian bytes, high half first

use super::read_fill;
use crate::constants::HALF_MASK;
use crate::types::Word;
use std::io::{self, Read, Write};

pub(crate) fn read_word<R: Read>(reader: &mut R) -> io::Result<Option<Word>> {
    let mut buf = [0u8; 8];
    if read_fill(reader, &mut buf)? == 0 {
        return Ok(None);
    }
    let half = |bytes: &[u8]| {
        (u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as u64 & HALF_MASK) as u32
    };
    Ok(Some(Word::from_halves(half(&buf[0..4]), half(&buf[4..8]))))
}

pub(crate) fn write_word<W: Write>(writer: &mut W, word: Word) -> io::Result<()> {
    writer.write_all(&word.high().to_le_bytes())?;
    writer.write_all(&word.low().to_le_bytes())
}
