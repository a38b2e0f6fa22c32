//! Eight little-endian bytes per word, low 36 bits significant

use super::read_fill;
use crate::types::Word;
use std::io::{self, Read, Write};

pub(crate) fn read_word<R: Read>(reader: &mut R) -> io::Result<Option<Word>> {
    let mut buf = [0u8; 8];
    if read_fill(reader, &mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(Word::new(u64::from_le_bytes(buf))))
}

pub(crate) fn write_word<W: Write>(writer: &mut W, word: Word) -> io::Result<()> {
    writer.write_all(&word.value().to_le_bytes())
}
