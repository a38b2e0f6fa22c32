//! One word per line, twelve octal digits

use crate::types::Word;
use std::io::{self, Read, Write};

const DIGITS: usize = 12;

fn next_byte<R: Read>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

pub(crate) fn read_word<R: Read>(reader: &mut R) -> io::Result<Option<Word>> {
    let mut value = 0u64;
    let mut digits = 0;
    loop {
        match next_byte(reader)? {
            None => break,
            Some(c) if c.is_ascii_whitespace() => {
                if digits > 0 {
                    break;
                }
            }
            Some(c @ b'0'..=b'7') if digits < DIGITS => {
                value = (value << 3) | u64::from(c - b'0');
                digits += 1;
            }
            Some(c) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unexpected byte {:#04x} in octal word", c),
                ));
            }
        }
    }
    if digits == 0 {
        return Ok(None);
    }
    Ok(Some(Word::new(value)))
}

pub(crate) fn write_word<W: Write>(writer: &mut W, word: Word) -> io::Result<()> {
    writeln!(writer, "{:012o}", word.value())
}
