//! Fuzzing harness for dart-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Call these functions from a `fuzz_target!` body

use dart_core::{extract_tape, MemorySink, TapeDecoder, WordFormat, WordReader, WordWriter};
use std::io::Cursor;

/// Decode arbitrary bytes as a tape in every word format
pub fn fuzz_decode(data: &[u8]) {
    for format in WordFormat::ALL {
        // Should either finish or return an error, never panic
        let mut decoder = TapeDecoder::new(Cursor::new(data), format);
        let mut sink = MemorySink::new();
        let _ = extract_tape(&mut decoder, &mut sink, |_| {});
    }
}

/// Read arbitrary bytes as words and write them back in every format
pub fn fuzz_codecs(data: &[u8]) {
    for from in WordFormat::ALL {
        let words: Vec<_> = WordReader::new(Cursor::new(data), from)
            .map_while(Result::ok)
            .collect();
        for to in WordFormat::ALL {
            let mut writer = WordWriter::new(Vec::new(), to);
            let _ = writer.write_words(&words);
            let _ = writer.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzz_decode_empty() {
        fuzz_decode(&[]);
    }

    #[test]
    fn test_fuzz_decode_random() {
        fuzz_decode(&[0x12, 0x34, 0x56, 0x78, 0x05, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_fuzz_decode_ones() {
        fuzz_decode(&[0xFF; 1024]);
    }

    #[test]
    fn test_fuzz_codecs_random() {
        fuzz_codecs(b"0777 12x\n\x00\x01\x02\x03\x04\x05\x06\x07\x08");
    }
}
