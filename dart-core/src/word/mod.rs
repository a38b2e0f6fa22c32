//! Word codecs
//!
//! Every format turns a byte stream into 36-bit words and back. Reading at end
//! of input never fails; it returns `None`. Formats are chosen independently
//! for the tape image and for extracted file content.

mod ascii;
mod data8;
mod dta;
mod octal;
mod simh;

use crate::error::DartError;
use crate::types::Word;
use serde::{Deserialize, Serialize};
use simh::{SimhReader, SimhWriter, TapeFrame};
use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

/// Byte layout of a word stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordFormat {
    /// SIMH tape image, six 7-track frames per word
    Tape7,
    /// SIMH tape image, five 9-track frames per word (core dump)
    Tape9,
    /// Eight little-endian bytes per word
    Data8,
    /// Two 18-bit halves, four little-endian bytes each
    Dta,
    /// Five 7-bit characters per word
    Ascii,
    /// Twelve octal digits per word, one word per line
    Octal,
}

impl WordFormat {
    /// Every supported format
    pub const ALL: [WordFormat; 6] = [
        Self::Tape7,
        Self::Tape9,
        Self::Data8,
        Self::Dta,
        Self::Ascii,
        Self::Octal,
    ];

    /// Name accepted on the command line
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tape7 => "tape7",
            Self::Tape9 => "tape9",
            Self::Data8 => "data8",
            Self::Dta => "dta",
            Self::Ascii => "ascii",
            Self::Octal => "octal",
        }
    }

    /// Whether the format keeps tape record boundaries
    pub const fn is_framed(self) -> bool {
        matches!(self, Self::Tape7 | Self::Tape9)
    }

    /// Whether a byte-exact round trip of arbitrary words is guaranteed
    ///
    /// `ascii` drops bit 0 and NUL characters.
    pub const fn is_lossless(self) -> bool {
        !matches!(self, Self::Ascii)
    }
}

impl Default for WordFormat {
    fn default() -> Self {
        Self::Tape7
    }
}

impl fmt::Display for WordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WordFormat {
    type Err = DartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let lookup = match lower.as_str() {
            "7" | "7track" => "tape7",
            "9" | "9track" | "tape" => "tape9",
            "8" => "data8",
            "aa" | "text" => "ascii",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|format| format.name() == lookup)
            .ok_or_else(|| DartError::UnknownWordFormat(s.to_string()))
    }
}

/// Reads words from a byte stream
///
/// Wrap the inner reader in a `BufReader`; codecs issue small reads.
pub struct WordReader<R: Read> {
    inner: R,
    format: WordFormat,
    simh: SimhReader,
    peeked: Option<Option<Word>>,
    words: u64,
}

impl<R: Read> WordReader<R> {
    /// Create a reader for `format`
    pub fn new(inner: R, format: WordFormat) -> Self {
        Self {
            inner,
            format,
            simh: SimhReader::default(),
            peeked: None,
            words: 0,
        }
    }

    /// The format being read
    pub fn format(&self) -> WordFormat {
        self.format
    }

    /// Words consumed so far
    pub fn words_read(&self) -> u64 {
        self.words
    }

    /// Next word, or `None` at end of stream
    pub fn next_word(&mut self) -> io::Result<Option<Word>> {
        let word = match self.peeked.take() {
            Some(word) => word,
            None => self.decode()?,
        };
        if word.is_some() {
            self.words += 1;
        }
        Ok(word)
    }

    /// Look at the next word without consuming it
    pub fn peek(&mut self) -> io::Result<Option<Word>> {
        if let Some(word) = self.peeked {
            return Ok(word);
        }
        let word = self.decode()?;
        self.peeked = Some(word);
        Ok(word)
    }

    /// Give back the inner reader
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn decode(&mut self) -> io::Result<Option<Word>> {
        let inner = &mut self.inner;
        match self.format {
            WordFormat::Tape7 => self.simh.read_word(inner, TapeFrame::Seven),
            WordFormat::Tape9 => self.simh.read_word(inner, TapeFrame::Nine),
            WordFormat::Data8 => data8::read_word(inner),
            WordFormat::Dta => dta::read_word(inner),
            WordFormat::Ascii => ascii::read_word(inner),
            WordFormat::Octal => octal::read_word(inner),
        }
    }
}

impl<R: Read> Iterator for WordReader<R> {
    type Item = io::Result<Word>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_word().transpose()
    }
}

/// Writes words to a byte stream
///
/// Call [`WordWriter::finish`] (or [`WordWriter::flush_words`]) when done;
/// framed formats hold the current tape record until then.
pub struct WordWriter<W: Write> {
    inner: W,
    format: WordFormat,
    simh: SimhWriter,
    words: u64,
}

impl<W: Write> WordWriter<W> {
    /// Create a writer for `format`
    pub fn new(inner: W, format: WordFormat) -> Self {
        Self {
            inner,
            format,
            simh: SimhWriter::default(),
            words: 0,
        }
    }

    /// The format being written
    pub fn format(&self) -> WordFormat {
        self.format
    }

    /// Words written so far
    pub fn words_written(&self) -> u64 {
        self.words
    }

    /// Write one word; tape markers on it are honored by framed formats
    pub fn write_word(&mut self, word: Word) -> io::Result<()> {
        let inner = &mut self.inner;
        match self.format {
            WordFormat::Tape7 => self.simh.write_word(inner, word, TapeFrame::Seven)?,
            WordFormat::Tape9 => self.simh.write_word(inner, word, TapeFrame::Nine)?,
            WordFormat::Data8 => data8::write_word(inner, word)?,
            WordFormat::Dta => dta::write_word(inner, word)?,
            WordFormat::Ascii => ascii::write_word(inner, word)?,
            WordFormat::Octal => octal::write_word(inner, word)?,
        }
        self.words += 1;
        Ok(())
    }

    /// Write a run of words
    pub fn write_words(&mut self, words: &[Word]) -> io::Result<()> {
        for &word in words {
            self.write_word(word)?;
        }
        Ok(())
    }

    /// Pad and align the stream and flush the inner writer
    pub fn flush_words(&mut self) -> io::Result<()> {
        if self.format.is_framed() {
            self.simh.finish(&mut self.inner)?;
        }
        self.inner.flush()
    }

    /// Flush and give back the inner writer
    pub fn finish(mut self) -> io::Result<W> {
        self.flush_words()?;
        Ok(self.inner)
    }
}

/// Copy every word from `reader` to `writer`, keeping tape markers
///
/// Returns the number of words copied. The writer is flushed.
pub fn convert<R: Read, W: Write>(
    reader: &mut WordReader<R>,
    writer: &mut WordWriter<W>,
) -> io::Result<u64> {
    let mut count = 0;
    while let Some(word) = reader.next_word()? {
        writer.write_word(word)?;
        count += 1;
    }
    writer.flush_words()?;
    Ok(count)
}

/// Read as many bytes as are available into `buf`, up to its length
pub(crate) fn read_fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{START_FILE, START_RECORD};
    use std::io::Cursor;

    fn sample() -> Vec<Word> {
        vec![
            Word::new(0),
            Word::new(0o777777777777),
            Word::new(0o123456701234),
            Word::from_halves(0o777776, 0o22),
            Word::new(0o1),
        ]
    }

    fn write_all(format: WordFormat, words: &[Word]) -> Vec<u8> {
        let mut writer = WordWriter::new(Vec::new(), format);
        writer.write_words(words).unwrap();
        writer.finish().unwrap()
    }

    fn read_all(format: WordFormat, bytes: &[u8]) -> Vec<Word> {
        WordReader::new(Cursor::new(bytes), format)
            .map(|w| w.unwrap().unmarked())
            .collect()
    }

    #[test]
    fn test_lossless_formats_round_trip() {
        for format in WordFormat::ALL.into_iter().filter(|f| f.is_lossless()) {
            let bytes = write_all(format, &sample());
            assert_eq!(read_all(format, &bytes), sample(), "format {}", format);
        }
    }

    #[test]
    fn test_empty_input_is_end_of_stream() {
        for format in WordFormat::ALL {
            let mut reader = WordReader::new(Cursor::new(Vec::new()), format);
            assert_eq!(reader.next_word().unwrap(), None, "format {}", format);
            assert_eq!(reader.next_word().unwrap(), None, "format {}", format);
        }
    }

    #[test]
    fn test_peek_does_not_consume() {
        let bytes = write_all(WordFormat::Dta, &sample());
        let mut reader = WordReader::new(Cursor::new(bytes), WordFormat::Dta);
        let first = reader.peek().unwrap();
        assert_eq!(reader.peek().unwrap(), first);
        assert_eq!(reader.words_read(), 0);
        assert_eq!(reader.next_word().unwrap(), first);
        assert_eq!(reader.words_read(), 1);
        assert_eq!(reader.next_word().unwrap(), Some(sample()[1]));
    }

    #[test]
    fn test_format_names() {
        for format in WordFormat::ALL {
            assert_eq!(format.name().parse::<WordFormat>().unwrap(), format);
        }
        assert_eq!("aa".parse::<WordFormat>().unwrap(), WordFormat::Ascii);
        assert_eq!("9".parse::<WordFormat>().unwrap(), WordFormat::Tape9);
        assert!(matches!(
            "punch".parse::<WordFormat>(),
            Err(DartError::UnknownWordFormat(_))
        ));
    }

    #[test]
    fn test_convert_keeps_markers() {
        let words = vec![
            Word::new(1).with_markers(START_FILE),
            Word::new(2),
            Word::new(3).with_markers(START_RECORD),
            Word::new(4),
        ];
        let tape7 = write_all(WordFormat::Tape7, &words);

        let mut reader = WordReader::new(Cursor::new(tape7), WordFormat::Tape7);
        let mut writer = WordWriter::new(Vec::new(), WordFormat::Tape9);
        assert_eq!(convert(&mut reader, &mut writer).unwrap(), 4);
        let tape9 = writer.finish().unwrap();

        let back: Vec<Word> = WordReader::new(Cursor::new(tape9), WordFormat::Tape9)
            .map(|w| w.unwrap())
            .collect();
        assert_eq!(back.len(), 4);
        assert!(back[0].is_marked());
        assert!(!back[1].is_marked());
        assert!(back[2].starts_record());
        assert_eq!(back[3], Word::new(4));
    }
}
