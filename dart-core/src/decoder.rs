//! Record decoding
//!
//! A strict forward pass over the word stream. Each iteration starts from the
//! control word left over by the previous record; its high half selects the
//! record type and its low half gives the block length.

use crate::checksum::Checksum;
use crate::constants::{DART_MAGIC, HEADER_WORDS, HEAD_MAGIC, MAX_BLOCK_WORDS, TAIL_MAGIC};
use crate::error::DartError;
use crate::record::{FileStart, Record, RecordKind, TapeHeader};
use crate::types::{StructureVersion, Word};
use crate::word::{WordFormat, WordReader};
use crate::Result;
use serde::Serialize;
use std::io::Read;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// A recoverable problem; decoding continued but output may be wrong
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeWarning {
    /// Trailing checksum word disagrees with the block
    ChecksumMismatch {
        /// Record index on tape
        record: u64,
        /// Word found after the block
        found: u64,
        /// XOR of the block
        computed: u64,
    },
    /// Input ended where a checksum word was due
    MissingChecksum {
        /// Record index on tape
        record: u64,
    },
    /// Header block does not start with the DART magic word
    BadDartMagic {
        /// Record index on tape
        record: u64,
        /// Word found instead
        found: u64,
    },
    /// Header block kind is neither HEAD nor TAIL
    BadHeaderKind {
        /// Record index on tape
        record: u64,
        /// Word found instead
        found: u64,
    },
    /// Block shorter than the fields it must carry
    ShortDescriptor {
        /// Record index on tape
        record: u64,
        /// Words expected
        expected: usize,
        /// Words present
        actual: usize,
    },
    /// Data record with no file open
    OrphanData {
        /// Record index on tape
        record: u64,
        /// Words discarded
        words: usize,
    },
    /// Input ended without a tape trailer
    NoTrailer,
}

/// Counters for one pass over a tape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodeStats {
    /// Records decoded
    pub records: u64,
    /// Tape headers seen
    pub headers: u64,
    /// Tape trailers seen
    pub trailers: u64,
    /// FileStart records seen
    pub files: u64,
    /// Data records seen
    pub data_records: u64,
    /// Words of file content, FileStart payloads included
    pub data_words: u64,
    /// Gap records seen
    pub gaps: u64,
    /// Blocks with a bad checksum
    pub checksum_failures: u64,
    /// Everything recoverable that went wrong
    pub warnings: Vec<DecodeWarning>,
}

/// A record plus whether it ends the open file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    /// The record
    pub record: Record,
    /// The next control word is not a Data continuation (or input ended)
    /// while a file is open: close it after handling this record
    pub closes_file: bool,
}

/// Decoding context for one tape
///
/// Holds everything that changes while walking the tape: the lookahead
/// control word, the current tape and structure versions, the checksum
/// accumulator and the block buffer.
pub struct TapeDecoder<R: Read> {
    words: WordReader<R>,
    control: Option<Word>,
    started: bool,
    tape_version: Option<u32>,
    structure: StructureVersion,
    checksum: Checksum,
    block: Vec<Word>,
    file_open: bool,
    trailer_seen: bool,
    stats: DecodeStats,
}

impl<R: Read> TapeDecoder<R> {
    /// Decode a tape stored in `format`
    pub fn new(reader: R, format: WordFormat) -> Self {
        Self::from_words(WordReader::new(reader, format))
    }

    /// Decode from an existing word reader
    pub fn from_words(words: WordReader<R>) -> Self {
        Self {
            words,
            control: None,
            started: false,
            tape_version: None,
            structure: StructureVersion::default(),
            checksum: Checksum::new(),
            block: Vec::new(),
            file_open: false,
            trailer_seen: false,
            stats: DecodeStats::default(),
        }
    }

    /// Tape version of the most recent header
    pub fn tape_version(&self) -> Option<u32> {
        self.tape_version
    }

    /// Structure version of the most recent FileStart
    pub fn structure_version(&self) -> StructureVersion {
        self.structure
    }

    /// Counters so far
    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Consume the decoder, returning its counters
    pub fn into_stats(self) -> DecodeStats {
        self.stats
    }

    /// Whether the first word looks like a header control word
    ///
    /// Uses one word of lookahead; nothing is consumed. A `false` usually
    /// means the wrong tape format was selected.
    pub fn looks_like_dart(&mut self) -> Result<bool> {
        if self.started {
            return Ok(true);
        }
        Ok(match self.words.peek()? {
            Some(word) => {
                matches!(RecordKind::classify(word.high()), RecordKind::Header(v) if v > 0)
                    && word.low() as usize >= HEADER_WORDS
            }
            None => false,
        })
    }

    /// Decode the next record, `None` at end of tape
    pub fn next_record(&mut self) -> Result<Option<DecodedRecord>> {
        if !self.started {
            self.started = true;
            self.control = self.words.next_word()?;
            if self.control.is_none() {
                return Err(DartError::EmptyTape);
            }
        }

        let Some(control) = self.control else {
            if !self.trailer_seen && !self.stats.warnings.contains(&DecodeWarning::NoTrailer) {
                #[cfg(feature = "logging")]
                warn!("end of tape (no trailer)");
                self.stats.warnings.push(DecodeWarning::NoTrailer);
            }
            return Ok(None);
        };

        let length = control.low() as usize;
        let record = match RecordKind::classify(control.high()) {
            RecordKind::Data => {
                #[cfg(feature = "logging")]
                debug!("record: data, {} words", length);
                let payload = self.read_checked_block(length)?;
                self.stats.data_records += 1;
                if self.file_open {
                    self.stats.data_words += payload.len() as u64;
                } else {
                    self.warn(DecodeWarning::OrphanData {
                        record: self.stats.records,
                        words: payload.len(),
                    });
                }
                Record::Data { words: payload }
            }
            RecordKind::FileStart(version) => {
                #[cfg(feature = "logging")]
                debug!("record: file ({}), {} words", version, length);
                self.structure = version;
                let block = self.read_checked_block(length)?;
                if block.len() < version.descriptor_words() {
                    self.warn(DecodeWarning::ShortDescriptor {
                        record: self.stats.records,
                        expected: version.descriptor_words(),
                        actual: block.len(),
                    });
                }
                let file = FileStart::from_words(version, self.tape_version, &block);
                #[cfg(feature = "logging")]
                if let Some(extended) = &file.extended {
                    debug!("record number: {:012o}", extended.record_number);
                }
                self.stats.files += 1;
                self.stats.data_words += file.payload.len() as u64;
                self.file_open = true;
                Record::FileStart(file)
            }
            RecordKind::Gap => {
                #[cfg(feature = "logging")]
                debug!("record: gap");
                let skipped = self.skip_gap()?;
                self.stats.gaps += 1;
                Record::Gap { skipped }
            }
            RecordKind::Header(version) => {
                #[cfg(feature = "logging")]
                debug!("record: head, tape version {}", version);
                let header = self.read_header(version, length)?;
                Record::Header(header)
            }
            RecordKind::Unrecognized(high) => return Err(DartError::UnrecognizedRecord(high)),
        };
        self.stats.records += 1;

        // The word after the record is the next control word.
        self.control = self.words.next_word()?;
        let closes_file = self.file_open
            && matches!(record, Record::FileStart(_) | Record::Data { .. })
            && self.control.map_or(true, |word| word.high() != 0);
        if closes_file {
            self.file_open = false;
        }

        Ok(Some(DecodedRecord {
            record,
            closes_file,
        }))
    }

    /// Read exactly `length` words into the block buffer, accumulating the checksum
    fn get_block(&mut self, length: usize) -> Result<()> {
        if length > MAX_BLOCK_WORDS {
            return Err(DartError::BlockTooLarge(length, MAX_BLOCK_WORDS));
        }
        self.checksum.reset();
        self.block.clear();
        self.block.reserve(length);
        for read in 0..length {
            let word = self.words.next_word()?.ok_or(DartError::PhysicalEndOfTape)?;
            if word.is_marked() {
                return Err(DartError::ShortRecord {
                    expected: length,
                    actual: read,
                });
            }
            self.checksum.update(word);
            self.block.push(word);
        }
        Ok(())
    }

    /// Read a block followed by its checksum word
    fn read_checked_block(&mut self, length: usize) -> Result<Vec<Word>> {
        self.get_block(length)?;
        let record = self.stats.records;
        match self.words.next_word()? {
            Some(word) if self.checksum.matches(word) => {
                #[cfg(feature = "logging")]
                debug!("good checksum: {}", self.checksum.value());
            }
            Some(word) => {
                self.stats.checksum_failures += 1;
                self.warn(DecodeWarning::ChecksumMismatch {
                    record,
                    found: word.value(),
                    computed: self.checksum.value().value(),
                });
            }
            None => self.warn(DecodeWarning::MissingChecksum { record }),
        }
        Ok(std::mem::take(&mut self.block))
    }

    fn read_header(&mut self, version: u32, length: usize) -> Result<TapeHeader> {
        self.get_block(length)?;
        let record = self.stats.records;
        if self.block.len() < HEADER_WORDS {
            self.warn(DecodeWarning::ShortDescriptor {
                record,
                expected: HEADER_WORDS,
                actual: self.block.len(),
            });
        }
        let magic = self.block.first().map_or(0, |w| w.value());
        if magic != DART_MAGIC {
            self.warn(DecodeWarning::BadDartMagic {
                record,
                found: magic,
            });
        }
        let kind = self.block.get(1).map_or(0, |w| w.value());
        if kind != HEAD_MAGIC && kind != TAIL_MAGIC {
            self.warn(DecodeWarning::BadHeaderKind {
                record,
                found: kind,
            });
        }

        let header = TapeHeader::from_words(version, &self.block);
        self.tape_version = Some(version);
        if header.is_trailer() {
            self.stats.trailers += 1;
            self.trailer_seen = true;
        } else {
            self.stats.headers += 1;
        }
        Ok(header)
    }

    /// Discard a gap: the count word, then one word fewer than it says
    fn skip_gap(&mut self) -> Result<u64> {
        let count = self.words.next_word()?.ok_or(DartError::PhysicalEndOfTape)?;
        let skipped = count.value().saturating_sub(1);
        for _ in 0..skipped {
            self.words.next_word()?.ok_or(DartError::PhysicalEndOfTape)?;
        }
        Ok(skipped)
    }

    fn warn(&mut self, warning: DecodeWarning) {
        #[cfg(feature = "logging")]
        warn!("{:?}", warning);
        self.stats.warnings.push(warning);
    }
}

impl<R: Read> Iterator for TapeDecoder<R> {
    type Item = Result<DecodedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
