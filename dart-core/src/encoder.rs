//! Record encoding
//!
//! Writes a tape as: header, then per file a FileStart record holding the
//! descriptor followed by one or more Data records, then the trailer. Every
//! block except the header and trailer is followed by its XOR checksum.

use crate::checksum::Checksum;
use crate::constants::{
    DATE_EXTENSION_VERSION, GAP_MARKER, HEADER_WORDS, START_FILE, START_RECORD,
};
use crate::date::DartTimestamp;
use crate::error::DartError;
use crate::record::{DumpInfo, ExtendedFields, FileStart, HeaderKind, TapeHeader};
use crate::sixbit;
use crate::types::{Ppn, StructureVersion, Word};
use crate::word::{WordFormat, WordReader, WordWriter};
use crate::Result;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

#[cfg(feature = "logging")]
use tracing::debug;

/// Tape-wide settings for the encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Descriptor layout and record cap
    pub structure: StructureVersion,
    /// Time stamped into the header and trailer
    pub recorded: DartTimestamp,
    /// Who recorded the tape
    pub recorded_by: Ppn,
    /// Owner for files that carry none
    pub default_owner: Ppn,
    /// Device tag of every file
    pub device: String,
    /// Tape number; marks the tape as a system-class dump
    pub tape_number: Option<u32>,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            structure: StructureVersion::default(),
            recorded: DartTimestamp::default(),
            recorded_by: Ppn::default(),
            default_owner: Ppn::default(),
            device: "DSK".to_string(),
            tape_number: None,
        }
    }
}

impl EncoderOptions {
    /// Set the structure version
    pub fn structure(mut self, structure: StructureVersion) -> Self {
        self.structure = structure;
        self
    }

    /// Set the recording time
    pub fn recorded(mut self, recorded: DartTimestamp) -> Self {
        self.recorded = recorded;
        self
    }

    /// Set the recording PPN
    pub fn recorded_by(mut self, ppn: Ppn) -> Self {
        self.recorded_by = ppn;
        self
    }

    /// Set the owner used for files without one
    pub fn default_owner(mut self, ppn: Ppn) -> Self {
        self.default_owner = ppn;
        self
    }

    /// Mark the tape as system class with a tape number
    pub fn tape_number(mut self, number: u32) -> Self {
        self.tape_number = Some(number);
        self
    }
}

/// A file to be written to tape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Name, up to six sixbit characters
    pub name: String,
    /// Extension, up to three sixbit characters
    pub ext: String,
    /// Owner; the encoder's default owner when `None`
    pub owner: Option<Ppn>,
    /// Modification time
    pub timestamp: DartTimestamp,
    /// Content
    pub words: Vec<Word>,
}

impl SourceFile {
    /// Create a source file, folding name and extension to sixbit
    pub fn new(name: &str, ext: &str, words: Vec<Word>) -> Self {
        Self {
            name: sixbit::normalize(name, 6),
            ext: sixbit::normalize(ext, 3),
            owner: None,
            timestamp: DartTimestamp::default(),
            words,
        }
    }

    /// Set the owner
    pub fn owner(mut self, owner: Ppn) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Set the modification time
    pub fn timestamp(mut self, timestamp: DartTimestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Load a file from disk, reading its content as `content` words
    ///
    /// A parent directory named `prj,prg` supplies the owner, the way
    /// extraction lays files out.
    pub fn from_path(path: &Path, content: WordFormat) -> Result<Self> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DartError::InvalidName(path.display().to_string()))?;
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let file = File::open(path)?;
        let modified = file.metadata()?.modified()?;
        let mut words = Vec::new();
        let mut reader = WordReader::new(BufReader::new(file), content);
        while let Some(word) = reader.next_word()? {
            words.push(word.unmarked());
        }

        let mut source =
            Self::new(stem, ext, words).timestamp(DartTimestamp::from_system_time(modified));
        source.owner = path
            .parent()
            .and_then(Path::file_name)
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<Ppn>().ok());
        Ok(source)
    }
}

/// Encoding context for one tape
pub struct TapeEncoder<W: Write> {
    words: WordWriter<W>,
    options: EncoderOptions,
    checksum: Checksum,
    started: bool,
    files: u64,
}

impl<W: Write> TapeEncoder<W> {
    /// Encode a tape in `format`
    pub fn new(writer: W, format: WordFormat, options: EncoderOptions) -> Self {
        Self::from_words(WordWriter::new(writer, format), options)
    }

    /// Encode into an existing word writer
    pub fn from_words(words: WordWriter<W>, options: EncoderOptions) -> Self {
        Self {
            words,
            options,
            checksum: Checksum::new(),
            started: false,
            files: 0,
        }
    }

    /// Tape version written into the header
    ///
    /// Always the date extension version, so every structure version keeps
    /// full file dates.
    pub fn tape_version(&self) -> u32 {
        DATE_EXTENSION_VERSION
    }

    /// Files written so far
    pub fn files_written(&self) -> u64 {
        self.files
    }

    /// Words written so far, control and checksum words included
    pub fn words_written(&self) -> u64 {
        self.words.words_written()
    }

    /// Write the tape header; later calls do nothing
    pub fn begin(&mut self) -> Result<()> {
        if !self.started {
            self.started = true;
            self.write_header(HeaderKind::Header)?;
        }
        Ok(())
    }

    /// Write one file: its FileStart record and its Data records
    ///
    /// Returns the number of Data records written, at least one.
    pub fn add_file(&mut self, file: &SourceFile) -> Result<usize> {
        self.begin()?;
        let structure = self.options.structure;
        let length = file.words.len() as u64;
        let start = FileStart {
            structure_version: structure,
            device: self.options.device.clone(),
            name: file.name.clone(),
            ext: file.ext.clone(),
            owner: file
                .owner
                .clone()
                .unwrap_or_else(|| self.options.default_owner.clone()),
            timestamp: file.timestamp,
            extended: structure.has_extended_fields().then(|| ExtendedFields {
                length_words: length,
                record_number: 1,
                dump: (structure == StructureVersion::V3).then(|| DumpInfo {
                    tag: "*FILE*".to_string(),
                    dumped: self.options.recorded,
                    dumper: self.options.recorded_by.clone(),
                    system_class: self.options.tape_number.is_some(),
                    tape_number: self.options.tape_number.unwrap_or(0),
                    relative_dump: 0,
                    absolute_dump: 0,
                    tape_position: 0,
                    words_left: length,
                }),
                ..ExtendedFields::default()
            }),
            payload: Vec::new(),
        };

        #[cfg(feature = "logging")]
        debug!("file: {} ({} words)", start.display_path(), length);
        let descriptor = start.to_words(self.tape_version());
        self.write_record(structure.discriminator(), START_FILE, &descriptor)?;

        let mut records = 0;
        for chunk in file.words.chunks(structure.max_payload_words()) {
            self.write_record(0, START_RECORD, chunk)?;
            records += 1;
        }
        if records == 0 {
            self.write_record(0, START_RECORD, &[])?;
            records = 1;
        }
        self.files += 1;
        Ok(records)
    }

    /// Write a Gap record that makes a reader skip `words` zero words
    pub fn write_gap(&mut self, words: u32) -> Result<()> {
        self.begin()?;
        self.words
            .write_word(Word::from_halves(GAP_MARKER, 0).with_markers(START_RECORD))?;
        self.words.write_word(Word::new(u64::from(words) + 1))?;
        for _ in 0..words {
            self.words.write_word(Word::ZERO)?;
        }
        Ok(())
    }

    /// Write the trailer, flush, and give back the inner writer
    pub fn finish(mut self) -> Result<W> {
        self.begin()?;
        self.write_header(HeaderKind::Trailer)?;
        Ok(self.words.finish()?)
    }

    fn write_header(&mut self, kind: HeaderKind) -> Result<()> {
        let header = TapeHeader {
            version: self.tape_version(),
            kind,
            recorded: self.options.recorded,
            recorded_by: self.options.recorded_by.clone(),
            system_class: self.options.tape_number.is_some(),
            tape_number: self.options.tape_number,
        };
        #[cfg(feature = "logging")]
        debug!("{:?}: tape version {}", kind, header.version);
        self.words.write_word(
            Word::from_halves(header.version, HEADER_WORDS as u32).with_markers(START_FILE),
        )?;
        self.words.write_words(&header.to_words())?;
        Ok(())
    }

    /// Control word, block, checksum
    fn write_record(&mut self, discriminator: u32, marker: u64, block: &[Word]) -> Result<()> {
        self.checksum.reset();
        self.words
            .write_word(Word::from_halves(discriminator, block.len() as u32).with_markers(marker))?;
        for &word in block {
            self.checksum.update(word);
            self.words.write_word(word)?;
        }
        self.words.write_word(self.checksum.value())?;
        Ok(())
    }
}
