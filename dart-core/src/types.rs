//! Core types shared by the codecs, decoder and encoder

use crate::constants::{
    CONTROL_MASK, DESCRIPTOR_WORDS_V1, DESCRIPTOR_WORDS_V3, FILE_START_V1, FILE_START_V2,
    FILE_START_V3, HALF_MASK, RECORD_CAP_V1, RECORD_CAP_V2, START_FILE, START_RECORD, WORD_MASK,
};
use crate::error::DartError;
use crate::sixbit;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 36-bit machine word
///
/// The two bits above the data carry the tape framing markers
/// ([`START_FILE`], [`START_RECORD`]) observed by the word codecs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Word(u64);

impl Word {
    /// The all-zero word
    pub const ZERO: Word = Word(0);

    /// Create a word from the low 36 bits of `value`
    pub const fn new(value: u64) -> Self {
        Self(value & WORD_MASK)
    }

    /// Create a word from its two halves, each masked to 18 bits
    pub const fn from_halves(high: u32, low: u32) -> Self {
        Self(((high as u64 & HALF_MASK) << 18) | (low as u64 & HALF_MASK))
    }

    /// Create a word keeping control markers
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw & (WORD_MASK | CONTROL_MASK))
    }

    /// The 36 data bits
    pub const fn value(self) -> u64 {
        self.0 & WORD_MASK
    }

    /// Bits 18-35
    pub const fn high(self) -> u32 {
        ((self.0 >> 18) & HALF_MASK) as u32
    }

    /// Bits 0-17
    pub const fn low(self) -> u32 {
        (self.0 & HALF_MASK) as u32
    }

    /// Control markers carried by this word
    pub const fn markers(self) -> u64 {
        self.0 & CONTROL_MASK
    }

    /// True when the word opens a tape record or tape file
    pub const fn is_marked(self) -> bool {
        self.markers() != 0
    }

    /// True when the word follows a tape mark
    pub const fn starts_file(self) -> bool {
        self.0 & START_FILE != 0
    }

    /// True when the word opens a physical tape record
    pub const fn starts_record(self) -> bool {
        self.0 & START_RECORD != 0
    }

    /// Return this word carrying `markers` in addition to its data
    pub const fn with_markers(self, markers: u64) -> Self {
        Self(self.value() | (markers & CONTROL_MASK))
    }

    /// Return the data bits without markers
    pub const fn unmarked(self) -> Self {
        Self(self.value())
    }
}

impl From<u64> for Word {
    fn from(value: u64) -> Self {
        Word::new(value)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:012o}", self.value())
    }
}

/// FileStart/Data layout revision (IOVER)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum StructureVersion {
    /// 18-word descriptor, small records
    V1,
    /// 18-word descriptor with extended fields
    V2,
    /// 35-word descriptor
    V3,
}

impl StructureVersion {
    /// All versions, oldest first
    pub const ALL: [StructureVersion; 3] = [Self::V1, Self::V2, Self::V3];

    /// Map a control word high half to a version
    pub const fn from_discriminator(high: u32) -> Option<Self> {
        match high {
            FILE_START_V1 => Some(Self::V1),
            FILE_START_V2 => Some(Self::V2),
            FILE_START_V3 => Some(Self::V3),
            _ => None,
        }
    }

    /// High half written in a FileStart control word
    pub const fn discriminator(self) -> u32 {
        match self {
            Self::V1 => FILE_START_V1,
            Self::V2 => FILE_START_V2,
            Self::V3 => FILE_START_V3,
        }
    }

    /// Numeric version
    pub const fn number(self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
        }
    }

    /// Words in the FileStart descriptor
    pub const fn descriptor_words(self) -> usize {
        match self {
            Self::V1 | Self::V2 => DESCRIPTOR_WORDS_V1,
            Self::V3 => DESCRIPTOR_WORDS_V3,
        }
    }

    /// Largest record (block plus checksum) the encoder writes
    pub const fn record_cap(self) -> usize {
        match self {
            Self::V1 => RECORD_CAP_V1,
            Self::V2 | Self::V3 => RECORD_CAP_V2,
        }
    }

    /// Largest Data block payload the encoder writes
    pub const fn max_payload_words(self) -> usize {
        self.record_cap() - 1
    }

    /// Whether the descriptor carries the extended metadata block
    pub const fn has_extended_fields(self) -> bool {
        !matches!(self, Self::V1)
    }
}

impl Default for StructureVersion {
    fn default() -> Self {
        Self::V2
    }
}

impl From<StructureVersion> for u8 {
    fn from(version: StructureVersion) -> Self {
        version.number()
    }
}

impl TryFrom<u8> for StructureVersion {
    type Error = DartError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            other => Err(DartError::InvalidStructureVersion(other)),
        }
    }
}

impl fmt::Display for StructureVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IOVER{}", self.number())
    }
}

/// Project/programmer owner identifier, three sixbit characters each
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ppn {
    /// Project code
    pub project: String,
    /// Programmer code
    pub programmer: String,
}

impl Ppn {
    /// Create a PPN, uppercasing and truncating each part to three characters
    pub fn new(project: &str, programmer: &str) -> Self {
        Self {
            project: sixbit::normalize(project, 3),
            programmer: sixbit::normalize(programmer, 3),
        }
    }

    /// Unpack a PPN from a sixbit word
    pub fn from_word(word: Word) -> Self {
        let text = sixbit::decode(word);
        Self {
            project: text[..3].trim_end().to_string(),
            programmer: text[3..].trim_end().to_string(),
        }
    }

    /// Pack this PPN into a sixbit word
    pub fn to_word(&self) -> Word {
        sixbit::encode(&format!("{:<3}{:<3}", self.project, self.programmer))
    }

    /// Directory name used for extraction, `PRJ,PRG`
    pub fn directory_name(&self) -> String {
        self.to_string()
    }
}

impl Default for Ppn {
    fn default() -> Self {
        Self::new("DMP", "SYS")
    }
}

impl fmt::Display for Ppn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.project, self.programmer)
    }
}

impl FromStr for Ppn {
    type Err = DartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (project, programmer) = s
            .split_once(',')
            .ok_or_else(|| DartError::InvalidPpn(s.to_string()))?;
        let valid = |part: &str| {
            !part.is_empty() && part.len() <= 3 && part.chars().all(sixbit::is_representable)
        };
        if !valid(project) || !valid(programmer) {
            return Err(DartError::InvalidPpn(s.to_string()));
        }
        Ok(Self::new(project, programmer))
    }
}
