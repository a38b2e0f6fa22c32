//! Error types for DART operations

/// Fatal errors that stop processing of a tape
///
/// Recoverable conditions (bad checksums, unexpected magic words, files that
/// cannot be created) are reported as [`crate::decoder::DecodeWarning`] instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DartError {
    /// Input ended in the middle of a block or gap
    #[error("Physical end of tape")]
    PhysicalEndOfTape,

    /// A control marker appeared before the declared block length was read
    #[error("Record too short: expected {expected} words, got {actual}")]
    ShortRecord {
        /// The declared block length.
        expected: usize,
        /// Words read before the control marker.
        actual: usize,
    },

    /// Declared block length exceeds the maximum block size
    #[error("Block length {0} exceeds maximum {1}")]
    BlockTooLarge(usize, usize),

    /// Control word high half matches no record type
    #[error("Expected record type, got {0:o}")]
    UnrecognizedRecord(u32),

    /// The input held no words at all
    #[error("Empty tape")]
    EmptyTape,

    /// IO error during read/write
    #[error("IO error: {0}")]
    Io(String),

    /// Word format name not recognized
    #[error("Unknown word format: {0}")]
    UnknownWordFormat(String),

    /// Structure version outside 1..=3
    #[error("Invalid structure version: {0}")]
    InvalidStructureVersion(u8),

    /// Project/programmer pair could not be parsed
    #[error("Invalid project,programmer: {0}")]
    InvalidPpn(String),

    /// A source file name cannot be stored on tape
    #[error("Invalid file name: {0}")]
    InvalidName(String),
}

impl From<std::io::Error> for DartError {
    fn from(err: std::io::Error) -> Self {
        DartError::Io(err.to_string())
    }
}
