//! # DART Core
//!
//! Decoding and encoding of DART tape archives: 36-bit words, the legacy byte
//! encodings they are stored in, and the checksummed record stream on top.
//!
//! ## Modules
//!
//! - `constants`: Format constants and limits
//! - `types`: Words, structure versions, owner PPNs
//! - `word`: Word codecs (SIMH 7/9-track, data8, dta, ascii, octal)
//! - `sixbit`: Sixbit text packing
//! - `date`: Packed date/minutes timestamps
//! - `checksum`: Block XOR checksum
//! - `record`: Record types and their word layouts
//! - `decoder`: Strict record decoding
//! - `encoder`: Tape writing
//! - `extract`: Decoded files to a sink
//! - `names`: Host file name cleaning

#![warn(missing_docs)]

pub mod checksum;
pub mod constants;
pub mod date;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod extract;
pub mod names;
pub mod record;
pub mod sixbit;
pub mod types;
pub mod word;

// Re-export commonly used types
pub use date::DartTimestamp;
pub use decoder::{DecodeStats, DecodeWarning, DecodedRecord, TapeDecoder};
pub use encoder::{EncoderOptions, SourceFile, TapeEncoder};
pub use error::DartError;
pub use extract::{extract_tape, DirectorySink, ExtractedFile, FileSink, MemorySink};
pub use record::{FileStart, Record, TapeHeader};
pub use types::{Ppn, StructureVersion, Word};
pub use word::{WordFormat, WordReader, WordWriter};

/// Result type alias for DART operations
pub type Result<T> = std::result::Result<T, DartError>;
