//! Constants and limits for the DART tape format

/// Mask for the 36 significant bits of a word
pub const WORD_MASK: u64 = 0o777777777777;

/// Mask for one 18-bit half word
pub const HALF_MASK: u64 = 0o777777;

/// Marker carried by the first word after a tape mark
///
/// Lives above the 36 data bits so it never collides with word content.
pub const START_FILE: u64 = 0o1000000000000;

/// Marker carried by the first word of a physical tape record
pub const START_RECORD: u64 = 0o2000000000000;

/// Both control markers
pub const CONTROL_MASK: u64 = START_FILE | START_RECORD;

/// Product magic word, sixbit `DART  `
pub const DART_MAGIC: u64 = 0o444162640000;

/// Block-kind magic word of a tape header
pub const HEAD_MAGIC: u64 = 0o125045414412;

/// Block-kind magic word of a tape trailer
pub const TAIL_MAGIC: u64 = 0o126441515412;

/// High half of a FileStart control word, structure version 1
pub const FILE_START_V1: u32 = 0o777777;

/// High half of a FileStart control word, structure version 2
pub const FILE_START_V2: u32 = 0o777776;

/// High half of a FileStart control word, structure version 3
pub const FILE_START_V3: u32 = 0o777775;

/// High half of a Gap control word
pub const GAP_MARKER: u32 = 0o777767;

/// Header/Trailer control words carry the tape version, which is below this bound
pub const MAX_TAPE_VERSION: u32 = 10;

/// Largest block the decoder accepts, in words
pub const MAX_BLOCK_WORDS: usize = 10240;

/// Words in a Header/Trailer block
pub const HEADER_WORDS: usize = 5;

/// FileStart descriptor length for structure versions 1 and 2
pub const DESCRIPTOR_WORDS_V1: usize = 0o22;

/// FileStart descriptor length for structure version 3
pub const DESCRIPTOR_WORDS_V3: usize = 0o43;

/// Record cap (block plus checksum) when writing structure version 1
pub const RECORD_CAP_V1: usize = 1280;

/// Record cap (block plus checksum) when writing structure versions 2 and 3
pub const RECORD_CAP_V2: usize = 10240;

/// First year representable by a packed date
pub const EPOCH_YEAR: i32 = 1964;

/// Low twelve bits of a packed date
pub const DATE_LOW_MASK: u32 = 0o7777;

/// Extension bits of a packed date, present from tape version 5
pub const DATE_HIGH_MASK: u32 = 0o70000;

/// Mask for the minutes field
pub const MINUTES_MASK: u32 = 0o3777;

/// Minutes in a day
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Tape version from which FileStart dates carry their extension bits
pub const DATE_EXTENSION_VERSION: u32 = 5;

/// SIMH tape record length meaning "tape mark"
pub const SIMH_TAPE_MARK: u32 = 0;

/// SIMH tape record length meaning "end of medium"
pub const SIMH_END_OF_MEDIUM: u32 = 0xFFFF_FFFF;

/// SIMH flag for a record read with errors
pub const SIMH_ERROR_FLAG: u32 = 0x8000_0000;

/// Significant bits of a SIMH record length
pub const SIMH_LENGTH_MASK: u32 = 0x00FF_FFFF;
