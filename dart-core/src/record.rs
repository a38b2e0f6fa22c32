//! DART records and their word layouts

use crate::constants::{
    DART_MAGIC, DATE_EXTENSION_VERSION, DATE_HIGH_MASK, DATE_LOW_MASK, GAP_MARKER, HALF_MASK,
    HEADER_WORDS, HEAD_MAGIC, MAX_TAPE_VERSION, MINUTES_MASK, TAIL_MAGIC, WORD_MASK,
};
use crate::date::DartTimestamp;
use crate::sixbit;
use crate::types::{Ppn, StructureVersion, Word};
use serde::{Serialize, Serializer};
use std::fmt;

/// What a control word's high half announces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Continuation data for the open file
    Data,
    /// Start of a file in the given layout
    FileStart(StructureVersion),
    /// Filler to skip
    Gap,
    /// Tape header or trailer of the given tape version
    Header(u32),
    /// Nothing known
    Unrecognized(u32),
}

impl RecordKind {
    /// Classify a control word high half; defined for every input
    pub const fn classify(high: u32) -> Self {
        match high {
            0 => Self::Data,
            GAP_MARKER => Self::Gap,
            h if h < MAX_TAPE_VERSION => Self::Header(h),
            h => match StructureVersion::from_discriminator(h) {
                Some(version) => Self::FileStart(version),
                None => Self::Unrecognized(h),
            },
        }
    }
}

/// Whether a header block opens or closes a tape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderKind {
    /// Start of tape
    Header,
    /// End of tape
    Trailer,
}

impl HeaderKind {
    /// Magic word identifying this kind
    pub const fn magic(self) -> u64 {
        match self {
            Self::Header => HEAD_MAGIC,
            Self::Trailer => TAIL_MAGIC,
        }
    }
}

/// Pack a timestamp the way headers store it: date bits 12-14 in bits 33-35
pub fn pack_header_time(ts: DartTimestamp) -> Word {
    let date = u64::from(ts.date);
    Word::new(
        (date & u64::from(DATE_LOW_MASK))
            | ((u64::from(ts.minutes) & u64::from(MINUTES_MASK)) << 12)
            | ((date & u64::from(DATE_HIGH_MASK)) << 21),
    )
}

/// Inverse of [`pack_header_time`]
pub fn unpack_header_time(word: Word) -> DartTimestamp {
    let value = word.value();
    let date = (value & u64::from(DATE_LOW_MASK)) | ((value >> 21) & u64::from(DATE_HIGH_MASK));
    let minutes = (value >> 12) & u64::from(MINUTES_MASK);
    DartTimestamp::new(date as u32, minutes as u32)
}

fn word_at(block: &[Word], index: usize) -> Word {
    block.get(index).copied().unwrap_or(Word::ZERO)
}

/// Tape header or trailer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TapeHeader {
    /// DART tape version from the control word
    pub version: u32,
    /// Header or trailer
    pub kind: HeaderKind,
    /// When the tape was written
    pub recorded: DartTimestamp,
    /// Who wrote it
    pub recorded_by: Ppn,
    /// System-class dump
    pub system_class: bool,
    /// Tape sequence number, only for system-class dumps
    pub tape_number: Option<u32>,
}

impl TapeHeader {
    /// True for the block that closes a tape
    pub fn is_trailer(&self) -> bool {
        self.kind == HeaderKind::Trailer
    }

    /// Decode the block following a header control word
    ///
    /// Magic words are not checked here; see the decoder.
    pub fn from_words(version: u32, block: &[Word]) -> Self {
        let kind = if word_at(block, 1).value() == TAIL_MAGIC {
            HeaderKind::Trailer
        } else {
            HeaderKind::Header
        };
        let class = word_at(block, 4);
        let system_class = class.high() != 0;
        Self {
            version,
            kind,
            recorded: unpack_header_time(word_at(block, 2)),
            recorded_by: Ppn::from_word(word_at(block, 3)),
            system_class,
            tape_number: system_class.then(|| class.low()),
        }
    }

    /// Block words, control word excluded
    pub fn to_words(&self) -> [Word; HEADER_WORDS] {
        let class = match (self.system_class, self.tape_number) {
            (true, number) => Word::from_halves(1, number.unwrap_or(0)),
            (false, _) => Word::ZERO,
        };
        [
            Word::new(DART_MAGIC),
            Word::new(self.kind.magic()),
            pack_header_time(self.recorded),
            self.recorded_by.to_word(),
            class,
        ]
    }
}

impl fmt::Display for TapeHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "DART VERSION {:<2} TAPE {}",
            self.version,
            match self.kind {
                HeaderKind::Header => "HEADER",
                HeaderKind::Trailer => "TRAILER",
            }
        )?;
        write!(
            f,
            "RECORDED {},  BY [{}] {} CLASS",
            self.recorded,
            self.recorded_by,
            if self.system_class { "SYSTEM" } else { "USER" }
        )?;
        if let Some(number) = self.tape_number {
            write!(f, " TAPE #{}", number)?;
        }
        Ok(())
    }
}

/// Dump bookkeeping carried only by structure version 3
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpInfo {
    /// Block tag, `*FILE*` on the first record of a file
    pub tag: String,
    /// When the dump ran
    pub dumped: DartTimestamp,
    /// Who ran it
    pub dumper: Ppn,
    /// System-class dump
    pub system_class: bool,
    /// Tape number of the dump
    pub tape_number: u32,
    /// Relative dump number
    pub relative_dump: u32,
    /// Absolute dump number
    pub absolute_dump: u32,
    /// Position on tape
    pub tape_position: u64,
    /// Words of the file not yet written when this record was cut
    pub words_left: u64,
}

/// Informational descriptor fields of structure versions 2 and 3
///
/// None of these are needed to reproduce file content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtendedFields {
    /// Location of the first disk block
    pub first_block: u64,
    /// File length in words
    pub length_words: u64,
    /// Last reference time, raw
    pub referenced: u64,
    /// Dump status, raw
    pub dump_status: u64,
    /// First retrieval group, raw
    pub first_group: u64,
    /// Next retrieval group, raw
    pub next_group: u64,
    /// Storage allocation table id
    pub sat_id: u64,
    /// Login information, raw
    pub login: u64,
    /// Record number within the file
    pub record_number: u64,
    /// Structure version 3 bookkeeping
    pub dump: Option<DumpInfo>,
}

/// Start of a file on tape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStart {
    /// Descriptor layout
    pub structure_version: StructureVersion,
    /// Device or volume tag
    pub device: String,
    /// File name, up to six characters
    pub name: String,
    /// Extension, up to three characters
    pub ext: String,
    /// Owner
    pub owner: Ppn,
    /// Modification time
    pub timestamp: DartTimestamp,
    /// Structure version 2 and 3 fields
    pub extended: Option<ExtendedFields>,
    /// File content stored after the descriptor in the same block
    #[serde(skip)]
    pub payload: Vec<Word>,
}

impl FileStart {
    /// Decode a FileStart block
    ///
    /// `tape_version` is the version of the enclosing header, if one was seen;
    /// from version 5 the date carries three extension bits in the ext word.
    pub fn from_words(version: StructureVersion, tape_version: Option<u32>, block: &[Word]) -> Self {
        let ext_word = word_at(block, 2);
        let time_word = word_at(block, 3).value();
        let mut date = (time_word & u64::from(DATE_LOW_MASK)) as u32;
        if tape_version.is_some_and(|v| v >= DATE_EXTENSION_VERSION) {
            date |= ext_word.low() & DATE_HIGH_MASK;
        }
        let minutes = ((time_word >> 12) & u64::from(MINUTES_MASK)) as u32;

        let extended = version
            .has_extended_fields()
            .then(|| Self::extended_from_words(version, block));
        let descriptor = version.descriptor_words();
        let payload = block.get(descriptor..).map(<[Word]>::to_vec).unwrap_or_default();

        Self {
            structure_version: version,
            device: sixbit::decode_trimmed(word_at(block, 0)),
            name: sixbit::decode_trimmed(word_at(block, 1)),
            ext: sixbit::decode_prefix(ext_word, 3),
            owner: Ppn::from_word(word_at(block, 4)),
            timestamp: DartTimestamp::new(date, minutes),
            extended,
            payload,
        }
    }

    fn extended_from_words(version: StructureVersion, block: &[Word]) -> ExtendedFields {
        let raw = |index| word_at(block, index).value();
        let dump = (version == StructureVersion::V3).then(|| {
            let class = word_at(block, 0o25);
            let dumps = word_at(block, 0o26);
            DumpInfo {
                tag: sixbit::decode_trimmed(word_at(block, 0o22)),
                dumped: unpack_header_time(word_at(block, 0o23)),
                dumper: Ppn::from_word(word_at(block, 0o24)),
                system_class: class.high() != 0,
                tape_number: class.low(),
                relative_dump: dumps.high(),
                absolute_dump: dumps.low(),
                tape_position: raw(0o27),
                words_left: raw(0o33),
            }
        });
        ExtendedFields {
            first_block: raw(0o5),
            length_words: raw(0o6),
            referenced: raw(0o7),
            dump_status: raw(0o10),
            first_group: raw(0o11),
            next_group: raw(0o12),
            sat_id: raw(0o13),
            login: raw(0o14),
            record_number: raw(0o20),
            dump,
        }
    }

    /// Descriptor words, control word excluded; `payload` is not included
    pub fn to_words(&self, tape_version: u32) -> Vec<Word> {
        let version = self.structure_version;
        let mut block = vec![Word::ZERO; version.descriptor_words()];
        let date = self.timestamp.date;

        let mut ext = sixbit::encode(&sixbit::normalize(&self.ext, 3)).value() & !HALF_MASK;
        if tape_version >= DATE_EXTENSION_VERSION {
            ext |= u64::from(date & DATE_HIGH_MASK);
        }

        block[0] = sixbit::encode(&self.device);
        block[1] = sixbit::encode(&self.name);
        block[2] = Word::new(ext);
        block[3] = Word::new(
            u64::from(date & DATE_LOW_MASK)
                | ((u64::from(self.timestamp.minutes) & u64::from(MINUTES_MASK)) << 12),
        );
        block[4] = self.owner.to_word();

        if let Some(extended) = self.extended.as_ref().filter(|_| version.has_extended_fields()) {
            block[0o5] = Word::new(extended.first_block);
            block[0o6] = Word::new(extended.length_words);
            block[0o7] = Word::new(extended.referenced);
            block[0o10] = Word::new(extended.dump_status);
            block[0o11] = Word::new(extended.first_group);
            block[0o12] = Word::new(extended.next_group);
            block[0o13] = Word::new(extended.sat_id);
            block[0o14] = Word::new(extended.login);
            block[0o20] = Word::new(extended.record_number);

            if let Some(dump) = extended.dump.as_ref().filter(|_| version == StructureVersion::V3) {
                block[0o21] = Word::new(DART_MAGIC);
                block[0o22] = sixbit::encode(&dump.tag);
                block[0o23] = pack_header_time(dump.dumped);
                block[0o24] = dump.dumper.to_word();
                block[0o25] = Word::from_halves(u32::from(dump.system_class), dump.tape_number);
                block[0o26] = Word::from_halves(dump.relative_dump, dump.absolute_dump);
                block[0o27] = Word::new(dump.tape_position);
                block[0o31] = Word::new(WORD_MASK);
                block[0o33] = Word::new(dump.words_left);
            }
        }
        block
    }

    /// Relative output path, `PRJ,PRG/NAME.EXT`, before name cleaning
    pub fn display_path(&self) -> String {
        if self.ext.is_empty() {
            format!("{}/{}", self.owner.directory_name(), self.name)
        } else {
            format!("{}/{}.{}", self.owner.directory_name(), self.name, self.ext)
        }
    }
}

impl fmt::Display for FileStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "   {}:{}.{}[{}]   {}",
            self.device, self.name, self.ext, self.owner, self.timestamp
        )
    }
}

/// One decoded record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    /// Tape header or trailer
    Header(TapeHeader),
    /// Start of a file
    FileStart(FileStart),
    /// File content
    Data {
        /// Payload words, serialized as their count
        #[serde(serialize_with = "word_count")]
        words: Vec<Word>,
    },
    /// Skipped filler
    Gap {
        /// Words discarded after the count word
        skipped: u64,
    },
}

fn word_count<S: Serializer>(words: &[Word], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(words.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file(version: StructureVersion) -> FileStart {
        let extended = version.has_extended_fields().then(|| ExtendedFields {
            length_words: 1234,
            record_number: 1,
            dump: (version == StructureVersion::V3).then(|| DumpInfo {
                tag: "*FILE*".to_string(),
                dumped: DartTimestamp::from_parts(1990, 4, 2, 8, 15),
                dumper: Ppn::new("DMP", "SYS"),
                system_class: false,
                tape_number: 0,
                relative_dump: 0,
                absolute_dump: 0,
                tape_position: 0,
                words_left: 1234,
            }),
            ..ExtendedFields::default()
        });
        FileStart {
            structure_version: version,
            device: "DSK".to_string(),
            name: "SPACEW".to_string(),
            ext: "MAC".to_string(),
            owner: Ppn::new("1", "2"),
            timestamp: DartTimestamp::from_parts(1978, 11, 30, 23, 59),
            extended,
            payload: Vec::new(),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(RecordKind::classify(0), RecordKind::Data);
        assert_eq!(RecordKind::classify(5), RecordKind::Header(5));
        assert_eq!(RecordKind::classify(9), RecordKind::Header(9));
        assert_eq!(RecordKind::classify(10), RecordKind::Unrecognized(10));
        assert_eq!(RecordKind::classify(0o777767), RecordKind::Gap);
        assert_eq!(
            RecordKind::classify(0o777777),
            RecordKind::FileStart(StructureVersion::V1)
        );
        assert_eq!(
            RecordKind::classify(0o777776),
            RecordKind::FileStart(StructureVersion::V2)
        );
        assert_eq!(
            RecordKind::classify(0o777775),
            RecordKind::FileStart(StructureVersion::V3)
        );
        assert_eq!(RecordKind::classify(0o777774), RecordKind::Unrecognized(0o777774));
    }

    #[test]
    fn test_header_time_packing() {
        let ts = DartTimestamp::from_parts(2001, 9, 9, 1, 46);
        assert!(ts.date > 0o7777);
        assert_eq!(unpack_header_time(pack_header_time(ts)), ts);
    }

    #[test]
    fn test_header_words() {
        let header = TapeHeader {
            version: 5,
            kind: HeaderKind::Trailer,
            recorded: DartTimestamp::from_parts(1980, 1, 2, 3, 4),
            recorded_by: Ppn::new("DMP", "SYS"),
            system_class: true,
            tape_number: Some(42),
        };
        let words = header.to_words();
        assert_eq!(words[0].value(), DART_MAGIC);
        assert_eq!(words[1].value(), TAIL_MAGIC);
        assert_eq!(TapeHeader::from_words(5, &words), header);
    }

    #[test]
    fn test_user_class_has_no_tape_number() {
        let words = [
            Word::new(DART_MAGIC),
            Word::new(HEAD_MAGIC),
            Word::ZERO,
            Word::ZERO,
            Word::from_halves(0, 17),
        ];
        let header = TapeHeader::from_words(4, &words);
        assert!(!header.system_class);
        assert_eq!(header.tape_number, None);
        assert!(!header.is_trailer());
    }

    #[test]
    fn test_descriptor_round_trip_all_versions() {
        for version in StructureVersion::ALL {
            let file = sample_file(version);
            let words = file.to_words(DATE_EXTENSION_VERSION);
            assert_eq!(words.len(), version.descriptor_words());
            let back = FileStart::from_words(version, Some(DATE_EXTENSION_VERSION), &words);
            assert_eq!(back, file);
        }
    }

    #[test]
    fn test_date_extension_needs_tape_version_5() {
        let file = sample_file(StructureVersion::V2);
        let words = file.to_words(5);
        let old = FileStart::from_words(StructureVersion::V2, Some(4), &words);
        assert_eq!(old.timestamp.date, file.timestamp.date & DATE_LOW_MASK);
        let none = FileStart::from_words(StructureVersion::V2, None, &words);
        assert_eq!(none.timestamp.date, file.timestamp.date & DATE_LOW_MASK);
    }

    #[test]
    fn test_payload_after_descriptor() {
        let file = sample_file(StructureVersion::V2);
        let mut words = file.to_words(5);
        words.push(Word::new(0o1));
        words.push(Word::new(0o2));
        let back = FileStart::from_words(StructureVersion::V2, Some(5), &words);
        assert_eq!(back.payload, vec![Word::new(1), Word::new(2)]);
    }

    #[test]
    fn test_short_descriptor_zero_filled() {
        let words = [sixbit::encode("DSK"), sixbit::encode("X")];
        let back = FileStart::from_words(StructureVersion::V3, Some(6), &words);
        assert_eq!(back.name, "X");
        assert_eq!(back.ext, "");
        assert!(back.payload.is_empty());
        assert_eq!(back.extended.unwrap().dump.unwrap().words_left, 0);
    }

    #[test]
    fn test_display_path() {
        let mut file = sample_file(StructureVersion::V1);
        assert_eq!(file.display_path(), "1,2/SPACEW.MAC");
        file.ext.clear();
        assert_eq!(file.display_path(), "1,2/SPACEW");
    }
}
