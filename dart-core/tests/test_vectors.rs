//! Known tape images
//!
//! Small tapes assembled by hand in the `octal` word format, one word per
//! line, checked against what the decoder must report for them.

use dart_core::{
    extract_tape, DartTimestamp, DecodeWarning, MemorySink, Ppn, Record, StructureVersion,
    TapeDecoder, Word, WordFormat,
};
use std::io::Cursor;

/// Header recorded 1985-07-04 09:00 by [DMP,SYS], user class
const HEADER: &str = "
000005000005
444162640000
125045414412
100010347501
445560637163
000000000000
";

/// Trailer matching `HEADER`
const TRAILER: &str = "
000005000005
444162640000
126441515412
100010347501
445560637163
000000000000
";

/// IOVER 1 FileStart for DSK:HELLO.TXT[1,2] dated 1974-11-03 17:45, checksum not included
const FILE_START_V1: &str = "
777777000022
446353000000
504554545700
647064000000
000020517700
210000220000
000000000000
000000000000
000000000000
000000000000
000000000000
000000000000
000000000000
000000000000
000000000000
000000000000
000000000000
000000000000
000000000000
";

/// Data record holding the ASCII text `HELLO` and its checksum
const DATA_HELLO: &str = "
000000000001
442131446236
442131446236
";

fn decode(text: String) -> (Vec<Record>, TapeDecoder<Cursor<Vec<u8>>>) {
    let mut decoder = TapeDecoder::new(Cursor::new(text.into_bytes()), WordFormat::Octal);
    let mut records = Vec::new();
    let mut sink = MemorySink::new();
    extract_tape(&mut decoder, &mut sink, |r| records.push(r.clone())).unwrap();
    (records, decoder)
}

/// Checksum word of a FileStart block: XOR of its words
fn descriptor_checksum() -> String {
    let words: Vec<u64> = FILE_START_V1
        .split_whitespace()
        .skip(1)
        .take(18)
        .map(|w| u64::from_str_radix(w, 8).unwrap())
        .collect();
    format!("{:012o}\n", words.iter().fold(0, |acc, w| acc ^ w))
}

fn file_start_with_checksum() -> String {
    format!("{}{}", FILE_START_V1, descriptor_checksum())
}

#[test]
fn test_header_vector() {
    let (records, decoder) = decode(format!("{}{}", HEADER, TRAILER));
    let Record::Header(header) = &records[0] else {
        panic!("expected header, got {:?}", records[0]);
    };
    assert_eq!(header.version, 5);
    assert_eq!(header.recorded, DartTimestamp::from_parts(1985, 7, 4, 9, 0));
    assert_eq!(header.recorded_by, Ppn::new("DMP", "SYS"));
    assert!(!header.system_class);
    assert_eq!(
        header.to_string(),
        "DART VERSION 5  TAPE HEADER\nRECORDED 1985-07-04 09:00,  BY [DMP,SYS] USER CLASS"
    );
    assert!(decoder.stats().warnings.is_empty());
}

#[test]
fn test_file_vector() {
    let text = format!(
        "{}{}{}{}",
        HEADER,
        file_start_with_checksum(),
        DATA_HELLO,
        TRAILER
    );
    let mut decoder = TapeDecoder::new(Cursor::new(text.into_bytes()), WordFormat::Octal);
    let mut sink = MemorySink::new();
    extract_tape(&mut decoder, &mut sink, |_| {}).unwrap();
    assert!(decoder.stats().warnings.is_empty(), "{:?}", decoder.stats().warnings);

    let file = &sink.files()[0];
    assert_eq!(file.start.structure_version, StructureVersion::V1);
    assert_eq!(file.start.device, "DSK");
    assert_eq!(file.start.name, "HELLO");
    assert_eq!(file.start.ext, "TXT");
    assert_eq!(file.start.owner, Ppn::new("1", "2"));
    assert_eq!(file.start.timestamp, DartTimestamp::from_parts(1974, 11, 3, 17, 45));
    assert_eq!(file.start.display_path(), "1,2/HELLO.TXT");
    assert_eq!(file.words, vec![Word::new(0o442131446236)]);
}

#[test]
fn test_header_kind_swapped() {
    let broken = HEADER.replace("125045414412", "000000000001");
    let (_, decoder) = decode(format!("{}{}", broken, TRAILER));
    assert_eq!(
        decoder.stats().warnings,
        vec![DecodeWarning::BadHeaderKind {
            record: 0,
            found: 1
        }]
    );
}

#[test]
fn test_unknown_record_type() {
    let text = format!("{}400000000000\n", HEADER);
    let mut decoder = TapeDecoder::new(Cursor::new(text.into_bytes()), WordFormat::Octal);
    assert!(decoder.next_record().unwrap().is_some());
    let err = decoder.next_record().unwrap_err();
    assert_eq!(err.to_string(), "Expected record type, got 400000");
}
