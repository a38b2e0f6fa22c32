//! Property-based tests using proptest

use dart_core::{
    checksum::Checksum, extract_tape, sixbit, DartTimestamp, EncoderOptions, MemorySink,
    SourceFile, StructureVersion, TapeDecoder, TapeEncoder, Word, WordFormat, WordReader,
    WordWriter,
};
use proptest::prelude::*;
use std::io::Cursor;

fn any_word() -> impl Strategy<Value = Word> {
    (0u64..=0o777777777777).prop_map(Word::new)
}

fn any_structure() -> impl Strategy<Value = StructureVersion> {
    prop::sample::select(StructureVersion::ALL.to_vec())
}

fn lossless_format() -> impl Strategy<Value = WordFormat> {
    prop::sample::select(
        WordFormat::ALL
            .into_iter()
            .filter(|f| f.is_lossless())
            .collect::<Vec<_>>(),
    )
}

proptest! {
    #[test]
    fn prop_round_trip_tape(
        structure in any_structure(),
        format in lossless_format(),
        contents in prop::collection::vec(prop::collection::vec(any_word(), 0..3000), 0..4)
    ) {
        let files: Vec<SourceFile> = contents
            .iter()
            .enumerate()
            .map(|(i, words)| SourceFile::new(&format!("F{}", i), "DAT", words.clone()))
            .collect();

        let options = EncoderOptions::default().structure(structure);
        let mut encoder = TapeEncoder::new(Vec::new(), format, options);
        for file in &files {
            encoder.add_file(file).unwrap();
        }
        let bytes = encoder.finish().unwrap();

        let mut decoder = TapeDecoder::new(Cursor::new(bytes), format);
        let mut sink = MemorySink::new();
        extract_tape(&mut decoder, &mut sink, |_| {}).unwrap();
        let extracted = sink.into_files();

        prop_assert_eq!(extracted.len(), files.len());
        for (source, out) in files.iter().zip(&extracted) {
            prop_assert_eq!(&out.words, &source.words);
            prop_assert_eq!(&out.start.name, &source.name);
        }
        prop_assert!(decoder.stats().warnings.is_empty());
    }

    #[test]
    fn prop_date_round_trip(
        year in 1964i32..2050,
        month in 1u32..=12,
        day in 1u32..=31,
        hour in 0u32..24,
        minute in 0u32..60
    ) {
        let ts = DartTimestamp::from_parts(year, month, day, hour, minute);
        prop_assert_eq!(ts.year(), year);
        prop_assert_eq!(ts.month(), month);
        prop_assert_eq!(ts.day(), day);
        prop_assert_eq!(ts.hour(), hour);
        prop_assert_eq!(ts.minute(), minute);
        prop_assert_eq!(DartTimestamp::new(ts.date, ts.minutes), ts);
    }

    #[test]
    fn prop_checksum_detects_single_corruption(
        block in prop::collection::vec(any_word(), 1..512),
        index in any::<prop::sample::Index>(),
        flip in 1u64..=0o777777777777
    ) {
        let sum = Checksum::of(&block);
        let mut corrupt = block.clone();
        let i = index.index(corrupt.len());
        corrupt[i] = Word::new(corrupt[i].value() ^ flip);
        prop_assert_ne!(Checksum::of(&corrupt), sum);
    }

    #[test]
    fn prop_checksum_order_independent(
        block in prop::collection::vec(any_word(), 0..256).prop_shuffle()
    ) {
        let mut sorted = block.clone();
        sorted.sort_by_key(|w| w.value());
        prop_assert_eq!(Checksum::of(&block), Checksum::of(&sorted));
    }

    #[test]
    fn prop_sixbit_round_trip(text in "[ -_]{0,6}") {
        let padded = format!("{:<6}", text);
        prop_assert_eq!(sixbit::decode(sixbit::encode(&text)), padded);
    }

    #[test]
    fn prop_lossless_codecs_round_trip(
        format in lossless_format(),
        words in prop::collection::vec(any_word(), 0..512)
    ) {
        let mut writer = WordWriter::new(Vec::new(), format);
        writer.write_words(&words).unwrap();
        let bytes = writer.finish().unwrap();
        let back: Vec<Word> = WordReader::new(Cursor::new(bytes), format)
            .map(|w| w.unwrap().unmarked())
            .collect();
        prop_assert_eq!(back, words);
    }

    #[test]
    fn prop_decode_never_panics(
        format in prop::sample::select(WordFormat::ALL.to_vec()),
        data in prop::collection::vec(any::<u8>(), 0..4096)
    ) {
        // Should either finish or return an error, never panic
        let decoder = TapeDecoder::new(Cursor::new(data), format);
        for record in decoder.take(10_000) {
            if record.is_err() {
                break;
            }
        }
    }
}
