use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dart_core::{
    extract_tape, EncoderOptions, MemorySink, SourceFile, StructureVersion, TapeDecoder,
    TapeEncoder, Word, WordFormat,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::io::Cursor;

fn make_files(count: usize, words: usize) -> Vec<SourceFile> {
    let mut rng = StdRng::seed_from_u64(1964);
    (0..count)
        .map(|i| {
            let content = (0..words)
                .map(|_| Word::new(rng.gen_range(0..=0o777777777777)))
                .collect();
            SourceFile::new(&format!("FILE{}", i), "DAT", content)
        })
        .collect()
}

fn make_tape(structure: StructureVersion, files: &[SourceFile]) -> Vec<u8> {
    let options = EncoderOptions::default().structure(structure);
    let mut encoder = TapeEncoder::new(Vec::new(), WordFormat::Tape7, options);
    for file in files {
        encoder.add_file(file).unwrap();
    }
    encoder.finish().unwrap()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_tape");
    let files = make_files(16, 4096);
    group.throughput(Throughput::Elements(16 * 4096));

    for structure in StructureVersion::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(structure), &files, |b, files| {
            b.iter(|| make_tape(structure, black_box(files)));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_tape");
    let files = make_files(16, 4096);
    group.throughput(Throughput::Elements(16 * 4096));

    for structure in StructureVersion::ALL {
        let tape = make_tape(structure, &files);
        group.bench_with_input(BenchmarkId::from_parameter(structure), &tape, |b, tape| {
            b.iter(|| {
                let mut decoder =
                    TapeDecoder::new(Cursor::new(black_box(tape.as_slice())), WordFormat::Tape7);
                let mut sink = MemorySink::new();
                extract_tape(&mut decoder, &mut sink, |_| {}).unwrap();
                sink.into_files().len()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
