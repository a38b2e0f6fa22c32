use dart_cli::commands::create::{self, CreateOptions};
use dart_cli::parse_structure;
use dart_core::{
    extract_tape, MemorySink, Ppn, StructureVersion, TapeDecoder, WordFormat,
};
use std::fs;
use std::io::Cursor;
use tempfile::tempdir;

fn read_back(path: &std::path::Path, format: WordFormat) -> MemorySink {
    let bytes = fs::read(path).unwrap();
    let mut decoder = TapeDecoder::new(Cursor::new(bytes), format);
    let mut sink = MemorySink::new();
    extract_tape(&mut decoder, &mut sink, |_| {}).unwrap();
    assert!(decoder.stats().warnings.is_empty());
    sink
}

#[test]
fn test_create_from_files() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("alpha.txt");
    let b = dir.path().join("beta");
    fs::write(&a, b"first file\n").unwrap();
    fs::write(&b, b"").unwrap();
    let tape = dir.path().join("out.tap");

    let options = CreateOptions {
        owner: Some(Ppn::new("ABC", "DEF")),
        ..CreateOptions::default()
    };
    create::execute(Some(&tape), &[a, b], &options).unwrap();

    let files = read_back(&tape, WordFormat::Tape7).into_files();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].start.name, "ALPHA");
    assert_eq!(files[0].start.ext, "TXT");
    assert_eq!(files[0].start.owner, Ppn::new("ABC", "DEF"));
    assert_eq!(files[0].start.structure_version, StructureVersion::V2);
    assert_eq!(files[0].words.len(), 3);
    assert_eq!(files[1].start.name, "BETA");
    assert!(files[1].words.is_empty());
}

#[test]
fn test_create_walks_owner_directories() {
    let dir = tempdir().unwrap();
    let owner = dir.path().join("gam,rjs");
    fs::create_dir(&owner).unwrap();
    fs::write(owner.join("b.dat"), [0u8; 16]).unwrap();
    fs::write(owner.join("a.dat"), [1u8; 8]).unwrap();
    let tape = dir.path().join("out.tap");

    let options = CreateOptions {
        format: WordFormat::Tape9,
        content: WordFormat::Data8,
        structure: StructureVersion::V3,
        progress: true,
        ..CreateOptions::default()
    };
    create::execute(Some(&tape), &[owner], &options).unwrap();

    let files = read_back(&tape, WordFormat::Tape9).into_files();
    let names: Vec<&str> = files.iter().map(|f| f.start.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(files[0].start.owner, Ppn::new("GAM", "RJS"));
    assert_eq!(files[0].words.len(), 1);
    assert_eq!(files[1].words.len(), 2);
    let dump = files[0].start.extended.as_ref().and_then(|e| e.dump.as_ref()).unwrap();
    assert_eq!(dump.tag, "*FILE*");
}

#[test]
fn test_create_skips_missing_inputs() {
    let dir = tempdir().unwrap();
    let present = dir.path().join("here.txt");
    fs::write(&present, b"ok").unwrap();
    let tape = dir.path().join("out.tap");

    create::execute(
        Some(&tape),
        &[dir.path().join("missing.txt"), present],
        &CreateOptions::default(),
    )
    .unwrap();
    assert_eq!(read_back(&tape, WordFormat::Tape7).files().len(), 1);
}

#[cfg(unix)]
#[test]
fn test_create_does_not_follow_directory_links() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("a.txt"), b"only file").unwrap();
    std::os::unix::fs::symlink(&src, src.join("loop")).unwrap();
    let tape = dir.path().join("out.tap");

    create::execute(Some(&tape), &[src], &CreateOptions::default()).unwrap();

    let files = read_back(&tape, WordFormat::Tape7).into_files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].start.name, "A");
}

#[test]
fn test_parse_structure() {
    assert_eq!(parse_structure("1").unwrap(), StructureVersion::V1);
    assert_eq!(parse_structure("3").unwrap(), StructureVersion::V3);
    assert!(parse_structure("4").is_err());
    assert!(parse_structure("two").is_err());
}
