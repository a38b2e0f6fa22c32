//! Extraction of decoded files
//!
//! [`extract_tape`] walks a decoder and hands FileStart and Data records to a
//! [`FileSink`]. The sink decides where the words go: a directory tree on
//! disk or memory.

use crate::date::DartTimestamp;
use crate::decoder::TapeDecoder;
use crate::names;
use crate::record::{FileStart, Record};
use crate::types::Word;
use crate::word::{WordFormat, WordWriter};
use crate::Result;
use std::fs::{self, File, FileTimes};
use std::io::{BufWriter, Read};
use std::path::{Path, PathBuf};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Receives the files of a tape one at a time
pub trait FileSink {
    /// A new file starts
    ///
    /// Failing to create the target is not an error: the sink skips the file
    /// and ignores writes until the next `open`.
    fn open(&mut self, file: &FileStart) -> Result<()>;

    /// Append content to the open file
    fn write(&mut self, words: &[Word]) -> Result<()>;

    /// Finish the open file
    fn close(&mut self) -> Result<()>;

    /// Drop the open file after a fatal decoding error
    fn abort(&mut self);
}

/// Decode every record of a tape into `sink`
///
/// `visit` sees each record before the sink does. On a fatal error the sink
/// is aborted, so no file is left open, and the error is returned.
pub fn extract_tape<R, S, F>(decoder: &mut TapeDecoder<R>, sink: &mut S, mut visit: F) -> Result<()>
where
    R: Read,
    S: FileSink + ?Sized,
    F: FnMut(&Record),
{
    let mut open = false;
    loop {
        let decoded = match decoder.next_record() {
            Ok(Some(decoded)) => decoded,
            Ok(None) => break,
            Err(err) => {
                sink.abort();
                return Err(err);
            }
        };
        visit(&decoded.record);

        let step = match &decoded.record {
            Record::FileStart(file) => {
                open = true;
                sink.open(file).and_then(|()| {
                    if file.payload.is_empty() {
                        Ok(())
                    } else {
                        sink.write(&file.payload)
                    }
                })
            }
            Record::Data { words } if open => sink.write(words),
            _ => Ok(()),
        };
        let step = step.and_then(|()| {
            if decoded.closes_file && open {
                open = false;
                sink.close()
            } else {
                Ok(())
            }
        });
        if let Err(err) = step {
            sink.abort();
            return Err(err);
        }
    }
    if open {
        sink.close()?;
    }
    Ok(())
}

struct OpenTarget {
    path: PathBuf,
    writer: WordWriter<BufWriter<File>>,
    timestamp: DartTimestamp,
}

/// Writes files under a root directory as `prj,prg/name.ext`
pub struct DirectorySink {
    root: PathBuf,
    content: WordFormat,
    cleaner: fn(&str) -> String,
    current: Option<OpenTarget>,
    extracted: Vec<PathBuf>,
    skipped: Vec<PathBuf>,
}

impl DirectorySink {
    /// Extract below `root`, writing content as `content` words
    pub fn new(root: impl Into<PathBuf>, content: WordFormat) -> Self {
        Self {
            root: root.into(),
            content,
            cleaner: names::clean_name,
            current: None,
            extracted: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Replace the name cleaner applied to each path component
    pub fn with_cleaner(mut self, cleaner: fn(&str) -> String) -> Self {
        self.cleaner = cleaner;
        self
    }

    /// Output root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files written and closed
    pub fn extracted(&self) -> &[PathBuf] {
        &self.extracted
    }

    /// Files that could not be created
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    /// Target path for a file, relative components cleaned
    pub fn target_path(&self, file: &FileStart) -> PathBuf {
        let clean = self.cleaner;
        let name = if file.ext.is_empty() {
            clean(&file.name)
        } else {
            format!("{}.{}", clean(&file.name), clean(&file.ext))
        };
        self.root
            .join(clean(&file.owner.directory_name()))
            .join(name)
    }

    fn create(path: &Path) -> std::io::Result<File> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        File::create(path)
    }
}

impl FileSink for DirectorySink {
    fn open(&mut self, file: &FileStart) -> Result<()> {
        self.abort();
        let path = self.target_path(file);
        match Self::create(&path) {
            Ok(handle) => {
                #[cfg(feature = "logging")]
                debug!("extracting {}", path.display());
                self.current = Some(OpenTarget {
                    path,
                    writer: WordWriter::new(BufWriter::new(handle), self.content),
                    timestamp: file.timestamp,
                });
            }
            Err(_err) => {
                #[cfg(feature = "logging")]
                warn!("error opening output file {}: {}", path.display(), _err);
                self.skipped.push(path);
            }
        }
        Ok(())
    }

    fn write(&mut self, words: &[Word]) -> Result<()> {
        if let Some(target) = self.current.as_mut() {
            target.writer.write_words(words)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(target) = self.current.take() else {
            return Ok(());
        };
        let file = target
            .writer
            .finish()?
            .into_inner()
            .map_err(|err| err.into_error())?;

        apply_times(&target.path, target.timestamp, |times| file.set_times(times));
        self.extracted.push(target.path);
        Ok(())
    }

    fn abort(&mut self) {
        if let Some(_target) = self.current.take() {
            #[cfg(feature = "logging")]
            warn!("{}: extraction interrupted", _target.path.display());
        }
    }
}

/// Stamp an extracted file with its tape date; returns whether it was applied
///
/// Failures are logged and leave the file with its current times.
#[cfg_attr(not(feature = "logging"), allow(unused_variables))]
fn apply_times(
    path: &Path,
    timestamp: DartTimestamp,
    set: impl FnOnce(FileTimes) -> std::io::Result<()>,
) -> bool {
    let Some(time) = timestamp.to_system_time() else {
        #[cfg(feature = "logging")]
        warn!("{}: cannot represent {} as a local time", path.display(), timestamp);
        return false;
    };
    match set(FileTimes::new().set_accessed(time).set_modified(time)) {
        Ok(()) => true,
        Err(err) => {
            #[cfg(feature = "logging")]
            warn!("{}: cannot set file times: {}", path.display(), err);
            false
        }
    }
}

/// A file captured by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile {
    /// Its FileStart record, leading payload removed
    pub start: FileStart,
    /// Full content
    pub words: Vec<Word>,
}

/// Collects files in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    current: Option<ExtractedFile>,
    files: Vec<ExtractedFile>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Files closed so far
    pub fn files(&self) -> &[ExtractedFile] {
        &self.files
    }

    /// Take the collected files
    pub fn into_files(self) -> Vec<ExtractedFile> {
        self.files
    }
}

impl FileSink for MemorySink {
    fn open(&mut self, file: &FileStart) -> Result<()> {
        let mut start = file.clone();
        start.payload.clear();
        self.current = Some(ExtractedFile {
            start,
            words: Vec::new(),
        });
        Ok(())
    }

    fn write(&mut self, words: &[Word]) -> Result<()> {
        if let Some(file) = self.current.as_mut() {
            file.words.extend_from_slice(words);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(file) = self.current.take() {
            self.files.push(file);
        }
        Ok(())
    }

    fn abort(&mut self) {
        self.current = None;
    }
}
