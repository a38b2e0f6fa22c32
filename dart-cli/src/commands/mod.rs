//! Subcommand implementations
//!
//! Each command exposes an `execute` function taking plain values so the
//! binary and the integration tests share one code path.

pub mod convert;
pub mod create;
pub mod extract;
pub mod list;

use anyhow::{Context, Result};
use dart_core::{Record, TapeDecoder, WordFormat};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::warn;

/// Open the tape image, or standard input when no path is given
pub(crate) fn open_tape(path: Option<&Path>) -> Result<Box<dyn Read>> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(File::open(path).with_context(|| {
            format!("Error opening tape {}", path.display())
        })?)),
        None => Box::new(BufReader::new(io::stdin())),
    })
}

/// Create the tape image, or write to standard output when no path is given
pub(crate) fn create_tape(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Error creating tape {}", path.display())
        })?)),
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

/// Open a decoder and check the first word looks like a tape header
pub(crate) fn open_decoder(path: Option<&Path>, format: WordFormat) -> Result<TapeDecoder<Box<dyn Read>>> {
    let mut decoder = TapeDecoder::new(open_tape(path)?, format);
    if !decoder.looks_like_dart().context("Error reading tape")? {
        warn!("input does not start with a DART header; is {} the right format?", format);
    }
    Ok(decoder)
}

/// Print one record of the listing
pub(crate) fn print_record(out: &mut dyn Write, record: &Record) -> io::Result<()> {
    match record {
        Record::Header(header) => {
            writeln!(out, "{}", header)?;
            if header.is_trailer() {
                writeln!(out)?;
            }
        }
        Record::FileStart(file) => writeln!(out, "{}", file)?,
        Record::Gap { .. } => writeln!(out, "   GAP")?,
        Record::Data { .. } => {}
    }
    Ok(())
}
