use super::{open_decoder, print_record};
use anyhow::{Context, Result};
use colored::*;
use dart_core::{DecodeStats, Record, TapeDecoder, WordFormat};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::info;

/// JSON document written by `list --json`
#[derive(Serialize)]
struct Listing {
    records: Vec<serde_json::Value>,
    stats: DecodeStats,
}

pub fn execute(tape: Option<&Path>, format: WordFormat, json: bool) -> Result<()> {
    info!(
        "Listing tape {} ({})",
        tape.map_or("<stdin>".into(), |p| p.display().to_string()),
        format
    );
    let mut decoder = open_decoder(tape, format)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    list_tape(&mut decoder, json, &mut out)?;
    Ok(())
}

/// List every record of a tape to `out`, returning the decoder's counters
pub fn list_tape<R: Read>(
    decoder: &mut TapeDecoder<R>,
    json: bool,
    out: &mut dyn Write,
) -> Result<DecodeStats> {
    let mut records = Vec::new();
    while let Some(decoded) = decoder.next_record().context("Error reading tape")? {
        if json {
            if !matches!(decoded.record, Record::Data { .. }) {
                records.push(serde_json::to_value(&decoded.record)?);
            }
        } else {
            print_record(out, &decoded.record)?;
        }
    }
    let stats = decoder.stats().clone();

    if json {
        let listing = Listing {
            records,
            stats: stats.clone(),
        };
        serde_json::to_writer_pretty(&mut *out, &listing)?;
        writeln!(out)?;
    } else {
        print_summary(out, &stats)?;
    }
    Ok(stats)
}

pub(crate) fn print_summary(out: &mut dyn Write, stats: &DecodeStats) -> io::Result<()> {
    writeln!(
        out,
        "{} files, {} data records, {} words",
        stats.files, stats.data_records, stats.data_words
    )?;
    if stats.checksum_failures > 0 {
        writeln!(
            out,
            "{} {} bad checksums",
            "✗".red(),
            stats.checksum_failures.to_string().red()
        )?;
    }
    if stats.warnings.is_empty() {
        writeln!(out, "{} No problems found", "✓".green())?;
    } else {
        writeln!(out, "{} {} warnings", "!".yellow(), stats.warnings.len())?;
    }
    Ok(())
}
