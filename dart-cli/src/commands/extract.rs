use super::list::print_summary;
use super::{open_decoder, print_record};
use anyhow::{Context, Result};
use colored::*;
use dart_core::{extract_tape, DirectorySink, WordFormat};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{info, warn};

pub fn execute(
    tape: Option<&Path>,
    format: WordFormat,
    content: WordFormat,
    directory: &Path,
    verbose: bool,
) -> Result<()> {
    info!("Extracting to {} ({} content)", directory.display(), content);
    fs::create_dir_all(directory)
        .with_context(|| format!("Error creating directory {}", directory.display()))?;

    let mut decoder = open_decoder(tape, format)?;
    let mut sink = DirectorySink::new(directory, content);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut listing_error = None;
    let result = extract_tape(&mut decoder, &mut sink, |record| {
        if verbose && listing_error.is_none() {
            listing_error = print_record(&mut out, record).err();
        }
    });
    if let Some(err) = listing_error {
        warn!("listing output failed: {}", err);
    }
    result.context("Error reading tape")?;

    let stats = decoder.into_stats();
    if verbose {
        print_summary(&mut out, &stats)?;
    }
    writeln!(
        out,
        "{} Extracted {} files",
        "✓".green(),
        sink.extracted().len().to_string().green()
    )?;
    if !sink.skipped().is_empty() {
        writeln!(
            out,
            "{} {} files could not be created",
            "✗".red(),
            sink.skipped().len().to_string().red()
        )?;
        for path in sink.skipped() {
            warn!("skipped {}", path.display());
        }
    }
    Ok(())
}
