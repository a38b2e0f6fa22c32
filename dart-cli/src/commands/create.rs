use super::create_tape;
use anyhow::{Context, Result};
use colored::*;
use dart_core::{
    DartTimestamp, EncoderOptions, Ppn, SourceFile, StructureVersion, TapeEncoder, WordFormat,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Settings for `create`
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Tape word format
    pub format: WordFormat,
    /// Word format of the source files
    pub content: WordFormat,
    /// Structure version of the tape
    pub structure: StructureVersion,
    /// Owner for files outside a `prj,prg` directory
    pub owner: Option<Ppn>,
    /// Show a progress bar
    pub progress: bool,
    /// Print each file as it is written
    pub verbose: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            format: WordFormat::Tape7,
            content: WordFormat::Ascii,
            structure: StructureVersion::default(),
            owner: None,
            progress: false,
            verbose: false,
        }
    }
}

pub fn execute(tape: Option<&Path>, files: &[PathBuf], options: &CreateOptions) -> Result<()> {
    let sources = collect_files(files);
    info!(
        "Writing {} files as {} ({})",
        sources.len(),
        options.structure,
        options.format
    );

    let mut encoder_options = EncoderOptions::default()
        .structure(options.structure)
        .recorded(DartTimestamp::now());
    if let Some(owner) = &options.owner {
        encoder_options = encoder_options.default_owner(owner.clone());
    }
    let mut encoder = TapeEncoder::new(create_tape(tape)?, options.format, encoder_options);
    encoder.begin().context("Error writing tape")?;

    let progress = if options.progress {
        let bar = ProgressBar::new(sources.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")?
                .progress_chars("=> "),
        );
        Some(bar)
    } else {
        None
    };

    let mut skipped = 0;
    for path in &sources {
        if let Some(bar) = &progress {
            bar.set_message(path.display().to_string());
        }
        match SourceFile::from_path(path, options.content) {
            Ok(source) => {
                if options.verbose {
                    eprintln!(
                        "   {}.{}   {} words",
                        source.name,
                        source.ext,
                        source.words.len()
                    );
                }
                encoder
                    .add_file(&source)
                    .with_context(|| format!("Error writing {} to tape", path.display()))?;
            }
            Err(err) => {
                warn!("Error opening input file {}: {}", path.display(), err);
                skipped += 1;
            }
        }
        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }
    if let Some(bar) = progress {
        bar.finish_with_message("done");
    }

    let files_written = encoder.files_written();
    let words = encoder.words_written();
    let mut writer = encoder.finish().context("Error writing tape")?;
    writer.flush().context("Error writing tape")?;

    eprintln!(
        "{} Wrote {} files ({} words)",
        "✓".green(),
        files_written.to_string().green(),
        words
    );
    if skipped > 0 {
        eprintln!("{} {} files skipped", "✗".red(), skipped.to_string().red());
    }
    Ok(())
}

/// Expand directories into the files below them, in name order
///
/// Symbolic links below a directory are not followed. Other paths are kept
/// as given so unreadable ones are reported when opened.
fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let walker = WalkDir::new(path)
            .follow_links(false)
            .sort_by_file_name();
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                Ok(_) => {}
                Err(err) => warn!("Error reading directory {}: {}", path.display(), err),
            }
        }
    }
    files
}
