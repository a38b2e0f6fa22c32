use super::{create_tape, open_tape};
use anyhow::{Context, Result};
use colored::*;
use dart_core::{word, WordFormat, WordReader, WordWriter};
use std::path::Path;
use tracing::info;

pub fn execute(
    tape: Option<&Path>,
    from: WordFormat,
    output: &Path,
    to: WordFormat,
) -> Result<u64> {
    info!("Converting {} to {} ({})", from, to, output.display());

    let mut reader = WordReader::new(open_tape(tape)?, from);
    let mut writer = WordWriter::new(create_tape(Some(output))?, to);
    let count = word::convert(&mut reader, &mut writer).context("Error converting tape")?;
    writer.finish().context("Error writing output")?;

    eprintln!("{} Converted {} words", "✓".green(), count.to_string().green());
    Ok(count)
}
