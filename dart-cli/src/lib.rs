//! Library entry for dart-cli used by integration tests and embedding.

pub mod commands;

// Re-export commands for convenience
pub use commands::*;

use dart_core::StructureVersion;

/// Parse a `-s` structure version argument (1, 2 or 3)
pub fn parse_structure(value: &str) -> Result<StructureVersion, String> {
    let number: u8 = value
        .parse()
        .map_err(|_| format!("expected 1, 2 or 3, got {}", value))?;
    StructureVersion::try_from(number).map_err(|err| err.to_string())
}
