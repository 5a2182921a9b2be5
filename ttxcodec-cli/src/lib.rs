//! Library entry for ttxcodec-cli used by integration tests and embedding.

pub mod commands;

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{self, Read, Write};
use ttxcodec_core::{FormatId, FormatRegistry, PageFormat};

// Re-export commands for convenience
pub use commands::*;

/// File format named on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum FormatChoice {
    /// MRG Systems TTI text
    Tti,
    /// Raw 42-byte packet stream
    T42,
    /// EP1 page file
    Ep1,
    /// HTT bit-reversed capture
    Htt,
}

impl From<FormatChoice> for FormatId {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Tti => FormatId::Tti,
            FormatChoice::T42 => FormatId::T42,
            FormatChoice::Ep1 => FormatId::Ep1,
            FormatChoice::Htt => FormatId::Htt,
        }
    }
}

/// Pick the format from an explicit choice, else from the path's extension
pub fn resolve_format<'a>(
    registry: &'a FormatRegistry,
    path: &str,
    choice: Option<FormatChoice>,
) -> Result<&'a dyn PageFormat> {
    match choice {
        Some(choice) => registry
            .get(choice.into())
            .ok_or_else(|| anyhow!("Format {:?} is not registered", choice)),
        None => registry.for_path(path).ok_or_else(|| {
            anyhow!(
                "Cannot tell the format of {} from its extension, use --format",
                path
            )
        }),
    }
}

/// Read a file, or stdin when `path` is "-"
pub fn read_input(path: &str) -> Result<Vec<u8>> {
    if path == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(path).with_context(|| format!("Failed to read input file: {}", path))
    }
}

/// Write a file, or stdout when `path` is "-"
pub fn write_output(path: &str, data: &[u8]) -> Result<()> {
    if path == "-" {
        io::stdout().write_all(data)?;
        Ok(())
    } else {
        fs::write(path, data).with_context(|| format!("Failed to write output file: {}", path))
    }
}

/// Page number as shown to users, magazine 8 for 0x0xx
pub fn page_label(page_number: u16) -> String {
    let magazine = match (page_number >> 8) & 0x07 {
        0 => 8,
        magazine => magazine,
    };
    format!("{:X}{:02X}", magazine, page_number & 0xFF)
}
