use crate::{page_label, read_input, resolve_format, write_output, FormatChoice};
use anyhow::{Context, Result};
use colored::*;
use ttxcodec_core::FormatRegistry;
use tracing::info;

/// Warnings raised while converting, load first then save
#[derive(Debug, Default)]
pub struct ConvertSummary {
    pub subpages: usize,
    pub bytes_written: usize,
    pub load_warnings: Vec<String>,
    pub save_warnings: Vec<String>,
}

pub fn convert(
    input: &str,
    output: &str,
    from: Option<FormatChoice>,
    to: Option<FormatChoice>,
) -> Result<ConvertSummary> {
    let registry = FormatRegistry::new();
    let source = resolve_format(&registry, input, from)?;
    let target = resolve_format(&registry, output, to)?;
    info!("Converting {} ({}) to {} ({})", input, source.id(), output, target.id());

    let data = read_input(input)?;
    let loaded = source
        .load(&data)
        .with_context(|| format!("Failed to load {} as {}", input, source.id()))?;
    info!(
        "Loaded page {} with {} subpages",
        page_label(loaded.pages.page_number),
        loaded.pages.len()
    );

    let saved = target.save(&loaded.pages);
    write_output(output, &saved.data)?;

    Ok(ConvertSummary {
        subpages: loaded.pages.len(),
        bytes_written: saved.data.len(),
        load_warnings: loaded.warnings,
        save_warnings: saved.warnings,
    })
}

pub fn execute(
    input: &str,
    output: &str,
    from: Option<FormatChoice>,
    to: Option<FormatChoice>,
) -> Result<()> {
    let summary = convert(input, output, from, to)?;

    // Keep stdout clean when the page itself goes there
    if output == "-" {
        return Ok(());
    }

    println!(
        "{} Wrote {} subpages ({} bytes) to {}",
        "✓".green(),
        summary.subpages,
        summary.bytes_written,
        output
    );
    for warning in &summary.load_warnings {
        println!("{} load: {}", "!".yellow(), warning);
    }
    for warning in &summary.save_warnings {
        println!("{} save: {}", "!".yellow(), warning);
    }

    Ok(())
}
