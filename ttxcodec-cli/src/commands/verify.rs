use crate::{page_label, read_input, resolve_format, FormatChoice};
use anyhow::{bail, Context, Result};
use colored::*;
use ttxcodec_core::FormatRegistry;
use tracing::{info, warn};

/// Fingerprints of one sub-page before and after a save and reload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubpageCheck {
    pub index: usize,
    pub loaded: [u8; 32],
    pub reloaded: Option<[u8; 32]>,
}

impl SubpageCheck {
    pub fn matches(&self) -> bool {
        self.reloaded == Some(self.loaded)
    }
}

/// Load, save and reload a file with the same format
pub fn check(input: &str, format: Option<FormatChoice>) -> Result<Vec<SubpageCheck>> {
    let registry = FormatRegistry::new();
    let codec = resolve_format(&registry, input, format)?;
    let data = read_input(input)?;
    info!("Verifying {} as {}", input, codec.id());

    let first = codec
        .load(&data)
        .with_context(|| format!("Failed to load {} as {}", input, codec.id()))?;
    for warning in &first.warnings {
        warn!("load: {}", warning);
    }

    let saved = codec.save(&first.pages);
    let second = codec
        .load(&saved.data)
        .with_context(|| "Failed to reload the saved page")?;

    if second.pages.page_number != first.pages.page_number {
        warn!(
            "Page number changed from {} to {}",
            page_label(first.pages.page_number),
            page_label(second.pages.page_number)
        );
    }

    Ok(first
        .pages
        .subpages
        .iter()
        .enumerate()
        .map(|(index, page)| SubpageCheck {
            index: index + 1,
            loaded: page.fingerprint(),
            reloaded: second.pages.subpages.get(index).map(|page| page.fingerprint()),
        })
        .collect())
}

pub fn execute(input: &str, format: Option<FormatChoice>) -> Result<()> {
    let checks = check(input, format)?;

    println!("\n=== Verification Results ===");
    println!("Subpages:           {}", checks.len());

    let mut failures = 0;
    for check in &checks {
        if check.matches() {
            println!(
                "{} Subpage {}: {}",
                "✓".green(),
                check.index,
                &hex::encode(check.loaded)[..16]
            );
        } else {
            failures += 1;
            match check.reloaded {
                Some(reloaded) => println!(
                    "{} Subpage {}: {} became {}",
                    "✗".red(),
                    check.index,
                    &hex::encode(check.loaded)[..16],
                    &hex::encode(reloaded)[..16]
                ),
                None => println!("{} Subpage {}: lost on reload", "✗".red(), check.index),
            }
        }
    }

    println!("\n=== Summary ===");
    if failures > 0 {
        bail!("{} of {} subpages changed after save and reload", failures, checks.len());
    }
    println!("{} File survives save and reload unchanged", "✓".green());
    Ok(())
}
