use crate::{page_label, read_input, resolve_format, FormatChoice};
use anyhow::{Context, Result};
use colored::*;
use serde::{Deserialize, Serialize};
use ttxcodec_core::{FormatRegistry, LevelOnePage, PacketStore};
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
pub struct PacketDump {
    pub number: u8,
    pub code: Option<u8>,
    pub hex: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubpageSummary {
    pub index: usize,
    pub subcode: String,
    pub level: String,
    pub triplets: usize,
    pub triplet_errors: usize,
    pub fingerprint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packets: Option<Vec<PacketDump>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InspectReport {
    pub file: String,
    pub format: String,
    pub page: String,
    pub description: String,
    pub subpages: Vec<SubpageSummary>,
    pub warnings: Vec<String>,
}

fn packet_dumps(page: &LevelOnePage) -> Vec<PacketDump> {
    let mut dumps = Vec::new();
    for number in 0..=25u8 {
        if let Some(packet) = page.packet(number) {
            dumps.push(PacketDump {
                number,
                code: None,
                hex: hex::encode(packet),
            });
        }
    }
    for number in 26..=29u8 {
        for code in 0..16u8 {
            if let Some(packet) = page.designation_packet(number, code) {
                dumps.push(PacketDump {
                    number,
                    code: Some(code),
                    hex: hex::encode(packet),
                });
            }
        }
    }
    dumps
}

/// Load a file and summarise each sub-page
pub fn report(input: &str, format: Option<FormatChoice>, packets: bool) -> Result<InspectReport> {
    let registry = FormatRegistry::new();
    let codec = resolve_format(&registry, input, format)?;
    let data = read_input(input)?;
    info!("Inspecting {} as {} ({} bytes)", input, codec.id(), data.len());

    let outcome = codec
        .load(&data)
        .with_context(|| format!("Failed to load {} as {}", input, codec.id()))?;

    let subpages = outcome
        .pages
        .subpages
        .iter()
        .enumerate()
        .map(|(index, page)| SubpageSummary {
            index: index + 1,
            subcode: format!("{:04X}", page.subcode()),
            level: page.level_required().to_string(),
            triplets: page.enhancements().len(),
            triplet_errors: page.enhancements().error_count(),
            fingerprint: hex::encode(page.fingerprint()),
            packets: packets.then(|| packet_dumps(page)),
        })
        .collect();

    Ok(InspectReport {
        file: input.to_string(),
        format: codec.id().to_string(),
        page: page_label(outcome.pages.page_number),
        description: outcome.pages.description.clone(),
        subpages,
        warnings: outcome.warnings,
    })
}

pub fn execute(input: &str, format: Option<FormatChoice>, json: bool, packets: bool) -> Result<()> {
    let report = report(input, format, packets)?;

    if json {
        let json = serde_json::to_string_pretty(&report)
            .with_context(|| "Failed to serialize inspection report")?;
        println!("{}", json);
        return Ok(());
    }

    println!("\n=== Page {} ({}) ===", report.page.bold(), report.format);
    if !report.description.is_empty() {
        println!("Description:       {}", report.description);
    }
    println!("Subpages:          {}", report.subpages.len());

    for subpage in &report.subpages {
        println!("\n--- Subpage {} ---", subpage.index);
        println!("Subcode:           {}", subpage.subcode);
        println!("Level required:    {}", subpage.level);
        println!("Triplets:          {}", subpage.triplets);
        if subpage.triplet_errors > 0 {
            println!("Triplet errors:    {}", subpage.triplet_errors.to_string().red());
        } else {
            println!("Triplet errors:    {}", subpage.triplet_errors);
        }
        if let Some(packets) = &subpage.packets {
            for packet in packets {
                match packet.code {
                    Some(code) => println!("  X/{}/{:<2} {}", packet.number, code, packet.hex),
                    None => println!("  X/{:<5} {}", packet.number, packet.hex),
                }
            }
        }
    }

    if !report.warnings.is_empty() {
        println!("\n=== Warnings ===");
        for warning in &report.warnings {
            println!("{} {}", "!".yellow(), warning);
        }
    }

    Ok(())
}
