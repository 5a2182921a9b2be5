//! Build a page in memory and write it in every supported format

use ttxcodec_core::{
    links::absolute_to_relative, triplet::mode, ControlBit, FastTextLink, FormatRegistry,
    LevelOnePage, PageSet, Triplet,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("ttxcodec page conversion example\n");

    let mut page = LevelOnePage::new();
    for (i, &c) in b"\x0D\x03  TELETEXT INDEX".iter().enumerate() {
        page.set_character(1, i, c);
    }
    for (row, title) in ["News", "Sport", "Weather", "Travel"].iter().enumerate() {
        let line = format!("\x06{:<20}\x03{}", title, 101 + row);
        for (i, &c) in line.as_bytes().iter().enumerate() {
            page.set_character(4 + row * 2, i, c);
        }
    }
    page.set_control_bit(ControlBit::C5, true);
    for (i, target) in [0x101u16, 0x102, 0x103, 0x104].into_iter().enumerate() {
        page.set_fasttext_link(
            i,
            FastTextLink {
                page: absolute_to_relative(target, 1),
                subpage: 0x3F7F,
            },
        );
    }

    // Blue background on the title row
    page.enhancements_mut()
        .append(Triplet::new(41, mode::FULL_ROW_COLOUR, 0x04))?;

    let mut set = PageSet::with_page(0x100, page);
    set.description = String::from("Index");

    println!("Level required: {}", set.subpages[0].level_required());

    let registry = FormatRegistry::new();
    for format in registry.iter() {
        let saved = format.save(&set);
        let name = format!("example_output.{}", format.id());
        std::fs::write(&name, &saved.data)?;
        println!("{:<24} {:>5} bytes  ({})", name, saved.data.len(), format.description());
        for warning in &saved.warnings {
            println!("    warning: {}", warning);
        }
    }

    println!("\nUse 'ttxcodec inspect --input example_output.t42' to read one back");

    Ok(())
}
