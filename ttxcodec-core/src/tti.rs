//! TTI text dump format
//!
//! One command per line, `XX,arguments`. Display rows are stored as 7-bit
//! text with control codes escaped; designation packets are stored as 6-bit
//! groups (or 4-bit link nibbles) with bit 6 set so every byte is printable.

use crate::constants::{ANY_SUBPAGE, PACKET_SIZE};
use crate::error::CodecError;
use crate::format::{Diagnostics, FormatId, LoadOutcome, PageFormat, SaveOutcome};
use crate::links::{absolute_to_relative, relative_to_absolute, FastTextLink};
use crate::packet::{Packet, PacketStore};
use crate::page::{ControlBit, CycleType, LevelOnePage};
use crate::pageset::PageSet;
use crate::triplet::Triplet;
use crate::Result;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use bytes::Bytes;

#[cfg(feature = "logging")]
use tracing::debug;

const ESC: u8 = 0x1B;

/// Page status bit that marks a page for transmission
const PS_TRANSMIT: u16 = 0x8000;

/// Page status bit for each control bit
const PS_BITS: [(ControlBit, u16); 11] = [
    (ControlBit::C4, 0x4000),
    (ControlBit::C5, 0x0001),
    (ControlBit::C6, 0x0002),
    (ControlBit::C7, 0x0004),
    (ControlBit::C8, 0x0008),
    (ControlBit::C9, 0x0010),
    (ControlBit::C10, 0x0020),
    (ControlBit::C11, 0x0040),
    (ControlBit::C12, 0x0080),
    (ControlBit::C13, 0x0100),
    (ControlBit::C14, 0x0200),
];

/// Packet families whose payload is Hamming 24/18 triplets on air
fn carries_triplets(number: u8, code: u8) -> bool {
    number != 27 || code >= 4
}

/// TTI text dump
#[derive(Debug, Clone, Copy, Default)]
pub struct TtiFormat;

impl PageFormat for TtiFormat {
    fn id(&self) -> FormatId {
        FormatId::Tti
    }

    fn description(&self) -> &'static str {
        "MRG Systems TTI"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["tti", "ttix"]
    }

    fn load(&self, data: &[u8]) -> Result<LoadOutcome> {
        let mut diagnostics = Diagnostics::new();
        let mut loader = Loader::default();

        let mut start = 0;
        let ends = memchr::memchr_iter(b'\n', data).chain(core::iter::once(data.len()));
        for (line_number, end) in ends.enumerate() {
            if start > data.len() {
                break;
            }
            let mut line = &data[start..end];
            start = end + 1;
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }
            if line.is_empty() {
                continue;
            }
            if !loader.line(line_number + 1, line, &mut diagnostics)? {
                break;
            }
        }

        let pages = loader.finish(&mut diagnostics)?;
        Ok(LoadOutcome {
            pages,
            warnings: diagnostics.into_warnings(),
        })
    }

    fn save(&self, pages: &PageSet) -> SaveOutcome {
        let mut diagnostics = Diagnostics::new();
        let mut out = Vec::new();

        if !pages.description.is_empty() {
            let description: String = pages
                .description
                .chars()
                .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
                .collect();
            write_line(&mut out, &format!("DE,{}", description));
        }

        let magazine = pages.magazine();
        for (index, page) in pages.subpages.iter().enumerate() {
            let subpage_number = if pages.subpages.len() > 1 { index + 1 } else { 0 };
            write_line(
                &mut out,
                &format!("PN,{:X}{:02X}{:02}", magazine, pages.page_byte(), subpage_number % 100),
            );
            write_line(&mut out, &format!("SC,{:04X}", page.subcode()));
            write_line(&mut out, &format!("PS,{:04X}", page_status(page)));
            let cycle_unit = match page.cycle_type() {
                CycleType::Cycles => 'C',
                CycleType::Seconds => 'T',
            };
            write_line(&mut out, &format!("CT,{},{}", page.cycle_value(), cycle_unit));
            if page.default_charset() != 0 {
                write_line(&mut out, &format!("RE,{:X}", page.default_charset()));
            }

            for number in [28u8, 26, 27, 29] {
                for code in 0..16u8 {
                    if number == 27 && code == 0 {
                        continue;
                    }
                    if let Some(packet) = page.designation_packet(number, code) {
                        write_packet_line(&mut out, number, &encode_designation(&packet));
                    }
                }
            }

            for number in 0..=25u8 {
                if let Some(packet) = page.packet(number) {
                    write_packet_line(&mut out, number, &encode_display(&packet));
                }
            }

            if page.designation_packet_exists(27, 0) {
                let mut fields = Vec::new();
                for (i, link) in page.fasttext_links().iter().enumerate() {
                    let absolute = relative_to_absolute(link.page, magazine);
                    if link.has_specific_subpage() {
                        diagnostics.warn(format!(
                            "Subpage {}: FastText link {} to page {:03X} sub-page {:04X} saved without its sub-page",
                            index + 1,
                            i,
                            absolute,
                            link.subpage
                        ));
                    }
                    fields.push(format!("{:03x}", absolute));
                }
                write_line(&mut out, &format!("FL,{}", fields.join(",")));
            }
        }

        SaveOutcome {
            data: Bytes::from(out),
            warnings: diagnostics.into_warnings(),
        }
    }
}

fn write_line(out: &mut Vec<u8>, line: &str) {
    out.extend_from_slice(line.as_bytes());
    out.extend_from_slice(b"\r\n");
}

fn write_packet_line(out: &mut Vec<u8>, number: u8, payload: &[u8]) {
    out.extend_from_slice(format!("OL,{},", number).as_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(b"\r\n");
}

fn page_status(page: &LevelOnePage) -> u16 {
    PS_BITS
        .iter()
        .filter(|(bit, _)| page.control_bit(*bit))
        .fold(PS_TRANSMIT, |status, (_, mask)| status | mask)
}

/// Escape control codes in a display row
pub fn encode_display(packet: &Packet) -> Vec<u8> {
    let mut out = Vec::with_capacity(PACKET_SIZE + 8);
    for &byte in packet.iter() {
        let byte = byte & 0x7F;
        if byte < 0x20 {
            out.push(ESC);
            out.push(byte | 0x40);
        } else {
            out.push(byte);
        }
    }
    out
}

/// Decode an escaped display row, padding short lines with 0x00
pub fn decode_display(text: &[u8]) -> Packet {
    let mut packet = [0u8; PACKET_SIZE];
    let mut bytes = text.iter();
    let mut column = 0;
    while column < PACKET_SIZE {
        let byte = match bytes.next() {
            Some(&ESC) => match bytes.next() {
                Some(&escaped) => escaped.wrapping_sub(0x40) & 0x7F,
                None => break,
            },
            Some(&byte) => byte & 0x7F,
            None => break,
        };
        packet[column] = byte;
        column += 1;
    }
    packet
}

/// Store a designation packet as printable 6-bit groups
pub fn encode_designation(packet: &Packet) -> Vec<u8> {
    packet.iter().map(|&byte| (byte & 0x3F) | 0x40).collect()
}

/// Decode printable 6-bit groups, padding triplet packets with [`Triplet::NO_OP`]
///
/// Returns `None` when the designation code is out of range.
pub fn decode_designation(number: u8, text: &[u8]) -> Option<Packet> {
    let code = *text.first()? & 0x3F;
    if code > 15 {
        return None;
    }

    let mut packet = [0u8; PACKET_SIZE];
    packet[0] = code;
    if carries_triplets(number, code) {
        let padding = Triplet::NO_OP.groups();
        for (i, byte) in packet.iter_mut().enumerate().skip(1) {
            *byte = padding[(i - 1) % 3];
        }
    }
    for (slot, &byte) in packet.iter_mut().skip(1).zip(text.iter().skip(1)) {
        *slot = byte & 0x3F;
    }
    Some(packet)
}

fn parse_text(bytes: &[u8]) -> Option<&str> {
    core::str::from_utf8(bytes).ok().map(str::trim)
}

fn parse_hex(bytes: &[u8]) -> Option<u16> {
    u16::from_str_radix(parse_text(bytes)?, 16).ok()
}

fn parse_decimal(bytes: &[u8]) -> Option<u16> {
    parse_text(bytes)?.parse().ok()
}

#[derive(Default)]
struct Loader {
    page_number: Option<u16>,
    description: String,
    subpages: Vec<LevelOnePage>,
    current: Option<LevelOnePage>,
    current_has_number: bool,
    cycles: Vec<(u16, CycleType)>,
}

impl Loader {
    fn page(&mut self) -> &mut LevelOnePage {
        self.current.get_or_insert_with(LevelOnePage::new)
    }

    fn magazine(&self) -> u8 {
        match self.page_number.map_or(1, |number| (number >> 8) & 0x07) {
            0 => 8,
            magazine => magazine as u8,
        }
    }

    /// Handle one line; returns false when loading should stop
    fn line(&mut self, line_number: usize, line: &[u8], diagnostics: &mut Diagnostics) -> Result<bool> {
        let (command, argument) = match line.get(2) {
            Some(b',') => (&line[..2], &line[3..]),
            _ if line.len() == 2 => (line, &line[2..]),
            _ => {
                diagnostics.warn(format!("Line {}: not a command, ignored", line_number));
                return Ok(true);
            }
        };

        match command {
            b"DE" => self.description = String::from_utf8_lossy(argument).into_owned(),
            b"PN" => return self.page_number_line(line_number, argument, diagnostics),
            b"SC" => match parse_hex(argument) {
                Some(subcode) => self.page().set_subcode(subcode),
                None => diagnostics.warn(format!("Line {}: bad subcode, ignored", line_number)),
            },
            b"PS" => match parse_hex(argument) {
                Some(status) => {
                    let page = self.page();
                    for (bit, mask) in PS_BITS {
                        page.set_control_bit(bit, status & mask != 0);
                    }
                }
                None => diagnostics.warn(format!("Line {}: bad page status, ignored", line_number)),
            },
            b"CT" => self.cycle_line(line_number, argument, diagnostics),
            b"FL" => self.fasttext_line(line_number, argument, diagnostics),
            b"RE" => match parse_hex(argument) {
                Some(region) if region <= 0x0F => {
                    let page = self.page();
                    let nos = page.default_nos();
                    page.set_default_charset(region as u8, nos);
                }
                _ => diagnostics.warn(format!("Line {}: bad region, ignored", line_number)),
            },
            b"OL" => self.packet_line(line_number, argument, diagnostics)?,
            b"SP" | b"DS" | b"MS" | b"CY" | b"PF" => {
                #[cfg(feature = "logging")]
                debug!("Line {}: {} ignored", line_number, String::from_utf8_lossy(command));
            }
            _ => diagnostics.warn(format!(
                "Line {}: unknown command {}, ignored",
                line_number,
                String::from_utf8_lossy(command)
            )),
        }
        Ok(true)
    }

    fn page_number_line(&mut self, line_number: usize, argument: &[u8], diagnostics: &mut Diagnostics) -> Result<bool> {
        let number = argument
            .get(..3)
            .and_then(parse_hex)
            .ok_or_else(|| CodecError::Parse(format!("line {}: bad page number", line_number)))?;

        match self.page_number {
            Some(existing) if existing & 0x7FF != number & 0x7FF => {
                diagnostics.warn(format!(
                    "Line {}: page {:03X} follows page {:03X}, only the first page was kept",
                    line_number, number, existing
                ));
                return Ok(false);
            }
            Some(_) => {}
            None => self.page_number = Some(number),
        }

        if self.current_has_number {
            if let Some(page) = self.current.take() {
                self.subpages.push(page);
            }
        }
        self.page();
        self.current_has_number = true;
        Ok(true)
    }

    fn cycle_line(&mut self, line_number: usize, argument: &[u8], diagnostics: &mut Diagnostics) {
        let mut fields = argument.split(|&b| b == b',');
        let value = fields.next().and_then(parse_decimal);
        let unit = match fields.next().and_then(parse_text) {
            Some("T") => Some(CycleType::Seconds),
            Some("C") | None => Some(CycleType::Cycles),
            Some(_) => None,
        };
        match (value, unit) {
            (Some(value), Some(unit)) => {
                self.page().set_cycle(value, unit);
                self.cycles.push((value, unit));
            }
            _ => diagnostics.warn(format!("Line {}: bad cycle time, ignored", line_number)),
        }
    }

    fn fasttext_line(&mut self, line_number: usize, argument: &[u8], diagnostics: &mut Diagnostics) {
        let magazine = self.magazine();
        let fields: Vec<&[u8]> = argument.split(|&b| b == b',').collect();
        let mut links = [FastTextLink::NULL; 6];
        for (i, link) in links.iter_mut().enumerate() {
            match fields.get(i).and_then(|field| parse_hex(field)) {
                // Page numbers below 100 mark an unused link
                Some(absolute) if absolute >= 0x100 => {
                    *link = FastTextLink {
                        page: absolute_to_relative(absolute, magazine),
                        subpage: ANY_SUBPAGE,
                    };
                }
                Some(_) => {}
                None => {
                    diagnostics.warn(format!("Line {}: bad FastText link {}, null link used", line_number, i));
                }
            }
        }
        let page = self.page();
        for (i, link) in links.into_iter().enumerate() {
            page.set_fasttext_link(i, link);
        }
    }

    fn packet_line(&mut self, line_number: usize, argument: &[u8], diagnostics: &mut Diagnostics) -> Result<()> {
        let comma = argument.iter().position(|&b| b == b',');
        let (number, payload) = match comma {
            Some(at) => (parse_decimal(&argument[..at]), &argument[at + 1..]),
            None => (parse_decimal(argument), &argument[argument.len()..]),
        };

        let number = match number {
            Some(number) if number <= 29 => number as u8,
            _ => {
                diagnostics.warn(format!("Line {}: bad packet number, ignored", line_number));
                return Ok(());
            }
        };

        if number <= 25 {
            let packet = decode_display(payload);
            self.page().set_packet(number, &packet)?;
            return Ok(());
        }

        match decode_designation(number, payload) {
            Some(packet) => {
                if payload.len() < PACKET_SIZE {
                    #[cfg(feature = "logging")]
                    debug!("Line {}: short X/{} line padded", line_number, number);
                }
                self.page().set_designation_packet(number, packet[0], &packet)?;
            }
            None => diagnostics.warn(format!(
                "Line {}: X/{} designation code out of range, ignored",
                line_number, number
            )),
        }
        Ok(())
    }

    fn finish(mut self, diagnostics: &mut Diagnostics) -> Result<PageSet> {
        let page_number = self.page_number.ok_or(CodecError::NoPageHeader)?;
        if let Some(page) = self.current.take() {
            self.subpages.push(page);
        }

        // A lone cycle line in a multi-page file is taken to apply to every sub-page
        if self.cycles.len() == 1 && self.subpages.len() > 1 {
            let (value, unit) = self.cycles[0];
            for page in self.subpages.iter_mut() {
                page.set_cycle(value, unit);
            }
            #[cfg(feature = "logging")]
            debug!("Single cycle time {} applied to {} sub-pages", value, self.subpages.len());
        }

        for page in self.subpages.iter_mut() {
            page.enhancements_mut().drop_padding();
        }

        if self.subpages.iter().all(LevelOnePage::is_empty) {
            diagnostics.warn("File holds no page content");
        }

        Ok(PageSet {
            page_number,
            description: self.description,
            subpages: self.subpages,
        })
    }
}
