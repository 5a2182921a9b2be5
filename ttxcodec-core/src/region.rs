//! Page enhancement data packets X/28/0 and X/28/4
//!
//! Bytes 1 to 39 form one stream of 234 bits, six per byte, least
//! significant bit first. Both designation codes share the layout and differ
//! only in which half of the colour table they carry.

use crate::constants::{DEFAULT_CLUT, PACKET_SIZE};
use crate::packet::Packet;

/// Colour table entries carried by one X/28 packet
pub const CLUT_HALF: usize = 16;

/// Non-colour-table fields of an X/28/0 or X/28/4 packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionFields {
    /// Page function, 0 for a basic level one page
    pub page_function: u8,
    /// Page coding, 0 for 7-bit odd parity
    pub page_coding: u8,
    /// Default G0/G2 character set
    pub default_charset: u8,
    /// National option subset of the default set
    pub default_nos: u8,
    /// Second G0 character set, 0xF when unset
    pub second_charset: u8,
    /// National option subset of the second set
    pub second_nos: u8,
    /// Left side panel displayed
    pub left_panel: bool,
    /// Right side panel displayed
    pub right_panel: bool,
    /// Side panels displayed at level 3.5 only
    pub panels_3p5_only: bool,
    /// Columns of the left side panel
    pub left_columns: u8,
    /// Default screen colour
    pub screen_colour: u8,
    /// Default row colour
    pub row_colour: u8,
    /// Black background colour substitution
    pub black_background_substitution: bool,
    /// Colour table remapping
    pub remap: u8,
}

impl Default for RegionFields {
    fn default() -> Self {
        Self {
            page_function: 0,
            page_coding: 0,
            default_charset: 0,
            default_nos: 0,
            second_charset: 0xF,
            second_nos: 7,
            left_panel: false,
            right_panel: false,
            panels_3p5_only: false,
            left_columns: 0,
            screen_colour: 0,
            row_colour: 0,
            black_background_substitution: false,
            remap: 0,
        }
    }
}

impl RegionFields {
    /// Whether any field needs a level 2.5 decoder
    ///
    /// The default NOS is carried by the header control bits as well, so it
    /// is not counted.
    pub fn uses_level_2(&self) -> bool {
        self.default_charset != 0
            || self.second_charset != 0xF
            || self.left_panel
            || self.right_panel
            || self.screen_colour != 0
            || self.row_colour != 0
            || self.black_background_substitution
            || self.remap != 0
    }

    /// Whether page function or coding differ from a basic page
    pub fn has_page_function(&self) -> bool {
        self.page_function != 0 || self.page_coding != 0
    }
}

struct BitReader<'a> {
    packet: &'a Packet,
    position: usize,
}

impl<'a> BitReader<'a> {
    fn new(packet: &'a Packet) -> Self {
        Self {
            packet,
            position: 0,
        }
    }

    fn read(&mut self, width: usize) -> u16 {
        let mut value = 0u16;
        for bit in 0..width {
            let at = self.position + bit;
            let byte = self.packet[1 + at / 6];
            if byte & (1 << (at % 6)) != 0 {
                value |= 1 << bit;
            }
        }
        self.position += width;
        value
    }

    fn read_flag(&mut self) -> bool {
        self.read(1) != 0
    }
}

struct BitWriter {
    packet: Packet,
    position: usize,
}

impl BitWriter {
    fn new(code: u8) -> Self {
        let mut packet = [0u8; PACKET_SIZE];
        packet[0] = code;
        Self {
            packet,
            position: 0,
        }
    }

    fn write(&mut self, width: usize, value: u16) {
        for bit in 0..width {
            if value & (1 << bit) != 0 {
                let at = self.position + bit;
                self.packet[1 + at / 6] |= 1 << (at % 6);
            }
        }
        self.position += width;
    }

    fn write_flag(&mut self, flag: bool) {
        self.write(1, flag as u16);
    }
}

/// Decode the fields and 16 colour table entries of an X/28/0 or X/28/4 packet
pub fn decode_region(packet: &Packet) -> (RegionFields, [u16; CLUT_HALF]) {
    let mut bits = BitReader::new(packet);
    let mut fields = RegionFields {
        page_function: bits.read(4) as u8,
        page_coding: bits.read(3) as u8,
        ..RegionFields::default()
    };
    fields.default_nos = bits.read(3) as u8;
    fields.default_charset = bits.read(4) as u8;
    fields.second_nos = bits.read(3) as u8;
    fields.second_charset = bits.read(4) as u8;
    fields.left_panel = bits.read_flag();
    fields.right_panel = bits.read_flag();
    fields.panels_3p5_only = bits.read_flag();
    fields.left_columns = bits.read(4) as u8;

    let mut clut = [0u16; CLUT_HALF];
    for entry in clut.iter_mut() {
        let red = bits.read(4);
        let green = bits.read(4);
        let blue = bits.read(4);
        *entry = red << 8 | green << 4 | blue;
    }

    fields.screen_colour = bits.read(5) as u8;
    fields.row_colour = bits.read(5) as u8;
    fields.black_background_substitution = bits.read_flag();
    fields.remap = bits.read(3) as u8;

    (fields, clut)
}

/// Encode an X/28 packet with designation code `code`
pub fn encode_region(code: u8, fields: &RegionFields, clut: &[u16; CLUT_HALF]) -> Packet {
    let mut bits = BitWriter::new(code);
    bits.write(4, fields.page_function as u16);
    bits.write(3, fields.page_coding as u16);
    bits.write(3, fields.default_nos as u16);
    bits.write(4, fields.default_charset as u16);
    bits.write(3, fields.second_nos as u16);
    bits.write(4, fields.second_charset as u16);
    bits.write_flag(fields.left_panel);
    bits.write_flag(fields.right_panel);
    bits.write_flag(fields.panels_3p5_only);
    bits.write(4, fields.left_columns as u16);

    for &entry in clut.iter() {
        bits.write(4, entry >> 8);
        bits.write(4, entry >> 4);
        bits.write(4, entry);
    }

    bits.write(5, fields.screen_colour as u16);
    bits.write(5, fields.row_colour as u16);
    bits.write_flag(fields.black_background_substitution);
    bits.write(3, fields.remap as u16);

    bits.packet
}

/// First colour table entry carried by designation code `code` (0 or 4)
pub const fn clut_offset(code: u8) -> usize {
    if code == 0 {
        CLUT_HALF
    } else {
        0
    }
}

/// Whether colour table entries `offset..offset + 16` differ from the defaults
pub fn clut_half_modified(clut: &[u16], offset: usize) -> bool {
    clut[offset..offset + CLUT_HALF] != DEFAULT_CLUT[offset..offset + CLUT_HALF]
}
