//! Level one page: packets interpreted as named fields
//!
//! [`LevelOnePage`] keeps the display rows, the enhancement triplets, the
//! links and the X/28 region fields in structured form and converts to and
//! from raw packets on demand. Packets it does not interpret (row 25, X/27
//! codes other than 0, 4 and 5, X/28 codes other than 0 and 4, and all of
//! X/29) are kept unchanged in a [`PacketPage`].

use crate::constants::{
    CLUT_ENTRIES, COLUMNS, COMPOSE_LINKS, DEFAULT_CLUT, DEFAULT_CYCLE_VALUE, FASTTEXT_LINKS,
    PACKET_SIZE, ROWS, TRIPLETS_PER_PACKET,
};
use crate::enhancement::TripletList;
use crate::links::{ComposeLink, FastTextLink};
use crate::packet::{check_designation, check_display, Packet, PacketPage, PacketStore};
use crate::region::{clut_half_modified, clut_offset, decode_region, encode_region, RegionFields, CLUT_HALF};
use crate::triplet::{mode, Triplet};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Header control bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlBit {
    /// Erase page
    C4,
    /// Newsflash
    C5,
    /// Subtitle
    C6,
    /// Suppress header
    C7,
    /// Update indicator
    C8,
    /// Interrupted sequence
    C9,
    /// Inhibit display
    C10,
    /// Magazine serial
    C11,
    /// National option subset bit 0
    C12,
    /// National option subset bit 1
    C13,
    /// National option subset bit 2
    C14,
}

impl ControlBit {
    /// Every control bit, C4 first
    pub const ALL: [ControlBit; 11] = [
        ControlBit::C4,
        ControlBit::C5,
        ControlBit::C6,
        ControlBit::C7,
        ControlBit::C8,
        ControlBit::C9,
        ControlBit::C10,
        ControlBit::C11,
        ControlBit::C12,
        ControlBit::C13,
        ControlBit::C14,
    ];

    /// Number of the bit as transmitted (4 to 14)
    pub const fn number(self) -> u8 {
        self as u8 + 4
    }
}

/// Unit of the cycle value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CycleType {
    /// Transmission cycles
    #[default]
    Cycles,
    /// Seconds
    Seconds,
}

/// Lowest decoder level that displays a page as intended
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Level 1
    Level1,
    /// Level 1.5
    Level1p5,
    /// Level 2.5
    Level2p5,
    /// Level 3.5
    Level3p5,
}

impl core::fmt::Display for Level {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Level::Level1 => "1",
            Level::Level1p5 => "1.5",
            Level::Level2p5 => "2.5",
            Level::Level3p5 => "3.5",
        })
    }
}

/// One teletext page at levels 1 to 3.5
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelOnePage {
    base: PacketPage,
    subcode: u16,
    control_bits: u8,
    cycle_value: u16,
    cycle_type: CycleType,
    grid: [[u8; COLUMNS]; ROWS],
    enhancements: TripletList,
    fasttext: [FastTextLink; FASTTEXT_LINKS],
    link_control: u8,
    fasttext_crc: [u8; 2],
    compose: [ComposeLink; COMPOSE_LINKS],
    region: RegionFields,
    clut: [u16; CLUT_ENTRIES],
}

impl Default for LevelOnePage {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelOnePage {
    /// Create a blank page
    pub fn new() -> Self {
        Self {
            base: PacketPage::new(),
            subcode: 0,
            control_bits: 0,
            cycle_value: DEFAULT_CYCLE_VALUE,
            cycle_type: CycleType::Cycles,
            grid: [[b' '; COLUMNS]; ROWS],
            enhancements: TripletList::new(),
            fasttext: [FastTextLink::NULL; FASTTEXT_LINKS],
            link_control: 0x0F,
            fasttext_crc: [0; 2],
            compose: core::array::from_fn(ComposeLink::unused),
            region: RegionFields::default(),
            clut: DEFAULT_CLUT,
        }
    }

    /// Whether the page holds no content beyond its defaults
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
            && self.grid.iter().all(|row| row.iter().all(|&c| c == b' '))
            && self.enhancements.is_empty()
            && !self.fasttext_packet_exists()
            && !self.compose.iter().any(ComposeLink::exists)
            && !self.region.uses_level_2()
            && !self.region.has_page_function()
            && self.clut == DEFAULT_CLUT
    }

    /// Sub-page code
    pub fn subcode(&self) -> u16 {
        self.subcode
    }

    /// Set the sub-page code
    pub fn set_subcode(&mut self, subcode: u16) {
        self.subcode = subcode;
    }

    /// Read a header control bit
    pub fn control_bit(&self, bit: ControlBit) -> bool {
        match bit {
            ControlBit::C12 => self.region.default_nos & 0x01 != 0,
            ControlBit::C13 => self.region.default_nos & 0x02 != 0,
            ControlBit::C14 => self.region.default_nos & 0x04 != 0,
            other => self.control_bits & (1 << (other as u8)) != 0,
        }
    }

    /// Set a header control bit; C12 to C14 write the default NOS
    pub fn set_control_bit(&mut self, bit: ControlBit, value: bool) {
        let (field, mask) = match bit {
            ControlBit::C12 => (&mut self.region.default_nos, 0x01),
            ControlBit::C13 => (&mut self.region.default_nos, 0x02),
            ControlBit::C14 => (&mut self.region.default_nos, 0x04),
            other => (&mut self.control_bits, 1 << (other as u8)),
        };
        if value {
            *field |= mask;
        } else {
            *field &= !mask;
        }
    }

    /// Cycle value
    pub fn cycle_value(&self) -> u16 {
        self.cycle_value
    }

    /// Unit of the cycle value
    pub fn cycle_type(&self) -> CycleType {
        self.cycle_type
    }

    /// Set the cycle value and its unit
    pub fn set_cycle(&mut self, value: u16, cycle_type: CycleType) {
        self.cycle_value = value;
        self.cycle_type = cycle_type;
    }

    /// Character at `row`, `column`
    pub fn character(&self, row: usize, column: usize) -> u8 {
        self.grid[row][column]
    }

    /// Set the character at `row`, `column`, masked to 7 bits
    pub fn set_character(&mut self, row: usize, column: usize, character: u8) {
        self.grid[row][column] = character & 0x7F;
    }

    /// One display row
    pub fn row(&self, row: usize) -> &[u8; COLUMNS] {
        &self.grid[row]
    }

    /// Enhancement triplets
    pub fn enhancements(&self) -> &TripletList {
        &self.enhancements
    }

    /// Enhancement triplets, for editing
    pub fn enhancements_mut(&mut self) -> &mut TripletList {
        &mut self.enhancements
    }

    /// FastText link `index` (0-5)
    pub fn fasttext_link(&self, index: usize) -> FastTextLink {
        self.fasttext[index]
    }

    /// Set FastText link `index` (0-5)
    pub fn set_fasttext_link(&mut self, index: usize, link: FastTextLink) {
        self.fasttext[index] = link;
    }

    /// All FastText links
    pub fn fasttext_links(&self) -> &[FastTextLink; FASTTEXT_LINKS] {
        &self.fasttext
    }

    /// Compose link `index` (0-7)
    pub fn compose_link(&self, index: usize) -> ComposeLink {
        self.compose[index]
    }

    /// Set compose link `index`; links 0-3 keep the function fixed to their index
    pub fn set_compose_link(&mut self, index: usize, mut link: ComposeLink) {
        if index < 4 {
            link.function = index as u8;
        }
        self.compose[index] = link;
    }

    /// X/28 region fields
    pub fn region(&self) -> &RegionFields {
        &self.region
    }

    /// Default character set
    pub fn default_charset(&self) -> u8 {
        self.region.default_charset
    }

    /// Default national option subset (C12 to C14)
    pub fn default_nos(&self) -> u8 {
        self.region.default_nos
    }

    /// Set the default character set and national option subset
    pub fn set_default_charset(&mut self, charset: u8, nos: u8) {
        self.region.default_charset = charset & 0x0F;
        self.region.default_nos = nos & 0x07;
    }

    /// Set the second character set; set 0xF (unused) forces NOS 7
    pub fn set_second_charset(&mut self, charset: u8, nos: u8) {
        self.region.second_charset = charset & 0x0F;
        self.region.second_nos = if charset & 0x0F == 0x0F { 7 } else { nos & 0x07 };
    }

    /// Set which side panels are shown and the width of the left one
    pub fn set_side_panels(&mut self, left: bool, right: bool, level_3p5_only: bool, left_columns: u8) {
        self.region.left_panel = left;
        self.region.right_panel = right;
        self.region.panels_3p5_only = level_3p5_only;
        self.region.left_columns = left_columns & 0x0F;
    }

    /// Set the default screen and row colours
    pub fn set_default_colours(&mut self, screen: u8, row: u8) {
        self.region.screen_colour = screen & 0x1F;
        self.region.row_colour = row & 0x1F;
    }

    /// Set black background substitution
    pub fn set_black_background_substitution(&mut self, value: bool) {
        self.region.black_background_substitution = value;
    }

    /// Set the colour table remapping
    pub fn set_colour_table_remap(&mut self, remap: u8) {
        self.region.remap = remap & 0x07;
    }

    /// Colour table entry `index` (0-31) as 0x0RGB
    pub fn clut(&self, index: usize) -> u16 {
        self.clut[index]
    }

    /// Set colour table entry `index` (0-31)
    pub fn set_clut(&mut self, index: usize, colour: u16) {
        self.clut[index] = colour & 0x0FFF;
    }

    /// Link control nibble of X/27/0
    pub fn link_control(&self) -> u8 {
        self.link_control
    }

    fn fasttext_packet_exists(&self) -> bool {
        self.fasttext.iter().any(|link| !link.is_null())
            || self.link_control != 0x0F
            || self.fasttext_crc != [0; 2]
    }

    fn compose_packet_exists(&self, code: u8) -> bool {
        match code {
            4 => self.compose[..6].iter().any(ComposeLink::exists),
            5 => self.compose[6..].iter().any(ComposeLink::exists),
            _ => false,
        }
    }

    fn region_packet_exists(&self, code: u8) -> bool {
        match code {
            0 => {
                self.region.uses_level_2()
                    || self.region.has_page_function()
                    || self.region.left_columns != 0
                    || clut_half_modified(&self.clut, 16)
            }
            4 => clut_half_modified(&self.clut, 0),
            _ => false,
        }
    }

    /// Lowest decoder level needed for this page
    pub fn level_required(&self) -> Level {
        if clut_half_modified(&self.clut, 0) {
            return Level::Level3p5;
        }

        let mut level = if clut_half_modified(&self.clut, 16) || self.region.uses_level_2() {
            Level::Level2p5
        } else {
            Level::Level1
        };

        for triplet in self.enhancements.triplets() {
            let mode_ext = triplet.mode_ext();
            if mode_ext == mode::FONT_STYLE {
                return Level::Level3p5;
            }
            if level == Level::Level1
                && matches!(
                    mode_ext,
                    mode::SET_ACTIVE_POSITION
                        | mode::ADDRESS_ROW_0
                        | mode::TERMINATION_MARKER
                        | mode::G3_CHARACTER_L1_5
                        | mode::G2_CHARACTER
                        | mode::G0_DIACRITICAL_FIRST..=mode::G0_DIACRITICAL_LAST
                )
            {
                level = Level::Level1p5;
            }
            if level < Level::Level2p5
                && matches!(
                    mode_ext,
                    mode::FULL_SCREEN_COLOUR
                        | mode::FULL_ROW_COLOUR
                        | mode::ORIGIN_MODIFIER
                        | mode::INVOKE_ACTIVE_OBJECT..=mode::INVOKE_PASSIVE_OBJECT
                        | mode::DEFINE_ACTIVE_OBJECT..=mode::DEFINE_PASSIVE_OBJECT
                        | mode::DRCS_MODE
                        | mode::FOREGROUND_COLOUR
                        | mode::G1_CHARACTER
                        | mode::BACKGROUND_COLOUR
                        | mode::FLASH_FUNCTIONS
                        | mode::CHARACTER_SET_DESIGNATION
                        | mode::G0_CHARACTER_L2_5
                        | mode::G3_CHARACTER_L2_5
                        | mode::DISPLAY_ATTRIBUTES
                        | mode::DRCS_CHARACTER
                )
            {
                level = Level::Level2p5;
            }
            if level == Level::Level2p5 {
                if triplet.is_definition() && triplet.address() & 0x18 == 0x10 {
                    return Level::Level3p5;
                }
                if mode_ext == mode::DRCS_MODE && triplet.data() & 0x30 == 0x20 {
                    return Level::Level3p5;
                }
            }
        }

        level
    }

    /// BLAKE3 hash over the canonical packet set and header fields
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        for number in 0..=25u8 {
            if let Some(packet) = self.packet(number) {
                hasher.update(&[number]);
                hasher.update(&packet);
            }
        }
        for number in 26..=29u8 {
            for code in 0..16u8 {
                if let Some(packet) = self.designation_packet(number, code) {
                    hasher.update(&[number, code]);
                    hasher.update(&packet);
                }
            }
        }
        hasher.update(&self.subcode.to_le_bytes());
        for bit in ControlBit::ALL {
            hasher.update(&[self.control_bit(bit) as u8]);
        }
        hasher.update(&self.cycle_value.to_le_bytes());
        hasher.update(&[self.cycle_type as u8]);
        *hasher.finalize().as_bytes()
    }

    fn fasttext_packet(&self) -> Packet {
        let mut packet = [0u8; PACKET_SIZE];
        for (i, link) in self.fasttext.iter().enumerate() {
            packet[1 + i * 6..7 + i * 6].copy_from_slice(&link.nibbles());
        }
        packet[37] = self.link_control;
        packet[38..40].copy_from_slice(&self.fasttext_crc);
        packet
    }

    fn set_fasttext_packet(&mut self, packet: &Packet) {
        for (i, link) in self.fasttext.iter_mut().enumerate() {
            let mut nibbles = [0u8; 6];
            nibbles.copy_from_slice(&packet[1 + i * 6..7 + i * 6]);
            *link = FastTextLink::from_nibbles(nibbles);
        }
        self.link_control = packet[37] & 0x0F;
        self.fasttext_crc = [packet[38], packet[39]];
    }

    fn compose_packet(&self, code: u8) -> Packet {
        let mut packet = [0u8; PACKET_SIZE];
        packet[0] = code;
        let (first, count) = if code == 4 { (0, 6) } else { (6, 2) };
        for slot in 0..count {
            let groups = self.compose[first + slot].groups();
            packet[1 + slot * 6..7 + slot * 6].copy_from_slice(&groups);
        }
        packet
    }

    fn set_compose_packet(&mut self, code: u8, packet: &Packet) {
        let (first, count) = if code == 4 { (0, 6) } else { (6, 2) };
        for slot in 0..count {
            let mut groups = [0u8; 6];
            groups.copy_from_slice(&packet[1 + slot * 6..7 + slot * 6]);
            self.set_compose_link(first + slot, ComposeLink::from_groups(groups));
        }
    }

    fn reset_compose_packet(&mut self, code: u8) {
        let range = if code == 4 { 0..6 } else { 6..8 };
        for index in range {
            self.compose[index] = ComposeLink::unused(index);
        }
    }

    fn region_packet(&self, code: u8) -> Packet {
        let offset = clut_offset(code);
        let mut clut = [0u16; CLUT_HALF];
        clut.copy_from_slice(&self.clut[offset..offset + CLUT_HALF]);
        encode_region(code, &self.region, &clut)
    }

    fn set_region_packet(&mut self, code: u8, packet: &Packet) {
        let (fields, clut) = decode_region(packet);
        let offset = clut_offset(code);
        self.clut[offset..offset + CLUT_HALF].copy_from_slice(&clut);
        self.region = fields;
        // Unused second set always carries NOS 7
        if self.region.second_charset == 0x0F {
            self.region.second_nos = 7;
        }
    }

    fn triplet_packet(&self, code: u8) -> Option<Packet> {
        let block = self.enhancements.block(code)?;
        let mut packet = [0u8; PACKET_SIZE];
        packet[0] = code;
        for (i, triplet) in block.iter().enumerate() {
            packet[1 + i * 3..4 + i * 3].copy_from_slice(&triplet.groups());
        }
        Some(packet)
    }

    fn set_triplet_packet(&mut self, code: u8, packet: &Packet) -> Result<()> {
        let mut block = [Triplet::NO_OP; TRIPLETS_PER_PACKET];
        for (i, triplet) in block.iter_mut().enumerate() {
            let mut groups = [0u8; 3];
            groups.copy_from_slice(&packet[1 + i * 3..4 + i * 3]);
            *triplet = Triplet::from_groups(groups);
        }
        self.enhancements.set_block(code, &block)
    }

    fn clear_triplet_packet(&mut self, code: u8) -> Result<()> {
        let start = code as usize * TRIPLETS_PER_PACKET;
        let len = self.enhancements.len();
        if start >= len {
            return Ok(());
        }
        let end = (start + TRIPLETS_PER_PACKET).min(len);
        if end == len {
            self.enhancements.remove_range(start..end)?;
        } else {
            self.enhancements
                .set_block(code, &[Triplet::NO_OP; TRIPLETS_PER_PACKET])?;
        }
        Ok(())
    }
}

impl PacketStore for LevelOnePage {
    fn packet(&self, number: u8) -> Option<Packet> {
        match number as usize {
            row if row < ROWS => {
                let line = &self.grid[row];
                if line.iter().all(|&c| c == b' ') {
                    None
                } else {
                    Some(*line)
                }
            }
            _ => self.base.packet(number),
        }
    }

    fn designation_packet(&self, number: u8, code: u8) -> Option<Packet> {
        check_designation(number, code).ok()?;
        match (number, code) {
            (26, _) => self.triplet_packet(code),
            (27, 0) => self.fasttext_packet_exists().then(|| self.fasttext_packet()),
            (27, 4) | (27, 5) => self
                .compose_packet_exists(code)
                .then(|| self.compose_packet(code)),
            (28, 0) | (28, 4) => self
                .region_packet_exists(code)
                .then(|| self.region_packet(code)),
            _ => self.base.designation_packet(number, code),
        }
    }

    fn set_packet(&mut self, number: u8, data: &Packet) -> Result<()> {
        let index = check_display(number)?;
        if index < ROWS {
            for (cell, &byte) in self.grid[index].iter_mut().zip(data.iter()) {
                *cell = byte & 0x7F;
            }
            Ok(())
        } else {
            self.base.set_packet(number, data)
        }
    }

    fn set_designation_packet(&mut self, number: u8, code: u8, data: &Packet) -> Result<()> {
        check_designation(number, code)?;
        match (number, code) {
            (26, _) => self.set_triplet_packet(code, data)?,
            (27, 0) => self.set_fasttext_packet(data),
            (27, 4) | (27, 5) => self.set_compose_packet(code, data),
            (28, 0) | (28, 4) => self.set_region_packet(code, data),
            _ => self.base.set_designation_packet(number, code, data)?,
        }
        Ok(())
    }

    fn clear_packet(&mut self, number: u8) -> Result<()> {
        let index = check_display(number)?;
        if index < ROWS {
            self.grid[index] = [b' '; COLUMNS];
            Ok(())
        } else {
            self.base.clear_packet(number)
        }
    }

    fn clear_designation_packet(&mut self, number: u8, code: u8) -> Result<()> {
        check_designation(number, code)?;
        match (number, code) {
            (26, _) => self.clear_triplet_packet(code)?,
            (27, 0) => {
                self.fasttext = [FastTextLink::NULL; FASTTEXT_LINKS];
                self.link_control = 0x0F;
                self.fasttext_crc = [0; 2];
            }
            (27, 4) | (27, 5) => self.reset_compose_packet(code),
            (28, 0) => {
                self.region = RegionFields {
                    default_nos: self.region.default_nos,
                    ..RegionFields::default()
                };
                self.clut[16..].copy_from_slice(&DEFAULT_CLUT[16..]);
            }
            (28, 4) => self.clut[..16].copy_from_slice(&DEFAULT_CLUT[..16]),
            _ => self.base.clear_designation_packet(number, code)?,
        }
        Ok(())
    }
}
