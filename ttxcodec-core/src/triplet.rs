//! Enhancement triplets (X/26)
//!
//! A triplet packs an 18-bit instruction: a 6-bit address, a 5-bit mode and
//! a 7-bit data field. Addresses 40-63 select a display row and make a *row
//! triplet*; addresses 0-39 select a column and make a *column triplet*,
//! whose mode is read with bit 0x20 set (see [`Triplet::mode_ext`]).

use serde::{Deserialize, Serialize};

/// Extended mode numbers, as returned by [`Triplet::mode_ext`]
pub mod mode {
    /// Full screen colour
    pub const FULL_SCREEN_COLOUR: u8 = 0x00;
    /// Full row colour
    pub const FULL_ROW_COLOUR: u8 = 0x01;
    /// Set active position
    pub const SET_ACTIVE_POSITION: u8 = 0x04;
    /// Address display row 0
    pub const ADDRESS_ROW_0: u8 = 0x07;
    /// PDC: country of origin and programme source
    pub const PDC_COUNTRY_OF_ORIGIN: u8 = 0x08;
    /// PDC: series identifier and series code
    pub const PDC_SERIES: u8 = 0x0D;
    /// Origin modifier
    pub const ORIGIN_MODIFIER: u8 = 0x10;
    /// Invoke active object
    pub const INVOKE_ACTIVE_OBJECT: u8 = 0x11;
    /// Invoke adaptive object
    pub const INVOKE_ADAPTIVE_OBJECT: u8 = 0x12;
    /// Invoke passive object
    pub const INVOKE_PASSIVE_OBJECT: u8 = 0x13;
    /// Define active object
    pub const DEFINE_ACTIVE_OBJECT: u8 = 0x15;
    /// Define adaptive object
    pub const DEFINE_ADAPTIVE_OBJECT: u8 = 0x16;
    /// Define passive object
    pub const DEFINE_PASSIVE_OBJECT: u8 = 0x17;
    /// DRCS mode
    pub const DRCS_MODE: u8 = 0x18;
    /// Reserved row mode used as a placeholder
    pub const DUMMY: u8 = 0x1E;
    /// Termination marker
    pub const TERMINATION_MARKER: u8 = 0x1F;
    /// Foreground colour
    pub const FOREGROUND_COLOUR: u8 = 0x20;
    /// G1 block mosaic character
    pub const G1_CHARACTER: u8 = 0x21;
    /// G3 smoothed mosaic or line drawing character at level 1.5
    pub const G3_CHARACTER_L1_5: u8 = 0x22;
    /// Background colour
    pub const BACKGROUND_COLOUR: u8 = 0x23;
    /// PDC: cursor column and announced minutes
    pub const PDC_COLUMN: u8 = 0x26;
    /// Additional flash functions
    pub const FLASH_FUNCTIONS: u8 = 0x27;
    /// Modified G0 and G2 character set designation
    pub const CHARACTER_SET_DESIGNATION: u8 = 0x28;
    /// G0 character at level 2.5
    pub const G0_CHARACTER_L2_5: u8 = 0x29;
    /// G3 smoothed mosaic or line drawing character at level 2.5
    pub const G3_CHARACTER_L2_5: u8 = 0x2B;
    /// Display attributes
    pub const DISPLAY_ATTRIBUTES: u8 = 0x2C;
    /// DRCS character
    pub const DRCS_CHARACTER: u8 = 0x2D;
    /// Font style (level 3.5 only)
    pub const FONT_STYLE: u8 = 0x2E;
    /// G2 supplementary character
    pub const G2_CHARACTER: u8 = 0x2F;
    /// First G0 character with diacritical mark
    pub const G0_DIACRITICAL_FIRST: u8 = 0x30;
    /// Last G0 character with diacritical mark
    pub const G0_DIACRITICAL_LAST: u8 = 0x3F;
}

/// Where an object invocation finds its definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectSource {
    /// Reserved source value
    Illegal,
    /// Defined elsewhere on this page
    Local,
    /// Defined on a public object page
    Pop,
    /// Defined on the global public object page
    Gpop,
}

/// One enhancement triplet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triplet {
    address: u8,
    mode: u8,
    data: u8,
}

impl Triplet {
    /// Neutral triplet used to pad short or corrupt X/26 data
    pub const NO_OP: Triplet = Triplet {
        address: 41,
        mode: mode::DUMMY,
        data: 0,
    };

    /// Termination marker written after the last triplet of a page
    pub const TERMINATOR: Triplet = Triplet {
        address: 63,
        mode: mode::TERMINATION_MARKER,
        data: 7,
    };

    /// Build a triplet, masking every field to its width
    pub const fn new(address: u8, mode: u8, data: u8) -> Self {
        Self {
            address: address & 0x3F,
            mode: mode & 0x1F,
            data: data & 0x7F,
        }
    }

    /// Unpack an 18-bit value: address in bits 0-5, mode 6-10, data 11-17
    pub const fn from_value(value: u32) -> Self {
        Self::new(value as u8, (value >> 6) as u8, (value >> 11) as u8)
    }

    /// Pack into an 18-bit value
    pub const fn value(&self) -> u32 {
        self.address as u32 | (self.mode as u32) << 6 | (self.data as u32) << 11
    }

    /// Unpack from three 6-bit groups, low bits first
    pub const fn from_groups(groups: [u8; 3]) -> Self {
        Self::from_value(
            (groups[0] & 0x3F) as u32
                | ((groups[1] & 0x3F) as u32) << 6
                | ((groups[2] & 0x3F) as u32) << 12,
        )
    }

    /// Split into three 6-bit groups, low bits first
    pub const fn groups(&self) -> [u8; 3] {
        let value = self.value();
        [
            (value & 0x3F) as u8,
            ((value >> 6) & 0x3F) as u8,
            ((value >> 12) & 0x3F) as u8,
        ]
    }

    /// 6-bit address field
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// 5-bit mode field
    pub const fn mode(&self) -> u8 {
        self.mode
    }

    /// 7-bit data field
    pub const fn data(&self) -> u8 {
        self.data
    }

    /// Set the address field
    pub fn set_address(&mut self, address: u8) {
        self.address = address & 0x3F;
    }

    /// Set the mode field
    pub fn set_mode(&mut self, mode: u8) {
        self.mode = mode & 0x1F;
    }

    /// Set the data field
    pub fn set_data(&mut self, data: u8) {
        self.data = data & 0x7F;
    }

    /// Whether the address selects a row rather than a column
    pub const fn is_row_triplet(&self) -> bool {
        self.address >= 40
    }

    /// Mode in the combined 0x00-0x3F space: column triplets have bit 0x20 set
    pub const fn mode_ext(&self) -> u8 {
        if self.is_row_triplet() {
            self.mode
        } else {
            self.mode | 0x20
        }
    }

    /// Display row addressed by a row triplet (address 40 is row 24)
    pub const fn address_row(&self) -> u8 {
        if self.address == 40 {
            24
        } else {
            self.address.saturating_sub(40)
        }
    }

    /// Display column addressed by a column triplet
    pub const fn address_column(&self) -> u8 {
        self.address
    }

    /// Whether this triplet invokes an object (modes 0x11-0x13)
    pub const fn is_invocation(&self) -> bool {
        matches!(
            self.mode_ext(),
            mode::INVOKE_ACTIVE_OBJECT..=mode::INVOKE_PASSIVE_OBJECT
        )
    }

    /// Whether this triplet defines an object (modes 0x15-0x17)
    pub const fn is_definition(&self) -> bool {
        matches!(
            self.mode_ext(),
            mode::DEFINE_ACTIVE_OBJECT..=mode::DEFINE_PASSIVE_OBJECT
        )
    }

    /// Object source of an invocation, from address bits 3-4
    pub const fn object_source(&self) -> ObjectSource {
        match (self.address & 0x18) >> 3 {
            0 => ObjectSource::Illegal,
            1 => ObjectSource::Local,
            2 => ObjectSource::Pop,
            _ => ObjectSource::Gpop,
        }
    }

    /// Designation code of a local object pointer (address bit 0, data bits 4-6)
    pub const fn object_local_designation_code(&self) -> u8 {
        (self.address & 0x01) << 3 | self.data >> 4
    }

    /// Triplet number of a local object pointer (data bits 0-3)
    pub const fn object_local_triplet_number(&self) -> u8 {
        self.data & 0x0F
    }

    /// Position in the enhancement list that a local object pointer refers to
    pub const fn object_local_index(&self) -> usize {
        self.object_local_designation_code() as usize * 13
            + self.object_local_triplet_number() as usize
    }

    /// Point a local object reference at list position `index`
    pub fn set_object_local_index(&mut self, index: usize) {
        let code = (index / 13) as u8;
        let triplet = (index % 13) as u8;
        self.address = (self.address & 0x3E) | ((code >> 3) & 0x01);
        self.data = ((code & 0x07) << 4) | triplet;
    }
}

impl Default for Triplet {
    fn default() -> Self {
        Self::NO_OP
    }
}
