//! Generic packet storage for one teletext page
//!
//! A page owns up to 26 display packets (0-25) and up to 16 designation
//! packets in each of the families 26, 27, 28 and 29. Every payload is a
//! full 40-byte buffer allocated on first write. Byte 0 of a designation
//! packet holds its designation code.

use crate::constants::{
    DESIGNATION_CODES, DESIGNATION_FAMILIES, DISPLAY_PACKETS, FIRST_DESIGNATION_PACKET,
    LAST_DESIGNATION_PACKET, PACKET_SIZE,
};
use crate::error::CodecError;
use crate::Result;
use alloc::boxed::Box;

/// One 40-byte packet payload
pub type Packet = [u8; PACKET_SIZE];

/// Read and write access to the packets of a page
///
/// [`PacketPage`] stores every packet as raw bytes. [`crate::page::LevelOnePage`]
/// interprets some families as structured fields and forwards the rest.
pub trait PacketStore {
    /// Payload of display packet `number` (0-25), or `None` if absent
    fn packet(&self, number: u8) -> Option<Packet>;

    /// Payload of designation packet `number` (26-29) with designation `code`
    fn designation_packet(&self, number: u8, code: u8) -> Option<Packet>;

    /// Store display packet `number`, allocating it on first write
    fn set_packet(&mut self, number: u8, data: &Packet) -> Result<()>;

    /// Store designation packet `number`/`code`, allocating it on first write
    fn set_designation_packet(&mut self, number: u8, code: u8, data: &Packet) -> Result<()>;

    /// Remove display packet `number`
    fn clear_packet(&mut self, number: u8) -> Result<()>;

    /// Remove designation packet `number`/`code`
    fn clear_designation_packet(&mut self, number: u8, code: u8) -> Result<()>;

    /// Whether display packet `number` exists
    fn packet_exists(&self, number: u8) -> bool {
        self.packet(number).is_some()
    }

    /// Whether designation packet `number`/`code` exists
    fn designation_packet_exists(&self, number: u8, code: u8) -> bool {
        self.designation_packet(number, code).is_some()
    }
}

/// Validate a display packet number
pub(crate) fn check_display(number: u8) -> Result<usize> {
    if (number as usize) < DISPLAY_PACKETS {
        Ok(number as usize)
    } else {
        Err(CodecError::InvalidPacketNumber(number))
    }
}

/// Validate a designation packet number and code, returning (family, code) indices
pub(crate) fn check_designation(number: u8, code: u8) -> Result<(usize, usize)> {
    if !(FIRST_DESIGNATION_PACKET..=LAST_DESIGNATION_PACKET).contains(&number) {
        return Err(CodecError::InvalidPacketNumber(number));
    }
    if code as usize >= DESIGNATION_CODES {
        return Err(CodecError::InvalidDesignationCode {
            packet: number,
            code,
        });
    }
    Ok(((number - FIRST_DESIGNATION_PACKET) as usize, code as usize))
}

/// Raw packet storage with lazy allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketPage {
    display: [Option<Box<Packet>>; DISPLAY_PACKETS],
    designation: [[Option<Box<Packet>>; DESIGNATION_CODES]; DESIGNATION_FAMILIES],
}

impl PacketPage {
    /// Create an empty page with no packets allocated
    pub fn new() -> Self {
        Self {
            display: core::array::from_fn(|_| None),
            designation: core::array::from_fn(|_| core::array::from_fn(|_| None)),
        }
    }

    /// Borrow a display packet without copying it
    pub fn packet_ref(&self, number: u8) -> Option<&Packet> {
        self.display.get(number as usize)?.as_deref()
    }

    /// Borrow a designation packet without copying it
    pub fn designation_packet_ref(&self, number: u8, code: u8) -> Option<&Packet> {
        let (family, code) = check_designation(number, code).ok()?;
        self.designation[family][code].as_deref()
    }

    /// Whether no packet has been allocated
    pub fn is_empty(&self) -> bool {
        self.display.iter().all(Option::is_none)
            && self
                .designation
                .iter()
                .all(|family| family.iter().all(Option::is_none))
    }
}

impl Default for PacketPage {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketStore for PacketPage {
    fn packet(&self, number: u8) -> Option<Packet> {
        self.packet_ref(number).copied()
    }

    fn designation_packet(&self, number: u8, code: u8) -> Option<Packet> {
        self.designation_packet_ref(number, code).copied()
    }

    fn set_packet(&mut self, number: u8, data: &Packet) -> Result<()> {
        let index = check_display(number)?;
        match &mut self.display[index] {
            Some(existing) => **existing = *data,
            slot => *slot = Some(Box::new(*data)),
        }
        Ok(())
    }

    fn set_designation_packet(&mut self, number: u8, code: u8, data: &Packet) -> Result<()> {
        let (family, index) = check_designation(number, code)?;
        let mut stored = *data;
        stored[0] = code;
        match &mut self.designation[family][index] {
            Some(existing) => **existing = stored,
            slot => *slot = Some(Box::new(stored)),
        }
        Ok(())
    }

    fn clear_packet(&mut self, number: u8) -> Result<()> {
        let index = check_display(number)?;
        self.display[index] = None;
        Ok(())
    }

    fn clear_designation_packet(&mut self, number: u8, code: u8) -> Result<()> {
        let (family, index) = check_designation(number, code)?;
        self.designation[family][index] = None;
        Ok(())
    }

    fn packet_exists(&self, number: u8) -> bool {
        self.packet_ref(number).is_some()
    }

    fn designation_packet_exists(&self, number: u8, code: u8) -> bool {
        self.designation_packet_ref(number, code).is_some()
    }
}
