//! T42 raw packet stream
//!
//! Each record is 42 bytes: two Hamming 8/4 address bytes (magazine and
//! packet number) followed by the 40-byte packet as transmitted.

use crate::constants::{HEADER_TEXT_START, PACKET_SIZE, T42_RECORD_SIZE, TRIPLETS_PER_PACKET};
use crate::error::CodecError;
use crate::format::{Diagnostics, FormatId, LoadOutcome, PageFormat, SaveOutcome};
use crate::hamming::{
    hamming_24_18_decode, hamming_24_18_encode, hamming_8_4_checked, hamming_8_4_encode,
    parity_decode, parity_encode, Hamming24,
};
use crate::links::FastTextLink;
use crate::packet::{Packet, PacketStore};
use crate::page::{ControlBit, LevelOnePage};
use crate::pageset::PageSet;
use crate::triplet::Triplet;
use crate::Result;
use alloc::format;
use alloc::vec::Vec;
use bytes::{BufMut, Bytes, BytesMut};

#[cfg(feature = "logging")]
use tracing::debug;

/// One 42-byte record
pub type Record = [u8; T42_RECORD_SIZE];

/// Order in which designation packets are written after the header
const DESIGNATION_ORDER: [u8; 4] = [27, 28, 26, 29];

/// Decoded magazine and row address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    /// Magazine 0-7, 0 standing for 8
    pub magazine: u8,
    /// Packet number 0-31
    pub packet: u8,
}

/// Encode the two address bytes of a record
pub fn encode_address(magazine: u8, packet: u8) -> [u8; 2] {
    [
        hamming_8_4_encode((magazine & 0x07) | (packet & 0x01) << 3),
        hamming_8_4_encode(packet >> 1),
    ]
}

/// Decode the two address bytes of a record
pub fn decode_address(bytes: [u8; 2]) -> Option<Address> {
    let low = hamming_8_4_checked(bytes[0])?;
    let high = hamming_8_4_checked(bytes[1])?;
    Some(Address {
        magazine: low & 0x07,
        packet: (low >> 3) | high << 1,
    })
}

/// Whether X/27 designation code `code` carries link nibbles rather than triplets
fn is_link_packet(number: u8, code: u8) -> bool {
    number == 27 && code < 4
}

/// T42 packet stream
#[derive(Debug, Clone, Copy, Default)]
pub struct T42Format;

impl PageFormat for T42Format {
    fn id(&self) -> FormatId {
        FormatId::T42
    }

    fn description(&self) -> &'static str {
        "t42 packet stream"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["t42"]
    }

    fn load(&self, data: &[u8]) -> Result<LoadOutcome> {
        if data.len() < T42_RECORD_SIZE {
            return Err(CodecError::Truncated {
                expected: T42_RECORD_SIZE,
                actual: data.len(),
            });
        }

        let mut diagnostics = Diagnostics::new();
        let mut stream = Stream::default();

        let records = data.chunks_exact(T42_RECORD_SIZE);
        let remainder = records.remainder().len();
        for (index, chunk) in records.enumerate() {
            let mut record = [0u8; T42_RECORD_SIZE];
            record.copy_from_slice(chunk);
            if !stream.record(index, &record, &mut diagnostics)? {
                break;
            }
        }
        if remainder != 0 && !stream.finished {
            diagnostics.warn(format!("Ignored {} trailing bytes after the last record", remainder));
        }

        let pages = stream.finish()?;
        Ok(LoadOutcome {
            pages,
            warnings: diagnostics.into_warnings(),
        })
    }

    fn save(&self, pages: &PageSet) -> SaveOutcome {
        let mut diagnostics = Diagnostics::new();
        let magazine = pages.magazine() & 0x07;
        let mut out = BytesMut::new();

        for (index, page) in pages.subpages.iter().enumerate() {
            if page.row(0)[..HEADER_TEXT_START].iter().any(|&c| c != b' ') {
                diagnostics.warn(format!(
                    "Subpage {}: row 0 columns 0-7 are not stored in a T42 header",
                    index + 1
                ));
            }
            out.put_slice(&encode_header(magazine, pages.page_byte(), page));

            for number in DESIGNATION_ORDER {
                for code in 0..16u8 {
                    if let Some(packet) = page.designation_packet(number, code) {
                        out.put_slice(&encode_designation(magazine, number, &packet));
                    }
                }
            }

            for number in 1..=25u8 {
                if let Some(packet) = page.packet(number) {
                    out.put_slice(&encode_display(magazine, number, &packet));
                }
            }
        }

        SaveOutcome {
            data: out.freeze(),
            warnings: diagnostics.into_warnings(),
        }
    }
}

/// Encode the page header record
pub fn encode_header(magazine: u8, page: u8, content: &LevelOnePage) -> Record {
    let bit = |b: ControlBit| content.control_bit(b) as u8;
    let subcode = content.subcode();
    let nibbles = [
        page & 0x0F,
        page >> 4,
        (subcode & 0x0F) as u8,
        ((subcode >> 4) & 0x07) as u8 | bit(ControlBit::C4) << 3,
        ((subcode >> 8) & 0x0F) as u8,
        ((subcode >> 12) & 0x03) as u8 | bit(ControlBit::C5) << 2 | bit(ControlBit::C6) << 3,
        bit(ControlBit::C7) | bit(ControlBit::C8) << 1 | bit(ControlBit::C9) << 2 | bit(ControlBit::C10) << 3,
        bit(ControlBit::C11) | bit(ControlBit::C12) << 1 | bit(ControlBit::C13) << 2 | bit(ControlBit::C14) << 3,
    ];

    let mut record = [0u8; T42_RECORD_SIZE];
    record[..2].copy_from_slice(&encode_address(magazine, 0));
    for (slot, nibble) in record[2..10].iter_mut().zip(nibbles) {
        *slot = hamming_8_4_encode(nibble);
    }
    for (slot, &c) in record[10..].iter_mut().zip(content.row(0)[HEADER_TEXT_START..].iter()) {
        *slot = parity_encode(c);
    }
    record
}

/// Encode display packet 1-25 with odd parity
pub fn encode_display(magazine: u8, number: u8, packet: &Packet) -> Record {
    let mut record = [0u8; T42_RECORD_SIZE];
    record[..2].copy_from_slice(&encode_address(magazine, number));
    for (slot, &c) in record[2..].iter_mut().zip(packet.iter()) {
        *slot = parity_encode(c);
    }
    record
}

/// Encode a designation packet with Hamming 8/4 and 24/18 protection
pub fn encode_designation(magazine: u8, number: u8, packet: &Packet) -> Record {
    let mut record = [0u8; T42_RECORD_SIZE];
    record[..2].copy_from_slice(&encode_address(magazine, number));
    record[2] = hamming_8_4_encode(packet[0]);

    if is_link_packet(number, packet[0]) {
        for (slot, &nibble) in record[3..40].iter_mut().zip(packet[1..38].iter()) {
            *slot = hamming_8_4_encode(nibble);
        }
        record[40] = packet[38];
        record[41] = packet[39];
    } else {
        for t in 0..TRIPLETS_PER_PACKET {
            let groups = &packet[1 + t * 3..4 + t * 3];
            let value = (groups[0] & 0x3F) as u32
                | ((groups[1] & 0x3F) as u32) << 6
                | ((groups[2] & 0x3F) as u32) << 12;
            record[3 + t * 3..6 + t * 3].copy_from_slice(&hamming_24_18_encode(value));
        }
    }
    record
}

/// Page being assembled from the stream
#[derive(Default)]
struct Stream {
    magazine: Option<u8>,
    page_byte: u8,
    page: LevelOnePage,
    body_seen: bool,
    finished: bool,
}

impl Stream {
    /// Handle one record; returns false once the page is complete
    fn record(&mut self, index: usize, record: &Record, diagnostics: &mut Diagnostics) -> Result<bool> {
        let address = match decode_address([record[0], record[1]]) {
            Some(address) => address,
            None => {
                diagnostics.warn(format!("Record {}: bad packet address, skipped", index));
                return Ok(true);
            }
        };

        if address.packet == 0 {
            return Ok(self.header(index, address.magazine, record, diagnostics));
        }

        if self.magazine != Some(address.magazine) {
            return Ok(true);
        }

        match address.packet {
            1..=25 => self.display(index, address.packet, record, diagnostics)?,
            26..=29 => self.designation(index, address.packet, record, diagnostics)?,
            _ => {
                #[cfg(feature = "logging")]
                debug!("Record {}: packet {} skipped", index, address.packet);
                return Ok(true);
            }
        }
        self.body_seen = true;
        Ok(true)
    }

    fn header(&mut self, index: usize, magazine: u8, record: &Record, diagnostics: &mut Diagnostics) -> bool {
        let mut nibbles = [0u8; 8];
        for (nibble, &byte) in nibbles.iter_mut().zip(record[2..10].iter()) {
            match hamming_8_4_checked(byte) {
                Some(value) => *nibble = value,
                None => {
                    diagnostics.warn(format!("Record {}: page header unreadable, skipped", index));
                    return true;
                }
            }
        }
        let page_byte = nibbles[0] | nibbles[1] << 4;

        match self.magazine {
            None if page_byte == 0xFF => return true,
            None => {
                self.magazine = Some(magazine);
                self.page_byte = page_byte;
            }
            Some(ours) if ours != magazine => return true,
            Some(_) if page_byte == 0xFF => {
                self.finished = true;
                return false;
            }
            Some(_) if page_byte == self.page_byte => {
                if self.body_seen {
                    diagnostics.warn(format!(
                        "Record {}: page {:X}{:02X} repeats, further subpages ignored",
                        index,
                        if magazine == 0 { 8 } else { magazine },
                        page_byte
                    ));
                    self.finished = true;
                    return false;
                }
            }
            Some(_) => {
                diagnostics.warn(format!(
                    "Record {}: page {:X}{:02X} follows, only the first page was kept",
                    index,
                    if magazine == 0 { 8 } else { magazine },
                    page_byte
                ));
                self.finished = true;
                return false;
            }
        }

        let subcode = nibbles[2] as u16
            | ((nibbles[3] & 0x07) as u16) << 4
            | (nibbles[4] as u16) << 8
            | ((nibbles[5] & 0x03) as u16) << 12;
        self.page.set_subcode(subcode);
        let flags = [
            (ControlBit::C4, nibbles[3] & 0x08),
            (ControlBit::C5, nibbles[5] & 0x04),
            (ControlBit::C6, nibbles[5] & 0x08),
            (ControlBit::C7, nibbles[6] & 0x01),
            (ControlBit::C8, nibbles[6] & 0x02),
            (ControlBit::C9, nibbles[6] & 0x04),
            (ControlBit::C10, nibbles[6] & 0x08),
            (ControlBit::C11, nibbles[7] & 0x01),
            (ControlBit::C12, nibbles[7] & 0x02),
            (ControlBit::C13, nibbles[7] & 0x04),
            (ControlBit::C14, nibbles[7] & 0x08),
        ];
        for (bit, value) in flags {
            self.page.set_control_bit(bit, value != 0);
        }

        let mut errors = 0;
        for (column, &byte) in record[10..].iter().enumerate() {
            let c = parity_decode(byte).unwrap_or_else(|| {
                errors += 1;
                b' '
            });
            self.page.set_character(0, HEADER_TEXT_START + column, c);
        }
        if errors > 0 {
            diagnostics.warn(format!(
                "Record {}: {} header parity errors replaced by spaces",
                index, errors
            ));
        }
        true
    }

    fn display(&mut self, index: usize, number: u8, record: &Record, diagnostics: &mut Diagnostics) -> Result<()> {
        let mut packet = [b' '; PACKET_SIZE];
        let mut errors = 0;
        for (slot, &byte) in packet.iter_mut().zip(record[2..].iter()) {
            match parity_decode(byte) {
                Some(c) => *slot = c,
                None => errors += 1,
            }
        }
        if errors > 0 {
            diagnostics.warn(format!(
                "Record {}: {} parity errors in row {} replaced by spaces",
                index, errors, number
            ));
        }
        self.page.set_packet(number, &packet)
    }

    fn designation(&mut self, index: usize, number: u8, record: &Record, diagnostics: &mut Diagnostics) -> Result<()> {
        let code = match hamming_8_4_checked(record[2]) {
            Some(code) => code,
            None => {
                diagnostics.warn(format!(
                    "Record {}: X/{} designation code unreadable, skipped",
                    index, number
                ));
                return Ok(());
            }
        };

        let mut packet = [0u8; PACKET_SIZE];
        packet[0] = code;

        if is_link_packet(number, code) {
            self.link_packet(index, number, code, record, &mut packet, diagnostics);
        } else {
            let mut corrected = 0;
            for t in 0..TRIPLETS_PER_PACKET {
                let bytes = [record[3 + t * 3], record[4 + t * 3], record[5 + t * 3]];
                let value = match hamming_24_18_decode(bytes) {
                    Hamming24::Valid(value) => value,
                    Hamming24::Corrected(value) => {
                        corrected += 1;
                        value
                    }
                    Hamming24::Uncorrectable => {
                        diagnostics.warn(format!(
                            "Record {}: X/{}/{} triplet {} uncorrectable, {}",
                            index,
                            number,
                            code,
                            t,
                            if number == 26 { "no-op substituted" } else { "zeroed" }
                        ));
                        if number == 26 {
                            Triplet::NO_OP.value()
                        } else {
                            0
                        }
                    }
                };
                packet[1 + t * 3] = (value & 0x3F) as u8;
                packet[2 + t * 3] = ((value >> 6) & 0x3F) as u8;
                packet[3 + t * 3] = ((value >> 12) & 0x3F) as u8;
            }
            #[cfg(feature = "logging")]
            if corrected > 0 {
                debug!(
                    "Record {}: corrected {} triplets in X/{}/{}",
                    index, corrected, number, code
                );
            }
            #[cfg(not(feature = "logging"))]
            let _ = corrected;
        }

        self.page.set_designation_packet(number, code, &packet)
    }

    fn link_packet(
        &self,
        index: usize,
        number: u8,
        code: u8,
        record: &Record,
        packet: &mut Packet,
        diagnostics: &mut Diagnostics,
    ) {
        let null = FastTextLink::NULL.nibbles();
        for link in 0..6 {
            let start = 3 + link * 6;
            let mut nibbles = [0u8; 6];
            let mut readable = true;
            for (nibble, &byte) in nibbles.iter_mut().zip(record[start..start + 6].iter()) {
                match hamming_8_4_checked(byte) {
                    Some(value) => *nibble = value,
                    None => readable = false,
                }
            }
            if !readable {
                diagnostics.warn(format!(
                    "Record {}: X/{}/{} link {} unreadable, null link substituted",
                    index, number, code, link
                ));
                nibbles = null;
            }
            packet[1 + link * 6..7 + link * 6].copy_from_slice(&nibbles);
        }

        packet[37] = match hamming_8_4_checked(record[39]) {
            Some(value) => value,
            None => {
                diagnostics.warn(format!(
                    "Record {}: X/{}/{} link control unreadable, default used",
                    index, number, code
                ));
                0x0F
            }
        };
        packet[38] = record[40];
        packet[39] = record[41];
    }

    fn finish(mut self) -> Result<PageSet> {
        let magazine = self.magazine.ok_or(CodecError::NoPageHeader)?;
        if !self.body_seen {
            return Err(CodecError::NoBodyPackets);
        }
        self.page.enhancements_mut().drop_padding();

        let magazine = if magazine == 0 { 8 } else { magazine as u16 };
        Ok(PageSet::with_page(magazine << 8 | self.page_byte as u16, self.page))
    }
}

/// Split a stream into records, for tools that inspect packets directly
pub fn records(data: &[u8]) -> impl Iterator<Item = (Option<Address>, &[u8])> {
    data.chunks_exact(T42_RECORD_SIZE)
        .map(|record| (decode_address([record[0], record[1]]), record))
}

/// Bytes of `records` joined into one buffer
pub fn join_records(records: &[Record]) -> Bytes {
    let mut out = Vec::with_capacity(records.len() * T42_RECORD_SIZE);
    for record in records {
        out.extend_from_slice(record);
    }
    Bytes::from(out)
}
