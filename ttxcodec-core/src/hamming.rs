//! Hamming 8/4, Hamming 24/18 and odd parity, as carried on teletext packets
//!
//! Bits are numbered in transmission order: bit 1 is the least significant
//! bit of the first byte.
//!
//! - Hamming 8/4 protects 4 data bits. Single-bit errors are corrected,
//!   double-bit errors are reported through [`HAMMING_8_4_INVALID`].
//! - Hamming 24/18 protects 18 data bits with five odd-parity Hamming checks
//!   (P1-P5 at bits 1, 2, 4, 8, 16) and an overall odd parity bit (P6, bit 24).
//!   Single-bit errors are corrected, double-bit errors are detected.
//! - Display characters are 7 bits with odd parity in bit 8.

use serde::{Deserialize, Serialize};

/// Sentinel returned by [`hamming_8_4_decode`] for an uncorrectable byte
pub const HAMMING_8_4_INVALID: u8 = 0xFF;

/// Codeword for each 4-bit value
pub const HAMMING_8_4_ENCODE: [u8; 16] = [
    0x15, 0x02, 0x49, 0x5E, 0x64, 0x73, 0x38, 0x2F, 0xD0, 0xC7, 0x8C, 0x9B, 0xA1, 0xB6, 0xFD, 0xEA,
];

/// Data value for each received byte, or [`HAMMING_8_4_INVALID`]
pub const HAMMING_8_4_DECODE: [u8; 256] = build_8_4_decode_table();

/// Correction mask sentinel for a syndrome that points at more than one bit
pub const HAMMING_24_18_UNCORRECTABLE: u32 = u32::MAX;

/// Syndrome of a valid codeword: every check and the overall parity are odd
const VALID_SYNDROME: u8 = 0x3F;

/// Parity check contributions of each byte of a 24/18 codeword.
///
/// Bits 0-4 are the XOR of the Hamming positions of the set bits, bit 5 is
/// their overall parity.
const SYNDROME_TABLES: [[u8; 256]; 3] = [
    build_syndrome_table(0),
    build_syndrome_table(1),
    build_syndrome_table(2),
];

/// Bit flip to apply for each failed-check pattern, indexed by `syndrome ^ VALID_SYNDROME`
pub const HAMMING_24_18_CORRECTION: [u32; 64] = build_correction_table();

const fn build_8_4_decode_table() -> [u8; 256] {
    let mut table = [HAMMING_8_4_INVALID; 256];
    let mut byte = 0;
    while byte < 256 {
        let mut value = 0;
        while value < 16 {
            // Minimum distance is 4, so at most one codeword lies within distance 1
            if ((byte as u8) ^ HAMMING_8_4_ENCODE[value]).count_ones() <= 1 {
                table[byte] = value as u8;
            }
            value += 1;
        }
        byte += 1;
    }
    table
}

const fn build_syndrome_table(byte_index: usize) -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut value = 0;
    while value < 256 {
        let mut syndrome = 0u8;
        let mut bit = 0;
        while bit < 8 {
            if value & (1 << bit) != 0 {
                let position = byte_index * 8 + bit + 1;
                // P6 (bit 24) only takes part in the overall parity
                let check = if position <= 23 { position as u8 } else { 0 };
                syndrome ^= check | 0x20;
            }
            bit += 1;
        }
        table[value] = syndrome;
        value += 1;
    }
    table
}

const fn build_correction_table() -> [u32; 64] {
    let mut table = [HAMMING_24_18_UNCORRECTABLE; 64];
    table[0] = 0;
    // Overall parity failed: exactly one bit is wrong
    table[0x20] = 1u32 << 23;
    let mut position = 1;
    while position <= 23 {
        table[0x20 | position] = 1u32 << (position - 1);
        position += 1;
    }
    table
}

/// Encode the low 4 bits of `value`
pub const fn hamming_8_4_encode(value: u8) -> u8 {
    HAMMING_8_4_ENCODE[(value & 0x0F) as usize]
}

/// Decode a Hamming 8/4 byte, returning [`HAMMING_8_4_INVALID`] when uncorrectable
pub const fn hamming_8_4_decode(byte: u8) -> u8 {
    HAMMING_8_4_DECODE[byte as usize]
}

/// Decode a Hamming 8/4 byte, returning `None` when uncorrectable
pub fn hamming_8_4_checked(byte: u8) -> Option<u8> {
    match hamming_8_4_decode(byte) {
        HAMMING_8_4_INVALID => None,
        value => Some(value),
    }
}

/// Outcome of decoding one Hamming 24/18 codeword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hamming24 {
    /// All checks passed
    Valid(u32),
    /// One bit was wrong and has been corrected
    Corrected(u32),
    /// More than one bit is wrong
    Uncorrectable,
}

impl Hamming24 {
    /// The decoded 18-bit value, unless the codeword was uncorrectable
    pub const fn value(&self) -> Option<u32> {
        match self {
            Hamming24::Valid(v) | Hamming24::Corrected(v) => Some(*v),
            Hamming24::Uncorrectable => None,
        }
    }

    /// Whether a single-bit correction was applied
    pub const fn was_corrected(&self) -> bool {
        matches!(self, Hamming24::Corrected(_))
    }
}

fn syndrome(bytes: [u8; 3]) -> u8 {
    SYNDROME_TABLES[0][bytes[0] as usize]
        ^ SYNDROME_TABLES[1][bytes[1] as usize]
        ^ SYNDROME_TABLES[2][bytes[2] as usize]
}

/// Encode the low 18 bits of `value` as three transmission bytes
pub fn hamming_24_18_encode(value: u32) -> [u8; 3] {
    let mut bytes = [
        ((value & 0x01) << 2) as u8 | (((value >> 1) & 0x07) << 4) as u8,
        ((value >> 4) & 0x7F) as u8,
        ((value >> 11) & 0x7F) as u8,
    ];

    let missing = !syndrome(bytes) & 0x1F;
    if missing & 0x01 != 0 {
        bytes[0] |= 0x01;
    }
    if missing & 0x02 != 0 {
        bytes[0] |= 0x02;
    }
    if missing & 0x04 != 0 {
        bytes[0] |= 0x08;
    }
    if missing & 0x08 != 0 {
        bytes[0] |= 0x80;
    }
    if missing & 0x10 != 0 {
        bytes[1] |= 0x80;
    }

    let ones = bytes[0].count_ones() + bytes[1].count_ones() + bytes[2].count_ones();
    if ones % 2 == 0 {
        bytes[2] |= 0x80;
    }

    bytes
}

/// Decode three transmission bytes into an 18-bit value
pub fn hamming_24_18_decode(bytes: [u8; 3]) -> Hamming24 {
    let failed = (syndrome(bytes) ^ VALID_SYNDROME) as usize;
    let correction = HAMMING_24_18_CORRECTION[failed];
    if correction == HAMMING_24_18_UNCORRECTABLE {
        return Hamming24::Uncorrectable;
    }

    let word = (bytes[0] as u32 | (bytes[1] as u32) << 8 | (bytes[2] as u32) << 16) ^ correction;
    let value = ((word >> 2) & 0x01)
        | ((word >> 4) & 0x07) << 1
        | ((word >> 8) & 0x7F) << 4
        | ((word >> 16) & 0x7F) << 11;

    if failed == 0 {
        Hamming24::Valid(value)
    } else {
        Hamming24::Corrected(value)
    }
}

/// Add odd parity to a 7-bit character
pub const fn parity_encode(character: u8) -> u8 {
    let character = character & 0x7F;
    if character.count_ones() % 2 == 0 {
        character | 0x80
    } else {
        character
    }
}

/// Strip odd parity, returning `None` when the parity check fails
pub const fn parity_decode(byte: u8) -> Option<u8> {
    if byte.count_ones() % 2 == 1 {
        Some(byte & 0x7F)
    } else {
        None
    }
}
