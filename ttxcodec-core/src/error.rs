//! Error types for teletext codec operations

use alloc::string::String;

/// Errors that can occur while building pages or loading page files
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Input ended before a complete record could be read
    #[cfg_attr(feature = "std", error("Truncated input: expected at least {expected} bytes, got {actual}"))]
    Truncated {
        /// The number of bytes expected.
        expected: usize,
        /// The number of bytes actually found.
        actual: usize,
    },

    /// No page header packet was found in the input
    #[cfg_attr(feature = "std", error("No page header found"))]
    NoPageHeader,

    /// A page header was found but no packets belonging to its body
    #[cfg_attr(feature = "std", error("No body packets found for page"))]
    NoBodyPackets,

    /// The input does not look like the requested format
    #[cfg_attr(feature = "std", error("Unrecognised file format: {0}"))]
    UnrecognisedFormat(String),

    /// Packet number outside the range the operation accepts
    #[cfg_attr(feature = "std", error("Invalid packet number: {0}"))]
    InvalidPacketNumber(u8),

    /// Designation code outside 0-15, or a packet that carries no designation code
    #[cfg_attr(feature = "std", error("Invalid designation code {code} for packet {packet}"))]
    InvalidDesignationCode {
        /// The packet number.
        packet: u8,
        /// The offending designation code.
        code: u8,
    },

    /// The enhancement triplet list cannot grow any further
    #[cfg_attr(feature = "std", error("Enhancement triplet list is full ({capacity} triplets)"))]
    TripletListFull {
        /// Maximum number of triplets a page can carry.
        capacity: usize,
    },

    /// Index outside the enhancement triplet list
    #[cfg_attr(feature = "std", error("Index {index} out of range for list of length {len}"))]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The list length at the time of the request.
        len: usize,
    },

    /// IO error during read/write
    #[cfg_attr(feature = "std", error("IO error: {0}"))]
    Io(String),

    /// Malformed text in a line-oriented format
    #[cfg_attr(feature = "std", error("Parse error: {0}"))]
    Parse(String),
}

#[cfg(feature = "std")]
impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io(err.to_string())
    }
}
