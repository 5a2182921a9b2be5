//! Constants and limits for teletext packets and page files

/// Payload bytes of one packet, excluding the two magazine/row address bytes
pub const PACKET_SIZE: usize = 40;

/// Display packets 0 to 25
pub const DISPLAY_PACKETS: usize = 26;

/// First packet number that carries a designation code
pub const FIRST_DESIGNATION_PACKET: u8 = 26;

/// Last packet number that carries a designation code
pub const LAST_DESIGNATION_PACKET: u8 = 29;

/// Packet families 26, 27, 28 and 29
pub const DESIGNATION_FAMILIES: usize = 4;

/// Designation codes per family
pub const DESIGNATION_CODES: usize = 16;

/// Rows of the level one display grid (row 0 is the header row)
pub const ROWS: usize = 25;

/// Columns of the level one display grid
pub const COLUMNS: usize = 40;

/// First column of row 0 that is carried in the page header packet
pub const HEADER_TEXT_START: usize = 8;

/// Triplets carried by one designation packet
pub const TRIPLETS_PER_PACKET: usize = 13;

/// Maximum enhancement triplets on one page (16 X/26 packets)
pub const MAX_TRIPLETS: usize = TRIPLETS_PER_PACKET * DESIGNATION_CODES;

/// FastText links carried in X/27/0
pub const FASTTEXT_LINKS: usize = 6;

/// Compose links carried in X/27/4 and X/27/5
pub const COMPOSE_LINKS: usize = 8;

/// Colour look-up table entries (CLUTs 0 to 3)
pub const CLUT_ENTRIES: usize = 32;

/// Page units and tens of a null link ("FF")
pub const NULL_PAGE: u16 = 0x0FF;

/// Sub-page code meaning "any sub-page"
pub const ANY_SUBPAGE: u16 = 0x3F7F;

/// Length of one record in a T42 packet stream
pub const T42_RECORD_SIZE: usize = 42;

/// Synchronisation prefix of an HTT capture record
pub const HTT_SYNC: &[u8; 3] = b"\xAA\xAA\xE4";

/// Length of one HTT capture record
pub const HTT_RECORD_SIZE: usize = HTT_SYNC.len() + T42_RECORD_SIZE;

/// Default cycle value of a freshly created page
pub const DEFAULT_CYCLE_VALUE: u16 = 20;

/// Default colour look-up table, 12-bit 0x0RGB entries
#[rustfmt::skip]
pub const DEFAULT_CLUT: [u16; CLUT_ENTRIES] = [
    // CLUT 0: full intensity
    0x000, 0xF00, 0x0F0, 0xFF0, 0x00F, 0xF0F, 0x0FF, 0xFFF,
    // CLUT 1: half intensity, entry 8 is transparent
    0x000, 0x700, 0x070, 0x770, 0x007, 0x707, 0x077, 0x777,
    // CLUT 2
    0xF05, 0xF70, 0x0F7, 0xFFB, 0x0CA, 0x500, 0x652, 0xC77,
    // CLUT 3
    0x333, 0xF77, 0x7F7, 0xFF7, 0x77F, 0xF7F, 0x7FF, 0xDDD,
];
