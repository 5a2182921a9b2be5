//! EP1 vendor page file
//!
//! ```text
//! [CA len_lo len_hi triplets...]   optional enhancement block, 3 bytes per triplet
//! FE 01 lang 00 00 00              page header
//! 24 x 40 bytes                    rows 0-23
//! 00 00                            trailer
//! ```

use crate::constants::{COLUMNS, MAX_TRIPLETS};
use crate::error::CodecError;
use crate::format::{Diagnostics, FormatId, LoadOutcome, PageFormat, SaveOutcome};
use crate::page::LevelOnePage;
use crate::pageset::PageSet;
use crate::enhancement::TripletList;
use crate::triplet::{mode, Triplet};
use crate::Result;
use alloc::format;
use alloc::vec::Vec;
use bytes::{Buf, BufMut, BytesMut};

/// Marks the optional enhancement block
pub const ENHANCEMENT_BLOCK: u8 = 0xCA;

/// Page header without its language byte
const HEADER_LEAD: [u8; 2] = [0xFE, 0x01];

const HEADER_SIZE: usize = 6;

const TRAILER: [u8; 2] = [0x00, 0x00];

/// Rows stored in the file; row 24 is not
const EP1_ROWS: usize = 24;

/// Address byte used for termination markers
const TERMINATION_ADDRESS: u8 = 0xFF;

/// Language code, name, default character set and national option
const LANGUAGES: [(u8, &str, u8, u8); 15] = [
    (0x00, "English", 0, 0),
    (0x01, "German", 0, 1),
    (0x02, "Swedish", 0, 2),
    (0x03, "Italian", 0, 3),
    (0x04, "French", 0, 4),
    (0x05, "Portuguese/Spanish", 0, 5),
    (0x06, "Czech/Slovak", 0, 6),
    (0x08, "Polish", 1, 0),
    (0x09, "Turkish", 2, 6),
    (0x0A, "Serbian/Croatian/Slovenian", 3, 5),
    (0x0B, "Romanian", 3, 7),
    (0x0C, "Russian/Bulgarian", 4, 4),
    (0x0D, "Ukrainian", 4, 5),
    (0x0E, "Estonian", 4, 2),
    (0x0F, "Lettish/Lithuanian", 4, 3),
];

/// Character set and national option for an EP1 language code
pub fn language_charset(code: u8) -> Option<(u8, u8)> {
    LANGUAGES
        .iter()
        .find(|entry| entry.0 == code)
        .map(|&(_, _, charset, nos)| (charset, nos))
}

/// EP1 language code for a character set and national option
pub fn charset_language(charset: u8, nos: u8) -> Option<u8> {
    LANGUAGES
        .iter()
        .find(|entry| entry.2 == charset && entry.3 == nos)
        .map(|entry| entry.0)
}

/// Name of an EP1 language code
pub fn language_name(code: u8) -> Option<&'static str> {
    LANGUAGES.iter().find(|entry| entry.0 == code).map(|entry| entry.1)
}

/// EP1 vendor binary
#[derive(Debug, Clone, Copy, Default)]
pub struct Ep1Format;

impl PageFormat for Ep1Format {
    fn id(&self) -> FormatId {
        FormatId::Ep1
    }

    fn description(&self) -> &'static str {
        "EP1 page file"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ep1"]
    }

    fn load(&self, data: &[u8]) -> Result<LoadOutcome> {
        let mut diagnostics = Diagnostics::new();
        let mut buf = data;
        let mut page = LevelOnePage::new();

        if buf.first() == Some(&ENHANCEMENT_BLOCK) {
            buf.advance(1);
            if buf.remaining() < 2 {
                return Err(CodecError::Truncated {
                    expected: 3,
                    actual: data.len(),
                });
            }
            let length = buf.get_u16_le() as usize;
            if buf.remaining() < length {
                return Err(CodecError::Truncated {
                    expected: 3 + length,
                    actual: data.len(),
                });
            }
            if length % 3 != 0 {
                diagnostics.warn(format!(
                    "Enhancement block length {} is not a whole number of triplets",
                    length
                ));
            }

            let mut triplets = Vec::with_capacity(length / 3);
            for chunk in buf[..length].chunks_exact(3) {
                let address = if chunk[2] == TERMINATION_ADDRESS { 63 } else { chunk[2] & 0x3F };
                triplets.push(Triplet::new(address, chunk[1] & 0x1F, chunk[0] & 0x7F));
            }
            buf.advance(length);
            if triplets.len() > MAX_TRIPLETS {
                diagnostics.warn(format!(
                    "Enhancement block holds {} triplets, only the first {} kept",
                    triplets.len(),
                    MAX_TRIPLETS
                ));
                triplets.truncate(MAX_TRIPLETS);
            }
            // Object pointers are taken as stored
            *page.enhancements_mut() = TripletList::from_triplets(triplets)?;
        }

        if buf.remaining() < HEADER_SIZE || buf[..2] != HEADER_LEAD {
            return Err(CodecError::NoPageHeader);
        }
        let language = buf[2];
        buf.advance(HEADER_SIZE);
        let (charset, nos) = language_charset(language).unwrap_or_else(|| {
            diagnostics.warn(format!("Unknown language code 0x{:02X}, using English", language));
            (0, 0)
        });
        page.set_default_charset(charset, nos);

        let body = EP1_ROWS * COLUMNS + TRAILER.len();
        if buf.remaining() < body {
            return Err(CodecError::Truncated {
                expected: data.len() - buf.remaining() + body,
                actual: data.len(),
            });
        }
        for row in 0..EP1_ROWS {
            for column in 0..COLUMNS {
                page.set_character(row, column, buf.get_u8());
            }
        }
        buf.advance(TRAILER.len());

        if buf.has_remaining() {
            diagnostics.warn(format!(
                "{} bytes after the first page, extra pages ignored",
                buf.remaining()
            ));
        }

        Ok(LoadOutcome {
            pages: PageSet::with_page(0x100, page),
            warnings: diagnostics.into_warnings(),
        })
    }

    fn save(&self, pages: &PageSet) -> SaveOutcome {
        let mut diagnostics = Diagnostics::new();
        let blank = LevelOnePage::new();
        let page = pages.subpages.first().unwrap_or(&blank);
        if pages.len() > 1 {
            diagnostics.warn(format!(
                "EP1 holds one page, {} subpages not saved",
                pages.len() - 1
            ));
        }
        if page.row(EP1_ROWS).iter().any(|&c| c != b' ') {
            diagnostics.warn("Row 24 is not stored in EP1");
        }

        let mut out = BytesMut::with_capacity(HEADER_SIZE + EP1_ROWS * COLUMNS + TRAILER.len());

        let triplets = page.enhancements().triplets();
        if !triplets.is_empty() {
            let terminated = triplets.len() == MAX_TRIPLETS
                || triplets
                    .last()
                    .map_or(false, |t| t.mode_ext() == mode::TERMINATION_MARKER);
            let count = triplets.len() + usize::from(!terminated);
            out.put_u8(ENHANCEMENT_BLOCK);
            out.put_u16_le((count * 3) as u16);
            let padding = (!terminated).then_some(Triplet::TERMINATOR);
            for triplet in triplets.iter().chain(padding.iter()) {
                let address = if triplet.mode_ext() == mode::TERMINATION_MARKER {
                    TERMINATION_ADDRESS
                } else {
                    triplet.address()
                };
                out.put_slice(&[triplet.data(), triplet.mode(), address]);
            }
        }

        let language = charset_language(page.default_charset(), page.default_nos()).unwrap_or_else(|| {
            diagnostics.warn(format!(
                "Character set {} option {} has no EP1 language, saved as English",
                page.default_charset(),
                page.default_nos()
            ));
            0x00
        });
        out.put_slice(&HEADER_LEAD);
        out.put_slice(&[language, 0, 0, 0]);
        for row in 0..EP1_ROWS {
            out.put_slice(page.row(row));
        }
        out.put_slice(&TRAILER);

        SaveOutcome {
            data: out.freeze(),
            warnings: diagnostics.into_warnings(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn page_bytes(language: u8) -> Vec<u8> {
        let mut data = vec![0xFE, 0x01, language, 0, 0, 0];
        data.extend(core::iter::repeat(b' ').take(24 * 40));
        data.extend_from_slice(&[0, 0]);
        data
    }

    #[test]
    fn test_language_table() {
        assert_eq!(language_charset(0x01), Some((0, 1)));
        assert_eq!(language_charset(0x0C), Some((4, 4)));
        assert_eq!(language_charset(0x07), None);
        assert_eq!(charset_language(3, 7), Some(0x0B));
        assert_eq!(charset_language(9, 9), None);
        assert_eq!(language_name(0x09), Some("Turkish"));
    }

    #[test]
    fn test_round_trip() {
        let mut page = LevelOnePage::new();
        page.set_default_charset(0, 4);
        for (i, &c) in b"\x03Bonjour".iter().enumerate() {
            page.set_character(2, i, c);
        }
        page.enhancements_mut()
            .append(Triplet::new(42, mode::SET_ACTIVE_POSITION, 0))
            .unwrap();
        page.enhancements_mut()
            .append(Triplet::new(3, mode::G0_DIACRITICAL_FIRST + 2, b'e'))
            .unwrap();

        let saved = Ep1Format.save(&PageSet::with_page(0x100, page.clone()));
        assert!(saved.warnings.is_empty());
        assert_eq!(saved.data[0], ENHANCEMENT_BLOCK);
        assert_eq!(&saved.data[1..3], &[9, 0]);
        // Appended terminator carries the 0xFF address byte
        assert_eq!(saved.data[9..12], [0x07, 0x1F, 0xFF]);

        let loaded = Ep1Format.load(&saved.data).unwrap();
        assert!(loaded.warnings.is_empty());
        let loaded = &loaded.pages.subpages[0];
        assert_eq!(loaded.default_nos(), 4);
        assert_eq!(loaded.row(2), page.row(2));
        assert_eq!(loaded.enhancements().len(), 3);
        assert_eq!(loaded.enhancements().get(1), page.enhancements().get(1));
        assert_eq!(loaded.enhancements().get(2), Some(&Triplet::TERMINATOR));
    }

    #[test]
    fn test_forward_object_pointer_survives() {
        let mut invoke = Triplet::new(0x28, mode::INVOKE_ACTIVE_OBJECT, 0);
        invoke.set_object_local_index(2);
        let mut page = LevelOnePage::new();
        *page.enhancements_mut() = TripletList::from_triplets(vec![
            invoke,
            Triplet::TERMINATOR,
            Triplet::new(0x28, mode::DEFINE_ACTIVE_OBJECT, 0),
        ])
        .unwrap();
        assert_eq!(page.enhancements().error_count(), 0);

        let saved = Ep1Format.save(&PageSet::with_page(0x100, page.clone()));
        let loaded = Ep1Format.load(&saved.data).unwrap();
        let list = loaded.pages.subpages[0].enhancements();
        assert_eq!(list.get(0).unwrap().object_local_index(), 2);
        assert_eq!(list.state(0).unwrap().error, None);
        assert_eq!(&list.triplets()[..3], page.enhancements().triplets());
        assert_eq!(list.get(3), Some(&Triplet::TERMINATOR));
    }

    #[test]
    fn test_oversized_block_truncated() {
        let count = MAX_TRIPLETS + 4;
        let mut data = vec![ENHANCEMENT_BLOCK];
        data.extend_from_slice(&((count * 3) as u16).to_le_bytes());
        for _ in 0..count {
            data.extend_from_slice(&[0x00, 0x1E, 41]);
        }
        data.extend(page_bytes(0));

        let loaded = Ep1Format.load(&data).unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("only the first 208 kept"));
        assert_eq!(loaded.pages.subpages[0].enhancements().len(), MAX_TRIPLETS);
    }

    #[test]
    fn test_full_list_saved_without_terminator() {
        let mut page = LevelOnePage::new();
        *page.enhancements_mut() = TripletList::from_triplets(vec![Triplet::NO_OP; MAX_TRIPLETS]).unwrap();
        let saved = Ep1Format.save(&PageSet::with_page(0x100, page.clone()));
        assert_eq!(&saved.data[1..3], &((MAX_TRIPLETS * 3) as u16).to_le_bytes());

        let loaded = Ep1Format.load(&saved.data).unwrap();
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.pages.subpages[0].enhancements(), page.enhancements());
    }

    #[test]
    fn test_plain_page() {
        let loaded = Ep1Format.load(&page_bytes(0x0E)).unwrap();
        assert_eq!(loaded.pages.page_number, 0x100);
        let page = &loaded.pages.subpages[0];
        assert_eq!((page.default_charset(), page.default_nos()), (4, 2));
        assert!(page.enhancements().is_empty());
    }

    #[test]
    fn test_unknown_language_falls_back() {
        let loaded = Ep1Format.load(&page_bytes(0x07)).unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.pages.subpages[0].default_nos(), 0);

        let mut page = LevelOnePage::new();
        page.set_default_charset(2, 0);
        let saved = Ep1Format.save(&PageSet::with_page(0x100, page));
        assert_eq!(saved.warnings.len(), 1);
        assert_eq!(saved.data[2], 0x00);
    }

    #[test]
    fn test_errors_and_warnings() {
        assert_eq!(Ep1Format.load(&[0x12, 0x34]).unwrap_err(), CodecError::NoPageHeader);
        assert!(matches!(
            Ep1Format.load(&page_bytes(0)[..100]).unwrap_err(),
            CodecError::Truncated { .. }
        ));
        assert!(matches!(
            Ep1Format.load(&[0xCA, 0x09, 0x00, 1, 2]).unwrap_err(),
            CodecError::Truncated { .. }
        ));

        let mut data = page_bytes(0);
        data.extend_from_slice(&page_bytes(0));
        let loaded = Ep1Format.load(&data).unwrap();
        assert!(loaded.warnings[0].contains("extra pages ignored"));

        let mut set = PageSet::with_page(0x100, LevelOnePage::new());
        set.subpages[0].set_character(24, 0, b'X');
        set.subpages.push(LevelOnePage::new());
        assert_eq!(Ep1Format.save(&set).warnings.len(), 2);
    }
}
