//! HTT capture wrapper around the T42 packet stream
//!
//! Each record is the sync sequence `AA AA E4` followed by a 42-byte T42
//! record with the bit order of every byte reversed.

use crate::constants::{HTT_RECORD_SIZE, HTT_SYNC, T42_RECORD_SIZE};
use crate::error::CodecError;
use crate::format::{Diagnostics, FormatId, LoadOutcome, PageFormat, SaveOutcome};
use crate::pageset::PageSet;
use crate::t42::T42Format;
use crate::Result;
use alloc::format;
use alloc::vec::Vec;
use bytes::{BufMut, BytesMut};
use memchr::memmem;

/// HTT capture file
#[derive(Debug, Clone, Copy, Default)]
pub struct HttFormat {
    inner: T42Format,
}

impl HttFormat {
    /// Wrap a T42 codec
    pub fn new(inner: T42Format) -> Self {
        Self { inner }
    }

    /// Strip sync bytes and restore bit order, resynchronising on damage
    fn unwrap_records(data: &[u8], diagnostics: &mut Diagnostics) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len() / HTT_RECORD_SIZE * T42_RECORD_SIZE);
        let mut offset = 0;

        while data.len() - offset >= HTT_RECORD_SIZE {
            if &data[offset..offset + HTT_SYNC.len()] != HTT_SYNC {
                match memmem::find(&data[offset + 1..], HTT_SYNC) {
                    Some(skip) => {
                        diagnostics.warn(format!(
                            "Sync lost at byte {}, skipped {} bytes",
                            offset,
                            skip + 1
                        ));
                        offset += skip + 1;
                        continue;
                    }
                    None => {
                        diagnostics.warn(format!("Sync lost at byte {}, rest of file ignored", offset));
                        return out;
                    }
                }
            }
            let body = &data[offset + HTT_SYNC.len()..offset + HTT_RECORD_SIZE];
            out.extend(body.iter().map(|byte| byte.reverse_bits()));
            offset += HTT_RECORD_SIZE;
        }

        if offset < data.len() {
            diagnostics.warn(format!(
                "Ignored {} trailing bytes after the last record",
                data.len() - offset
            ));
        }
        out
    }
}

impl PageFormat for HttFormat {
    fn id(&self) -> FormatId {
        FormatId::Htt
    }

    fn description(&self) -> &'static str {
        "HTT bit-reversed capture"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["htt"]
    }

    fn load(&self, data: &[u8]) -> Result<LoadOutcome> {
        if data.len() < HTT_RECORD_SIZE {
            return Err(CodecError::Truncated {
                expected: HTT_RECORD_SIZE,
                actual: data.len(),
            });
        }

        let mut diagnostics = Diagnostics::new();
        let records = Self::unwrap_records(data, &mut diagnostics);
        let mut outcome = self.inner.load(&records)?;

        let mut warnings = diagnostics.into_warnings();
        warnings.append(&mut outcome.warnings);
        outcome.warnings = warnings;
        Ok(outcome)
    }

    fn save(&self, pages: &PageSet) -> SaveOutcome {
        let inner = self.inner.save(pages);
        let mut out = BytesMut::with_capacity(inner.data.len() / T42_RECORD_SIZE * HTT_RECORD_SIZE);
        for record in inner.data.chunks_exact(T42_RECORD_SIZE) {
            out.put_slice(HTT_SYNC);
            out.extend(record.iter().map(|byte| byte.reverse_bits()));
        }
        SaveOutcome {
            data: out.freeze(),
            warnings: inner.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::LevelOnePage;

    fn sample() -> PageSet {
        let mut page = LevelOnePage::new();
        for (i, &c) in b"Captured".iter().enumerate() {
            page.set_character(7, i, c);
        }
        page.set_subcode(3);
        PageSet::with_page(0x4A1, page)
    }

    #[test]
    fn test_round_trip() {
        let set = sample();
        let saved = HttFormat::default().save(&set);
        assert_eq!(saved.data.len(), 2 * HTT_RECORD_SIZE);
        assert_eq!(&saved.data[..3], HTT_SYNC);
        assert_eq!(&saved.data[45..48], HTT_SYNC);

        let loaded = HttFormat::default().load(&saved.data).unwrap();
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.pages.page_number, 0x4A1);
        assert_eq!(loaded.pages.subpages[0].row(7), set.subpages[0].row(7));
        assert_eq!(loaded.pages.subpages[0].subcode(), 3);
    }

    #[test]
    fn test_bits_are_reversed() {
        let t42 = T42Format.save(&sample());
        let htt = HttFormat::new(T42Format).save(&sample());
        for (i, &byte) in t42.data[..T42_RECORD_SIZE].iter().enumerate() {
            assert_eq!(htt.data[3 + i], byte.reverse_bits());
        }
    }

    #[test]
    fn test_resync_after_garbage() {
        let saved = HttFormat::default().save(&sample());
        let mut data = saved.data[..HTT_RECORD_SIZE].to_vec();
        data.extend_from_slice(&[0x12, 0x34, 0x56]);
        data.extend_from_slice(&saved.data[HTT_RECORD_SIZE..]);

        let loaded = HttFormat::default().load(&data).unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("skipped 3 bytes"));
        assert_eq!(loaded.pages.subpages[0].character(7, 0), b'C');
    }

    #[test]
    fn test_short_input() {
        assert_eq!(
            HttFormat::default().load(&[0xAA; 44]).unwrap_err(),
            CodecError::Truncated { expected: 45, actual: 44 }
        );
    }
}
