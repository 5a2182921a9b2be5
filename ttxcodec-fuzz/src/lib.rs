//! Fuzz entry points for the ttxcodec-core page formats
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_t42

use ttxcodec_core::{
    ep1::Ep1Format, htt::HttFormat, t42::T42Format, tti::TtiFormat, PageFormat,
};

/// Load arbitrary bytes, then save and reload whatever loaded
fn load_and_resave(format: &dyn PageFormat, data: &[u8]) {
    if let Ok(outcome) = format.load(data) {
        let saved = format.save(&outcome.pages);
        // Blank pages may save without body packets, so only the absence of panics is checked
        let _ = format.load(&saved.data);
    }
}

pub fn fuzz_tti(data: &[u8]) {
    load_and_resave(&TtiFormat, data);
}

pub fn fuzz_t42(data: &[u8]) {
    load_and_resave(&T42Format, data);
}

pub fn fuzz_ep1(data: &[u8]) {
    load_and_resave(&Ep1Format, data);
}

pub fn fuzz_htt(data: &[u8]) {
    load_and_resave(&HttFormat::default(), data);
}
