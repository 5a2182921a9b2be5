use std::fs;
use tempfile::tempdir;

use ttxcodec_cli::{commands::verify, FormatChoice};
use ttxcodec_core::{triplet::mode, FormatId, FormatRegistry, LevelOnePage, PageSet, Triplet};

/// Helper: a two sub-page set with text and enhancements
fn sample_pages() -> PageSet {
    let mut set = PageSet::new(0x123);
    for n in 0..2u8 {
        let mut page = LevelOnePage::new();
        page.set_character(1, 0, b'A' + n);
        page.enhancements_mut()
            .append(Triplet::new(41, mode::FULL_ROW_COLOUR, 0x02))
            .unwrap();
        set.subpages.push(page);
    }
    set
}

fn encoded(id: FormatId) -> Vec<u8> {
    FormatRegistry::new().get(id).unwrap().save(&sample_pages()).data.to_vec()
}

#[test]
fn test_verify_tti() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("page.tti");
    fs::write(&input_path, encoded(FormatId::Tti)).unwrap();

    let checks = verify::check(input_path.to_str().unwrap(), None).unwrap();
    assert_eq!(checks.len(), 2);
    assert!(checks.iter().all(|c| c.matches()));

    assert!(verify::execute(input_path.to_str().unwrap(), None).is_ok());
}

#[test]
fn test_verify_t42_with_format_override() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("capture.bin");
    fs::write(&input_path, encoded(FormatId::T42)).unwrap();

    // No usable extension
    assert!(verify::execute(input_path.to_str().unwrap(), None).is_err());

    let checks = verify::check(input_path.to_str().unwrap(), Some(FormatChoice::T42)).unwrap();
    assert_eq!(checks.len(), 1);
    assert!(checks[0].matches());
}

#[test]
fn test_verify_empty_file() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("empty.t42");
    fs::write(&input_path, b"").unwrap();

    // Too short to hold a packet
    assert!(verify::execute(input_path.to_str().unwrap(), None).is_err());
}

#[test]
fn test_verify_missing_file() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("missing.ep1");
    assert!(verify::execute(input_path.to_str().unwrap(), None).is_err());
}

#[test]
fn test_subpage_check_matches() {
    let check = verify::SubpageCheck {
        index: 1,
        loaded: [1; 32],
        reloaded: Some([1; 32]),
    };
    assert!(check.matches());
    let lost = verify::SubpageCheck {
        reloaded: None,
        ..check.clone()
    };
    assert!(!lost.matches());
}
