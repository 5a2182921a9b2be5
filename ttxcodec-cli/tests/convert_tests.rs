use std::fs;
use tempfile::tempdir;

use ttxcodec_cli::{commands::convert, FormatChoice};
use ttxcodec_core::{FormatId, FormatRegistry, LevelOnePage, PageSet};

fn tti_text() -> &'static str {
    "DE,Test page\r\nPN,20000\r\nSC,0000\r\nPS,8000\r\nOL,1,\x1bAHeadline\r\nOL,24,Footer\r\n"
}

#[test]
fn test_convert_tti_to_t42() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("page.tti");
    let output_path = td.path().join("page.t42");
    fs::write(&input_path, tti_text()).unwrap();

    let summary = convert::convert(
        input_path.to_str().unwrap(),
        output_path.to_str().unwrap(),
        None,
        None,
    )
    .unwrap();
    assert_eq!(summary.subpages, 1);
    assert!(summary.load_warnings.is_empty());
    assert!(summary.save_warnings.is_empty());

    let data = fs::read(&output_path).unwrap();
    assert_eq!(data.len(), summary.bytes_written);
    assert_eq!(data.len() % 42, 0);

    let loaded = FormatRegistry::new().get(FormatId::T42).unwrap().load(&data).unwrap();
    assert_eq!(loaded.pages.page_number, 0x200);
    assert_eq!(&loaded.pages.subpages[0].row(1)[..9], b"\x01Headline");
}

#[test]
fn test_convert_reports_lossy_save() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("page.tti");
    let output_path = td.path().join("page.ep1");
    fs::write(&input_path, tti_text()).unwrap();

    let summary = convert::convert(
        input_path.to_str().unwrap(),
        output_path.to_str().unwrap(),
        None,
        None,
    )
    .unwrap();
    // Row 24 does not fit in EP1
    assert_eq!(summary.save_warnings.len(), 1);
    assert!(convert::execute(
        input_path.to_str().unwrap(),
        output_path.to_str().unwrap(),
        None,
        None
    )
    .is_ok());
}

#[test]
fn test_convert_with_explicit_formats() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("capture.dat");
    let output_path = td.path().join("out.txt");

    let mut page = LevelOnePage::new();
    page.set_character(5, 0, b'Q');
    let htt = FormatRegistry::new()
        .get(FormatId::Htt)
        .unwrap()
        .save(&PageSet::with_page(0x7B0, page));
    fs::write(&input_path, &htt.data).unwrap();

    convert::convert(
        input_path.to_str().unwrap(),
        output_path.to_str().unwrap(),
        Some(FormatChoice::Htt),
        Some(FormatChoice::Tti),
    )
    .unwrap();

    let text = fs::read_to_string(&output_path).unwrap();
    assert!(text.starts_with("PN,7B000\r\n"));
    assert!(text.contains("OL,5,Q"));
}

#[test]
fn test_convert_bad_input() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("broken.t42");
    let output_path = td.path().join("out.tti");
    fs::write(&input_path, [0u8; 42]).unwrap();

    assert!(convert::execute(
        input_path.to_str().unwrap(),
        output_path.to_str().unwrap(),
        None,
        None
    )
    .is_err());
    assert!(!output_path.exists());
}
