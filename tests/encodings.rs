use std::io::Cursor;
use std::path::{Path, PathBuf};

use udr::error::ReaderError;
use udr::{DictReader, DictReaderBuilder, DictRow, Encoding, Value};

fn data_path(name: &str) -> PathBuf {
    Path::new(file!()).parent().unwrap().join("data").join(name)
}

#[test]
fn test_windows_1252() {
    let mut reader = DictReaderBuilder::new()
        .delimiter(b';')
        .rest_key("_rest")
        .rest_value("?")
        .from_path(data_path("cities-cp1252.csv"))
        .unwrap();
    assert_eq!(reader.encoding(), Encoding::Windows1252);
    assert_eq!(reader.fieldnames().unwrap(), ["Name", "Stadt"]);

    let rows: Vec<DictRow> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        [("Name", "Müller"), ("Stadt", "Köln")].into_iter().collect::<DictRow>()
    );
    assert_eq!(rows[1].get("Stadt").and_then(Value::as_str), Some("Düsseldorf"));
    assert_eq!(rows[1].get("_rest"), Some(&Value::from(vec!["NRW", "DE"])));
    assert_eq!(
        rows[2],
        [("Name", "Weiß"), ("Stadt", "?")].into_iter().collect::<DictRow>()
    );
}

#[test]
fn test_utf16_candidates() {
    let mut reader = DictReaderBuilder::new()
        .candidates(&[Encoding::Utf8, Encoding::Utf16])
        .from_path(data_path("cities-utf16.csv"))
        .unwrap();
    assert_eq!(reader.encoding(), Encoding::Utf16);
    assert_eq!(reader.fieldnames().unwrap(), ["name", "city"]);

    let rows: Vec<DictRow> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(
        rows,
        vec![
            [("name", "José"), ("city", "León")].into_iter().collect::<DictRow>(),
            // the UTF-16 code unit of 本 contains a comma byte; fields split on the decoded text
            [("name", "日本"), ("city", "東京")].into_iter().collect::<DictRow>(),
        ]
    );
}

#[test]
fn test_explicit_encoding() {
    let utf16 = std::fs::read(data_path("cities-utf16.csv")).unwrap();
    let mut reader = DictReaderBuilder::new()
        .encoding("utf-16".parse().unwrap())
        .from_reader(Cursor::new(utf16))
        .unwrap();
    assert_eq!(reader.encoding(), Encoding::Utf16);
    let first = reader.next().unwrap().unwrap();
    assert_eq!(first.get("city").and_then(Value::as_str), Some("León"));
}

#[test]
fn test_utf8_preferred() {
    let mut reader =
        DictReader::from_reader(Cursor::new("clé,valeur\r\nçà,été\r\n".as_bytes())).unwrap();
    assert_eq!(reader.encoding(), Encoding::Utf8);
    assert_eq!(
        reader.next().unwrap().unwrap(),
        [("clé", "çà"), ("valeur", "été")].into_iter().collect::<DictRow>()
    );
}

#[test]
fn test_utf8_bom_not_in_fieldnames() {
    let mut reader = DictReader::from_reader(Cursor::new(&b"\xef\xbb\xbfid,v\r\n1,x\r\n"[..])).unwrap();
    assert_eq!(reader.encoding(), Encoding::Utf8);
    assert_eq!(reader.fieldnames().unwrap(), ["id", "v"]);
}

#[test]
fn test_latin1_fallback() {
    // 0x81 is undefined in Windows-1252
    let mut reader = DictReader::from_reader(Cursor::new(&b"k\r\na\x81\xe9\r\n"[..])).unwrap();
    assert_eq!(reader.encoding(), Encoding::Latin1);
    assert_eq!(
        reader.next().unwrap().unwrap().get("k").and_then(Value::as_str),
        Some("a\u{81}é")
    );
}

#[test]
fn test_encoding_not_detected() {
    let result = DictReaderBuilder::new()
        .candidates(&[Encoding::Ascii, Encoding::Utf8])
        .from_reader(Cursor::new(&b"k\r\n\xe9\r\n"[..]));
    match result.err() {
        Some(ReaderError::EncodingNotDetected(tried)) => {
            assert_eq!(tried, vec![Encoding::Ascii, Encoding::Utf8]);
        }
        other => panic!("expected EncodingNotDetected, got {:?}", other),
    }
}

#[test]
fn test_invalid_header() {
    let mut reader = DictReaderBuilder::new()
        .encoding(Encoding::Ascii)
        .from_reader(Cursor::new(&b"f\xe91,f2\r\n1,2\r\n"[..]))
        .unwrap();
    match reader.fieldnames() {
        Err(ReaderError::InvalidHeader(err)) => assert!(err.is_io_error()),
        other => panic!("expected InvalidHeader, got {:?}", other),
    }
}

#[test]
fn test_invalid_header_from_iteration() {
    let mut reader = DictReaderBuilder::new()
        .encoding(Encoding::Ascii)
        .from_reader(Cursor::new(&b"f\xe91,f2\r\n1,2\r\n"[..]))
        .unwrap();
    let err = reader.next().unwrap().unwrap_err();
    assert!(matches!(err, ReaderError::InvalidHeader(_)));
    assert!(err.to_string().ends_with(": invalid keys/column names"));
    assert!(reader.next().is_none());
}
