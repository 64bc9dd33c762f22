//! Raw dump loading across the accepted formats.

use std::fs;

use storelens_core::errors::StorageError;
use storelens_storage::raw::read_raw_dump;

#[test]
fn json_lines_skip_malformed_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.jsonl");
    fs::write(
        &path,
        "{\"appId\":\"com.a\",\"title\":\"A\"}\n\nnot json\n[1,2]\n{\"appId\":\"com.b\"}\n",
    )
    .unwrap();
    let result = read_raw_dump(&path).unwrap();
    assert_eq!(result.data.len(), 2);
    assert_eq!(result.error_count(), 2);
    assert_eq!(result.data[1]["appId"], "com.b");
}

#[test]
fn json_array_keeps_objects() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.json");
    fs::write(&path, r#"[{"id":"x"}, 3, {"id":"y"}]"#).unwrap();
    let result = read_raw_dump(&path).unwrap();
    assert_eq!(result.data.len(), 2);
    assert_eq!(result.error_count(), 1);
}

#[test]
fn json_scalar_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.json");
    fs::write(&path, "42").unwrap();
    let err = read_raw_dump(&path).unwrap_err();
    assert!(matches!(err, StorageError::MalformedRecord { .. }));
}

#[test]
fn csv_dump_blank_cells_are_null() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.csv");
    fs::write(&path, "appId,title,summary\ncom.a,,Short\n").unwrap();
    let result = read_raw_dump(&path).unwrap();
    assert!(result.is_clean());
    let record = &result.data[0];
    assert_eq!(record["appId"], "com.a");
    assert!(record["title"].is_null());
}

#[test]
fn missing_dump_is_missing_input() {
    let err = read_raw_dump(std::path::Path::new("/nope/dump.jsonl")).unwrap_err();
    assert!(matches!(err, StorageError::MissingInput { .. }));
}
