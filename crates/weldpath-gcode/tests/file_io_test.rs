//! File-level encode and parse

use tempfile::TempDir;
use weldpath_core::{CoordinateTable, Point};
use weldpath_gcode::{parse_file, EncoderOptions, GcodeEncoder, ParseMode};

fn sample_table() -> CoordinateTable {
    let mut table = CoordinateTable::new();
    table.push(1, Point::new(0.0, 3.0, 0.0));
    table.push(1, Point::new(24.0, 3.0, 0.0));
    table.push(2, Point::new(0.0, 9.0, 0.0));
    table.push(2, Point::new(24.0, 9.0, 0.0));
    table
}

#[test]
fn test_encoder_write_file_produces_parseable_program() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("build.gcode");
    let encoder = GcodeEncoder::with_options(EncoderOptions::default().with_header_line("test build"));
    encoder.write_file(&path, &sample_table()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("; test build\n"));
    assert_eq!(text.lines().filter(|l| l.starts_with("G00")).count(), 2);

    let parsed = parse_file(&path, ParseMode::Strict).unwrap();
    assert_eq!(parsed, sample_table());
}

#[test]
fn test_parse_file_reports_path_on_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nothing-here.gcode");
    let err = parse_file(&path, ParseMode::Lenient).unwrap_err();
    assert!(err.is_io_error());
    let message = err.to_string();
    assert!(message.starts_with("failed to open"));
    assert!(message.contains("nothing-here.gcode"));
}

#[test]
fn test_parse_file_strict_error_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.gcode");
    std::fs::write(&path, "G00 X0 Y0 Z0\nG01 X1 Y0\n").unwrap();

    let err = parse_file(&path, ParseMode::Strict).unwrap_err();
    assert!(err.is_parse_error());
    assert!(err.to_string().contains("line 2"));

    let table = parse_file(&path, ParseMode::Lenient).unwrap();
    assert_eq!(table.rows()[1].point, Point::new(1.0, 0.0, 0.0));
}

#[test]
fn test_empty_file_parses_to_empty_table() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.gcode");
    std::fs::write(&path, "").unwrap();
    assert!(parse_file(&path, ParseMode::Strict).unwrap().is_empty());
}
