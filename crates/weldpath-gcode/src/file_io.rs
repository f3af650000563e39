//! G-code file reading and writing

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{info, warn};
use weldpath_core::{CoordinateTable, IoError, Result};

use crate::parser::{GcodeParser, ParseMode};

/// Parse a G-code file into a coordinate table
///
/// The file is streamed line by line. A missing or unreadable file is
/// reported as an [`IoError`] naming the path.
pub fn parse_file(path: impl AsRef<Path>, mode: ParseMode) -> Result<CoordinateTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::new(path, "open", e))?;
    let mut reader = BufReader::new(file);

    // Bytes are decoded lossily so stray non-UTF-8 text in comments never
    // aborts a parse.
    let mut parser = GcodeParser::new(mode);
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        let read = reader
            .read_until(b'\n', &mut buffer)
            .map_err(|e| IoError::new(path, "read", e))?;
        if read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buffer);
        parser.parse_line(line.trim_end_matches(['\n', '\r']))?;
    }

    let table = parser.finish();
    info!(
        "Parsed {} weld line(s) ({} point(s)) from {}",
        table.line_count(),
        table.len(),
        path.display()
    );
    Ok(table)
}

/// Write G-code text to `path`
///
/// On failure the partially written file is removed so no truncated program
/// is left behind.
pub fn write_file(path: impl AsRef<Path>, text: &str) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| IoError::new(path, "create", e))?;

    let mut writer = BufWriter::new(file);
    let written = writer
        .write_all(text.as_bytes())
        .and_then(|()| writer.flush());

    if let Err(e) = written {
        drop(writer);
        if let Err(remove_err) = fs::remove_file(path) {
            warn!(
                "Failed to remove partial output {}: {}",
                path.display(),
                remove_err
            );
        }
        return Err(IoError::new(path, "write", e).into());
    }

    info!("Wrote {} byte(s) to {}", text.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_parse() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("part.gcode");
        write_file(&path, "G00 X1 Y2 Z3\nG01 X4 Y2 Z3\n").unwrap();

        let table = parse_file(&path, ParseMode::Strict).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.line_count(), 1);
    }

    #[test]
    fn test_non_utf8_comment_is_tolerated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin1.gcode");
        std::fs::write(&path, b"G00 X0 Y0 Z0 ; temp\xe9rature\r\nG01 X1 Y0 Z0\n").unwrap();

        let table = parse_file(&path, ParseMode::Lenient).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].point, weldpath_core::Point::new(1.0, 0.0, 0.0));

        let table = parse_file(&path, ParseMode::Strict).unwrap();
        assert_eq!(table.line_count(), 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.gcode");
        let err = parse_file(&path, ParseMode::Lenient).unwrap_err();
        assert!(err.is_io_error());
        assert!(err.to_string().contains("missing.gcode"));
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("out.gcode");
        let err = write_file(&path, "G00 X0 Y0 Z0\n").unwrap_err();
        assert!(err.is_io_error());
        assert!(!path.exists());
    }
}
