//! Coordinate table to G-code
//!
//! Every weld line becomes one `G00` rapid move to its first point followed
//! by one `G01` linear move per remaining point. Coordinates are written in
//! fixed-point with three decimals.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use weldpath_core::{vector_from_slice, ConfigurationError, CoordinateTable, Point, Result};

use crate::{file_io, COMMENT_MARKER, COORDINATE_PRECISION, LINEAR_MOVE, RAPID_MOVE};

/// Encoder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderOptions {
    /// Added to every coordinate before it is written
    pub origin_shift: Point,
    /// Append `; weld line N` to each rapid move
    pub annotate_lines: bool,
    /// Comment lines written before the first command
    pub header: Vec<String>,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            origin_shift: Point::ZERO,
            annotate_lines: true,
            header: Vec::new(),
        }
    }
}

impl EncoderOptions {
    /// Set the origin shift from an untyped vector of exactly 3 components
    pub fn with_origin_shift(mut self, shift: &[f64]) -> std::result::Result<Self, ConfigurationError> {
        self.origin_shift = vector_from_slice("origin_shift", shift)?;
        Ok(self)
    }

    /// Enable or disable per-line annotations
    pub fn with_annotations(mut self, annotate: bool) -> Self {
        self.annotate_lines = annotate;
        self
    }

    /// Add a header comment line
    pub fn with_header_line(mut self, line: impl Into<String>) -> Self {
        self.header.push(line.into());
        self
    }

    /// Check the shift is finite and every header line stays on one line
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        if !self.origin_shift.is_finite() {
            return Err(ConfigurationError::NonFinite {
                name: "origin_shift".to_string(),
            });
        }
        if let Some(index) = self
            .header
            .iter()
            .position(|text| text.contains(['\n', '\r']))
        {
            return Err(ConfigurationError::MultilineHeader { index });
        }
        Ok(())
    }
}

/// G-code encoder for coordinate tables
#[derive(Debug, Clone, Default)]
pub struct GcodeEncoder {
    options: EncoderOptions,
}

impl GcodeEncoder {
    /// Create an encoder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with the given options
    pub fn with_options(options: EncoderOptions) -> Self {
        Self { options }
    }

    /// Active options
    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Encode a table into G-code command lines
    ///
    /// Rows are grouped by line index value in order of first appearance, so
    /// rows of one line need not be adjacent in the input. Fails before
    /// producing anything when the options are invalid or a shifted
    /// coordinate is not finite.
    pub fn encode_lines(
        &self,
        table: &CoordinateTable,
    ) -> std::result::Result<Vec<String>, ConfigurationError> {
        self.options.validate()?;
        let shift = self.options.origin_shift;
        if let Some(row) = table
            .rows()
            .iter()
            .position(|r| !(r.point + shift).is_finite())
        {
            return Err(ConfigurationError::MalformedRow {
                row,
                reason: "coordinate is not finite".to_string(),
            });
        }

        let mut out = Vec::with_capacity(table.len() + self.options.header.len());
        for text in &self.options.header {
            out.push(format!("{} {}", COMMENT_MARKER, text));
        }

        let lines = table.lines();
        for line in &lines {
            for (position, point) in line.points.iter().enumerate() {
                let token = if position == 0 { RAPID_MOVE } else { LINEAR_MOVE };
                let mut command = format_move(token, *point + shift);
                if position == 0 && self.options.annotate_lines {
                    command.push_str(&format!(" {} weld line {}", COMMENT_MARKER, line.line_index));
                }
                trace!("{}", command);
                out.push(command);
            }
        }

        debug!(
            "Encoded {} weld line(s) into {} command(s)",
            lines.len(),
            out.len() - self.options.header.len()
        );
        Ok(out)
    }

    /// Encode a table into G-code text, one command per line
    pub fn encode(&self, table: &CoordinateTable) -> std::result::Result<String, ConfigurationError> {
        let mut text = String::new();
        for line in self.encode_lines(table)? {
            text.push_str(&line);
            text.push('\n');
        }
        Ok(text)
    }

    /// Encode a table and write it to `path`
    ///
    /// The text is fully rendered before the file is created. A partially
    /// written file is removed before the error is returned.
    pub fn write_file(&self, path: impl AsRef<Path>, table: &CoordinateTable) -> Result<()> {
        let text = self.encode(table)?;
        file_io::write_file(path, &text)
    }
}

fn format_move(token: &str, point: Point) -> String {
    format!(
        "{} X{:.prec$} Y{:.prec$} Z{:.prec$}",
        token,
        point.x,
        point.y,
        point.z,
        prec = COORDINATE_PRECISION
    )
}

/// Encode a table with an optional untyped origin shift
pub fn encode(
    table: &CoordinateTable,
    origin_shift: Option<&[f64]>,
) -> std::result::Result<String, ConfigurationError> {
    let mut options = EncoderOptions::default();
    if let Some(shift) = origin_shift {
        options = options.with_origin_shift(shift)?;
    }
    GcodeEncoder::with_options(options).encode(table)
}

/// Encode untyped `[line_index, x, y, z, ...]` rows
///
/// Fails when any row has fewer than four fields.
pub fn encode_rows<R: AsRef<[f64]>>(
    rows: &[R],
    origin_shift: Option<&[f64]>,
) -> std::result::Result<String, ConfigurationError> {
    let table = CoordinateTable::from_raw_rows(rows)?;
    encode(&table, origin_shift)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_lines() -> CoordinateTable {
        let mut table = CoordinateTable::new();
        table.push(1, Point::new(0.0, 3.0, 0.0));
        table.push(1, Point::new(24.0, 3.0, 0.0));
        table.push(2, Point::new(24.0, 9.0, 0.0));
        table.push(2, Point::new(0.0, 9.0, 0.0));
        table
    }

    #[test]
    fn test_encode_structure() {
        let lines = GcodeEncoder::new().encode_lines(&two_lines()).unwrap();
        assert_eq!(
            lines,
            vec![
                "G00 X0.000 Y3.000 Z0.000 ; weld line 1",
                "G01 X24.000 Y3.000 Z0.000",
                "G00 X24.000 Y9.000 Z0.000 ; weld line 2",
                "G01 X0.000 Y9.000 Z0.000",
            ]
        );
    }

    #[test]
    fn test_encode_without_annotations() {
        let encoder = GcodeEncoder::with_options(EncoderOptions::default().with_annotations(false));
        let lines = encoder.encode_lines(&two_lines()).unwrap();
        assert_eq!(lines[0], "G00 X0.000 Y3.000 Z0.000");
    }

    #[test]
    fn test_header_lines_are_comments() {
        let options = EncoderOptions::default()
            .with_header_line("weldpath build")
            .with_header_line("layers: 1");
        let lines = GcodeEncoder::with_options(options).encode_lines(&two_lines()).unwrap();
        assert_eq!(lines[0], "; weldpath build");
        assert_eq!(lines[1], "; layers: 1");
        assert!(lines[2].starts_with("G00"));
    }

    #[test]
    fn test_origin_shift_is_applied() {
        let text = encode(&two_lines(), Some(&[1.0, -2.0, 0.5])).unwrap();
        assert!(text.starts_with("G00 X1.000 Y1.000 Z0.500"));
    }

    #[test]
    fn test_origin_shift_must_have_three_components() {
        let err = encode(&two_lines(), Some(&[1.0, 2.0])).unwrap_err();
        assert!(matches!(err, ConfigurationError::ComponentCount { actual: 2, .. }));
    }

    #[test]
    fn test_non_adjacent_rows_are_grouped() {
        let mut table = CoordinateTable::new();
        table.push(7, Point::new(0.0, 0.0, 0.0));
        table.push(3, Point::new(5.0, 5.0, 0.0));
        table.push(7, Point::new(1.0, 0.0, 0.0));

        let lines = GcodeEncoder::new().encode_lines(&table).unwrap();
        assert_eq!(lines[0], "G00 X0.000 Y0.000 Z0.000 ; weld line 7");
        assert_eq!(lines[1], "G01 X1.000 Y0.000 Z0.000");
        assert_eq!(lines[2], "G00 X5.000 Y5.000 Z0.000 ; weld line 3");
    }

    #[test]
    fn test_degenerate_line_is_single_rapid_move() {
        let mut table = CoordinateTable::new();
        table.push(1, Point::new(2.0, 2.0, 2.0));
        let lines = GcodeEncoder::new().encode_lines(&table).unwrap();
        assert_eq!(lines, vec!["G00 X2.000 Y2.000 Z2.000 ; weld line 1"]);
    }

    #[test]
    fn test_encode_rows_requires_four_fields() {
        let rows = vec![vec![1.0, 0.0, 0.0]];
        assert!(matches!(
            encode_rows(&rows, None),
            Err(ConfigurationError::MalformedRow { row: 0, .. })
        ));

        let rows = vec![vec![1.0, 0.0, 0.0, 0.0], vec![1.0, 1.0, 0.0, 0.0]];
        let text = encode_rows(&rows, None).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_rounding_to_three_decimals() {
        let mut table = CoordinateTable::new();
        table.push(1, Point::new(1.23456, -0.5, 10.0));
        let text = GcodeEncoder::new().encode(&table).unwrap();
        assert!(text.starts_with("G00 X1.235 Y-0.500 Z10.000"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_header_with_line_break_is_rejected() {
        for text in ["part\nG00 X9 Y9 Z9", "part\rG01 X9"] {
            let options = EncoderOptions::default()
                .with_header_line("ok")
                .with_header_line(text);
            let err = GcodeEncoder::with_options(options).encode(&two_lines()).unwrap_err();
            assert_eq!(err, ConfigurationError::MultilineHeader { index: 1 });
        }
    }

    #[test]
    fn test_non_finite_row_is_rejected() {
        let mut table = two_lines();
        table.push(3, Point::new(f64::NAN, 0.0, 0.0));
        let err = GcodeEncoder::new().encode(&table).unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedRow { row: 4, .. }));

        let mut table = CoordinateTable::new();
        table.push(1, Point::new(f64::MAX, 0.0, 0.0));
        let err = encode(&table, Some(&[f64::MAX, 0.0, 0.0])).unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedRow { row: 0, .. }));
    }
}
