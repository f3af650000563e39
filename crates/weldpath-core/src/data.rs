//! Coordinate data model
//!
//! A toolpath travels between stages as a [`CoordinateTable`]: an ordered list
//! of `(line_index, X, Y, Z)` rows. Rows sharing a line index form one
//! [`WeldLine`]; the first row of a line is the rapid-move target and every
//! following row is reached by a depositing linear move.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// A 3-component coordinate (X, Y, Z)
pub type Point = glam::DVec3;

/// Build a [`Point`] from an untyped slice, checking it has exactly 3 finite components
pub fn vector_from_slice(name: &str, values: &[f64]) -> Result<Point, ConfigurationError> {
    if values.len() != 3 {
        return Err(ConfigurationError::ComponentCount {
            name: name.to_string(),
            expected: 3,
            actual: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ConfigurationError::NonFinite {
            name: name.to_string(),
        });
    }
    Ok(Point::new(values[0], values[1], values[2]))
}

/// One row of a coordinate table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRow {
    /// Weld line this row belongs to
    pub line_index: u32,
    /// Position of the row
    pub point: Point,
}

impl CoordinateRow {
    /// Create a new row
    pub fn new(line_index: u32, point: Point) -> Self {
        Self { line_index, point }
    }
}

/// One continuous deposition pass
///
/// The first point is reached by a rapid move, every later point by a
/// linear deposition move. A line with a single point is degenerate: it is
/// valid but deposits nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeldLine {
    /// Line index shared by every point of the pass
    pub line_index: u32,
    /// Ordered points of the pass
    pub points: Vec<Point>,
}

impl WeldLine {
    /// Create a weld line from its index and points
    pub fn new(line_index: u32, points: Vec<Point>) -> Self {
        Self { line_index, points }
    }

    /// Rapid-move target of the line
    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    /// Final point of the line
    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// True when the line has exactly one point
    pub fn is_degenerate(&self) -> bool {
        self.points.len() == 1
    }

    /// Total length of the linear moves of this line
    pub fn deposition_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }
}

/// Ordered collection of `(line_index, X, Y, Z)` rows
///
/// The canonical interchange representation between every stage of the
/// pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoordinateTable {
    rows: Vec<CoordinateRow>,
}

impl CoordinateTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with room for `capacity` rows
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
        }
    }

    /// Build a table from untyped rows of `[line_index, x, y, z, ...]`
    ///
    /// Every row must have at least four fields; fields past the fourth are
    /// ignored. The line index must be a non-negative integer.
    pub fn from_raw_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, ConfigurationError> {
        let mut table = Self::with_capacity(rows.len());
        for (row_number, raw) in rows.iter().enumerate() {
            let raw = raw.as_ref();
            if raw.len() < 4 {
                return Err(ConfigurationError::MalformedRow {
                    row: row_number,
                    reason: format!("expected at least 4 fields, got {}", raw.len()),
                });
            }
            let index = raw[0];
            if !index.is_finite() || index < 0.0 || index.fract() != 0.0 || index > u32::MAX as f64
            {
                return Err(ConfigurationError::MalformedRow {
                    row: row_number,
                    reason: format!("line index {} is not a non-negative integer", index),
                });
            }
            if raw[1..4].iter().any(|v| !v.is_finite()) {
                return Err(ConfigurationError::MalformedRow {
                    row: row_number,
                    reason: "coordinates must be finite".to_string(),
                });
            }
            table.push(index as u32, Point::new(raw[1], raw[2], raw[3]));
        }
        Ok(table)
    }

    /// Build a table from weld lines, in order
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a WeldLine>) -> Self {
        let mut table = Self::new();
        for line in lines {
            table.push_line(line);
        }
        table
    }

    /// Append a row
    pub fn push(&mut self, line_index: u32, point: Point) {
        self.rows.push(CoordinateRow::new(line_index, point));
    }

    /// Append every point of a weld line
    pub fn push_line(&mut self, line: &WeldLine) {
        self.rows.extend(
            line.points
                .iter()
                .map(|p| CoordinateRow::new(line.line_index, *p)),
        );
    }

    /// Append every row of another table, preserving order
    pub fn append(&mut self, other: CoordinateTable) {
        self.rows.extend(other.rows);
    }

    /// All rows in order
    pub fn rows(&self) -> &[CoordinateRow] {
        &self.rows
    }

    /// Consume the table and return its rows
    pub fn into_rows(self) -> Vec<CoordinateRow> {
        self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Group rows into weld lines
    ///
    /// Grouping is by value of the line index, not by position: rows of the
    /// same index that are not adjacent still land in one line. Lines appear
    /// in order of first appearance of their index and points keep row order.
    pub fn lines(&self) -> Vec<WeldLine> {
        let mut slots: HashMap<u32, usize> = HashMap::new();
        let mut lines: Vec<WeldLine> = Vec::new();
        for row in &self.rows {
            let slot = *slots.entry(row.line_index).or_insert_with(|| {
                lines.push(WeldLine::new(row.line_index, Vec::new()));
                lines.len() - 1
            });
            lines[slot].points.push(row.point);
        }
        lines
    }

    /// Number of distinct line indices
    pub fn line_count(&self) -> usize {
        let mut seen: Vec<u32> = self.rows.iter().map(|r| r.line_index).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    /// Highest line index in the table
    pub fn last_line_index(&self) -> Option<u32> {
        self.rows.iter().map(|r| r.line_index).max()
    }

    /// True when the rows of every line index are adjacent
    pub fn is_contiguous(&self) -> bool {
        let mut closed: Vec<u32> = Vec::new();
        let mut current: Option<u32> = None;
        for row in &self.rows {
            if current == Some(row.line_index) {
                continue;
            }
            if closed.contains(&row.line_index) {
                return false;
            }
            if let Some(prev) = current {
                closed.push(prev);
            }
            current = Some(row.line_index);
        }
        true
    }

    /// Copy of the table with `offset` added to every point
    pub fn shifted(&self, offset: Point) -> Self {
        Self {
            rows: self
                .rows
                .iter()
                .map(|r| CoordinateRow::new(r.line_index, r.point + offset))
                .collect(),
        }
    }

    /// Copy of the table with line indices renumbered densely from `start + 1`
    ///
    /// Lines keep their grouping and first-appearance order.
    pub fn renumbered(&self, start: u32) -> Self {
        let mut mapping: HashMap<u32, u32> = HashMap::new();
        let mut next = start;
        let rows = self
            .rows
            .iter()
            .map(|r| {
                let index = *mapping.entry(r.line_index).or_insert_with(|| {
                    next += 1;
                    next
                });
                CoordinateRow::new(index, r.point)
            })
            .collect();
        Self { rows }
    }
}

impl FromIterator<CoordinateRow> for CoordinateTable {
    fn from_iter<I: IntoIterator<Item = CoordinateRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CoordinateTable {
    type Item = &'a CoordinateRow;
    type IntoIter = std::slice::Iter<'a, CoordinateRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point {
        Point::new(x, y, z)
    }

    #[test]
    fn test_vector_from_slice() {
        assert_eq!(vector_from_slice("axis", &[1.0, 2.0, 3.0]).unwrap(), p(1.0, 2.0, 3.0));

        let err = vector_from_slice("axis", &[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::ComponentCount { expected: 3, actual: 2, .. }
        ));

        let err = vector_from_slice("axis", &[1.0, f64::NAN, 0.0]).unwrap_err();
        assert!(matches!(err, ConfigurationError::NonFinite { .. }));
    }

    #[test]
    fn test_from_raw_rows_requires_four_fields() {
        let rows = vec![vec![1.0, 0.0, 0.0, 0.0], vec![1.0, 2.0, 3.0]];
        let err = CoordinateTable::from_raw_rows(&rows).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MalformedRow {
                row: 1,
                reason: "expected at least 4 fields, got 3".to_string()
            }
        );
    }

    #[test]
    fn test_from_raw_rows_rejects_fractional_index() {
        let rows = vec![vec![1.5, 0.0, 0.0, 0.0]];
        assert!(CoordinateTable::from_raw_rows(&rows).is_err());
    }

    #[test]
    fn test_from_raw_rows_ignores_extra_fields() {
        let rows = vec![vec![2.0, 1.0, 2.0, 3.0, 99.0]];
        let table = CoordinateTable::from_raw_rows(&rows).unwrap();
        assert_eq!(table.rows()[0], CoordinateRow::new(2, p(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_lines_group_by_value_in_first_appearance_order() {
        let mut table = CoordinateTable::new();
        table.push(5, p(0.0, 0.0, 0.0));
        table.push(2, p(1.0, 0.0, 0.0));
        table.push(5, p(2.0, 0.0, 0.0));
        table.push(2, p(3.0, 0.0, 0.0));

        let lines = table.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_index, 5);
        assert_eq!(lines[0].points, vec![p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0)]);
        assert_eq!(lines[1].line_index, 2);
        assert_eq!(lines[1].points, vec![p(1.0, 0.0, 0.0), p(3.0, 0.0, 0.0)]);
        assert!(!table.is_contiguous());
        assert_eq!(table.line_count(), 2);
    }

    #[test]
    fn test_contiguous_table() {
        let mut table = CoordinateTable::new();
        table.push(1, p(0.0, 0.0, 0.0));
        table.push(1, p(1.0, 0.0, 0.0));
        table.push(2, p(1.0, 1.0, 0.0));
        assert!(table.is_contiguous());
        assert_eq!(table.last_line_index(), Some(2));
    }

    #[test]
    fn test_shifted_and_renumbered() {
        let mut table = CoordinateTable::new();
        table.push(10, p(0.0, 0.0, 0.0));
        table.push(10, p(1.0, 0.0, 0.0));
        table.push(20, p(1.0, 1.0, 0.0));

        let shifted = table.shifted(p(1.0, 2.0, 3.0));
        assert_eq!(shifted.rows()[0].point, p(1.0, 2.0, 3.0));
        assert_eq!(shifted.rows()[2].line_index, 20);

        let renumbered = table.renumbered(0);
        let indices: Vec<u32> = renumbered.rows().iter().map(|r| r.line_index).collect();
        assert_eq!(indices, vec![1, 1, 2]);
    }

    #[test]
    fn test_weld_line_geometry() {
        let line = WeldLine::new(1, vec![p(0.0, 0.0, 0.0), p(3.0, 4.0, 0.0), p(3.0, 4.0, 2.0)]);
        assert!((line.deposition_length() - 7.0).abs() < 1e-12);
        assert!(!line.is_degenerate());
        assert_eq!(line.start(), Some(p(0.0, 0.0, 0.0)));
        assert_eq!(line.end(), Some(p(3.0, 4.0, 2.0)));

        let single = WeldLine::new(2, vec![p(1.0, 1.0, 1.0)]);
        assert!(single.is_degenerate());
        assert_eq!(single.deposition_length(), 0.0);
    }

    #[test]
    fn test_from_lines_round_trip() {
        let lines = vec![
            WeldLine::new(1, vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]),
            WeldLine::new(2, vec![p(5.0, 5.0, 5.0)]),
        ];
        let table = CoordinateTable::from_lines(&lines);
        assert_eq!(table.len(), 3);
        assert_eq!(table.lines(), lines);
    }
}
