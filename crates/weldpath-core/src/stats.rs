//! Toolpath statistics
//!
//! Summaries of a coordinate table: line and point counts, deposition and
//! travel distances, and the bounding box of every visited point.

use serde::{Deserialize, Serialize};

use crate::data::{CoordinateTable, Point};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner
    pub min: Point,
    /// Maximum corner
    pub max: Point,
}

impl Bounds {
    /// Extent along each axis
    pub fn size(&self) -> Point {
        self.max - self.min
    }
}

/// Summary of a toolpath
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolpathStats {
    /// Number of weld lines
    pub line_count: usize,
    /// Number of points across all lines
    pub point_count: usize,
    /// Lines with a single point
    pub degenerate_lines: usize,
    /// Total length of linear (depositing) moves
    pub deposition_length: f64,
    /// Total length of rapid moves between consecutive lines
    pub travel_length: f64,
    /// Bounding box of all points, `None` for an empty table
    pub bounds: Option<Bounds>,
}

impl ToolpathStats {
    /// Compute statistics for a table
    ///
    /// Travel is measured from the end of one line to the start of the next;
    /// the first rapid move has no known origin and is not counted.
    pub fn from_table(table: &CoordinateTable) -> Self {
        let lines = table.lines();
        let mut stats = Self {
            line_count: lines.len(),
            point_count: table.len(),
            ..Self::default()
        };

        let mut previous_end: Option<Point> = None;
        for line in &lines {
            if line.is_degenerate() {
                stats.degenerate_lines += 1;
            }
            stats.deposition_length += line.deposition_length();
            if let (Some(prev), Some(start)) = (previous_end, line.start()) {
                stats.travel_length += prev.distance(start);
            }
            previous_end = line.end();
        }

        stats.bounds = table.rows().iter().fold(None, |acc: Option<Bounds>, row| {
            Some(match acc {
                None => Bounds {
                    min: row.point,
                    max: row.point,
                },
                Some(b) => Bounds {
                    min: b.min.min(row.point),
                    max: b.max.max(row.point),
                },
            })
        });

        stats
    }
}
