//! G-code to coordinate table
//!
//! A small state machine over text lines. The only state is the current weld
//! line index and the last value seen for each axis; both live in the parser
//! value and are never shared between parses.

use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use weldpath_core::{CoordinateTable, ParseError, Point};

use crate::{LINEAR_MOVE, RAPID_MOVE};

/// How malformed motion content is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Axis values carry forward between commands. Axes never set resolve
    /// to `0.0`, malformed numbers are logged and ignored, and a linear move
    /// before any rapid move implicitly starts line 1.
    #[default]
    Lenient,
    /// Every motion command must carry X, Y and Z with valid numbers, and
    /// the first motion command must be a rapid move.
    Strict,
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lenient => write!(f, "lenient"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// Kind of motion command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    /// `G00`, starts a new weld line
    Rapid,
    /// `G01`, extends the current weld line
    Linear,
}

impl MotionKind {
    fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case(RAPID_MOVE) {
            Some(Self::Rapid)
        } else if token.eq_ignore_ascii_case(LINEAR_MOVE) {
            Some(Self::Linear)
        } else {
            None
        }
    }
}

const AXES: [char; 3] = ['X', 'Y', 'Z'];

/// G-code parser producing a coordinate table
#[derive(Debug, Clone)]
pub struct GcodeParser {
    mode: ParseMode,
    current_line_index: u32,
    axes: [Option<f64>; 3],
    source_line: usize,
    table: CoordinateTable,
}

impl Default for GcodeParser {
    fn default() -> Self {
        Self::new(ParseMode::default())
    }
}

impl GcodeParser {
    /// Create a new parser
    pub fn new(mode: ParseMode) -> Self {
        Self {
            mode,
            current_line_index: 0,
            axes: [None; 3],
            source_line: 0,
            table: CoordinateTable::new(),
        }
    }

    /// Parsing mode
    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// Index of the weld line being filled, 0 before the first motion command
    pub fn current_line_index(&self) -> u32 {
        self.current_line_index
    }

    /// Feed one line of text
    ///
    /// Non-motion lines are ignored. In strict mode malformed motion content
    /// returns an error and leaves the table unchanged.
    pub fn parse_line(&mut self, line: &str) -> Result<Option<MotionKind>, ParseError> {
        self.source_line += 1;
        let cleaned = remove_comments(line);
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(None);
        }

        let mut kind = None;
        for token in &tokens {
            if let Some(found) = MotionKind::from_token(token) {
                if kind.is_none() {
                    kind = Some(found);
                } else {
                    warn!(
                        "Line {}: extra motion token '{}' ignored",
                        self.source_line, token
                    );
                }
            }
        }
        let Some(kind) = kind else {
            return Ok(None);
        };

        let mut axes = self.axes;
        let mut seen = [false; 3];
        for token in &tokens {
            let mut chars = token.chars();
            let Some(letter) = chars.next() else {
                continue;
            };
            let Some(slot) = AXES.iter().position(|a| a.eq_ignore_ascii_case(&letter)) else {
                continue;
            };
            match parse_number(chars.as_str()) {
                Some(value) => {
                    axes[slot] = Some(value);
                    seen[slot] = true;
                }
                None => match self.mode {
                    ParseMode::Strict => {
                        return Err(ParseError::InvalidNumber {
                            line_number: self.source_line,
                            token: token.to_string(),
                        })
                    }
                    ParseMode::Lenient => warn!(
                        "Line {}: invalid number '{}', keeping previous {} value",
                        self.source_line, token, AXES[slot]
                    ),
                },
            }
        }

        if self.mode == ParseMode::Strict {
            if let Some(missing) = seen.iter().position(|s| !s) {
                return Err(ParseError::MissingAxis {
                    line_number: self.source_line,
                    axis: AXES[missing],
                });
            }
        }

        match kind {
            MotionKind::Rapid => self.current_line_index += 1,
            MotionKind::Linear if self.current_line_index == 0 => match self.mode {
                ParseMode::Strict => {
                    return Err(ParseError::OrphanLinearMove {
                        line_number: self.source_line,
                    })
                }
                ParseMode::Lenient => {
                    warn!(
                        "Line {}: linear move before any rapid move, starting line 1",
                        self.source_line
                    );
                    self.current_line_index = 1;
                }
            },
            MotionKind::Linear => {}
        }

        self.axes = axes;
        let point = Point::new(
            axes[0].unwrap_or(0.0),
            axes[1].unwrap_or(0.0),
            axes[2].unwrap_or(0.0),
        );
        self.table.push(self.current_line_index, point);
        Ok(Some(kind))
    }

    /// Finish parsing and return the table
    pub fn finish(self) -> CoordinateTable {
        debug!(
            "Parsed {} point(s) in {} weld line(s) from {} source line(s) ({} mode)",
            self.table.len(),
            self.current_line_index,
            self.source_line,
            self.mode
        );
        self.table
    }
}

/// Remove comments from a G-code line
fn remove_comments(line: &str) -> Cow<'_, str> {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = COMMENT_REGEX.get_or_init(|| Regex::new(r";.*").expect("invalid regex pattern"));
    regex.replace(line, "")
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse G-code text into a coordinate table
///
/// Line indices in the result are dense from 1 in file order.
pub fn parse_str(text: &str, mode: ParseMode) -> Result<CoordinateTable, ParseError> {
    let mut parser = GcodeParser::new(mode);
    for line in text.lines() {
        parser.parse_line(line)?;
    }
    Ok(parser.finish())
}
