//! Error handling for Weldpath
//!
//! Provides the error types for every layer of the toolpath pipeline:
//! - Configuration errors (geometric and structural parameters)
//! - Parse errors (strict-mode motion command content)
//! - I/O errors (opening, reading and writing G-code files)
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration error type
///
/// Raised synchronously before any output is produced when geometric or
/// structural parameters are invalid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A length that must be strictly positive was zero or negative
    #[error("{name} must be > 0, got {value}")]
    NonPositive {
        /// The parameter name.
        name: String,
        /// The rejected value.
        value: f64,
    },

    /// A value that must be finite was NaN or infinite
    #[error("{name} must be finite")]
    NonFinite {
        /// The parameter name.
        name: String,
    },

    /// Side length does not hold a whole number of beam widths
    #[error("side length {side_length} is not divisible by beam width {beam_width}")]
    NotDivisible {
        /// The requested side length.
        side_length: f64,
        /// The requested beam width.
        beam_width: f64,
    },

    /// A direction vector has zero magnitude
    #[error("{name} must have non-zero magnitude")]
    ZeroVector {
        /// The vector name.
        name: String,
    },

    /// A vector has the wrong number of components
    #[error("{name} must have exactly {expected} components, got {actual}")]
    ComponentCount {
        /// The vector name.
        name: String,
        /// Required component count.
        expected: usize,
        /// Supplied component count.
        actual: usize,
    },

    /// The pattern name is not one of the recognized variants
    #[error("unknown pattern type '{0}' (expected 'zigzag' or 'raster')")]
    UnknownPattern(String),

    /// A coordinate table row does not have the required shape
    #[error("malformed coordinate row {row}: {reason}")]
    MalformedRow {
        /// Zero-based row position.
        row: usize,
        /// What is wrong with the row.
        reason: String,
    },

    /// A header comment would span more than one output line
    #[error("header line {index} contains a line break")]
    MultilineHeader {
        /// Zero-based position in the header.
        index: usize,
    },

    /// Generic configuration error
    #[error("{0}")]
    Other(String),
}

/// Parse error type
///
/// Only produced by the strict parser mode; the lenient mode recovers from
/// malformed content instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A motion command did not carry all three axes
    #[error("motion command at line {line_number} is missing the {axis} axis")]
    MissingAxis {
        /// 1-based source line number.
        line_number: usize,
        /// The missing axis letter.
        axis: char,
    },

    /// An axis token could not be read as a number
    #[error("invalid number '{token}' at line {line_number}")]
    InvalidNumber {
        /// 1-based source line number.
        line_number: usize,
        /// The offending token.
        token: String,
    },

    /// A linear move appeared before any rapid move
    #[error("linear move at line {line_number} precedes any rapid move")]
    OrphanLinearMove {
        /// 1-based source line number.
        line_number: usize,
    },
}

/// I/O error type
///
/// A resource could not be opened, read or written.
#[derive(Error, Debug)]
#[error("failed to {operation} {}: {source}", path.display())]
pub struct IoError {
    /// The file the operation targeted.
    pub path: PathBuf,
    /// What was being attempted ("open", "write", ...).
    pub operation: &'static str,
    /// The underlying OS error.
    #[source]
    pub source: std::io::Error,
}

impl IoError {
    /// Wrap an OS error with the path and operation it belongs to
    pub fn new(path: impl Into<PathBuf>, operation: &'static str, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            operation,
            source,
        }
    }
}

/// Main error type for Weldpath
///
/// A unified error type that can represent any error from the pipeline.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Parse error
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// I/O error
    #[error(transparent)]
    Io(#[from] IoError),
}

impl Error {
    /// Check if this is a configuration error
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    /// Check if this is a parse error
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse(_))
    }

    /// Check if this is an I/O error
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
