//! # Weldpath G-code
//!
//! Bidirectional mapping between coordinate tables and G-code text.
//!
//! Only two motion commands are produced and understood:
//! - `G00` rapid move to the first point of a weld line
//! - `G01` linear deposition move to every following point
//!
//! A `;` starts a comment that runs to the end of the line.

pub mod encoder;
pub mod file_io;
pub mod parser;

pub use encoder::{encode, encode_rows, EncoderOptions, GcodeEncoder};
pub use file_io::{parse_file, write_file};
pub use parser::{parse_str, GcodeParser, MotionKind, ParseMode};

/// Rapid (non-depositing) move token
pub const RAPID_MOVE: &str = "G00";

/// Linear (depositing) move token
pub const LINEAR_MOVE: &str = "G01";

/// Start of a comment
pub const COMMENT_MARKER: char = ';';

/// Digits after the decimal point in emitted coordinates
pub const COORDINATE_PRECISION: usize = 3;
