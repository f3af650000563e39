//! # Weldpath Core
//!
//! Core types shared by every Weldpath crate.
//! Provides the coordinate table that flows between the pattern generator,
//! the layer assembler, the G-code encoder and the G-code parser, together
//! with the error taxonomy used across the workspace.

pub mod data;
pub mod error;
pub mod stats;

pub use data::{vector_from_slice, CoordinateRow, CoordinateTable, Point, WeldLine};

pub use error::{ConfigurationError, Error, IoError, ParseError, Result};

pub use stats::{Bounds, ToolpathStats};
