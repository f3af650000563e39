//! # Weldpath Toolpath
//!
//! Generates deposition toolpaths for layer-by-layer additive manufacturing.
//!
//! ## Components
//!
//! - **Pattern generation**: zigzag and raster infill of a square region, one
//!   straight weld line per beam width
//! - **Layer assembly**: stacking layers along the build axis with axis
//!   swapping and continuous line numbering

pub mod layers;
pub mod pattern;

pub use layers::{assemble, AssembledBuild, AxisSwapRule, BuildPlan, LayerAssembler, LayerSummary};
pub use pattern::{generate, LayerSpec, PatternGenerator, PatternType};
