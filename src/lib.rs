//! # Weldpath
//!
//! Deposition toolpaths for layer-by-layer additive manufacturing.
//!
//! ## Architecture
//!
//! Weldpath is organized as a workspace with multiple crates:
//!
//! 1. **weldpath-core** - Coordinate table, weld lines, statistics, errors
//! 2. **weldpath-toolpath** - Zigzag and raster infill, layer stacking
//! 3. **weldpath-gcode** - `G00`/`G01` encoding and parsing
//! 4. **weldpath-visualizer** - Deterministic frame plans for an external renderer
//! 5. **weldpath-settings** - Build configuration files (JSON/TOML)
//! 6. **weldpath** - This facade and the `weldpath` command-line tool
//!
//! ## Pipeline
//!
//! ```text
//! BuildPlan -> assemble -> CoordinateTable -> GcodeEncoder -> .gcode
//! .gcode -> parse_file -> CoordinateTable -> frame_plan -> FrameSink
//! ```

pub use weldpath_core::{
    vector_from_slice, Bounds, ConfigurationError, CoordinateRow, CoordinateTable, Error,
    IoError, ParseError, Point, Result, ToolpathStats, WeldLine,
};

pub use weldpath_toolpath::{
    assemble, generate, AssembledBuild, AxisSwapRule, BuildPlan, LayerAssembler, LayerSpec,
    LayerSummary, PatternGenerator, PatternType,
};

pub use weldpath_gcode::{
    encode, encode_rows, parse_file, parse_str, write_file, EncoderOptions, GcodeEncoder,
    GcodeParser, MotionKind, ParseMode,
};

pub use weldpath_visualizer::{
    frame_plan, play, Frame, FrameEvent, FrameRecorder, FrameSink, PlaybackSummary,
    RenderQuality, RenderSettings, TextFrameSink, VisualizerError,
};

pub use weldpath_settings::{BuildConfig, ConfigFormat, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output to stderr, so stdout stays free for command results
/// - RUST_LOG environment variable support, `info` when unset
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
