//! Single-layer infill patterns
//!
//! A layer covers a square of `side_length` along `main_axis` by
//! `side_length` along `line_axis`. It is filled with
//! `side_length / beam_width` straight weld lines, each centred half a beam
//! width inside its strip so the outermost passes sit inside the square.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use weldpath_core::{vector_from_slice, ConfigurationError, CoordinateTable, Point};

/// Relative tolerance used when checking that the side length holds a whole
/// number of beam widths.
const DIVISIBILITY_TOLERANCE: f64 = 1e-9;

/// Infill pattern of one layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    /// Consecutive lines alternate travel direction
    Zigzag,
    /// Every line travels along `+main_axis`
    Raster,
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zigzag => write!(f, "zigzag"),
            Self::Raster => write!(f, "raster"),
        }
    }
}

impl FromStr for PatternType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zigzag" => Ok(Self::Zigzag),
            "raster" => Ok(Self::Raster),
            _ => Err(ConfigurationError::UnknownPattern(s.to_string())),
        }
    }
}

/// Geometric parameters of one layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Infill pattern
    pub pattern: PatternType,
    /// Spacing between adjacent weld lines (mm)
    pub beam_width: f64,
    /// Edge length of the square region (mm)
    pub side_length: f64,
    /// Reference corner of the layer
    pub origin: Point,
    /// Travel direction of each weld line, need not be normalized
    pub main_axis: Point,
    /// Line-to-line step direction, need not be normalized
    pub line_axis: Point,
}

impl LayerSpec {
    /// Create a layer spec from typed vectors
    pub fn new(
        pattern: PatternType,
        beam_width: f64,
        side_length: f64,
        origin: Point,
        main_axis: Point,
        line_axis: Point,
    ) -> Self {
        Self {
            pattern,
            beam_width,
            side_length,
            origin,
            main_axis,
            line_axis,
        }
    }

    /// Create a layer spec from untyped vectors, checking each has 3 components
    pub fn from_slices(
        pattern: PatternType,
        beam_width: f64,
        side_length: f64,
        origin: &[f64],
        main_axis: &[f64],
        line_axis: &[f64],
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::new(
            pattern,
            beam_width,
            side_length,
            vector_from_slice("origin", origin)?,
            vector_from_slice("main_axis", main_axis)?,
            vector_from_slice("line_axis", line_axis)?,
        ))
    }

    /// Number of weld lines in the layer
    ///
    /// Fails when any precondition of the layer is violated.
    pub fn line_count(&self) -> Result<u32, ConfigurationError> {
        check_positive("beam_width", self.beam_width)?;
        check_positive("side_length", self.side_length)?;
        check_direction("main_axis", self.main_axis)?;
        check_direction("line_axis", self.line_axis)?;
        if !self.origin.is_finite() {
            return Err(ConfigurationError::NonFinite {
                name: "origin".to_string(),
            });
        }

        let ratio = self.side_length / self.beam_width;
        let lines = ratio.round();
        if lines < 1.0
            || (ratio - lines).abs() > DIVISIBILITY_TOLERANCE * lines.max(1.0)
            || lines > u32::MAX as f64
        {
            return Err(ConfigurationError::NotDivisible {
                side_length: self.side_length,
                beam_width: self.beam_width,
            });
        }
        Ok(lines as u32)
    }

    /// Check every precondition of the layer
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.line_count().map(|_| ())
    }

    /// Copy of this spec with main and line axes exchanged
    pub fn with_swapped_axes(&self) -> Self {
        Self {
            main_axis: self.line_axis,
            line_axis: self.main_axis,
            ..*self
        }
    }

    /// Copy of this spec with `dz` added to the origin's Z component
    pub fn with_z_offset(&self, dz: f64) -> Self {
        Self {
            origin: self.origin + Point::new(0.0, 0.0, dz),
            ..*self
        }
    }
}

fn check_positive(name: &str, value: f64) -> Result<(), ConfigurationError> {
    if !value.is_finite() {
        return Err(ConfigurationError::NonFinite {
            name: name.to_string(),
        });
    }
    if value <= 0.0 {
        return Err(ConfigurationError::NonPositive {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

fn check_direction(name: &str, axis: Point) -> Result<(), ConfigurationError> {
    if !axis.is_finite() {
        return Err(ConfigurationError::NonFinite {
            name: name.to_string(),
        });
    }
    if axis.length_squared() == 0.0 {
        return Err(ConfigurationError::ZeroVector {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Generator for single-layer infill patterns
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternGenerator;

impl PatternGenerator {
    /// Create a new PatternGenerator
    pub fn new() -> Self {
        Self
    }

    /// Generate the weld lines of one layer
    ///
    /// Line `i` (1-based) receives index `start_line_index + i`. Returns the
    /// table, with exactly two rows per line, and the last index used so the
    /// next layer can continue the numbering. Nothing is produced when the
    /// spec is invalid.
    pub fn generate(
        &self,
        start_line_index: u32,
        spec: &LayerSpec,
    ) -> Result<(CoordinateTable, u32), ConfigurationError> {
        let line_count = spec.line_count()?;
        let last_line_index = start_line_index.checked_add(line_count).ok_or_else(|| {
            ConfigurationError::Other(format!(
                "line index overflow: {} + {} lines",
                start_line_index, line_count
            ))
        })?;

        let main = spec.main_axis.normalize();
        let step = spec.line_axis.normalize();
        let cos = main.dot(step).abs();
        if cos > 1.0 - 1e-9 {
            warn!("main_axis and line_axis are parallel; every weld line overlaps");
        } else if cos > 1e-9 {
            debug!("main_axis and line_axis are not orthogonal (|cos| = {:.6})", cos);
        }

        let travel = main * spec.side_length;
        let beam_offset = step * (spec.beam_width / 2.0);
        let mut table = CoordinateTable::with_capacity(line_count as usize * 2);

        for i in 1..=line_count {
            let line_offset = step * (f64::from(i - 1) * spec.beam_width);
            let start = spec.origin + line_offset + beam_offset;
            let end = start + travel;
            let line_index = start_line_index + i;

            let reversed = spec.pattern == PatternType::Zigzag && i % 2 == 0;
            let (first, second) = if reversed { (end, start) } else { (start, end) };
            trace!("line {}: {:?} -> {:?}", line_index, first, second);

            table.push(line_index, first);
            table.push(line_index, second);
        }

        debug!(
            "Generated {} {} line(s) at z={:.3} (indices {}..={})",
            line_count,
            spec.pattern,
            spec.origin.z,
            start_line_index + 1,
            last_line_index
        );

        Ok((table, last_line_index))
    }
}

/// Generate one layer from untyped parameters
///
/// Parses the pattern name and checks every vector has exactly three
/// components before delegating to [`PatternGenerator::generate`].
pub fn generate(
    start_line_index: u32,
    pattern: &str,
    beam_width: f64,
    side_length: f64,
    origin: &[f64],
    main_axis: &[f64],
    line_axis: &[f64],
) -> Result<(CoordinateTable, u32), ConfigurationError> {
    let pattern: PatternType = pattern.parse()?;
    let spec = LayerSpec::from_slices(pattern, beam_width, side_length, origin, main_axis, line_axis)?;
    PatternGenerator::new().generate(start_line_index, &spec)
}
