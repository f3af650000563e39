//! Layer stacking
//!
//! Stacks single-layer patterns along the build axis. The running line index
//! is threaded from one layer into the next so indices stay unique and
//! strictly increasing across the whole build.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use weldpath_core::{ConfigurationError, CoordinateTable};

use crate::pattern::{LayerSpec, PatternGenerator};

/// Rule deciding which layers exchange main and line axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum AxisSwapRule {
    /// Every layer uses the base axes
    Never,
    /// Odd layers (0-based) swap axes, giving a cross-hatch stack
    #[default]
    EveryLayer,
    /// Axes swap after every block of `n` layers
    EveryN {
        /// Layers per block
        n: u32,
    },
}

impl AxisSwapRule {
    /// Whether layer `layer` (0-based) uses swapped axes
    pub fn swaps(&self, layer: u32) -> bool {
        match self {
            Self::Never => false,
            Self::EveryLayer => layer % 2 == 1,
            Self::EveryN { n } => *n > 0 && (layer / n) % 2 == 1,
        }
    }

    /// Check the rule's parameters
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            Self::EveryN { n: 0 } => Err(ConfigurationError::NonPositive {
                name: "swap_rule.n".to_string(),
                value: 0.0,
            }),
            _ => Ok(()),
        }
    }
}

/// A complete multi-layer build request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildPlan {
    /// Parameters of the first layer
    pub base: LayerSpec,
    /// Number of layers to stack
    pub layer_count: u32,
    /// Amount added to the origin's Z for each successive layer
    pub z_increment: f64,
    /// Which layers swap main and line axes
    pub swap_rule: AxisSwapRule,
}

impl BuildPlan {
    /// Create a plan
    pub fn new(base: LayerSpec, layer_count: u32, z_increment: f64, swap_rule: AxisSwapRule) -> Self {
        Self {
            base,
            layer_count,
            z_increment,
            swap_rule,
        }
    }

    /// Create a single-layer plan
    pub fn single(base: LayerSpec) -> Self {
        Self::new(base, 1, 0.0, AxisSwapRule::Never)
    }

    /// Expand the plan into one spec per layer
    pub fn layers(&self) -> Result<Vec<LayerSpec>, ConfigurationError> {
        if self.layer_count == 0 {
            return Err(ConfigurationError::NonPositive {
                name: "layer_count".to_string(),
                value: 0.0,
            });
        }
        if !self.z_increment.is_finite() {
            return Err(ConfigurationError::NonFinite {
                name: "z_increment".to_string(),
            });
        }
        self.swap_rule.validate()?;

        Ok((0..self.layer_count)
            .map(|layer| {
                let spec = self.base.with_z_offset(f64::from(layer) * self.z_increment);
                if self.swap_rule.swaps(layer) {
                    spec.with_swapped_axes()
                } else {
                    spec
                }
            })
            .collect())
    }
}

/// Line index range and height of one assembled layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    /// First line index of the layer
    pub first_line_index: u32,
    /// Last line index of the layer
    pub last_line_index: u32,
    /// Z of the layer origin
    pub z: f64,
}

/// Result of assembling a build
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledBuild {
    /// Rows of every layer in build order
    pub table: CoordinateTable,
    /// Last line index used
    pub last_line_index: u32,
    /// One entry per layer
    pub layers: Vec<LayerSummary>,
}

/// Concatenates layers while threading the running line index
#[derive(Debug, Clone)]
pub struct LayerAssembler {
    generator: PatternGenerator,
    table: CoordinateTable,
    last_line_index: u32,
    layers: Vec<LayerSummary>,
}

impl LayerAssembler {
    /// Create an assembler whose first line will be `start_line_index + 1`
    pub fn new(start_line_index: u32) -> Self {
        Self {
            generator: PatternGenerator::new(),
            table: CoordinateTable::new(),
            last_line_index: start_line_index,
            layers: Vec::new(),
        }
    }

    /// Generate one layer and append it
    ///
    /// Returns the new running line index. On error nothing is appended.
    pub fn push_layer(&mut self, spec: &LayerSpec) -> Result<u32, ConfigurationError> {
        let (layer, last) = self.generator.generate(self.last_line_index, spec)?;
        self.layers.push(LayerSummary {
            first_line_index: self.last_line_index + 1,
            last_line_index: last,
            z: spec.origin.z,
        });
        self.table.append(layer);
        self.last_line_index = last;
        Ok(last)
    }

    /// Running line index
    pub fn last_line_index(&self) -> u32 {
        self.last_line_index
    }

    /// Number of layers pushed so far
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Finish the build
    pub fn finish(self) -> AssembledBuild {
        AssembledBuild {
            table: self.table,
            last_line_index: self.last_line_index,
            layers: self.layers,
        }
    }
}

/// Assemble a whole build plan
///
/// Every layer is validated before any is generated, so an invalid layer
/// anywhere in the stack yields an error and no output.
pub fn assemble(plan: &BuildPlan, start_line_index: u32) -> Result<AssembledBuild, ConfigurationError> {
    let specs = plan.layers()?;
    for spec in &specs {
        spec.validate()?;
    }

    let mut assembler = LayerAssembler::new(start_line_index);
    for spec in &specs {
        assembler.push_layer(spec)?;
    }
    let build = assembler.finish();

    info!(
        "Assembled {} layer(s), {} line(s), {} row(s)",
        build.layers.len(),
        build.last_line_index - start_line_index,
        build.table.len()
    );
    debug!("Layer summaries: {:?}", build.layers);

    Ok(build)
}
