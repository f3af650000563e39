//! Build configuration for Weldpath
//!
//! A build is described by three sections:
//! - Layer geometry (pattern, beam width, square side, origin and axes)
//! - Stacking (layer count, Z increment, axis swap rule, first line index)
//! - Output (origin shift, line annotations, header comments)
//!
//! plus optional playback settings for the frame renderer. Files are JSON or
//! TOML, picked by extension.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use weldpath_core::{vector_from_slice, ConfigurationError};
use weldpath_gcode::EncoderOptions;
use weldpath_toolpath::{AxisSwapRule, BuildPlan, LayerSpec, PatternType};
use weldpath_visualizer::{RenderQuality, RenderSettings};

use crate::error::{SettingsError, SettingsResult};

/// On-disk format of a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.json` files
    Json,
    /// `.toml` files
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) => Err(SettingsError::UnsupportedFormat(ext.to_string())),
            None => Err(SettingsError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Toml => write!(f, "toml"),
        }
    }
}

/// Geometry of a single layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerSection {
    /// Infill pattern
    pub pattern: PatternType,
    /// Distance between adjacent weld lines (mm)
    pub beam_width: f64,
    /// Edge of the square region (mm), a whole multiple of `beam_width`
    pub side_length: f64,
    /// Reference corner `[x, y, z]`
    pub origin: Vec<f64>,
    /// Weld line travel direction `[x, y, z]`
    pub main_axis: Vec<f64>,
    /// Line-to-line step direction `[x, y, z]`
    pub line_axis: Vec<f64>,
}

impl Default for LayerSection {
    fn default() -> Self {
        Self {
            pattern: PatternType::Raster,
            beam_width: 6.0,
            side_length: 24.0,
            origin: vec![0.0, 0.0, 0.0],
            main_axis: vec![1.0, 0.0, 0.0],
            line_axis: vec![0.0, 1.0, 0.0],
        }
    }
}

/// Layer stacking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Number of layers (at least 1)
    pub layer_count: u32,
    /// Z added per layer (mm)
    pub z_increment: f64,
    /// Line index the first layer continues from
    pub start_line_index: u32,
    /// Which layers swap main and line axes
    pub swap_rule: AxisSwapRule,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            layer_count: 1,
            z_increment: 1.0,
            start_line_index: 0,
            swap_rule: AxisSwapRule::EveryLayer,
        }
    }
}

/// G-code output options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Added to every coordinate on output `[x, y, z]`
    pub origin_shift: Vec<f64>,
    /// Append `; weld line N` to rapid moves
    pub annotate_lines: bool,
    /// Comment lines at the top of the program
    pub header: Vec<String>,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            origin_shift: vec![0.0, 0.0, 0.0],
            annotate_lines: true,
            header: Vec::new(),
        }
    }
}

/// Frame playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    /// Frames per second
    pub frame_rate: f64,
    /// Renderer detail level
    pub quality: RenderQuality,
}

impl Default for RenderSection {
    fn default() -> Self {
        let defaults = RenderSettings::default();
        Self {
            frame_rate: defaults.frame_rate,
            quality: defaults.quality,
        }
    }
}

/// Complete build configuration
///
/// Every section falls back to its defaults when missing from the file, so
/// an empty file describes the 4-line raster square on the XY plane.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// `[layer]`: the first layer's pattern and geometry
    pub layer: LayerSection,
    /// `[build]`: layer stacking
    pub build: BuildSection,
    /// `[output]`: G-code encoding
    pub output: OutputSection,
    /// `[render]`: playback defaults
    pub render: RenderSection,
}

impl BuildConfig {
    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::LoadError {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_str_with_format(&content, format)?;
        info!("Loaded {} build config from {}", format, path.display());
        Ok(config)
    }

    /// Parse config text in the given format and validate it
    pub fn from_str_with_format(content: &str, format: ConfigFormat) -> SettingsResult<Self> {
        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        let format = ConfigFormat::from_path(path)?;
        let content = self.to_string_with_format(format)?;

        std::fs::write(path, content).map_err(|source| SettingsError::SaveError {
            path: path.display().to_string(),
            source,
        })?;

        info!("Saved {} build config to {}", format, path.display());
        Ok(())
    }

    /// Validate and render the config in the given format
    pub fn to_string_with_format(&self, format: ConfigFormat) -> SettingsResult<String> {
        self.validate()?;
        Ok(match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        })
    }

    /// Validate configuration
    ///
    /// Runs every check the generator would run, so a config that validates
    /// always produces a toolpath.
    pub fn validate(&self) -> SettingsResult<()> {
        if self.build.layer_count == 0 {
            return Err(SettingsError::InvalidSetting {
                key: "build.layer_count".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if !self.render.frame_rate.is_finite() || self.render.frame_rate <= 0.0 {
            return Err(SettingsError::InvalidSetting {
                key: "render.frame_rate".to_string(),
                reason: format!("must be > 0, got {}", self.render.frame_rate),
            });
        }

        let plan = self.to_plan()?;
        plan.layers()?;
        self.to_encoder_options()?;

        debug!(
            "Build config valid: {} layer(s) of {} line(s)",
            plan.layer_count,
            plan.base.line_count()?
        );
        Ok(())
    }

    /// Layer spec of the first layer
    pub fn layer_spec(&self) -> Result<LayerSpec, ConfigurationError> {
        LayerSpec::from_slices(
            self.layer.pattern,
            self.layer.beam_width,
            self.layer.side_length,
            &self.layer.origin,
            &self.layer.main_axis,
            &self.layer.line_axis,
        )
    }

    /// Build plan described by this config
    pub fn to_plan(&self) -> Result<BuildPlan, ConfigurationError> {
        Ok(BuildPlan::new(
            self.layer_spec()?,
            self.build.layer_count,
            self.build.z_increment,
            self.build.swap_rule,
        ))
    }

    /// Encoder options described by this config
    pub fn to_encoder_options(&self) -> Result<EncoderOptions, ConfigurationError> {
        let mut options = EncoderOptions::default().with_annotations(self.output.annotate_lines);
        options.origin_shift = vector_from_slice("origin_shift", &self.output.origin_shift)?;
        options.header = self.output.header.clone();
        options.validate()?;
        Ok(options)
    }

    /// Playback settings described by this config
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings::new(self.render.frame_rate, self.render.quality)
    }
}
