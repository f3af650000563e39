//! Weldpath Settings Crate
//!
//! Build configuration: the layer geometry, the stacking rule and the G-code
//! output options, persisted as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{BuildConfig, BuildSection, ConfigFormat, LayerSection, OutputSection, RenderSection};
pub use error::{SettingsError, SettingsResult};
