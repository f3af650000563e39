//! Saving and loading build configs

use tempfile::TempDir;
use weldpath_settings::{BuildConfig, SettingsError};
use weldpath_toolpath::{AxisSwapRule, PatternType};
use weldpath_visualizer::RenderQuality;

fn custom_config() -> BuildConfig {
    let mut config = BuildConfig::default();
    config.layer.pattern = PatternType::Zigzag;
    config.layer.beam_width = 0.5;
    config.layer.side_length = 20.0;
    config.layer.origin = vec![10.0, 10.0, 0.0];
    config.build.layer_count = 8;
    config.build.z_increment = 0.4;
    config.build.swap_rule = AxisSwapRule::EveryN { n: 2 };
    config.build.start_line_index = 100;
    config.output.header = vec!["bracket".to_string(), "steel".to_string()];
    config.render.quality = RenderQuality::High;
    config
}

#[test]
fn test_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("build.json");
    let config = custom_config();

    config.save_to_file(&path).unwrap();
    let loaded = BuildConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_toml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("build.toml");
    let config = custom_config();

    config.save_to_file(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("[layer]"));
    assert!(text.contains("pattern = \"zigzag\""));

    let loaded = BuildConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_invalid_config_is_not_saved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    let mut config = BuildConfig::default();
    config.layer.beam_width = 0.0;

    assert!(config.save_to_file(&path).is_err());
    assert!(!path.exists());
}

#[test]
fn test_missing_file_reports_load_error() {
    let dir = TempDir::new().unwrap();
    let err = BuildConfig::load_from_file(&dir.path().join("none.toml")).unwrap_err();
    assert!(matches!(err, SettingsError::LoadError { .. }));
}

#[test]
fn test_malformed_json_reports_json_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"layer\": ").unwrap();
    let err = BuildConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::JsonError(_)));
}

#[test]
fn test_unknown_pattern_is_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("spiral.toml");
    std::fs::write(&path, "[layer]\npattern = \"spiral\"\n").unwrap();
    let err = BuildConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::TomlError(_)));
}
