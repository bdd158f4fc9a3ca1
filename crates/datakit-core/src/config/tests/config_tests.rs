use std::path::Path;

use tempfile::tempdir;

use crate::config::{ConfigError, ConfigFormat, FinalizeMode, RuntimeConfig};
use crate::kernel::constants::DEFAULT_CONFIG_FILE;

#[test]
fn test_default_config() {
    let config = RuntimeConfig::default();
    assert_eq!(config.finalize_mode, FinalizeMode::Incremental);
    assert!(config.disabled_extensions.is_empty());
    assert!(config.log_discovery_rejections);
    assert!(!config.is_disabled("P/A"));
}

#[test]
fn test_format_from_path() {
    assert_eq!(ConfigFormat::from_path(Path::new("a/b.json")), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path(Path::new("a/b.JSON")), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path(Path::new("a/b.ini")), None);
    assert_eq!(ConfigFormat::from_path(Path::new("a/noext")), None);
    assert_eq!(ConfigFormat::Json.extension(), "json");
}

#[test]
fn test_json_missing_fields_use_defaults() {
    let config = RuntimeConfig::from_str(r#"{ "disabled_extensions": ["P/A", "Stats"] }"#, ConfigFormat::Json).unwrap();
    assert_eq!(config.finalize_mode, FinalizeMode::Incremental);
    assert!(config.log_discovery_rejections);
    assert!(config.is_disabled("P/A"));
    assert!(config.is_disabled("Stats"));
    assert!(!config.is_disabled("P/B"));
}

#[test]
fn test_json_finalize_mode_is_lowercase() {
    let config = RuntimeConfig::from_str(r#"{ "finalize_mode": "full" }"#, ConfigFormat::Json).unwrap();
    assert_eq!(config.finalize_mode, FinalizeMode::Full);

    let err = RuntimeConfig::from_str(r#"{ "finalize_mode": "Sometimes" }"#, ConfigFormat::Json).unwrap_err();
    assert!(matches!(err, ConfigError::DeserializationError { .. }));
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_yaml_config() {
    let yaml = "finalize_mode: full\nlog_discovery_rejections: false\n";
    let config = RuntimeConfig::from_str(yaml, ConfigFormat::Yaml).unwrap();
    assert_eq!(config.finalize_mode, FinalizeMode::Full);
    assert!(!config.log_discovery_rejections);
    assert_eq!(ConfigFormat::from_path(Path::new("x.yml")), Some(ConfigFormat::Yaml));
}

#[cfg(feature = "toml-config")]
#[test]
fn test_toml_config() {
    let toml = "disabled_extensions = [\"/Rollup\"]\n";
    let config = RuntimeConfig::from_str(toml, ConfigFormat::Toml).unwrap();
    assert!(config.is_disabled("/Rollup"));
    assert_eq!(config.finalize_mode, FinalizeMode::Incremental);
}

#[test]
fn test_save_and_load_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("runtime.json");
    let config = RuntimeConfig {
        finalize_mode: FinalizeMode::Full,
        disabled_extensions: vec!["P/A".to_string()],
        log_discovery_rejections: false,
    };

    config.save(&path).unwrap();
    assert_eq!(RuntimeConfig::load(&path).unwrap(), config);
}

#[test]
fn test_unsupported_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("runtime.ini");
    let err = RuntimeConfig::default().save(&path).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    let err = RuntimeConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = RuntimeConfig::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_load_or_default() {
    let dir = tempdir().unwrap();
    assert_eq!(RuntimeConfig::load_or_default(dir.path()).unwrap(), RuntimeConfig::default());

    #[cfg(feature = "toml-config")]
    {
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "finalize_mode = \"full\"\n").unwrap();
        let config = RuntimeConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.finalize_mode, FinalizeMode::Full);
    }
}
