/// Application name
pub const APP_NAME: &str = "datakit";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default runtime configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "datakit.toml";

/// Source name used for extensions registered directly by the host
pub const BUILTIN_SOURCE: &str = "builtin";
