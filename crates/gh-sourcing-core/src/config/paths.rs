//! Default config and cache locations.

use std::path::PathBuf;

use super::{CACHE_DIR, ReadableKeyedConfiguration};

const APP_DIR: &str = "gh-sourcing";

/// `<config_dir>/gh-sourcing/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// Archive cache directory: `sourcing.cache_dir` when set to a non-blank value,
/// otherwise `<cache_dir>/gh-sourcing/archives`, falling back to the
/// system temp dir.
pub fn default_cache_dir(configuration: &dyn ReadableKeyedConfiguration) -> PathBuf {
    if let Some(dir) = configuration
        .get_string(CACHE_DIR)
        .filter(|dir| !dir.trim().is_empty())
    {
        return PathBuf::from(dir);
    }

    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join("archives")
}
