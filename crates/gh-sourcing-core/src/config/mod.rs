//! Keyed configuration consulted by resolvers.
//!
//! Resolvers only ever read configuration through
//! [`ReadableKeyedConfiguration`]; frontends own a writable
//! [`KeyedConfigurationStore`] that is loaded from `config.toml` and
//! overlaid with environment variables.

mod parser;
pub mod paths;
mod store;

pub use parser::{ConfigError, parse_config_str};
pub use paths::{default_cache_dir, default_config_path};
pub use store::{ConfigValue, KeyedConfigurationStore};

/// Token sent as `Authorization: token <value>` to the GitHub API.
pub const GITHUB_TOKEN: &str = "github.token";
/// Base URL of the GitHub REST API (GitHub Enterprise installations).
pub const GITHUB_API_URL: &str = "github.api_url";
/// Directory where downloaded archives are extracted.
pub const CACHE_DIR: &str = "sourcing.cache_dir";

/// Read access to dotted-key configuration values.
///
/// Getters return `None` both for missing keys and for keys holding a
/// value of another type.
pub trait ReadableKeyedConfiguration {
    fn get_boolean(&self, key: &str) -> Option<bool>;

    fn get_integer(&self, key: &str) -> Option<i32>;

    fn get_long(&self, key: &str) -> Option<i64>;

    fn get_string(&self, key: &str) -> Option<&str>;
}

/// Read/write access to dotted-key configuration values.
pub trait KeyedConfiguration: ReadableKeyedConfiguration {
    fn set_boolean(&mut self, key: &str, value: bool);

    fn set_integer(&mut self, key: &str, value: i32);

    fn set_long(&mut self, key: &str, value: i64);

    fn set_string(&mut self, key: &str, value: &str);
}
