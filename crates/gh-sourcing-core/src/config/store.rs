//! TOML-backed keyed configuration store.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::parser::{ConfigError, parse_config_str};
use super::{GITHUB_TOKEN, KeyedConfiguration, ReadableKeyedConfiguration};

/// Prefix of environment variables mapped onto configuration keys.
const ENV_PREFIX: &str = "GH_SOURCING_";

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl std::fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

/// In-memory configuration keyed by dotted names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyedConfigurationStore {
    values: BTreeMap<String, ConfigValue>,
}

impl KeyedConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a store from TOML content.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            values: parse_config_str(content)?,
        })
    }

    /// Load a store from a TOML file. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content).map_err(|err| match err {
            ConfigError::Parse(message) => {
                ConfigError::Parse(format!("{}\n  in {}", message, path.display()))
            }
            other => other,
        })
    }

    /// Write the store to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize the store as nested TOML tables.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let mut root = toml::Table::new();

        'keys: for (key, value) in &self.values {
            let mut segments: Vec<&str> = key.split('.').collect();
            let leaf = segments.pop().unwrap_or(key.as_str());

            let mut table = &mut root;
            for segment in segments {
                let entry = table
                    .entry(segment.to_string())
                    .or_insert_with(|| toml::Value::Table(toml::Table::new()));
                match entry.as_table_mut() {
                    Some(nested) => table = nested,
                    None => {
                        tracing::warn!(%key, "skipping key shadowed by a scalar value");
                        continue 'keys;
                    }
                }
            }

            let value = match value {
                ConfigValue::Boolean(b) => toml::Value::Boolean(*b),
                ConfigValue::Integer(i) => toml::Value::Integer(*i),
                ConfigValue::String(s) => toml::Value::String(s.clone()),
            };
            table.insert(leaf.to_string(), value);
        }

        Ok(toml::to_string_pretty(&root)?)
    }

    /// Overlay environment variables onto the store.
    ///
    /// `GH_SOURCING_GITHUB_TOKEN` sets `github.token`; a plain
    /// `GITHUB_TOKEN` is only used when no token is configured otherwise.
    /// A blank `GH_SOURCING_*` value clears the key and a blank
    /// `GITHUB_TOKEN` is ignored.
    pub fn apply_env<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut fallback_token = None;

        for (name, value) in vars {
            let name = name.as_ref();
            if let Some(key) = name.strip_prefix(ENV_PREFIX) {
                if key.is_empty() {
                    continue;
                }
                let key = env_key(key);
                let value = value.into();
                if value.trim().is_empty() {
                    tracing::trace!(%key, "configuration cleared from environment");
                    self.remove(&key);
                } else {
                    tracing::trace!(%key, "configuration overridden from environment");
                    self.values.insert(key, ConfigValue::String(value));
                }
            } else if name == "GITHUB_TOKEN" {
                let value: String = value.into();
                if !value.trim().is_empty() {
                    fallback_token = Some(value);
                }
            }
        }

        if let Some(token) = fallback_token {
            self.values
                .entry(GITHUB_TOKEN.to_string())
                .or_insert(ConfigValue::String(token));
        }
    }

    /// Overlay the current process environment.
    pub fn with_process_env(mut self) -> Self {
        self.apply_env(std::env::vars());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// Remove a key, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.values.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// `GITHUB_API_URL` -> `github.api_url`; the first underscore separates
/// the table from the key.
fn env_key(raw: &str) -> String {
    let lower = raw.to_ascii_lowercase();
    match lower.split_once('_') {
        Some((table, key)) if !key.is_empty() => format!("{}.{}", table, key),
        _ => lower,
    }
}

impl ReadableKeyedConfiguration for KeyedConfigurationStore {
    fn get_boolean(&self, key: &str) -> Option<bool> {
        match self.values.get(key)? {
            ConfigValue::Boolean(b) => Some(*b),
            ConfigValue::String(s) => s.parse().ok(),
            ConfigValue::Integer(_) => None,
        }
    }

    fn get_integer(&self, key: &str) -> Option<i32> {
        self.get_long(key).and_then(|i| i32::try_from(i).ok())
    }

    fn get_long(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            ConfigValue::Integer(i) => Some(*i),
            ConfigValue::String(s) => s.parse().ok(),
            ConfigValue::Boolean(_) => None,
        }
    }

    fn get_string(&self, key: &str) -> Option<&str> {
        match self.values.get(key)? {
            ConfigValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl KeyedConfiguration for KeyedConfigurationStore {
    fn set_boolean(&mut self, key: &str, value: bool) {
        self.values
            .insert(key.to_string(), ConfigValue::Boolean(value));
    }

    fn set_integer(&mut self, key: &str, value: i32) {
        self.set_long(key, i64::from(value));
    }

    fn set_long(&mut self, key: &str, value: i64) {
        self.values
            .insert(key.to_string(), ConfigValue::Integer(value));
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.values
            .insert(key.to_string(), ConfigValue::String(value.to_string()));
    }
}
