//! TOML parser with helpful error messages

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::store::ConfigValue;

/// Errors raised while reading or writing configuration files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file: {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Parse(String),

    #[error("Unsupported {kind} value for key '{key}' (expected boolean, integer or string)")]
    UnsupportedValue { key: String, kind: &'static str },

    #[error("Failed to serialize configuration to TOML")]
    Serialize(#[from] toml::ser::Error),
}

/// Parse configuration content into flattened dotted keys.
///
/// `[github]\ntoken = "x"` becomes `github.token = "x"`.
pub fn parse_config_str(content: &str) -> Result<BTreeMap<String, ConfigValue>, ConfigError> {
    let table: toml::Table =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    let mut values = BTreeMap::new();
    flatten_into(&mut values, None, table)?;
    Ok(values)
}

fn flatten_into(
    values: &mut BTreeMap<String, ConfigValue>,
    prefix: Option<&str>,
    table: toml::Table,
) -> Result<(), ConfigError> {
    for (name, value) in table {
        let key = match prefix {
            Some(prefix) => format!("{}.{}", prefix, name),
            None => name,
        };

        let value = match value {
            toml::Value::Table(nested) => {
                flatten_into(values, Some(&key), nested)?;
                continue;
            }
            toml::Value::Boolean(b) => ConfigValue::Boolean(b),
            toml::Value::Integer(i) => ConfigValue::Integer(i),
            toml::Value::String(s) => ConfigValue::String(s),
            other => {
                return Err(ConfigError::UnsupportedValue {
                    key,
                    kind: other.type_str(),
                });
            }
        };

        values.insert(key, value);
    }

    Ok(())
}

/// Enhance TOML parsing errors with the offending lines
fn enhance_toml_error(error: toml::de::Error, content: &str) -> ConfigError {
    let message = error.message().to_string();

    match error.span() {
        Some(span) => {
            let line_num = content[..span.start.min(content.len())]
                .matches('\n')
                .count()
                + 1;
            let context = get_line_context(content, line_num);
            ConfigError::Parse(format!(
                "TOML parsing error at line {}:\n{}\n\nError: {}",
                line_num, context, message
            ))
        }
        None => ConfigError::Parse(format!("TOML parsing error: {}", message)),
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());

    lines
        .get(start..end)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_tables() {
        let toml = r#"
[github]
token = "ghp_secret"
api_url = "https://ghe.example.com/api/v3"

[sourcing]
cache_dir = "/var/cache/gh-sourcing"
"#;

        let values = parse_config_str(toml).unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(
            values.get("github.token"),
            Some(&ConfigValue::String("ghp_secret".to_string()))
        );
        assert_eq!(
            values.get("sourcing.cache_dir"),
            Some(&ConfigValue::String("/var/cache/gh-sourcing".to_string()))
        );
    }

    #[test]
    fn test_parse_dotted_keys_and_scalars() {
        let toml = r#"
github.retries = 3
sourcing.offline = true
"#;

        let values = parse_config_str(toml).unwrap();
        assert_eq!(values.get("github.retries"), Some(&ConfigValue::Integer(3)));
        assert_eq!(
            values.get("sourcing.offline"),
            Some(&ConfigValue::Boolean(true))
        );
    }

    #[test]
    fn test_parse_empty_config() {
        let values = parse_config_str("").unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_parse_rejects_arrays() {
        let err = parse_config_str("github.tokens = [\"a\", \"b\"]").unwrap_err();
        match err {
            ConfigError::UnsupportedValue { key, kind } => {
                assert_eq!(key, "github.tokens");
                assert_eq!(kind, "array");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_error_points_at_line() {
        let toml = "[github]\ntoken = \"ok\"\napi_url = \n";

        let err = parse_config_str(toml).unwrap_err().to_string();
        assert!(err.contains("line 3"), "unexpected message: {err}");
        assert!(err.contains(">>>"));
    }

    #[test]
    fn test_get_line_context_marks_line() {
        let content = "a = 1\nb = 2\nc = 3\nd = 4";
        let context = get_line_context(content, 3);

        assert!(context.contains(">>>    3 | c = 3"));
        assert!(context.contains("       2 | b = 2"));
        assert!(context.contains("       4 | d = 4"));
        assert!(!context.contains("a = 1"));
    }
}
