//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::BotConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Why a configuration file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// One or more semantic checks failed; all of them are listed.
    #[error("invalid configuration: {}", format_violations(.0))]
    Validation(Vec<ValidationError>),
}

fn format_violations(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BotConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: BotConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_a_valid_file() {
        let path = write_temp(
            "matebot-valid.toml",
            r#"
            [gateway]
            base_url = "http://mete.local:5000"
            read_retries = 4
            "#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.gateway.base_url, "http://mete.local:5000");
        assert_eq!(config.gateway.read_retries, 4);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("matebot-does-not-exist.toml");
        assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn syntax_errors_are_parse_errors() {
        let path = write_temp("matebot-broken.toml", "[gateway\nbase_url = ");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn semantic_violations_are_listed_in_the_message() {
        let path = write_temp(
            "matebot-invalid.toml",
            r#"
            [gateway]
            base_url = ""
            request_timeout_secs = 0
            "#,
        );
        let err = load_config(&path).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("gateway.base_url"));
        assert!(message.contains("gateway.request_timeout_secs"));
        let _ = fs::remove_file(&path);
    }
}
