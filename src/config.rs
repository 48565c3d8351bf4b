//! Server Configuration
//!
//! Parses and validates the optional TOML file passed with `--config`.
//! Every key has a default, so an empty file is a valid configuration.
//!
//! ```toml
//! max_frame_bytes = 1048576
//!
//! [log]
//! filter = "ipc_call=debug"
//! format = "json"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::transport::DEFAULT_MAX_FRAME_BYTES;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Largest request or response frame accepted, in bytes
    pub max_frame_bytes: usize,

    /// Diagnostic logging
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            log: LogConfig::default(),
        }
    }
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub filter: String,

    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Log line layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Errors that can occur when loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl Config {
    /// Load configuration from a specific path
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frame_bytes == 0 {
            return Err(invalid("max_frame_bytes", "must be greater than 0"));
        }

        // Frame lengths travel as u32
        if u32::try_from(self.max_frame_bytes).is_err() {
            return Err(invalid(
                "max_frame_bytes",
                format!("must not exceed {}", u32::MAX),
            ));
        }

        if self.log.filter.trim().is_empty() {
            return Err(invalid("log.filter", "cannot be empty"));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.max_frame_bytes, DEFAULT_MAX_FRAME_BYTES);
        assert_eq!(config.log.filter, "info");
        assert_eq!(config.log.format, LogFormat::Compact);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
max_frame_bytes = 4096

[log]
filter = "ipc_call=trace"
format = "json"
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.max_frame_bytes, 4096);
        assert_eq!(config.log.filter, "ipc_call=trace");
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_partial_log_section_keeps_defaults() {
        let config = Config::parse("[log]\nformat = \"json\"\n").unwrap();
        assert_eq!(config.log.filter, "info");
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = Config::parse("max_frame_size = 10\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result = Config::parse("[log]\nformat = \"pretty\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_zero_frame_limit_rejected() {
        let err = Config::parse("max_frame_bytes = 0\n").unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => assert_eq!(field, "max_frame_bytes"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_oversized_frame_limit_rejected() {
        let config = Config {
            max_frame_bytes: usize::MAX,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_filter_rejected() {
        let err = Config::parse("[log]\nfilter = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("log.filter"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_frame_bytes = 128").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.max_frame_bytes, 128);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }
}
