//! `credo` configuration.
//!
//! Loaded from a TOML file via [`CliConfig::from_toml_file`]; every field
//! has a default, so an empty file (or no file) is valid. Command-line flags
//! and `CREDO_*` environment variables override file values.

use std::path::{Path, PathBuf};

use credo_types::VerificationParams;
use credo_utils::LogFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub params: VerificationParams,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./credo_data")
}

fn default_map_size_mb() -> usize {
    256
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size_mb: default_map_size_mb(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            params: VerificationParams::default(),
        }
    }
}

impl CliConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_size_mb == 0 {
            return Err(ConfigError::Invalid("map_size_mb must be positive".into()));
        }
        credo_otp::validate_length(self.params.code_length)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.params.max_code_attempts == 0 {
            return Err(ConfigError::Invalid(
                "params.max_code_attempts must be positive".into(),
            ));
        }
        if self.params.accepted_certificate_types.is_empty() {
            return Err(ConfigError::Invalid(
                "params.accepted_certificate_types must not be empty".into(),
            ));
        }
        if !self.params.max_gpa.is_finite() || self.params.max_gpa <= 0.0 {
            return Err(ConfigError::Invalid("params.max_gpa must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credo_types::CertificateType;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = CliConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = CliConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = CliConfig::from_toml_str("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.params.code_ttl_secs, 600);
    }

    #[test]
    fn partial_params_table() {
        let config = CliConfig::from_toml_str(
            r#"
            log_format = "json"

            [params]
            max_code_attempts = 5
            accepted_certificate_types = ["bachelor_degree", "teaching_license"]
            "#,
        )
        .unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.params.max_code_attempts, 5);
        assert_eq!(config.params.code_length, 6);
        assert!(config.params.accepts(CertificateType::TeachingLicense));
        assert!(!config.params.accepts(CertificateType::Doctorate));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            CliConfig::from_toml_str("map_size_mb = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CliConfig::from_toml_str("[params]\ncode_length = 2"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CliConfig::from_toml_str("log_format = \"xml\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credo.toml");
        std::fs::write(&path, "log_level = \"debug\"\n").unwrap();
        let config = CliConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.log_level, "debug");

        assert!(matches!(
            CliConfig::from_toml_file(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
