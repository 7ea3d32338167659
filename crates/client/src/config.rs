//! Client configuration.
//!
//! Sources, later overriding earlier:
//! 1. built-in defaults
//! 2. `textileflow.toml` in the working directory (or an explicit file)
//! 3. environment variables prefixed with `TEXTILEFLOW_`

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use textileflow_observability::LogFormat;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const ENV_PREFIX: &str = "TEXTILEFLOW";
const DEFAULT_FILE: &str = "textileflow";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("configuration error: {0}")]
    Source(#[from] config::ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// REST API root, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Where the token pair is persisted. Defaults under the user data dir.
    #[serde(default)]
    pub token_path: Option<PathBuf>,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            token_path: None,
            log_format: LogFormat::default(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    /// Load from `textileflow.toml` (optional) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load with an explicit config file, which must exist when given.
    pub fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };
        let config = Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: ClientConfig = config.try_deserialize()?;
        cfg.validated()
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "base_url".into(),
                message: format!("{:?} is not an http(s) URL", self.base_url),
            });
        }
        self.base_url = trimmed.to_string();
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(self)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        self.base_url = base_url.into();
        self.validated()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured token path, else `<data dir>/textileflow/tokens.json`.
    pub fn token_path(&self) -> Option<PathBuf> {
        self.token_path
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("textileflow").join("tokens.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.base_url, "http://127.0.0.1:8000/api");
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("textileflow-cfg-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("client.toml");
        std::fs::write(
            &path,
            "base_url = \"https://erp.example.pk/api/\"\ntimeout_secs = 5\nlog_format = \"json\"\ntoken_path = \"/tmp/tf-tokens.json\"\n",
        )
        .unwrap();

        let cfg = ClientConfig::load_from(Some(&path)).unwrap();
        assert_eq!(cfg.base_url, "https://erp.example.pk/api");
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.token_path(), Some(PathBuf::from("/tmp/tf-tokens.json")));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn rejects_non_http_base_url_and_zero_timeout() {
        assert!(ClientConfig::default().with_base_url("ftp://x").is_err());
        let cfg = ClientConfig {
            timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert!(cfg.validated().is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(ClientConfig::load_from(Some(Path::new("/nonexistent/textileflow.toml"))).is_err());
    }
}
