//! Server configuration
//!
//! Loaded from an optional TOML file, then overridden by command-line flags.

use dex_core::ServiceConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidValue {
                field: "log_format",
                value: other.to_string(),
            }),
        }
    }
}

/// Errors while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config file {path}: {source}")]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Underlying parse error
        source: toml::de::Error,
    },

    /// A single value failed to parse
    #[error("invalid value for {field}: {value}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Offending value
        value: String,
    },
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// JSON snapshot file; memory only when absent
    pub data_file: Option<PathBuf>,
    /// Directory uploaded images are written to
    pub upload_dir: PathBuf,
    /// Base URL used to build image links handed back to clients
    pub public_base_url: String,
    /// Largest accepted upload in bytes
    pub max_upload_bytes: u64,
    /// Largest accepted JSON body in bytes
    pub max_body_bytes: u64,
    /// Log output format
    pub log_format: LogFormat,
    /// Record service settings
    pub service: ServiceConfig,
}

impl ServerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a TOML file; missing keys keep their defaults
    ///
    /// # Errors
    /// [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// With listen address
    #[inline]
    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// With snapshot file
    #[inline]
    #[must_use]
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = Some(path.into());
        self
    }

    /// With upload directory
    #[inline]
    #[must_use]
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    /// With public base URL
    #[inline]
    #[must_use]
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = url.into();
        self
    }

    /// With upload size limit
    #[inline]
    #[must_use]
    pub fn with_max_upload_bytes(mut self, max: u64) -> Self {
        self.max_upload_bytes = max;
        self
    }

    /// With log format
    #[inline]
    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// With record service settings
    #[inline]
    #[must_use]
    pub fn with_service(mut self, service: ServiceConfig) -> Self {
        self.service = service;
        self
    }

    /// Public URL of an uploaded file
    #[must_use]
    pub fn upload_url(&self, file_name: &str) -> String {
        format!("{}/uploads/{}", self.public_base_url.trim_end_matches('/'), file_name)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            data_file: None,
            upload_dir: PathBuf::from("uploads"),
            public_base_url: "http://localhost:5000".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
            max_body_bytes: 1024 * 1024,
            log_format: LogFormat::Pretty,
            service: ServiceConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_core::IdentityPolicy;
    use dex_model::AbilityMatch;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ServerConfig::new();
        assert_eq!(config.bind.port(), 5000);
        assert!(config.data_file.is_none());
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn upload_url_joins_cleanly() {
        let config = ServerConfig::new().with_public_base_url("https://dex.example/");
        assert_eq!(config.upload_url("a.png"), "https://dex.example/uploads/a.png");
    }

    #[test]
    fn load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        writeln!(
            file,
            r#"
bind = "0.0.0.0:8080"
data_file = "data/catalog.json"
log_format = "json"

[service]
identity_policy = "max_scan"
ability_match = "ignore_case"
"#
        )
        .unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.data_file, Some(PathBuf::from("data/catalog.json")));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.service.identity_policy, IdentityPolicy::MaxScan);
        assert_eq!(config.service.ability_match, AbilityMatch::IgnoreCase);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn load_reports_bad_file() {
        let err = ServerConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));

        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "bind = 12").unwrap();
        let err = ServerConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
