//! Configuration loading for the era API server.
//!
//! The server reads `world-one.yaml` (or the file named by `W1_CONFIG`),
//! applies environment overrides and validates the result before anything
//! connects to the database.
//!
//! Environment overrides:
//! - `W1_PGURL` overrides `database.url`
//! - `W1_ADDR` overrides `server.addr`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use validator::Validate;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "world-one.yaml";

/// Environment variable naming an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "W1_CONFIG";

/// Environment variable overriding `database.url`.
pub const DATABASE_URL_ENV: &str = "W1_PGURL";

/// Environment variable overriding `server.addr`.
pub const SERVER_ADDR_ENV: &str = "W1_ADDR";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },

    /// The configuration parsed but breaks a validation rule.
    #[error("invalid configuration: {source}")]
    Invalid {
        /// Every rule that failed.
        #[from]
        source: validator::ValidationErrors,
    },
}

/// Top-level API server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct ApiConfig {
    /// Listener settings.
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerSettings,

    /// `PostgreSQL` settings.
    #[serde(default)]
    #[validate(nested)]
    pub database: DatabaseSettings,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl ApiConfig {
    /// Load from the file named by `W1_CONFIG`, or `world-one.yaml`.
    ///
    /// A missing default file is not an error: defaults plus environment
    /// overrides are used instead. A missing file named explicitly is.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Self::from_defaults()
                }
            }
        }
    }

    /// Load configuration from a YAML file, apply environment overrides and
    /// validate.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// No environment overrides are applied.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn from_defaults() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides looked up by variable name.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.database.url = url;
        }
        if let Some(addr) = lookup(SERVER_ADDR_ENV).filter(|v| !v.is_empty()) {
            self.server.addr = addr;
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct ServerSettings {
    /// Address to bind, `host:port`.
    #[serde(default = "default_addr")]
    #[validate(length(min = 1, message = "server address must be set"))]
    pub addr: String,

    /// Deadline applied to each request's era operations, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    #[validate(range(min = 1, message = "request timeout must be positive"))]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    /// The request deadline as a [`Duration`].
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// `PostgreSQL` connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct DatabaseSettings {
    /// Connection URL. Usually supplied through `W1_PGURL`.
    #[serde(default)]
    #[validate(length(min = 1, message = "database url must be set"))]
    pub url: String,

    /// Maximum pool size.
    #[serde(default = "default_max_connections")]
    #[validate(range(min = 1, message = "pool needs at least one connection"))]
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Default filter directive. `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Include source file and line in each record.
    #[serde(default)]
    pub include_source: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_log_level(),
            include_source: false,
        }
    }
}

fn default_addr() -> String {
    "0.0.0.0:8080".to_owned()
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

const fn default_max_connections() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_owned()
}
