//! Configuration management.
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! `BUILDPRUNE_*` environment variables, then command-line flags.
//!
//! ```toml
//! endpoint = "http://127.0.0.1:8235"
//! namespace = "buildkit"
//! connect_timeout_ms = 5000
//! timeout_ms = 0
//! debug = false
//!
//! [logging]
//! format = "json"
//! level = "info"
//! file = "/var/log/buildprune.log"
//! ```

use crate::observability::DEFAULT_NAMESPACE;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default cache service endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8235";

/// Default connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "BUILDPRUNE_CONFIG_PATH";

/// Main configuration for buildprune.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneConfig {
    /// Cache service endpoint.
    pub endpoint: String,
    /// Namespace label isolating this tool's cache.
    pub namespace: String,
    /// Connect timeout in milliseconds (0 = none).
    pub connect_timeout_ms: u64,
    /// Deadline for the whole prune in milliseconds (0 = none).
    pub timeout_ms: u64,
    /// Dump raw records instead of the table.
    pub debug: bool,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Logging section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Filter directive, e.g. `info` or `buildprune=debug`.
    pub level: Option<String>,
    /// Log file path.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Cache service endpoint.
    pub endpoint: Option<String>,
    /// Namespace label.
    pub namespace: Option<String>,
    /// Connect timeout.
    pub connect_timeout_ms: Option<u64>,
    /// Prune deadline.
    pub timeout_ms: Option<u64>,
    /// Debug output.
    pub debug: Option<bool>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            timeout_ms: 0,
            debug: false,
            logging: LoggingSettings::default(),
        }
    }
}

impl PruneConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration for a CLI invocation.
    ///
    /// Uses `path` if given, else `BUILDPRUNE_CONFIG_PATH`, else the default
    /// location; then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be read or parsed,
    /// or an environment override is malformed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = if let Some(path) = path {
            Self::load_from_file(path)?
        } else if let Some(path) = std::env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
        {
            Self::load_from_file(Path::new(&path))?
        } else {
            Self::load_default()
        };

        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::parse_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config file.
    pub fn parse_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the platform config dir, then `~/.config/buildprune/`.
    /// Returns defaults if no readable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("buildprune").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("buildprune")
                .join("config.toml"),
        ];

        for candidate in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(candidate) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(
                    path = %candidate.display(),
                    error = %e,
                    "Ignoring unreadable config file"
                ),
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `PruneConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(endpoint) = file.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(namespace) = file.namespace {
            config.namespace = namespace;
        }
        if let Some(ms) = file.connect_timeout_ms {
            config.connect_timeout_ms = ms;
        }
        if let Some(ms) = file.timeout_ms {
            config.timeout_ms = ms;
        }
        if let Some(debug) = file.debug {
            config.debug = debug;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }

    /// Applies `BUILDPRUNE_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a numeric or boolean override
    /// cannot be parsed.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = get("BUILDPRUNE_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(namespace) = get("BUILDPRUNE_NAMESPACE") {
            self.namespace = namespace;
        }
        if let Some(v) = get("BUILDPRUNE_TIMEOUT_MS") {
            self.timeout_ms = parse_env_u64("BUILDPRUNE_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("BUILDPRUNE_CONNECT_TIMEOUT_MS") {
            self.connect_timeout_ms = parse_env_u64("BUILDPRUNE_CONNECT_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("BUILDPRUNE_DEBUG") {
            self.debug = parse_env_bool("BUILDPRUNE_DEBUG", &v)?;
        }

        Ok(self)
    }

    /// Sets the cache service endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Enables debug output.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the prune deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Deadline for the prune, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.timeout_ms))
        }
    }

    /// Connect timeout, if any.
    #[must_use]
    pub const fn connect_timeout(&self) -> Option<Duration> {
        if self.connect_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.connect_timeout_ms))
        }
    }
}

fn parse_env_u64(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("{key} must be an integer, got '{value}'")))
}

fn parse_env_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidInput(format!(
            "{key} must be a boolean, got '{value}'"
        ))),
    }
}
