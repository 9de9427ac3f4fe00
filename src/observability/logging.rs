//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;

/// Default filter when neither `RUST_LOG` nor the config sets one.
const DEFAULT_LEVEL: &str = "warn";

/// Filter used with `--verbose`.
const VERBOSE_LEVEL: &str = "buildprune=debug,info";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name, falling back to [`LogFormat::Pretty`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `tracing_subscriber::EnvFilter` directive.
    pub filter: String,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: DEFAULT_LEVEL.to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Builds logging configuration from settings, `RUST_LOG` and the verbose flag.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        Self::from_settings_with_env(settings, verbose, std::env::var("RUST_LOG").ok())
    }

    /// Same as [`LoggingConfig::from_settings`] with an explicit `RUST_LOG` value.
    #[must_use]
    pub fn from_settings_with_env(
        settings: Option<&LoggingSettings>,
        verbose: bool,
        rust_log: Option<String>,
    ) -> Self {
        let format = settings
            .and_then(|s| s.format.as_deref())
            .map(LogFormat::parse)
            .unwrap_or_default();
        let file = settings.and_then(|s| s.file.clone());

        let filter = if verbose {
            VERBOSE_LEVEL.to_string()
        } else if let Some(directive) = rust_log.filter(|v| !v.trim().is_empty()) {
            directive
        } else {
            settings
                .and_then(|s| s.level.clone())
                .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
        };

        Self {
            format,
            filter,
            file,
        }
    }
}
