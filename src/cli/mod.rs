//! Command-line interface.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `prune` | Prune and clean up the build cache |
//!
//! # Example Usage
//!
//! ```bash
//! # Remove everything the cache service considers reclaimable
//! buildprune prune
//!
//! # Keep the last day of cache and up to 2 GB of it
//! buildprune prune --keep-duration 24h --keep-storage 2000
//!
//! # Only prune local source snapshots, showing raw records
//! buildprune --debug prune --filter type=source.local
//! ```

mod duration;
pub mod prune;

pub use duration::{parse_duration, parse_storage_mb};
pub use prune::PruneArgs;

use crate::Result;
use crate::config::PruneConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Buildprune - prune and clean up the build cache.
#[derive(Parser, Debug)]
#[command(name = "buildprune")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Dump raw cache records instead of the table.
    #[arg(short = 'D', long, global = true)]
    pub debug: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Cache service endpoint (overrides config).
    #[arg(long, global = true, value_name = "URL")]
    pub backend: Option<String>,

    /// Stop waiting on the cache service after this long.
    #[arg(long, global = true, value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prune and clean up the build cache.
    Prune(PruneArgs),
}

impl Cli {
    /// Applies global flags on top of loaded configuration.
    #[must_use]
    pub fn apply_overrides(&self, mut config: PruneConfig) -> PruneConfig {
        if let Some(backend) = &self.backend {
            config = config.with_endpoint(backend.clone());
        }
        if self.debug {
            config = config.with_debug(true);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        config
    }
}

/// Runs the selected command.
///
/// # Errors
///
/// Returns the command's error; see [`crate::Error`].
pub async fn run(cli: Cli, config: PruneConfig) -> Result<()> {
    match cli.command {
        Commands::Prune(args) => prune::execute(&args, &config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_override_config() {
        let cli = Cli::try_parse_from([
            "buildprune",
            "prune",
            "-D",
            "--backend",
            "http://cache:9000",
            "--timeout",
            "30s",
        ])
        .expect("valid invocation");

        let config = cli.apply_overrides(PruneConfig::new());
        assert!(config.debug);
        assert_eq!(config.endpoint, "http://cache:9000");
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let cli = Cli::try_parse_from(["buildprune", "prune"]).expect("valid invocation");
        let base = PruneConfig::new().with_debug(true);
        assert_eq!(cli.apply_overrides(base.clone()), base);
    }
}
