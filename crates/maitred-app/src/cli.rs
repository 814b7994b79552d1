//! CLI argument definitions for the maitred application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// maitred - a conversational banquet-booking assistant server.
#[derive(Parser, Debug)]
#[command(name = "maitred", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// HTTP server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Data directory for session files and OAuth tokens.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > MAITRED_CONFIG env var > ./maitred.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("MAITRED_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("maitred.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config_flag_wins() {
        let args = CliArgs {
            config: Some(PathBuf::from("/etc/maitred/custom.toml")),
            port: None,
            data_dir: None,
            log_level: None,
        };
        assert_eq!(
            args.resolve_config_path(),
            PathBuf::from("/etc/maitred/custom.toml")
        );
    }

    #[test]
    fn test_defaults_to_local_file() {
        let args = CliArgs {
            config: None,
            port: None,
            data_dir: None,
            log_level: None,
        };
        if std::env::var("MAITRED_CONFIG").is_err() {
            assert_eq!(args.resolve_config_path(), PathBuf::from("maitred.toml"));
        }
    }
}
