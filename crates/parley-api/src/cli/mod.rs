//! CLI command definitions for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod models;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Chat proxy between web clients and a multimodal LLM provider.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, env = "PARLEY_CONFIG", default_value = "parley.toml")]
    pub config: PathBuf,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "info",
            1 => "info,parley=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server.
    Serve {
        /// Port to listen on (overrides `server.port`).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides `server.host`).
        #[arg(long)]
        host: Option<String>,
    },

    /// List models available to the configured API key.
    Models {
        /// Include models that cannot be used for chat.
        #[arg(long)]
        all: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["parley", "serve", "--port", "9000", "--host", "0.0.0.0"])
            .unwrap();
        match cli.command {
            Commands::Serve { port, host } => {
                assert_eq!(port, Some(9000));
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
            }
            Commands::Models { .. } => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_models_with_globals() {
        let cli = Cli::try_parse_from(["parley", "models", "--all", "-vv", "--config", "x.toml"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Models { all: true }));
        assert_eq!(cli.config, PathBuf::from("x.toml"));
        assert_eq!(cli.default_log_filter(), "trace");
    }

    #[test]
    fn test_default_log_filter_levels() {
        let quiet = Cli::try_parse_from(["parley", "--quiet", "serve"]).unwrap();
        assert_eq!(quiet.default_log_filter(), "error");
        let verbose = Cli::try_parse_from(["parley", "-v", "serve"]).unwrap();
        assert_eq!(verbose.default_log_filter(), "info,parley=debug");
    }
}
