//! Command-line interface for the blockpost shell
//!
//! # Usage
//!
//! ```bash
//! # Derive view-state for an external bundle
//! blockpost --external data/external.yml
//!
//! # Transfer it into the store, then show the result
//! blockpost --external data/external.json --action forward --action refresh
//!
//! # Start from a stored editor snapshot with custom bridge config
//! blockpost --store snapshot.json --config bridge.yml --log-level debug
//! ```

use std::path::PathBuf;

use blockpost_bridge::ActionKind;
use clap::Parser;

/// Blockpost shell - preview the bridge view-state from the command line
///
/// Loads external editor data and an optional store snapshot, runs the
/// requested actions through the bridge, and prints the derived view-state
/// as JSON after each step.
#[derive(Parser, Debug, Clone)]
#[command(name = "blockpost")]
#[command(version)]
#[command(about = "Preview the blockpost bridge view-state", long_about = None)]
pub struct Args {
    /// External data bundle (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    pub external: Option<PathBuf>,

    /// Custom bridge configuration (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Editor store snapshot to start from (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Action to run, in order. May be repeated.
    ///
    /// One of: forward, reverse, bidirectional, reset, refresh, validate,
    /// refresh-external
    #[arg(short, long = "action", value_name = "ID", value_parser = parse_action)]
    pub actions: Vec<ActionKind>,

    /// Refresh requests issued before the final view-state
    #[arg(long, default_value = "0", value_name = "N")]
    pub refreshes: u32,

    /// Log level for output
    ///
    /// Controls the verbosity of log output. Available levels:
    /// error, warn, info, debug, trace
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    pub log_level: String,

    /// Print single-line JSON
    #[arg(long)]
    pub compact: bool,

    /// Remember the external path and config as defaults
    #[arg(long)]
    pub save_settings: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            external: None,
            config: None,
            store: None,
            actions: Vec::new(),
            refreshes: 0,
            log_level: "info".to_string(),
            compact: false,
            save_settings: false,
        }
    }
}

impl Args {
    /// Get log level as env_logger filter string
    pub fn log_filter(&self) -> &str {
        match self.log_level.to_lowercase().as_str() {
            "error" => "error",
            "warn" | "warning" => "warn",
            "info" => "info",
            "debug" => "debug",
            "trace" => "trace",
            _ => "info",
        }
    }
}

fn parse_action(id: &str) -> Result<ActionKind, String> {
    ActionKind::from_id(id).ok_or_else(|| {
        let known: Vec<&str> = ActionKind::ALL.iter().map(|kind| kind.id()).collect();
        format!("unknown action '{}' (expected one of: {})", id, known.join(", "))
    })
}
