//! Blockpost shell - Main entry point
//!
//! Loads inputs, drives a [`BridgeView`] over the in-memory editor store and
//! prints the derived view-state.
//!
//! # Usage
//!
//! ```bash
//! blockpost --help                       # Show help
//! blockpost --external data.yml          # Show view-state for a bundle
//! blockpost --log-level debug -a forward # Enable debug logging
//! ```

mod cli;
mod settings;

pub use cli::Args;

use anyhow::Context;
use blockpost_bridge::loader::{load_external_data, load_snapshot, load_value};
use blockpost_bridge::{BridgeView, EditorStore, LocalExecutor, ViewState};
use clap::Parser;
use serde_json::Value;
use settings::ShellSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Configure logging based on CLI args
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_filter()),
    )
    .init();

    log::info!("Starting blockpost shell");
    log::debug!("CLI args: {:?}", args);

    let mut settings = ShellSettings::load();

    let external_path = args
        .external
        .clone()
        .or_else(|| settings.last_external_path.clone());
    let external: Option<Value> = match &external_path {
        Some(path) => {
            log::info!("Using external data: {:?}", path);
            let data = load_external_data(path)
                .with_context(|| format!("loading external data {:?}", path))?;
            Some(data.to_value())
        }
        None => None,
    };

    let custom_config: Option<Value> = match &args.config {
        Some(path) => {
            Some(load_value(path).with_context(|| format!("loading bridge config {:?}", path))?)
        }
        None => settings.bridge_config.clone(),
    };

    let store = match &args.store {
        Some(path) => EditorStore::with_snapshot(
            load_snapshot(path).with_context(|| format!("loading store snapshot {:?}", path))?,
        ),
        None => EditorStore::new(),
    };

    let view = BridgeView::new(LocalExecutor::new(store.clone()), store);
    let compact = args.compact || settings.compact_output;

    let state = view.view_state(custom_config.as_ref(), external.as_ref());
    print_state(&state, compact)?;

    for kind in &args.actions {
        let outcome = view.dispatch(*kind).await;
        log::info!("Action {}: {:?}", kind, outcome);

        let state = view.view_state(custom_config.as_ref(), external.as_ref());
        print_state(&state, compact)?;
    }

    if args.refreshes > 0 {
        let accepted = (0..args.refreshes)
            .filter(|_| view.refresh().is_dispatched())
            .count();
        log::info!("{} of {} refresh requests accepted", accepted, args.refreshes);

        let state = view.view_state(custom_config.as_ref(), external.as_ref());
        print_state(&state, compact)?;
    }

    if args.save_settings {
        settings.last_external_path = external_path;
        settings.bridge_config = custom_config;
        settings.compact_output = args.compact;
        settings.save().context("saving shell settings")?;
        log::info!("Saved settings to {:?}", ShellSettings::settings_path());
    }

    Ok(())
}

fn print_state(state: &ViewState, compact: bool) -> anyhow::Result<()> {
    let json = if compact {
        serde_json::to_string(state)?
    } else {
        serde_json::to_string_pretty(state)?
    };
    println!("{}", json);
    Ok(())
}
