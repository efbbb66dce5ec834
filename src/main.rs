#![deny(unsafe_code)]

mod binding;
mod common;
mod config;
mod constants;
mod editor;
mod gui;
mod monitor;
mod poll;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::binding::{FieldId, RenderHint};
use crate::config::{ConfigStore, resolve_config_path};
use crate::monitor::Variant;

#[derive(Parser)]
#[command(name = "status-overlay")]
#[command(version)]
#[command(about = "Character status overlay and settings toggle panel", long_about = None)]
struct Cli {
    /// Open the settings toggle panel instead of the monitor
    #[arg(long)]
    toggle: bool,

    /// INI file to read and write (default: ./config.ini, then the user config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Also show insurance and invite flags
    #[arg(long)]
    extended: bool,

    /// Show automation flags as icons from [Paths] STATUS_ICON_DIR
    #[arg(long)]
    icons: bool,

    /// Setting to show in the toggle panel, as SECTION.KEY (repeatable)
    #[arg(long = "setting", value_name = "SECTION.KEY", value_parser = parse_field_id)]
    settings: Vec<FieldId>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn parse_field_id(raw: &str) -> Result<FieldId, String> {
    FieldId::parse(raw).ok_or_else(|| format!("expected SECTION.KEY, got {raw:?}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --debug
    let default_level = if cli.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let path = resolve_config_path(cli.config);
    info!(path = %path.display(), version = env!("CARGO_PKG_VERSION"), "Using config file");
    let store = ConfigStore::new(path);

    if cli.toggle {
        gui::run_editor(store, cli.settings)
    } else {
        if !cli.settings.is_empty() {
            warn!("--setting only applies with --toggle, ignoring");
        }
        let variant = if cli.extended {
            Variant::Extended
        } else {
            Variant::Basic
        };
        let hint = if cli.icons {
            RenderHint::IconPair
        } else {
            RenderHint::Text
        };
        gui::run_monitor(store, variant, hint)
    }
}
