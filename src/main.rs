//! Cuotas main entry point

use anyhow::Context;
use clap::Parser;
use cuotas_api::start_server;
use cuotas_config::{Config, ConfigError};
use cuotas_core::Ledger;
use cuotas_sheet::open_store;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::RwLock;

#[derive(Parser, Debug)]
#[command(name = "cuotas")]
#[command(version = "0.1.0")]
#[command(about = "Track credit-card purchases paid in installments", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print a commented default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

/// Load the configuration; a missing file means defaults.
///
/// Other failures print their details before logging is up.
fn load_config(path: &Path) -> anyhow::Result<(Config, bool)> {
    match Config::load(path) {
        Ok(config) => Ok((config, false)),
        Err(ConfigError::FileNotFound { .. }) => Ok((Config::default(), true)),
        Err(e) => {
            eprintln!("{}", e.to_details());
            Err(e).with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, config_missing) = load_config(&args.config)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();

    if config_missing {
        warn!("Config file {} not found, using defaults", args.config.display());
    } else {
        info!("Config loaded from {}", args.config.display());
    }

    let rt = Runtime::new()?;
    rt.block_on(async {
        let store = open_store(&config.store).context("Failed to open the ledger store")?;
        let ledger = Ledger::new(store, &config);

        ledger.ensure_schema().await?;
        if config.store.backfill_ids {
            ledger.backfill_ids().await?;
        }

        start_server(config, Arc::new(RwLock::new(ledger))).await
    })
}
