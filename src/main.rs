use anyhow::Result;
use clap::Parser;
use tracing::debug;

use cdslogviewer_client::app_state::build_app_state;
use cdslogviewer_client::cli::{self, Cli};
use cdslogviewer_client::config::ClientConfig;
use cdslogviewer_client::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Flags fall back to LOGVIEWER_* variables, which may come from .env
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    args.apply_overrides(&mut config);
    let config = cli::ensure_valid(config)?;

    let _guard = init_tracing(&config.log_level, config.log_dir.as_deref());
    debug!(base_url = %config.base_url, root = %config.deployment_root, "configuration loaded");

    let state = build_app_state(&config)?;
    cli::run(args.command, state).await
}
