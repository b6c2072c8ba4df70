//! Chain RPC gateway.
//!
//! Keeps a pool of RPC endpoints per chain, sweeps them for liveness in the
//! background and serves block height queries from the first healthy endpoint
//! in configuration order.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                 CHAIN GATEWAY                │
//!                     │                                              │
//!   GET /api/v1/...   │  ┌────────┐   ┌─────────┐   ┌─────────────┐  │
//!   ──────────────────┼─▶│  http  │──▶│ service │──▶│ blockchain  │  │
//!                     │  │ server │   │  chain  │   │ NodeManager │  │
//!                     │  └────────┘   └─────────┘   └──────┬──────┘  │
//!                     │                                    │         │
//!                     │                                    ▼         │
//!                     │                           ┌──────────────┐   │      RPC
//!                     │                           │load_balancer │───┼───▶ nodes
//!                     │                           │ pool + first │   │
//!                     │                           │   healthy    │   │
//!                     │                           └──────▲───────┘   │
//!                     │                                  │           │
//!                     │                           ┌──────┴───────┐   │
//!                     │                           │    health    │   │
//!                     │                           │ sweep + probe│   │
//!                     │                           └──────────────┘   │
//!                     │                                              │
//!                     │  config · observability · lifecycle ·        │
//!                     │  registry · resilience                       │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use chain_gateway::config::loader::{load_config, resolve_config_path};
use chain_gateway::lifecycle;
use chain_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "chain-gateway", version)]
#[command(about = "Multi-endpoint chain RPC gateway", long_about = None)]
struct Cli {
    /// Config file. Defaults to configs/config-local.toml, then configs/config-debug.toml.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let path = resolve_config_path(cli.config.as_deref());
    let config = load_config(&path)?;

    logging::init_logging(&config.observability);
    tracing::info!(path = %path.display(), "Configuration loaded");

    lifecycle::run(config).await?;
    Ok(())
}
