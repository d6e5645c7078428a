//! HTTP server command
//!
//! Loads config, connects to Postgres, applies migrations and serves the
//! API plus pages until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use mentallap_server::{migrate, run_server, AppState};

use super::DbArgs;
use crate::config::load_app_config;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default from config: 127.0.0.1:3000)
    #[arg(long, short = 'b', env = "MENTALLAP_BIND")]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Skip applying migrations at startup
    #[arg(long)]
    pub no_migrate: bool,

    #[command(flatten)]
    pub db: DbArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_app_config(config_path)?;
    if let Some(bind) = args.bind {
        config.server.bind = bind.to_string();
    }
    if args.cors_permissive {
        config.server.cors_permissive = true;
    }

    let pool = args.db.connect().await?;
    if args.no_migrate {
        tracing::info!("skipping migrations");
    } else {
        migrate(&pool).await.context("Failed to apply migrations")?;
    }

    tracing::info!("Starting mentallap server on {}", config.server.bind);
    let state = AppState::from_config(pool, config).context("Failed to set up mail transport")?;

    // Blocks until shutdown
    run_server(state).await.context("Server error")?;

    Ok(())
}
