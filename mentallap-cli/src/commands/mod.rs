//! Command implementations for the mentallap CLI

pub mod db;
pub mod mail;
pub mod serve;
pub mod users;

use anyhow::{Context, Result};
use clap::Args;
use sqlx::PgPool;

// Re-export dispatcher functions for flat access from main.rs
pub use db::{run_migrate, run_seed};
pub use mail::{run_mail, MailArgs};
pub use serve::{run_serve, ServeArgs};
pub use users::{run_users, UsersArgs};

/// Database connection shared by every command that touches Postgres
#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    /// Database URL (overrides environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

impl DbArgs {
    pub fn url(&self) -> Result<&str> {
        self.database_url.as_deref().context(
            "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or ~/.mentallap/.env",
        )
    }

    pub async fn connect(&self) -> Result<PgPool> {
        mentallap_server::create_pool(self.url()?)
            .await
            .context("Failed to create database pool")
    }
}
