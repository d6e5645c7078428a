//! Schema migrations and demo data

use anyhow::{Context, Result};
use chrono::Utc;

use mentallap_server::migrate;
use mentallap_server::seed::{seed, DEMO_PASSWORD};

use super::DbArgs;

pub async fn run_migrate(args: DbArgs) -> Result<()> {
    let pool = args.connect().await?;
    migrate(&pool).await.context("Failed to apply migrations")?;
    println!("Migrations applied");
    Ok(())
}

/// Migrate, then insert whatever demo data is missing.
pub async fn run_seed(args: DbArgs) -> Result<()> {
    let pool = args.connect().await?;
    migrate(&pool).await.context("Failed to apply migrations")?;

    let report = seed(&pool, Utc::now()).await.context("Seeding failed")?;

    println!("Seed complete:");
    println!("  users:           {}", report.users);
    println!("  journal entries: {}", report.journal_entries);
    println!("  workshops:       {}", report.workshops);
    println!("  articles:        {}", report.articles);
    println!("  form analyses:   {}", report.analyses);
    if report.users > 0 {
        println!("New demo accounts use the password \"{DEMO_PASSWORD}\"");
    }
    Ok(())
}
