//! Account maintenance: password resets, role changes, listing

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use mentallap_server::db::UserRepo;
use mentallap_server::seed::{reset_passwords, set_role, DEMO_PASSWORD};

use super::DbArgs;

#[derive(Parser, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommands,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    /// Set every account's password and recreate missing staff logins
    ResetPasswords {
        /// New password for all accounts
        #[arg(long, default_value = DEMO_PASSWORD)]
        password: String,

        #[command(flatten)]
        db: DbArgs,
    },
    /// Change an account's role (athlete, coach or admin)
    SetRole {
        /// Account email
        email: String,

        /// New role
        role: String,

        #[command(flatten)]
        db: DbArgs,
    },
    /// List accounts, oldest first
    List {
        /// Output as JSON lines
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        db: DbArgs,
    },
}

pub async fn run_users(args: UsersArgs) -> Result<()> {
    match args.command {
        UsersCommands::ResetPasswords { password, db } => {
            let pool = db.connect().await?;
            let count = reset_passwords(&pool, &password)
                .await
                .context("Password reset failed")?;
            println!("Reset {count} account password(s)");
        }
        UsersCommands::SetRole { email, role, db } => {
            let pool = db.connect().await?;
            let user = set_role(&pool, &email, &role)
                .await
                .with_context(|| format!("Could not set role for {email}"))?;
            println!("{} is now {}", user.email, user.role);
        }
        UsersCommands::List { json, db } => {
            let pool = db.connect().await?;
            let users = UserRepo::new(&pool)
                .list_all()
                .await
                .context("Failed to list users")?;
            for user in &users {
                if json {
                    let line = json!({
                        "id": user.id,
                        "email": user.email,
                        "name": user.name,
                        "role": user.role,
                        "created_at": user.created_at,
                    });
                    println!("{line}");
                } else {
                    println!("{:<8} {:<36} {}", user.role, user.email, user.name);
                }
            }
        }
    }
    Ok(())
}
