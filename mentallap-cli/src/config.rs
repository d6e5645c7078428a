//! Environment and config-file loading shared by the subcommands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mentallap_server::AppConfig;
use tracing::{debug, info};

/// Load `.env` from the working directory, then `~/.mentallap/.env`.
///
/// Variables already set in the process win over both files.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("loaded .env from {}", path.display()),
        Err(_) => debug!("no .env in current directory"),
    }

    if let Some(path) = global_env_path() {
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(()) => info!("loaded {}", path.display()),
                Err(e) => debug!("could not load {}: {}", path.display(), e),
            }
        }
    }
}

fn global_env_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".mentallap").join(".env"))
}

/// Config file (explicit path or default location) overlaid with the
/// process environment.
pub fn load_app_config(path: Option<&Path>) -> Result<AppConfig> {
    load_app_config_with(path, |key| std::env::var(key).ok())
}

fn load_app_config_with<F>(path: Option<&Path>, lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = AppConfig::load(path).context("Failed to load config file")?;
    config
        .apply_env(lookup)
        .context("Invalid configuration in environment")?;
    Ok(config)
}
