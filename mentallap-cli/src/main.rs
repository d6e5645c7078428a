//! mentallap CLI - run and maintain The Mental Lap server
//!
//! - `serve`: HTTP server (JSON API plus server-rendered pages)
//! - `migrate`: apply database migrations
//! - `seed`: insert demo coaches, athletes, workshops and articles
//! - `users`: password resets, role changes, listing
//! - `mail test`: send a test email through the configured transport

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod config;
mod tracing_setup;

use commands::{DbArgs, MailArgs, ServeArgs, UsersArgs};
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "mentallap",
    author,
    version,
    about = "Run and maintain The Mental Lap athlete mental-performance server",
    long_about = "Serve the journal, workshop, booking and form-analysis platform, apply \
                  migrations, seed demo data and manage accounts."
)]
struct Cli {
    /// Debug logging (RUST_LOG still takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (needs the telemetry feature)
    #[arg(long, global = true)]
    otel: bool,

    /// Config file (default: ~/.mentallap/config.toml)
    #[arg(long, global = true, env = "MENTALLAP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Apply pending database migrations
    Migrate(DbArgs),
    /// Insert demo data (safe to run repeatedly)
    Seed(DbArgs),
    /// Account maintenance
    Users(UsersArgs),
    /// Mail transport checks
    Mail(MailArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();
    config::load_dotenv();

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config_path).await,
        Commands::Migrate(args) => commands::run_migrate(args).await,
        Commands::Seed(args) => commands::run_seed(args).await,
        Commands::Users(args) => commands::run_users(args).await,
        Commands::Mail(args) => commands::run_mail(args, config_path).await,
        Commands::Completions(args) => run_completions(args),
    };

    tracing_setup::shutdown_otel();
    result
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn set_role_takes_email_and_role() {
        let cli = Cli::try_parse_from([
            "mentallap",
            "users",
            "set-role",
            "coach@example.com",
            "coach",
            "--database-url",
            "postgres://localhost/mentallap",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Users(_)));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from([
            "mentallap",
            "mail",
            "test",
            "--config",
            "/tmp/mentallap.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/mentallap.toml")));
    }
}
