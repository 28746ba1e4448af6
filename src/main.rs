use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;
use twitcher::cli::{Cli, Commands};

/// Default log level from repeated -v flags; TWITCHER_LOG overrides
fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging with TWITCHER_LOG environment variable support
    let level =
        std::env::var("TWITCHER_LOG").unwrap_or_else(|_| log_level(cli.verbose).to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        // Use appropriate exit codes based on error type
        let exit_code = match e.downcast_ref::<twitcher::TwitcherError>() {
            Some(twitcher::TwitcherError::Config(_)) => 2,
            Some(twitcher::TwitcherError::Io(_)) => 3,
            Some(twitcher::TwitcherError::Parse(_))
            | Some(twitcher::TwitcherError::Taxonomy(_))
            | Some(twitcher::TwitcherError::UnrecognizedFormat(_))
            | Some(twitcher::TwitcherError::EmptyHistory) => 4,
            Some(twitcher::TwitcherError::Api(_)) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Find(args) => twitcher::cli::commands::find::run(args),
        Commands::Cache(args) => twitcher::cli::commands::cache::run(args),
        Commands::History(args) => twitcher::cli::commands::history::run(args),
    }
}
