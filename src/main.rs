// starpick entry point.
// Parses the CLI, resolves configuration and env fallbacks, runs a session.

mod cache;
mod error;
mod github;
mod select;
mod session;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::error::Result;
use crate::github::ItemSource;
use crate::session::SessionConfig;

const DEFAULT_MAX_HISTORY: i64 = 100;

#[derive(Parser)]
#[command(name = "starpick", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pick random repositories starred by a GitHub profile.
    Star(RunArgs),
    /// Pick random repositories owned by a GitHub user.
    Repo(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Account to fetch repositories from. Falls back to GITHUB_ACCOUNT.
    account: Option<String>,

    /// Total amount of random repositories to pick from.
    #[arg(short, long, default_value_t = 3)]
    total: usize,

    /// Re-fetch all repositories instead of using the cache.
    #[arg(short, long)]
    refresh: bool,

    /// Amount of historic choices to keep. -1 keeps history unlimited, 0
    /// disables it. GH_STAR_MAX_HISTORY overrides the default.
    #[arg(long)]
    max_history: Option<i64>,

    /// Do not exclude repositories on the ignore list.
    #[arg(long)]
    no_ignore: bool,

    /// Maximum amount of repositories to retrieve. 0 fetches all.
    #[arg(long, default_value_t = 0)]
    max_results: usize,

    /// Override the cache directory.
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Ctrl-C at the blocking prompt is a user exit, not an error. Cache
    // writes are atomic, so exiting here cannot leave a corrupt document.
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n{}", session::EXIT_MESSAGE);
            std::process::exit(0);
        }
    });

    let cli = Cli::parse();
    let (source, args) = match cli.command {
        Command::Star(args) => (ItemSource::Stars, args),
        Command::Repo(args) => (ItemSource::Repos, args),
    };

    let result = resolve_config(source, args);
    let config = match result {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    match session::run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

/// Resolve CLI arguments and environment fallbacks into a session config.
fn resolve_config(source: ItemSource, args: RunArgs) -> Result<SessionConfig> {
    let account = args
        .account
        .or_else(|| env::var("GITHUB_ACCOUNT").ok())
        .ok_or(crate::error::StarpickError::MissingAccount)?;

    let max_history = args.max_history.unwrap_or_else(|| {
        env::var("GH_STAR_MAX_HISTORY")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_MAX_HISTORY)
    });

    let cache_root = crate::cache::cache_root(args.cache_dir.as_deref())?;

    Ok(SessionConfig {
        account,
        token: env::var("GITHUB_ACCESS_TOKEN").ok(),
        cache_root,
        source,
        pool_size: args.total,
        refresh: args.refresh,
        max_history,
        ignore_enabled: !args.no_ignore,
        max_results: args.max_results,
    })
}
