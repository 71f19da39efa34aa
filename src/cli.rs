use crate::commands;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "source-sweep",
    version,
    about = "Tidy template trees: collapse blank lines and migrate legacy class names"
)]
struct Cli {
    /// Increase verbosity (-v, -vv). Uses RUST_LOG under the hood
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct Target {
    /// Path to sweep.toml (defaults to ./sweep.toml when present)
    #[arg(long)]
    config: Option<String>,
    /// Directory to process (overrides sweep.root)
    #[arg(long)]
    root: Option<PathBuf>,
    /// Print the run outcome as JSON instead of a text report
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Collapse blank-line runs and strip trailing whitespace
    Format {
        #[command(flatten)]
        target: Target,
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Rewrite legacy class names and add the namespaced imports
    Migrate {
        #[command(flatten)]
        target: Target,
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Show blank-line statistics without touching files
    Stats {
        #[command(flatten)]
        target: Target,
    },
    /// Fail if any file would be formatted or migrated
    Check {
        #[command(flatten)]
        target: Target,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}

fn dispatch(cli: Cli) -> Result<()> {
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Format { target, dry_run } => commands::format(
            target.config.as_deref(),
            target.root.as_deref(),
            dry_run,
            target.json,
        )?,
        Commands::Migrate { target, dry_run } => commands::migrate(
            target.config.as_deref(),
            target.root.as_deref(),
            dry_run,
            target.json,
        )?,
        Commands::Stats { target } => commands::stats(
            target.config.as_deref(),
            target.root.as_deref(),
            target.json,
        )?,
        Commands::Check { target } => commands::check(
            target.config.as_deref(),
            target.root.as_deref(),
            target.json,
        )?,
    }

    Ok(())
}

pub fn run_cli() -> Result<()> {
    dispatch(Cli::parse())
}

pub fn run_cli_with<I, S>(args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    dispatch(Cli::try_parse_from(args)?)
}
