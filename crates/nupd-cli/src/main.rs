//! nupd CLI
//!
//! The command-line interface for updating directory trees from a content
//! source.

mod cli;
mod commands;
mod error;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Some(cmd) => execute_command(cmd, cli.config.as_deref()),
        None => {
            // No command provided - show help hint
            println!("{} content updater", "nupd".green().bold());
            println!();
            println!("Run {} for available commands.", "nupd --help".cyan());
            Ok(())
        }
    }
}

/// Log to stderr so JSON on stdout stays parseable.
fn init_tracing(verbose: bool) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_target(verbose);
    let result = if verbose {
        tracing::subscriber::set_global_default(builder.with_max_level(Level::DEBUG).finish())
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing::subscriber::set_global_default(builder.with_env_filter(filter).finish())
    };
    result.map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {}", e)))?;
    tracing::debug!("Verbose mode enabled");
    Ok(())
}

fn execute_command(cmd: Commands, config: Option<&std::path::Path>) -> Result<()> {
    match cmd {
        Commands::Update {
            root,
            source,
            dry_run,
            json,
        } => {
            let config = commands::load_config(config)?;
            commands::run_update(&root, &source, dry_run, json, &config)
        }
        Commands::Check { root, source, json } => {
            let config = commands::load_config(config)?;
            commands::run_check(&root, &source, json, &config)
        }
        Commands::Manifest { dir, output } => commands::run_manifest(&dir, output.as_deref()),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "nupd", &mut std::io::stdout());
            Ok(())
        }
    }
}
