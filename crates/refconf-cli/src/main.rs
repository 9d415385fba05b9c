//! refconf CLI
//!
//! Resolves `${path}` references and `{{ expr }}` blocks in JSON
//! configuration files from the command line.

mod cli;
mod commands;
mod error;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose or RUST_LOG is set
    if cli.verbose || std::env::var_os("RUST_LOG").is_some() {
        init_tracing(cli.verbose)?;
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!(
                "{} resolve references and expressions in JSON configuration",
                "refconf".green().bold()
            );
            println!();
            println!("Run {} for available commands.", "refconf --help".cyan());
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {}", e)))
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Resolve {
            file,
            mode,
            format,
            compact,
        } => commands::run_resolve(&file, mode.resolve(), format, compact),
        Commands::Get {
            file,
            path,
            mode,
            raw,
        } => commands::run_get(&file, &path, mode.resolve(), raw),
        Commands::Check { file, mode } => commands::run_check(&file, mode.resolve()),
        Commands::Deps { file } => commands::run_deps(&file),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "refconf",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
