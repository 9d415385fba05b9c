//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use refconf_core::Mode;

/// refconf - Resolve references and expressions in JSON configuration files
#[derive(Parser, Debug)]
#[command(name = "refconf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve a document and print the result
    ///
    /// Examples:
    ///   refconf resolve app.jsonc
    ///   refconf resolve app.jsonc --format yaml
    ///   refconf resolve app.jsonc --unrestricted --compact
    Resolve {
        /// Document to resolve
        file: PathBuf,

        #[command(flatten)]
        mode: ModeArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Print one resolved value
    ///
    /// Examples:
    ///   refconf get app.jsonc person.name
    ///   refconf get app.jsonc servers.0 --raw
    Get {
        /// Document to resolve
        file: PathBuf,

        /// Dot-separated path of the value
        path: String,

        #[command(flatten)]
        mode: ModeArgs,

        /// Print strings without JSON quoting
        #[arg(long)]
        raw: bool,
    },

    /// Resolve a document and report whether it succeeds
    Check {
        /// Document to check
        file: PathBuf,

        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Show the references each value depends on
    Deps {
        /// Document to inspect
        file: PathBuf,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   refconf completions bash > ~/.local/share/bash-completion/completions/refconf
    ///   refconf completions zsh > ~/.zfunc/_refconf
    ///   refconf completions fish > ~/.config/fish/completions/refconf.fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Evaluation mode selection shared by resolving commands
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeArgs {
    /// Evaluation mode (restricted or unrestricted)
    #[arg(short, long, env = "REFCONF_MODE")]
    pub mode: Option<Mode>,

    /// Shorthand for `--mode unrestricted`
    #[arg(long)]
    pub unrestricted: bool,
}

impl ModeArgs {
    /// The selected mode. `--unrestricted` wins over `--mode`.
    pub fn resolve(&self) -> Mode {
        if self.unrestricted {
            Mode::Unrestricted
        } else {
            self.mode.unwrap_or_default()
        }
    }
}

/// Output formats for `resolve`
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}
