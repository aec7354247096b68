//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments, organized into
//! domain-specific submodules:
//!
//! - `cache` - Fit-cache management commands
//! - `config_cmd` - Configuration file commands
//! - `list` - Catalog listing
//! - `run` - The rotation agent
//! - `types` - Shared types used across commands

use std::io;
use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::error::AgentError;
use crate::schema;

pub mod cache;
pub mod config_cmd;
pub mod list;
pub mod run;
pub mod types;

pub use cache::CacheCommands;
pub use config_cmd::ConfigCommands;
pub use run::RunArgs;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Binary name used in completions.
const BIN_NAME: &str = "wallpaper-agent";

/// Wallpaper Agent - rotates the desktop wallpaper and lock screen.
///
/// Runs the rotation agent when invoked without a command.
#[derive(Parser, Debug)]
#[command(name = "wallpaper-agent")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Run the rotation agent (default).
    ///
    /// Changes the wallpaper at random intervals until interrupted. SIGUSR1
    /// triggers an immediate change.
    #[command(after_long_help = r#"Examples:
  wallpaper-agent run                             # Use the configuration file
  wallpaper-agent run --once                      # Apply one change and exit
  wallpaper-agent run -d ~/Pictures --gate alternating
  wallpaper-agent run --min-interval 30 --max-interval 90"#)]
    Run(RunArgs),

    /// List the eligible wallpapers, newest first.
    List {
        /// Output as JSON.
        #[arg(long, short)]
        json: bool,
    },

    /// Fit-cache management commands.
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Configuration file management commands.
    ///
    /// Initialize and locate the configuration file.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output the configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// configuration file. Can be redirected to a file for use with editors
    /// that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    /// Can be used with eval or redirected to a file.
    ///
    /// Usage:
    ///   eval "$(wallpaper-agent completions --shell zsh)"
    ///   wallpaper-agent completions --shell bash > ~/.local/share/bash-completion/completions/wallpaper-agent
    ///   wallpaper-agent completions --shell fish > ~/.config/fish/completions/wallpaper-agent.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> { self.config.as_ref().map(PathBuf::from) }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), AgentError> {
        let config_path = self.config_path();
        let config_path = config_path.as_deref();

        match &self.command {
            None => run::execute(&RunArgs::default(), config_path),
            Some(Commands::Run(args)) => run::execute(args, config_path),
            Some(Commands::List { json }) => list::execute(*json, config_path),
            Some(Commands::Cache(cmd)) => cache::execute(cmd, config_path),
            Some(Commands::Config(cmd)) => config_cmd::execute(cmd),
            Some(Commands::Schema) => {
                println!("{}", schema::generate_schema_json());
                Ok(())
            }
            Some(Commands::Completions { shell }) => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, BIN_NAME, &mut io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use super::types::CliGateVariant;
    use super::*;

    // ========================================================================
    // CLI parsing tests
    // ========================================================================

    #[test]
    fn test_cli_without_command_runs_agent() {
        let cli = Cli::try_parse_from(["wallpaper-agent"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_parses_run_flags() {
        let cli =
            Cli::try_parse_from(["wallpaper-agent", "run", "--once", "--gate", "lock-aware"]).unwrap();
        match cli.command {
            Some(Commands::Run(args)) => {
                assert!(args.once);
                assert_eq!(args.gate, Some(CliGateVariant::LockAware));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parses_schema() {
        let cli = Cli::try_parse_from(["wallpaper-agent", "schema"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Schema)));
    }

    #[test]
    fn test_cli_parses_list_json() {
        let cli = Cli::try_parse_from(["wallpaper-agent", "list", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::List { json: true })));
    }

    #[test]
    fn test_cli_parses_completions_zsh() {
        let cli = Cli::try_parse_from(["wallpaper-agent", "completions", "--shell", "zsh"]).unwrap();
        match cli.command {
            Some(Commands::Completions { shell }) => assert_eq!(shell, Shell::Zsh),
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_cli_parses_cache_generate() {
        let cli = Cli::try_parse_from(["wallpaper-agent", "cache", "generate"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Cache(CacheCommands::Generate))));
    }

    #[test]
    fn test_cli_parses_config_init() {
        let cli = Cli::try_parse_from(["wallpaper-agent", "config", "init", "--stdout"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config(ConfigCommands::Init { stdout: true, .. }))
        ));
    }

    // ========================================================================
    // Global flag tests
    // ========================================================================

    #[test]
    fn test_cli_counts_verbose_flags() {
        let cli = Cli::try_parse_from(["wallpaper-agent", "-vv", "list"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_parses_config_flag_after_subcommand() {
        let cli =
            Cli::try_parse_from(["wallpaper-agent", "list", "--config", "/path/to/config.jsonc"])
                .unwrap();
        assert_eq!(cli.config_path(), Some(PathBuf::from("/path/to/config.jsonc")));
    }

    #[test]
    fn test_cli_config_path_returns_none_when_not_specified() {
        let cli = Cli::try_parse_from(["wallpaper-agent", "schema"]).unwrap();
        assert!(cli.config_path().is_none());
    }

    #[test]
    fn test_cli_definition_is_valid() { Cli::command().debug_assert(); }

    #[test]
    fn test_app_version_is_not_empty() {
        assert!(!APP_VERSION.is_empty());
    }
}
