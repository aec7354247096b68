//! Config CLI commands.
//!
//! Commands for managing the agent's configuration file.

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::config_paths;
use crate::config::template::{create_config_file, generate_config_template};
use crate::error::AgentError;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Initialize a new configuration file with all options documented.
    ///
    /// Every option is written with its default value and a comment
    /// describing it.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  wallpaper-agent config init              # Create config at default location
  wallpaper-agent config init --force      # Overwrite existing config
  wallpaper-agent config init --path ~/my-config.jsonc  # Create at custom path
  wallpaper-agent config init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite existing configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        /// If not specified, uses ~/.config/wallpaper-agent/config.jsonc
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the configuration template to stdout instead of writing to a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Show the configuration file search paths.
    ///
    /// Marks the file that is currently in use, if any.
    Path,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be written.
pub fn execute(cmd: &ConfigCommands) -> Result<(), AgentError> {
    match cmd {
        ConfigCommands::Init { force, path, stdout } => {
            if *stdout {
                println!("{}", generate_config_template());
                Ok(())
            } else {
                init_config(*force, path.clone())
            }
        }
        ConfigCommands::Path => {
            show_config_path();
            Ok(())
        }
    }
}

/// Initialize a new configuration file.
fn init_config(force: bool, custom_path: Option<PathBuf>) -> Result<(), AgentError> {
    let config_path = custom_path.unwrap_or_else(|| {
        config_paths().into_iter().next().unwrap_or_else(|| PathBuf::from("config.jsonc"))
    });

    if config_path.exists() && !force {
        return Err(AgentError::InvalidArguments(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    create_config_file(&config_path)?;

    println!("Configuration file created at: {}", config_path.display());
    Ok(())
}

/// Show the configuration file search paths.
fn show_config_path() {
    println!("Configuration file search paths (in priority order):\n");

    let mut found_config = false;
    for (i, path) in config_paths().iter().enumerate() {
        let exists = path.exists();
        let marker = if exists && !found_config {
            found_config = true;
            " (active)"
        } else if exists {
            " (exists)"
        } else {
            ""
        };

        println!("  {}. {}{}", i + 1, path.display(), marker);
    }

    if !found_config {
        println!("\nNo configuration file found.");
        println!("Run 'wallpaper-agent config init' to create one.");
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_init_config_writes_template() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.jsonc");

        init_config(false, Some(path.clone())).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_init_config_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.jsonc");
        std::fs::write(&path, "{}").unwrap();

        let err = init_config(false, Some(path.clone())).unwrap_err();
        assert!(matches!(err, AgentError::InvalidArguments(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

        init_config(true, Some(path.clone())).unwrap();
        assert_ne!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
