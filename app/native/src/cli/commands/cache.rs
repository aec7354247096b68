//! Fit-cache CLI commands.

use std::io::{self, IsTerminal};
use std::path::Path;

use clap::Subcommand;
use colored::Colorize;

use crate::cache;
use crate::config;
use crate::error::AgentError;
use crate::platform::DrmDisplays;
use crate::wallpaper::catalog::{self, CatalogOptions, CatalogScan};
use crate::wallpaper::fit_cache::target_resolution;
use crate::wallpaper::generate::generate_all_streaming;
use crate::wallpaper::{DisplaySource, FsDirectory};

/// Cache subcommands for managing fitted wallpapers.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum CacheCommands {
    /// Show the fit-cache directory location.
    #[command(after_long_help = r#"Examples:
  wallpaper-agent cache path    # Print the fit-cache directory path"#)]
    Path,

    /// Remove every fitted image.
    ///
    /// Fitted images are regenerated on demand, so this only costs time.
    #[command(after_long_help = r#"Examples:
  wallpaper-agent cache clear   # Delete the fit-cache directory"#)]
    Clear,

    /// Fit every catalog image to the largest connected display.
    ///
    /// Images already fitted for the current resolution are skipped.
    #[command(after_long_help = r#"Examples:
  wallpaper-agent cache generate   # Pre-generate all fitted images"#)]
    Generate,
}

/// Execute cache subcommands.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the cache cannot
/// be cleared or the watched directory cannot be read.
pub fn execute(cmd: &CacheCommands, config_path: Option<&Path>) -> Result<(), AgentError> {
    let loaded = config::load(config_path)?;
    let cache_dir = loaded.config.cache_dir();

    match cmd {
        CacheCommands::Path => {
            println!("{}", cache_dir.display());
        }
        CacheCommands::Clear => {
            if !cache_dir.exists() {
                println!("Cache directory does not exist. Nothing to clear.");
                return Ok(());
            }
            let bytes_freed = cache::clear_dir(&cache_dir)?;
            println!(
                "Cache cleared successfully. Freed {}.",
                cache::format_bytes(bytes_freed).bold()
            );
        }
        CacheCommands::Generate => {
            let options = CatalogOptions::from_config(&loaded.config);
            let candidates = match catalog::refresh(&FsDirectory, &options, None, None)? {
                CatalogScan::Ready { catalog, .. } => catalog.candidates().to_vec(),
                CatalogScan::Empty { .. } => Vec::new(),
            };

            let target = target_resolution(&DrmDisplays::default().list_displays());
            let stdout = io::stdout();
            let is_tty = stdout.is_terminal();
            let summary = generate_all_streaming(stdout, is_tty, &candidates, &cache_dir, target);

            if summary.errors > 0 {
                tracing::warn!(errors = summary.errors, "some images could not be fitted");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: CacheCommands,
    }

    #[test]
    fn test_cache_path_parse() {
        let cli = TestCli::try_parse_from(["test", "path"]).unwrap();
        assert!(matches!(cli.command, CacheCommands::Path));
    }

    #[test]
    fn test_cache_clear_parse() {
        let cli = TestCli::try_parse_from(["test", "clear"]).unwrap();
        assert!(matches!(cli.command, CacheCommands::Clear));
    }

    #[test]
    fn test_cache_generate_parse() {
        let cli = TestCli::try_parse_from(["test", "generate"]).unwrap();
        assert!(matches!(cli.command, CacheCommands::Generate));
    }
}
