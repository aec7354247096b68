//! The `run` command: the long-running rotation agent.

use std::path::{Path, PathBuf};

use clap::Args;

use super::types::{CliGateVariant, CliOrientation};
use crate::agent::{self, RunOverrides};
use crate::config;
use crate::error::AgentError;

/// Arguments for the rotation agent.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    /// Apply a single change and exit.
    #[arg(long)]
    pub once: bool,

    /// Directory of wallpaper images. Overrides `watchDirectory`.
    #[arg(long, short, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Minimum delay between changes, in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub min_interval: Option<u64>,

    /// Maximum delay between changes, in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub max_interval: Option<u64>,

    /// Do not show desktop notifications.
    #[arg(long)]
    pub no_notifications: bool,

    /// How wallpaper and lock-screen updates are scheduled.
    #[arg(long, value_enum)]
    pub gate: Option<CliGateVariant>,

    /// Which image orientation is eligible.
    #[arg(long, value_enum)]
    pub orientation: Option<CliOrientation>,
}

impl RunArgs {
    /// Converts the flags into configuration overrides.
    #[must_use]
    pub fn overrides(&self) -> RunOverrides {
        RunOverrides {
            directory: self.directory.clone(),
            min_interval: self.min_interval,
            max_interval: self.max_interval,
            no_notifications: self.no_notifications,
            gate: self.gate.map(Into::into),
            orientation: self.orientation.map(Into::into),
        }
    }
}

/// Execute the run command.
///
/// # Errors
///
/// Returns a startup error if the configuration is invalid or the agent
/// cannot start.
pub fn execute(args: &RunArgs, config_path: Option<&Path>) -> Result<(), AgentError> {
    let mut loaded = config::load(config_path)?;
    let overrides = args.overrides();
    overrides.apply(&mut loaded.config)?;

    tracing::info!(
        directory = %loaded.config.watch_dir().display(),
        gate = ?loaded.config.gate_variant,
        "starting wallpaper agent"
    );

    agent::run(loaded, &overrides, args.once)
}
