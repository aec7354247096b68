//! Long-running agent lifecycle.
//!
//! Wires the production collaborators into a [`Scheduler`], runs it on a
//! single-threaded tokio runtime and rebuilds it whenever the configuration
//! file changes.

use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;

use crate::config::{self, AgentConfig, ConfigError, GateVariant, LoadedConfig, PrimaryOrientation};
use crate::error::AgentError;
use crate::platform::{DesktopNotifier, DrmDisplays, GSettingsSink, ScreenSaverLock};
use crate::wallpaper::{
    Collaborators, FsDirectory, LockSource, Notifier, RunExit, RunOptions, Scheduler,
    SchedulerOptions,
};

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOverrides {
    pub directory: Option<PathBuf>,
    pub min_interval: Option<u64>,
    pub max_interval: Option<u64>,
    pub no_notifications: bool,
    pub gate: Option<GateVariant>,
    pub orientation: Option<PrimaryOrientation>,
}

impl RunOverrides {
    /// Applies the overrides and re-validates the result.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when the combined values break an
    /// invariant, or `ConfigError::IoError` when the directory cannot be made
    /// absolute.
    pub fn apply(&self, config: &mut AgentConfig) -> Result<(), ConfigError> {
        if let Some(directory) = &self.directory {
            // Relative to the working directory, not the config file
            let absolute = std::path::absolute(directory)?;
            config.watch_directory = absolute.to_string_lossy().into_owned();
        }
        if let Some(min) = self.min_interval {
            config.min_interval_seconds = min;
        }
        if let Some(max) = self.max_interval {
            config.max_interval_seconds = max;
        }
        if self.no_notifications {
            config.notifications_enabled = false;
        }
        if let Some(gate) = self.gate {
            config.gate_variant = gate;
        }
        if let Some(orientation) = self.orientation {
            config.primary_orientation = orientation;
        }
        config.validate()
    }
}

/// Builds the desktop-backed collaborators for `config`.
///
/// # Errors
///
/// Returns `AgentError::NotificationInit` when notifications are enabled but
/// no server answers, and `AgentError::LockSourceInit` when the lock-aware
/// gate is configured but the screensaver service is unreachable.
pub fn production_collaborators(config: &AgentConfig) -> Result<Collaborators, AgentError> {
    let notifier = if config.notifications_enabled {
        Notifier::new(Box::new(DesktopNotifier::connect()?))
    } else {
        Notifier::disabled()
    };

    let lock: Option<Box<dyn LockSource>> = match ScreenSaverLock::connect(&config.lock_screen) {
        Ok(lock) => Some(Box::new(lock)),
        Err(err) if config.gate_variant == GateVariant::LockAware => return Err(err.into()),
        Err(err) => {
            tracing::debug!(error = %err, "no lock state source, notifications always shown");
            None
        }
    };

    Ok(Collaborators {
        directory: Box::new(FsDirectory),
        displays: Box::new(DrmDisplays::default()),
        settings: Box::new(GSettingsSink::new(config.desktop.clone())),
        lock,
        notifier,
    })
}

/// Starts a scheduler with production collaborators and an OS-seeded RNG.
///
/// # Errors
///
/// Returns any startup error from [`production_collaborators`] or
/// [`Scheduler::start`].
pub fn build_scheduler(config: &AgentConfig) -> Result<Scheduler, AgentError> {
    let collaborators = production_collaborators(config)?;
    let rng = StdRng::from_rng(&mut rand::rng());
    Scheduler::start(SchedulerOptions::from_config(config), collaborators, Box::new(rng))
}

/// Loads the configuration from `path` (or the default locations) with overrides.
fn load_with_overrides(
    path: Option<&std::path::Path>,
    overrides: &RunOverrides,
) -> Result<LoadedConfig, AgentError> {
    let mut loaded = config::load(path)?;
    overrides.apply(&mut loaded.config)?;
    Ok(loaded)
}

/// Runs the agent until SIGINT or SIGTERM.
///
/// The configuration file is watched; on change the scheduler is rebuilt and
/// takes over the running one's rotation state. A rebuild that fails keeps
/// the running scheduler.
///
/// # Errors
///
/// Returns a startup error from the first scheduler build, or
/// `AgentError::Runtime` if the async runtime cannot be created.
pub fn run(loaded: LoadedConfig, overrides: &RunOverrides, once: bool) -> Result<(), AgentError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AgentError::Runtime(format!("failed to start runtime: {err}")))?;

    let mut scheduler = build_scheduler(&loaded.config)?;
    let config_path = loaded.path;

    let mut reload = match (&config_path, once) {
        (Some(path), false) => {
            let (tx, rx) = mpsc::unbounded_channel();
            config::watch_config_file(path.clone(), tx);
            Some(rx)
        }
        _ => None,
    };

    let mut run_options = RunOptions {
        once,
        tick_immediately: true,
    };

    loop {
        let exit = runtime.block_on(scheduler.run(&mut reload, run_options))?;

        match exit {
            RunExit::Shutdown => break,
            RunExit::Reload => {
                tracing::info!("configuration changed, reloading");
                match load_with_overrides(config_path.as_deref(), overrides)
                    .and_then(|loaded| build_scheduler(&loaded.config))
                {
                    Ok(mut next) => {
                        next.adopt_state(&mut scheduler);
                        scheduler.shutdown();
                        scheduler = next;
                        run_options.tick_immediately = true;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "reload failed, keeping previous configuration");
                        run_options.tick_immediately = false;
                    }
                }
            }
        }
    }

    scheduler.shutdown();
    tracing::info!("wallpaper agent stopped");
    Ok(())
}
