//! Rotation scheduler.
//!
//! Owns the catalog, the unseen set, the gate, the fit cache and every
//! collaborator. Each tick is synchronous; the only suspension point is the
//! randomized sleep between ticks, which signals and configuration changes
//! can interrupt.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use rand::{Rng, RngCore};
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc::UnboundedReceiver;

use super::catalog::{self, Candidate, Catalog, CatalogOptions, CatalogScan};
use super::fit_cache::FitCache;
use super::gate::{LockGate, Target, make_gate};
use super::notifier::Notifier;
use super::selection::{SelectionPolicy, UnseenSet, choose_existing, make_policy};
use super::source::{DirectorySource, DisplaySource, LockSource, SettingError, SettingSink};
use crate::config::{AgentConfig, CatalogStyle, ConfigChanged, GateVariant, SelectionPolicyKind};
use crate::error::AgentError;
use crate::platform::path::file_uri;

/// Scheduler settings derived from the configuration.
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    pub catalog: CatalogOptions,
    pub min_interval: Duration,
    pub max_interval: Duration,
    pub gate: GateVariant,
    pub policy: SelectionPolicyKind,
    pub fit_to_display: bool,
    pub prewarm_cache: bool,
    pub cache_dir: PathBuf,
}

impl SchedulerOptions {
    #[must_use]
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            catalog: CatalogOptions::from_config(config),
            min_interval: Duration::from_secs(config.min_interval_seconds),
            max_interval: Duration::from_secs(config.max_interval_seconds),
            gate: config.gate_variant,
            policy: config.selection_policy,
            fit_to_display: config.fit_to_display,
            prewarm_cache: config.prewarm_cache,
            cache_dir: config.cache_dir(),
        }
    }
}

/// The side effects a scheduler performs.
pub struct Collaborators {
    pub directory: Box<dyn DirectorySource>,
    pub displays: Box<dyn DisplaySource>,
    pub settings: Box<dyn SettingSink>,
    /// Required by the lock-aware gate; optional otherwise.
    pub lock: Option<Box<dyn LockSource>>,
    pub notifier: Notifier,
}

/// Why a tick applied nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The directory could not be listed.
    CatalogUnreadable,
    /// The directory holds no eligible image.
    EmptyCatalog,
    /// The lock state is required but could not be read.
    LockStateUnavailable,
    /// The gate authorized nothing.
    Gated,
}

/// One attempted update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub target: Target,
    pub name: String,
    pub path: PathBuf,
    /// Whether the settings write succeeded.
    pub success: bool,
}

/// What a tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub skipped: Option<SkipReason>,
    pub applied: Vec<Applied>,
}

impl TickReport {
    const fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            applied: Vec::new(),
        }
    }

    /// Returns the attempt for `target`, if any.
    #[must_use]
    pub fn for_target(&self, target: Target) -> Option<&Applied> {
        self.applied.iter().find(|applied| applied.target == target)
    }
}

/// How [`Scheduler::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// SIGINT, SIGTERM, or a single-tick run finished.
    Shutdown,
    /// The configuration file changed.
    Reload,
}

/// How [`Scheduler::run`] starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Run a single tick and return.
    pub once: bool,
    /// Tick before the first sleep.
    pub tick_immediately: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            once: false,
            tick_immediately: true,
        }
    }
}

/// The rotation engine.
pub struct Scheduler {
    options: SchedulerOptions,
    collaborators: Collaborators,
    catalog: Catalog,
    watermark: SystemTime,
    unseen: UnseenSet,
    gate: Box<dyn LockGate>,
    policy: Box<dyn SelectionPolicy>,
    fit_cache: Option<FitCache>,
    rng: Box<dyn RngCore>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("options", &self.options)
            .field("catalog_len", &self.catalog.len())
            .field("unseen", &self.unseen.len())
            .field("gate", &self.gate)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Performs the startup scan and prepares the fit cache.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::LockSourceInit` when the lock-aware gate is
    /// configured and the lock state cannot be read, `AgentError::Catalog`
    /// when the directory is unreadable and `AgentError::EmptyCatalog` when
    /// it holds no eligible image.
    pub fn start(
        options: SchedulerOptions,
        collaborators: Collaborators,
        rng: Box<dyn RngCore>,
    ) -> Result<Self, AgentError> {
        let gate = make_gate(options.gate);

        if gate.requires_lock_state() {
            match &collaborators.lock {
                Some(lock) => {
                    lock.is_locked()?;
                }
                None => {
                    return Err(AgentError::LockSourceInit(super::source::LockError::Query(
                        "no lock state source configured".to_string(),
                    )));
                }
            }
        }

        let scan =
            catalog::refresh(collaborators.directory.as_ref(), &options.catalog, None, None)?;
        let (catalog, watermark) = match scan {
            CatalogScan::Ready {
                catalog, watermark, ..
            } => (catalog, watermark),
            CatalogScan::Empty { .. } => {
                return Err(AgentError::EmptyCatalog(options.catalog.directory.clone()));
            }
        };

        tracing::info!(
            directory = %options.catalog.directory.display(),
            images = catalog.len(),
            "catalog loaded"
        );

        let fit_cache = options.fit_to_display.then(|| {
            let mut cache =
                FitCache::new(options.cache_dir.clone(), &collaborators.displays.list_displays());
            if options.prewarm_cache {
                cache.prewarm(catalog.candidates());
            }
            cache
        });

        Ok(Self {
            policy: make_policy(options.policy),
            options,
            collaborators,
            catalog,
            watermark,
            unseen: UnseenSet::new(),
            gate,
            fit_cache,
            rng,
        })
    }

    /// The current catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog { &self.catalog }

    /// Names waiting to be shown for the first time.
    #[must_use]
    pub const fn unseen(&self) -> &UnseenSet { &self.unseen }

    /// Runs one rotation step. Never fails; problems are logged and reported.
    pub fn tick(&mut self) -> TickReport {
        if let Some(reason) = self.refresh_catalog() {
            return TickReport::skipped(reason);
        }

        if let Some(cache) = self.fit_cache.as_mut() {
            cache.retarget(&self.collaborators.displays.list_displays());
        }

        let locked = match self.collaborators.lock.as_ref().map(|lock| lock.is_locked()) {
            Some(Ok(locked)) => locked,
            Some(Err(err)) if self.gate.requires_lock_state() => {
                tracing::warn!(error = %err, "lock state unavailable, skipping tick");
                return TickReport::skipped(SkipReason::LockStateUnavailable);
            }
            Some(Err(err)) => {
                tracing::debug!(error = %err, "lock state unavailable, assuming unlocked");
                false
            }
            None => false,
        };

        let targets = self.gate.decide(locked);
        if targets.is_empty() {
            return TickReport::skipped(SkipReason::Gated);
        }

        let mut report = TickReport::default();
        for target in targets {
            if let Some(applied) = self.apply(target, locked) {
                report.applied.push(applied);
            }
        }
        report
    }

    /// Draws the delay before the next tick.
    pub fn next_delay(&mut self) -> Duration {
        let min = self.options.min_interval.as_secs();
        let max = self.options.max_interval.as_secs().max(min);
        Duration::from_secs(self.rng.random_range(min..=max))
    }

    /// Releases held notifications.
    pub fn shutdown(&mut self) { self.collaborators.notifier.close_all(); }

    /// Takes over rotation state from the scheduler this one replaces.
    ///
    /// With unchanged catalog settings the unseen set carries over, and images
    /// that appeared between the two scans are treated as discovered. With an
    /// unchanged gate variant the gate carries over, so a lock-screen update
    /// owed from a locked period is still made.
    pub fn adopt_state(&mut self, previous: &mut Self) {
        if self.options.catalog == previous.options.catalog {
            self.unseen.absorb(std::mem::take(&mut previous.unseen));
            if self.options.catalog.style == CatalogStyle::Incremental {
                let arrived: Vec<String> = self
                    .catalog
                    .iter()
                    .filter(|candidate| previous.catalog.get(&candidate.name).is_none())
                    .map(|candidate| candidate.name.clone())
                    .collect();
                self.unseen.extend(arrived);
            }
        }

        if self.options.gate == previous.options.gate {
            std::mem::swap(&mut self.gate, &mut previous.gate);
        }

        tracing::debug!(unseen = self.unseen.len(), gate = ?self.gate, "rotation state carried over");
    }

    /// Runs ticks until a shutdown signal or a configuration change.
    ///
    /// SIGUSR1 cuts the current sleep short.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::Runtime` if the signal handlers cannot be installed.
    pub async fn run(
        &mut self,
        reload: &mut Option<UnboundedReceiver<ConfigChanged>>,
        run: RunOptions,
    ) -> Result<RunExit, AgentError> {
        let install = |kind: SignalKind| {
            signal(kind).map_err(|err| {
                AgentError::Runtime(format!("failed to install signal handler: {err}"))
            })
        };
        let mut interrupt = install(SignalKind::interrupt())?;
        let mut terminate = install(SignalKind::terminate())?;
        let mut user1 = install(SignalKind::user_defined1())?;

        let mut tick_now = run.tick_immediately;
        loop {
            if tick_now {
                let report = self.tick();
                tracing::debug!(?report, "tick finished");
                if run.once {
                    return Ok(RunExit::Shutdown);
                }
            }
            tick_now = true;

            let delay = self.next_delay();
            tracing::info!(seconds = delay.as_secs(), "next change scheduled");

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                _ = interrupt.recv() => {
                    tracing::info!("received SIGINT, shutting down");
                    return Ok(RunExit::Shutdown);
                }
                _ = terminate.recv() => {
                    tracing::info!("received SIGTERM, shutting down");
                    return Ok(RunExit::Shutdown);
                }
                _ = user1.recv() => {
                    tracing::info!("received SIGUSR1, changing now");
                }
                Some(ConfigChanged) = next_change(reload) => {
                    return Ok(RunExit::Reload);
                }
            }
        }
    }

    /// Refreshes the catalog, returning why the tick must be skipped.
    fn refresh_catalog(&mut self) -> Option<SkipReason> {
        let scan = match catalog::refresh(
            self.collaborators.directory.as_ref(),
            &self.options.catalog,
            Some(&self.catalog),
            Some(self.watermark),
        ) {
            Ok(scan) => scan,
            Err(err) => {
                tracing::warn!(error = %err, "catalog refresh failed, skipping tick");
                return Some(SkipReason::CatalogUnreadable);
            }
        };

        match scan {
            CatalogScan::Ready {
                catalog,
                discovered,
                watermark,
            } => {
                if !discovered.is_empty() {
                    tracing::info!(count = discovered.len(), "discovered new images");
                }
                if self.options.catalog.style == CatalogStyle::Incremental {
                    self.unseen.extend(discovered);
                }
                self.catalog = catalog;
                self.watermark = watermark;
                None
            }
            CatalogScan::Empty { watermark } => {
                tracing::warn!(
                    directory = %self.options.catalog.directory.display(),
                    "no eligible images, skipping tick"
                );
                self.watermark = watermark;
                Some(SkipReason::EmptyCatalog)
            }
        }
    }

    /// Draws candidates until one resolves to an image that can be applied.
    ///
    /// Candidates the fit cache cannot decode are excluded and redrawn.
    fn select(&mut self, target: Target) -> Option<(Candidate, PathBuf)> {
        for _ in 0..=self.catalog.len() {
            let fit_cache = self.fit_cache.as_ref();
            let selectable =
                |candidate: &Candidate| fit_cache.is_none_or(|cache| !cache.is_excluded(candidate));
            let candidate = choose_existing(
                self.policy.as_ref(),
                &self.catalog,
                &mut self.unseen,
                self.rng.as_mut(),
                self.collaborators.directory.as_ref(),
                &selectable,
            )?;

            let Some(cache) = self.fit_cache.as_mut() else {
                let path = candidate.path.clone();
                return Some((candidate, path));
            };
            if let Some(path) = cache.resolve(&candidate) {
                return Some((candidate, path));
            }
            tracing::debug!(picture = %target, name = %candidate.name, "redrawing");
        }
        None
    }

    /// Selects and applies an image for `target`.
    ///
    /// Returns `None` when nothing could be selected. Otherwise the attempt is
    /// recorded on the gate whether or not the write succeeded.
    fn apply(&mut self, target: Target, locked: bool) -> Option<Applied> {
        let Some((candidate, path)) = self.select(target) else {
            tracing::warn!(picture = %target, "no image available");
            return None;
        };

        let uri = file_uri(&path);
        let success = match self.collaborators.settings.set_picture_uri(target.scope(), &uri) {
            Ok(()) => {
                tracing::info!(picture = %target, name = %candidate.name, "changed picture");
                self.collaborators.notifier.notify(target, &candidate.name, locked);
                true
            }
            Err(err @ SettingError::UnsupportedScope(_)) => {
                tracing::warn!(error = %err, picture = %target, "picture not applied");
                false
            }
            Err(err) => {
                tracing::warn!(error = %err, picture = %target, name = %candidate.name, "failed to apply picture");
                false
            }
        };

        self.gate.record_attempt(target);

        Some(Applied {
            target,
            name: candidate.name,
            path,
            success,
        })
    }
}

/// Waits for the next configuration change, or forever without a watcher.
async fn next_change(
    reload: &mut Option<UnboundedReceiver<ConfigChanged>>,
) -> Option<ConfigChanged> {
    match reload {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
