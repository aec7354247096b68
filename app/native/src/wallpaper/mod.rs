//! Wallpaper rotation engine.
//!
//! The [`scheduler::Scheduler`] drives a [`catalog`] refresh, a [`gate`]
//! decision, a [`selection`] draw and a settings write on every tick. All
//! I/O goes through the traits in [`source`].

pub mod catalog;
pub mod fit_cache;
pub mod gate;
pub mod generate;
pub mod notifier;
pub mod scheduler;
pub mod selection;
pub mod source;

pub use catalog::{Candidate, Catalog, CatalogError, CatalogOptions, CatalogScan};
pub use fit_cache::{FitCache, FitError};
pub use gate::{LockGate, Target};
pub use notifier::Notifier;
pub use scheduler::{Collaborators, RunExit, RunOptions, Scheduler, SchedulerOptions, TickReport};
pub use selection::{SelectionPolicy, UnseenSet};
pub use source::{
    DirectorySource, DisplaySource, FsDirectory, LockError, LockSource, NotificationSink,
    NotifyError, ScreenSize, SettingError, SettingScope, SettingSink,
};
