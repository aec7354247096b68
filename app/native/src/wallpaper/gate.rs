//! Lock-state gates.
//!
//! A gate decides which targets a tick may update. The scheduler reports
//! every attempted update back through [`LockGate::record_attempt`], even
//! when applying it failed.

use std::fmt;

use super::source::SettingScope;
use crate::config::GateVariant;

/// Something the agent can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Wallpaper,
    Lockscreen,
}

impl Target {
    /// Settings scope written for this target.
    #[must_use]
    pub const fn scope(self) -> SettingScope {
        match self {
            Self::Wallpaper => SettingScope::Background,
            Self::Lockscreen => SettingScope::Screensaver,
        }
    }

    /// Notification title for this target.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Wallpaper => "Wallpaper",
            Self::Lockscreen => "Lock Screen",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wallpaper => write!(f, "wallpaper"),
            Self::Lockscreen => write!(f, "lockscreen"),
        }
    }
}

/// Decides which targets may be updated on a tick.
pub trait LockGate: fmt::Debug {
    /// Whether a failed lock-state query must skip the tick.
    fn requires_lock_state(&self) -> bool;

    /// Returns the targets authorized for this tick, wallpaper first.
    fn decide(&mut self, locked: bool) -> Vec<Target>;

    /// Records that an update of `target` was attempted.
    fn record_attempt(&mut self, target: Target);
}

/// Alternates between wallpaper and lock screen, ignoring the lock state.
#[derive(Debug, Clone)]
pub struct AlternatingGate {
    next_target_is_wallpaper: bool,
}

impl Default for AlternatingGate {
    fn default() -> Self {
        Self {
            next_target_is_wallpaper: true,
        }
    }
}

impl AlternatingGate {
    #[must_use]
    pub const fn next_target(&self) -> Target {
        if self.next_target_is_wallpaper { Target::Wallpaper } else { Target::Lockscreen }
    }
}

impl LockGate for AlternatingGate {
    fn requires_lock_state(&self) -> bool { false }

    fn decide(&mut self, _locked: bool) -> Vec<Target> { vec![self.next_target()] }

    fn record_attempt(&mut self, target: Target) {
        if target == self.next_target() {
            self.next_target_is_wallpaper = !self.next_target_is_wallpaper;
        }
    }
}

/// States of the lock-aware gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GateState {
    /// Session unlocked; the wallpaper changes on every tick.
    #[default]
    UnlockedUpdating,
    /// Session locked; nothing changes until it unlocks.
    LockedWaiting,
}

/// Changes the wallpaper on unlocked ticks and refreshes the lock screen once
/// after each locked period.
///
/// | locked | state after        | authorized                          |
/// |--------|--------------------|-------------------------------------|
/// | true   | `LockedWaiting`    | nothing; lock-screen update pending |
/// | false  | `UnlockedUpdating` | wallpaper, plus lock screen if pending |
#[derive(Debug, Clone, Default)]
pub struct LockAwareGate {
    state: GateState,
    pending_lockscreen_update: bool,
}

impl LockAwareGate {
    #[must_use]
    pub const fn state(&self) -> GateState { self.state }

    #[must_use]
    pub const fn pending_lockscreen_update(&self) -> bool { self.pending_lockscreen_update }
}

impl LockGate for LockAwareGate {
    fn requires_lock_state(&self) -> bool { true }

    fn decide(&mut self, locked: bool) -> Vec<Target> {
        if locked {
            if self.state != GateState::LockedWaiting {
                tracing::debug!("session locked, deferring updates");
            }
            self.state = GateState::LockedWaiting;
            self.pending_lockscreen_update = true;
            return Vec::new();
        }

        self.state = GateState::UnlockedUpdating;
        if self.pending_lockscreen_update {
            vec![Target::Wallpaper, Target::Lockscreen]
        } else {
            vec![Target::Wallpaper]
        }
    }

    fn record_attempt(&mut self, target: Target) {
        if target == Target::Lockscreen {
            self.pending_lockscreen_update = false;
        }
    }
}

/// Builds the configured gate.
#[must_use]
pub fn make_gate(variant: GateVariant) -> Box<dyn LockGate> {
    match variant {
        GateVariant::Alternating => Box::new(AlternatingGate::default()),
        GateVariant::LockAware => Box::new(LockAwareGate::default()),
    }
}
