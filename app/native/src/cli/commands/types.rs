//! Shared types for CLI commands.
//!
//! Command-line spellings of configuration enums.

use crate::config::{GateVariant, PrimaryOrientation};

/// Gate variant (CLI representation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliGateVariant {
    /// Alternate between wallpaper and lock screen.
    Alternating,
    /// Follow the session lock state.
    LockAware,
}

impl From<CliGateVariant> for GateVariant {
    fn from(value: CliGateVariant) -> Self {
        match value {
            CliGateVariant::Alternating => Self::Alternating,
            CliGateVariant::LockAware => Self::LockAware,
        }
    }
}

/// Orientation filter (CLI representation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliOrientation {
    /// Width at least height.
    Landscape,
    /// Height at least width.
    Portrait,
    /// Every image.
    Any,
}

impl From<CliOrientation> for PrimaryOrientation {
    fn from(value: CliOrientation) -> Self {
        match value {
            CliOrientation::Landscape => Self::Landscape,
            CliOrientation::Portrait => Self::Portrait,
            CliOrientation::Any => Self::Any,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::ValueEnum;

    use super::*;

    #[test]
    fn test_gate_variant_spelling() {
        assert_eq!(CliGateVariant::from_str("lock-aware", false), Ok(CliGateVariant::LockAware));
        assert_eq!(
            GateVariant::from(CliGateVariant::Alternating),
            GateVariant::Alternating
        );
    }

    #[test]
    fn test_orientation_conversion() {
        assert_eq!(PrimaryOrientation::from(CliOrientation::Portrait), PrimaryOrientation::Portrait);
        assert_eq!(PrimaryOrientation::from(CliOrientation::Any), PrimaryOrientation::Any);
    }
}
