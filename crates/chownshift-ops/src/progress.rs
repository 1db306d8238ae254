//! Progress reporting types for shift passes.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use chownshift_core::Ownership;

/// The pass being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Validate every entry without touching the filesystem.
    Simulate,
    /// Change ownership.
    Apply,
}

impl Phase {
    /// Whether this pass changes the filesystem.
    pub fn mutates(self) -> bool {
        matches!(self, Self::Apply)
    }

    /// Prefix used for per-entry lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Simulate => "[Simulating]",
            Self::Apply => "[Changing]",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulate => write!(f, "Simulating"),
            Self::Apply => write!(f, "Applying"),
        }
    }
}

/// Something that happened while running a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShiftEvent {
    /// A pass is starting.
    PhaseStarted { phase: Phase },
    /// An entry was (or would be) shifted.
    Changed {
        phase: Phase,
        path: PathBuf,
        from: Ownership,
        to: Ownership,
    },
    /// A further name of an already handled inode was skipped.
    SkippedHardlink { phase: Phase, path: PathBuf },
    /// The capability set of an entry was written back.
    CapabilitiesRestored { path: PathBuf },
}

impl fmt::Display for ShiftEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PhaseStarted { phase } => write!(f, "{phase}..."),
            Self::Changed {
                phase,
                path,
                from,
                to,
            } => write!(f, "{} {}: {from} -> {to}", phase.label(), path.display()),
            Self::SkippedHardlink { phase, path } => {
                write!(f, "[{phase}] {}: Skip known hard link", path.display())
            }
            Self::CapabilitiesRestored { path } => {
                write!(f, "Restoring capability set for file '{}'", path.display())
            }
        }
    }
}

/// Counters for one completed pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    /// Which pass these counters belong to.
    pub phase: Phase,
    /// Entries produced by the walk.
    pub entries: usize,
    /// Entries shifted (or that would be shifted).
    pub changed: usize,
    /// Names skipped because their inode was already handled.
    pub hardlinks_skipped: usize,
    /// Entries whose ids wrapped past `u32::MAX`.
    pub wrapped: usize,
    /// Mode restorations performed.
    pub modes_restored: usize,
    /// Capability sets written back.
    pub capabilities_restored: usize,
}

impl PassSummary {
    /// Create an empty summary for a pass.
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            entries: 0,
            changed: 0,
            hardlinks_skipped: 0,
            wrapped: 0,
            modes_restored: 0,
            capabilities_restored: 0,
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReport {
    /// The simulate pass, which always runs.
    pub simulate: PassSummary,
    /// The apply pass, absent on a dry run.
    pub apply: Option<PassSummary>,
}

impl TransactionReport {
    /// Check if the filesystem was left untouched.
    pub fn is_dry_run(&self) -> bool {
        self.apply.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_lines() {
        let changed = ShiftEvent::Changed {
            phase: Phase::Simulate,
            path: PathBuf::from("/srv/a"),
            from: Ownership::new(1000, 1000),
            to: Ownership::new(11000, 11000),
        };
        assert_eq!(changed.to_string(), "[Simulating] /srv/a: 1000,1000 -> 11000,11000");

        let applied = ShiftEvent::Changed {
            phase: Phase::Apply,
            path: PathBuf::from("/srv/a"),
            from: Ownership::new(1, 2),
            to: Ownership::new(3, 4),
        };
        assert_eq!(applied.to_string(), "[Changing] /srv/a: 1,2 -> 3,4");

        let skipped = ShiftEvent::SkippedHardlink {
            phase: Phase::Apply,
            path: PathBuf::from("/srv/b"),
        };
        assert_eq!(skipped.to_string(), "[Applying] /srv/b: Skip known hard link");

        let started = ShiftEvent::PhaseStarted {
            phase: Phase::Simulate,
        };
        assert_eq!(started.to_string(), "Simulating...");
    }

    #[test]
    fn test_phase_mutates() {
        assert!(!Phase::Simulate.mutates());
        assert!(Phase::Apply.mutates());
    }

    #[test]
    fn test_report_dry_run() {
        let report = TransactionReport {
            simulate: PassSummary::new(Phase::Simulate),
            apply: None,
        };
        assert!(report.is_dry_run());
    }
}
