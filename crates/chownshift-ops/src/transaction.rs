//! Two-pass simulate/apply controller.

use chownshift_core::{IdShift, ShiftConfig, ShiftError};
use chownshift_scan::{SeenInodes, TreeWalker};

use crate::backend::{OwnershipBackend, SystemBackend};
use crate::progress::{PassSummary, ShiftEvent, TransactionReport};
use crate::visitor::{ApplyVisitor, EntryVisitor, SimulateVisitor};

/// Shifts the ownership of a tree in two passes.
///
/// The first pass walks the whole tree and computes every target owner
/// without touching anything. Only when it finishes cleanly, and the run is
/// not a dry run, the tree is walked again and changed. Any error stops the
/// run at once; entries already changed in the apply pass stay changed.
#[derive(Debug)]
pub struct ShiftTransaction<B = SystemBackend> {
    config: ShiftConfig,
    backend: B,
}

impl ShiftTransaction<SystemBackend> {
    /// Create a transaction that operates on the local filesystem.
    pub fn new(config: ShiftConfig) -> Self {
        Self::with_backend(config, SystemBackend)
    }
}

impl<B: OwnershipBackend> ShiftTransaction<B> {
    /// Create a transaction with a custom backend.
    pub fn with_backend(config: ShiftConfig, backend: B) -> Self {
        Self { config, backend }
    }

    /// The configuration this transaction runs with.
    pub fn config(&self) -> &ShiftConfig {
        &self.config
    }

    /// Run the simulate pass and, unless this is a dry run, the apply pass.
    pub fn run(&self, mut on_event: impl FnMut(&ShiftEvent)) -> Result<TransactionReport, ShiftError> {
        let simulate = self.simulate(&mut on_event)?;

        if self.config.dry_run {
            tracing::info!("dry run, skipping apply pass");
            return Ok(TransactionReport {
                simulate,
                apply: None,
            });
        }

        let apply = self.apply(&mut on_event)?;
        Ok(TransactionReport {
            simulate,
            apply: Some(apply),
        })
    }

    /// Validate every entry without changing anything.
    pub fn simulate(&self, mut on_event: impl FnMut(&ShiftEvent)) -> Result<PassSummary, ShiftError> {
        let mut visitor = SimulateVisitor::new(&self.config, &self.backend);
        self.run_pass(&mut visitor, &mut on_event)
    }

    /// Change every entry. Normally only called after [`Self::simulate`].
    pub fn apply(&self, mut on_event: impl FnMut(&ShiftEvent)) -> Result<PassSummary, ShiftError> {
        let mut visitor = ApplyVisitor::new(&self.config, &self.backend);
        self.run_pass(&mut visitor, &mut on_event)
    }

    /// Walk the tree once, handing every deduplicated entry to `visitor`.
    fn run_pass<V: EntryVisitor>(
        &self,
        visitor: &mut V,
        on_event: &mut dyn FnMut(&ShiftEvent),
    ) -> Result<PassSummary, ShiftError> {
        let phase = visitor.phase();
        let shift = IdShift::new(self.config.offset);
        let walker = TreeWalker::from_config(&self.config);
        let mut seen = SeenInodes::new();
        let mut summary = PassSummary::new(phase);

        on_event(&ShiftEvent::PhaseStarted { phase });
        tracing::debug!(%phase, root = %walker.root().display(), offset = shift.offset(), "starting pass");

        for record in walker.entries() {
            let record = record?;
            summary.entries += 1;

            if !seen.should_process(record.inode, record.link_count) {
                tracing::debug!(path = %record.path.display(), inode = record.inode.inode, "skipping known hard link");
                summary.hardlinks_skipped += 1;
                on_event(&ShiftEvent::SkippedHardlink {
                    phase,
                    path: record.path.clone(),
                });
                continue;
            }

            let target = shift.apply(record.owner).map_err(|neg| ShiftError::NegativeId {
                path: record.path.clone(),
                from: record.owner,
                target_uid: neg.uid,
                target_gid: neg.gid,
            })?;

            if shift.wraps(record.owner) {
                summary.wrapped += 1;
                if !phase.mutates() {
                    tracing::warn!(
                        path = %record.path.display(),
                        from = %record.owner,
                        to = %target,
                        "shifted id exceeds u32 range and wraps"
                    );
                }
            }

            on_event(&ShiftEvent::Changed {
                phase,
                path: record.path.clone(),
                from: record.owner,
                to: target,
            });

            let outcome = visitor.visit(&record, target)?;
            summary.changed += 1;
            if outcome.mode_restored {
                summary.modes_restored += 1;
            }
            if outcome.capabilities_restored {
                summary.capabilities_restored += 1;
                on_event(&ShiftEvent::CapabilitiesRestored {
                    path: record.path.clone(),
                });
            }
        }

        tracing::info!(
            %phase,
            entries = summary.entries,
            changed = summary.changed,
            hardlinks_skipped = summary.hardlinks_skipped,
            "pass complete"
        );
        Ok(summary)
    }
}
