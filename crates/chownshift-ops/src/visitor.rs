//! Per-entry actions for the simulate and apply passes.

use chownshift_core::{FileRecord, Ownership, ShiftConfig, ShiftError};

use crate::backend::{CAPABILITY_XATTR, OwnershipBackend};
use crate::progress::Phase;

/// What a visitor did to an entry beyond the ownership change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitOutcome {
    /// The original mode bits were written back.
    pub mode_restored: bool,
    /// The capability set was written back.
    pub capabilities_restored: bool,
}

/// Action taken for every entry that survives hardlink deduplication.
///
/// The traversal is shared by both passes; only the visitor differs.
pub trait EntryVisitor {
    /// The pass this visitor implements.
    fn phase(&self) -> Phase;

    /// Handle one entry whose shifted owner has already been computed.
    fn visit(&mut self, record: &FileRecord, target: Ownership) -> Result<VisitOutcome, ShiftError>;
}

/// Reads the capability set of `record` when the config asks for it.
fn capture_capabilities<B: OwnershipBackend>(
    config: &ShiftConfig,
    backend: &B,
    record: &FileRecord,
) -> Result<Option<Vec<u8>>, ShiftError> {
    if !config.preserve_capabilities || record.is_symlink() {
        return Ok(None);
    }
    backend
        .get_xattr(&record.path, CAPABILITY_XATTR)
        .map_err(|source| ShiftError::Xattr {
            path: record.path.clone(),
            name: CAPABILITY_XATTR,
            source,
        })
}

/// Validation-only visitor.
#[derive(Debug)]
pub struct SimulateVisitor<'a, B> {
    config: &'a ShiftConfig,
    backend: &'a B,
}

impl<'a, B: OwnershipBackend> SimulateVisitor<'a, B> {
    /// Create a new simulate visitor.
    pub fn new(config: &'a ShiftConfig, backend: &'a B) -> Self {
        Self { config, backend }
    }
}

impl<B: OwnershipBackend> EntryVisitor for SimulateVisitor<'_, B> {
    fn phase(&self) -> Phase {
        Phase::Simulate
    }

    fn visit(&mut self, record: &FileRecord, _target: Ownership) -> Result<VisitOutcome, ShiftError> {
        // Reading the attribute now surfaces unreadable entries before any change.
        capture_capabilities(self.config, self.backend, record)?;
        Ok(VisitOutcome::default())
    }
}

/// Visitor that changes ownership and restores what chown clears.
#[derive(Debug)]
pub struct ApplyVisitor<'a, B> {
    config: &'a ShiftConfig,
    backend: &'a B,
}

impl<'a, B: OwnershipBackend> ApplyVisitor<'a, B> {
    /// Create a new apply visitor.
    pub fn new(config: &'a ShiftConfig, backend: &'a B) -> Self {
        Self { config, backend }
    }
}

impl<B: OwnershipBackend> EntryVisitor for ApplyVisitor<'_, B> {
    fn phase(&self) -> Phase {
        Phase::Apply
    }

    fn visit(&mut self, record: &FileRecord, target: Ownership) -> Result<VisitOutcome, ShiftError> {
        let path = &record.path;
        let capabilities = capture_capabilities(self.config, self.backend, record)?;
        let mut outcome = VisitOutcome::default();

        self.backend
            .lchown(path, target)
            .map_err(|source| ShiftError::Chown {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), uid = target.uid, gid = target.gid, "lchown");

        // Symlinks carry no mode of their own; chmod would hit the target.
        if self.config.preserve_permissions && !record.is_symlink() {
            let mode = record.permission_bits();
            self.backend
                .chmod(path, mode)
                .map_err(|source| ShiftError::Chmod {
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!(path = %path.display(), mode = %format!("{mode:o}"), "restored mode");
            outcome.mode_restored = true;
        }

        if let Some(value) = capabilities {
            self.backend
                .set_xattr(path, CAPABILITY_XATTR, &value)
                .map_err(|source| ShiftError::Xattr {
                    path: path.clone(),
                    name: CAPABILITY_XATTR,
                    source,
                })?;
            outcome.capabilities_restored = true;
        }

        Ok(outcome)
    }
}
