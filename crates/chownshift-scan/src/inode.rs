//! Inode tracking for hardlink deduplication.

use std::collections::HashSet;

use chownshift_core::InodeInfo;

/// Tracks the multiply-linked inodes already handled in one pass.
///
/// A file with several hard links is reached once per name during a walk,
/// but its ownership must only be shifted once. Each pass starts from an
/// empty set.
#[derive(Debug, Default)]
pub struct SeenInodes {
    seen: HashSet<InodeInfo>,
}

impl SeenInodes {
    /// Create a new, empty set.
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    /// Decide whether an entry should be processed.
    ///
    /// Entries with a single link are always processed and never tracked.
    /// For multiply-linked inodes the first encounter is recorded and
    /// returns `true`; later encounters return `false`.
    pub fn should_process(&mut self, info: InodeInfo, link_count: u64) -> bool {
        if link_count <= 1 {
            return true;
        }
        self.seen.insert(info)
    }
}
