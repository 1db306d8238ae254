//! Tree walking and hardlink tracking for chownshift.
//!
//! # Overview
//!
//! `chownshift-scan` enumerates the entries a shift pass has to touch and
//! keeps track of hard links already handled in that pass:
//!
//! - **Serial pre-order traversal** via jwalk, never following symlinks
//! - **Single-target resolution** with a non-dereferencing stat
//! - **Hardlink detection** so an inode is shifted once per pass
//!
//! # Example
//!
//! ```rust,no_run
//! use chownshift_scan::{SeenInodes, TreeWalker};
//!
//! let walker = TreeWalker::new("/srv/rootfs", true);
//! let mut seen = SeenInodes::new();
//!
//! for record in walker.entries() {
//!     let record = record.unwrap();
//!     if seen.should_process(record.inode, record.link_count) {
//!         println!("{}: {}", record.path.display(), record.owner);
//!     }
//! }
//! ```

mod inode;
mod walker;

pub use inode::SeenInodes;
pub use walker::{Entries, TreeWalker};

// Re-export core types for convenience
pub use chownshift_core::{EntryKind, FileRecord, InodeInfo, Ownership, ShiftError};
