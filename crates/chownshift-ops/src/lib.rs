//! Ownership shift engine for chownshift.
//!
//! This crate runs the simulate/apply transaction: one generic traversal,
//! driven twice with a different [`EntryVisitor`] per pass, reporting
//! progress through [`ShiftEvent`]s. Filesystem mutations go through an
//! [`OwnershipBackend`] so the apply pass can be exercised without root.
//!
//! ```rust,no_run
//! use chownshift_core::ShiftConfig;
//! use chownshift_ops::ShiftTransaction;
//!
//! let mut config = ShiftConfig::new(100_000, "/var/lib/lxc/web/rootfs");
//! config.recursive = true;
//!
//! let report = ShiftTransaction::new(config)
//!     .run(|event| println!("{event}"))
//!     .unwrap();
//! println!("{} entries changed", report.simulate.changed);
//! ```

mod backend;
mod progress;
mod transaction;
mod visitor;

pub use backend::{CAPABILITY_XATTR, OwnershipBackend, SystemBackend};
pub use progress::{PassSummary, Phase, ShiftEvent, TransactionReport};
pub use transaction::ShiftTransaction;
pub use visitor::{ApplyVisitor, EntryVisitor, SimulateVisitor, VisitOutcome};
