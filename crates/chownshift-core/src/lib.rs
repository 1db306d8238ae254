//! Core types for chownshift.
//!
//! This crate provides the data model shared by the walker and the
//! transaction: the run configuration, per-entry records, the UID/GID
//! arithmetic and the error type.

mod config;
mod error;
mod ids;
mod record;

pub use config::{ShiftConfig, ShiftConfigBuilder, ShiftConfigBuilderError};
pub use error::ShiftError;
pub use ids::{IdShift, NegativeShift, shift_id, wraps};
pub use record::{EntryKind, FileRecord, InodeInfo, Ownership};
