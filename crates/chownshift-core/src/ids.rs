//! UID/GID arithmetic.

use serde::{Deserialize, Serialize};

use crate::record::Ownership;

/// Shift a single id by `offset`.
///
/// Returns `Err` with the raw (negative) result when the shifted id would be
/// below zero. Results above `u32::MAX` are not rejected; they keep the low
/// 32 bits.
pub fn shift_id(current: u32, offset: i64) -> Result<u32, i128> {
    let raw = i128::from(current) + i128::from(offset);
    if raw < 0 { Err(raw) } else { Ok(raw as u32) }
}

/// Whether shifting `current` by `offset` leaves the `u32` range upwards.
pub fn wraps(current: u32, offset: i64) -> bool {
    i128::from(current) + i128::from(offset) > i128::from(u32::MAX)
}

/// A UID/GID shift that would produce a negative id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegativeShift {
    /// Raw uid result.
    pub uid: i128,
    /// Raw gid result.
    pub gid: i128,
}

/// Signed offset applied to both the UID and the GID of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdShift {
    offset: i64,
}

impl IdShift {
    /// Create a new shift.
    pub fn new(offset: i64) -> Self {
        Self { offset }
    }

    /// The signed offset.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// The shift that undoes this one.
    pub fn inverse(&self) -> Self {
        Self {
            offset: self.offset.wrapping_neg(),
        }
    }

    /// Compute the shifted owner, rejecting any negative id.
    pub fn apply(&self, owner: Ownership) -> Result<Ownership, NegativeShift> {
        match (shift_id(owner.uid, self.offset), shift_id(owner.gid, self.offset)) {
            (Ok(uid), Ok(gid)) => Ok(Ownership::new(uid, gid)),
            _ => Err(NegativeShift {
                uid: i128::from(owner.uid) + i128::from(self.offset),
                gid: i128::from(owner.gid) + i128::from(self.offset),
            }),
        }
    }

    /// Whether the shift wraps either id past `u32::MAX`.
    pub fn wraps(&self, owner: Ownership) -> bool {
        wraps(owner.uid, self.offset) || wraps(owner.gid, self.offset)
    }
}
