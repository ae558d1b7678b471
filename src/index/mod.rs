//! Index Module
//!
//! In-memory primary index over the master file.
//!
//! ## Responsibilities
//! - Map master key → master slot in O(log n)
//! - Stay sorted ascending with unique keys after every mutation
//! - Rebuild from a full master scan when no artifact exists
//! - Persist as `{key: i32, slot: i32}` pairs on orderly shutdown
//!
//! ## Data Structure Choice
//! A sorted `Vec` with binary-searched insertion points:
//! - The data set is small and lookups dominate
//! - Persisted order is the in-memory order
//! - Sorted at all times, so a lookup right after an insert is correct

mod table;

pub use table::PrimaryIndex;

use crate::record::SlotId;

/// One index entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Master key
    pub key: i32,

    /// Slot of the master record
    pub slot: SlotId,
}
