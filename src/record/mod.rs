//! Record Module
//!
//! Fixed-size slot layouts for the two data files.
//!
//! ## Responsibilities
//! - Map domain records to their on-disk slot representation
//! - Bound text fields to their fixed width
//! - Translate null offsets and validity flags
//!
//! ## Slot Layout (little-endian, no padding)
//! ```text
//! Master (78 bytes)
//! ┌─────────┬───────────┬──────────────┬──────────┬───────────┬─────────┐
//! │ Key (4) │ Name (31) │ Address (31) │ Head (4) │ Count (4) │Valid (4)│
//! └─────────┴───────────┴──────────────┴──────────┴───────────┴─────────┘
//!
//! Slave (86 bytes)
//! ┌─────────┬──────────┬────────────┬─────────────┬───────────┬──────────┬─────────┐
//! │Owner (4)│ ISBN (4) │ Title (31) │ Author (31) │ Price (8) │ Next (4) │Valid (4)│
//! └─────────┴──────────┴────────────┴─────────────┴───────────┴──────────┴─────────┘
//! ```
//!
//! A null offset is stored as `-1`, validity as `1` / `0`, text NUL-padded.

mod master;
mod slave;

pub use master::{MasterField, MasterRecord, MasterUpdate};
pub use slave::{SlaveField, SlaveRecord, SlaveUpdate};

use crate::error::{LinkError, Result};

/// Position of a record in its data file, counted in slots
pub type SlotId = u32;

/// On-disk marker for "no slot"
pub const NIL_SLOT: i32 = -1;

/// Width of a text field on disk, terminator included
pub const TEXT_WIDTH: usize = 31;

/// Longest text a field accepts, in bytes
pub const MAX_TEXT_LEN: usize = TEXT_WIDTH - 1;

/// A record stored in fixed-size slots
pub trait Record: Sized + Clone + std::fmt::Debug {
    /// Slot size in bytes
    const SIZE: u64;

    /// Human-readable record kind, used in errors and logs
    const KIND: &'static str;

    /// Encode into exactly `SIZE` bytes
    fn encode(&self) -> Result<Vec<u8>>;

    /// Decode from exactly `SIZE` bytes
    fn decode(bytes: &[u8]) -> Result<Self>;

    /// Whether the slot holds a live record
    fn is_valid(&self) -> bool;

    /// Flip the validity flag
    fn set_valid(&mut self, valid: bool);
}

// =============================================================================
// Field Helpers (shared by master and slave layouts)
// =============================================================================

/// Check that `value` fits into a text field
pub(crate) fn check_text(field: &'static str, value: &str) -> Result<()> {
    if value.len() > MAX_TEXT_LEN {
        return Err(LinkError::FieldTooLong {
            field,
            max: MAX_TEXT_LEN,
            len: value.len(),
        });
    }
    if value.contains('\0') {
        return Err(LinkError::InvalidValue(format!(
            "`{}` must not contain NUL bytes",
            field
        )));
    }
    Ok(())
}

/// Encode text into a NUL-padded fixed-width buffer
pub(crate) fn encode_text(field: &'static str, value: &str) -> Result<[u8; TEXT_WIDTH]> {
    check_text(field, value)?;
    let mut buf = [0u8; TEXT_WIDTH];
    buf[..value.len()].copy_from_slice(value.as_bytes());
    Ok(buf)
}

/// Decode a NUL-padded fixed-width buffer (stops at the first NUL)
pub(crate) fn decode_text(buf: &[u8; TEXT_WIDTH]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(TEXT_WIDTH);
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

/// Convert an optional slot to its on-disk form
pub(crate) fn slot_to_raw(slot: Option<SlotId>) -> Result<i32> {
    match slot {
        None => Ok(NIL_SLOT),
        Some(s) => i32::try_from(s)
            .map_err(|_| LinkError::Corruption(format!("slot {} does not fit in i32", s))),
    }
}

/// Convert an on-disk slot reference back to an optional slot
pub(crate) fn slot_from_raw(raw: i32) -> Result<Option<SlotId>> {
    match raw {
        NIL_SLOT => Ok(None),
        n if n >= 0 => Ok(Some(n as SlotId)),
        n => Err(LinkError::Corruption(format!("invalid slot reference {}", n))),
    }
}

/// Convert an on-disk validity flag
pub(crate) fn valid_from_raw(raw: i32) -> bool {
    raw == 1
}

/// Check an encoded slot against the fixed size (bincode layout guard)
pub(crate) fn check_size(kind: &str, bytes: &[u8], expected: u64) -> Result<()> {
    if bytes.len() as u64 != expected {
        return Err(LinkError::Serialization(format!(
            "{} slot is {} bytes, expected {}",
            kind,
            bytes.len(),
            expected
        )));
    }
    Ok(())
}
