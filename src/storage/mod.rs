//! Storage Module
//!
//! Persistent storage layer over fixed-size record files.
//!
//! ## Responsibilities
//! - Read, overwrite and append fixed-size slots by offset
//! - Track reusable (invalidated) slots per data file
//! - Read and write the flat `i32` artifacts (index, free-lists)
//!
//! ## Data File Format
//! ```text
//! ┌────────────┬────────────┬────────────┬─────┐
//! │  Slot 0    │  Slot 1    │  Slot 2    │ ... │
//! │ (R::SIZE)  │ (R::SIZE)  │ (R::SIZE)  │     │
//! └────────────┴────────────┴────────────┴─────┘
//! ```
//! No header; slot `n` starts at byte `n * R::SIZE`. A slot is never
//! removed, only flagged invalid.

mod artifact;
mod free_list;
mod record_store;

pub use artifact::{read_i32_artifact, write_i32_artifact};
pub use free_list::FreeList;
pub use record_store::RecordStore;
