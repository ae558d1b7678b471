//! # linkdb
//!
//! A master/detail record store over fixed-length binary files with:
//! - Fixed-size slots addressed by offset, never physically removed
//! - An in-memory sorted primary index over master keys
//! - Slave records chained per master through an intrusive linked list
//! - Per-file free-lists so deleted slots are reused before appending
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Console Session                           │
//! │              (one command at a time)                         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │        (index + free-lists owned as session state)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────┐
//!          │            │             │
//!          ▼            ▼             ▼
//!   ┌────────────┐ ┌──────────┐ ┌────────────┐
//!   │PrimaryIndex│ │  Chain   │ │ FreeLists  │
//!   │ (sorted)   │ │ Manager  │ │  (LIFO)    │
//!   └────────────┘ └────┬─────┘ └────────────┘
//!                       │
//!                       ▼
//!               ┌──────────────┐
//!               │ RecordStores │
//!               │ B.fl / BK.fl │
//!               └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod storage;
pub mod index;
pub mod chain;
pub mod check;
pub mod protocol;
pub mod console;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LinkError, Result};
pub use config::Config;
pub use engine::Engine;
pub use record::{MasterRecord, SlaveRecord, SlotId};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of linkdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
