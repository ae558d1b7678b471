//! Chain Module
//!
//! Intrusive singly-linked list of slaves hanging off each master.
//!
//! ## Layout
//! ```text
//!  Master slot                 Slave file
//! ┌──────────────┐      ┌────────────┐     ┌────────────┐
//! │ head_slave ──┼─────►│ newest     │     │ oldest     │
//! │ slave_count  │      │ next ──────┼────►│ next = -1  │
//! └──────────────┘      └────────────┘     └────────────┘
//! ```
//!
//! ## Responsibilities
//! - Prepend new slaves (chain order is newest-first)
//! - Splice a single slave out, or invalidate a whole chain
//! - Keep `slave_count` equal to the number of linked valid slaves
//! - Detect cycles by bounding every walk by the slave file's slot count

mod iterator;
mod manager;

pub use iterator::ChainIter;
pub use manager::ChainManager;
