//! Console Module
//!
//! Line-oriented command loop over any reader / writer pair.
//!
//! ## Architecture
//! - One command name per line, arguments prompted one per line
//! - Each command runs to completion before the next is read
//! - Operation errors are reported and the loop continues
//! - `exit` or end of input ends the session

mod session;

pub use session::Session;
