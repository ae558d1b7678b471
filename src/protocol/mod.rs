//! Protocol Module
//!
//! Commands accepted by the engine and the responses it returns.
//!
//! ## Console Command Names
//! ```text
//! get-m     get-s     master / slave by key (and ISBN)
//! del-m     del-s     delete master (cascading) / single slave
//! update-m  update-s  change one non-key field
//! insert-m  insert-s  add master / prepend slave
//! calc-m    calc-s    count valid records
//! ut-m      ut-s      dump every slot with index and free-list
//! check               verify structural invariants
//! exit                persist index and free-lists, then quit
//! ```

mod command;
mod response;

pub use command::{Command, CommandType};
pub use response::Response;
