//! Command definitions
//!
//! Represents commands read from the console.

use std::fmt;
use std::str::FromStr;

use crate::error::LinkError;
use crate::record::{MasterRecord, MasterUpdate, SlaveRecord, SlaveUpdate};

/// Command types, one per console command name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    GetMaster,
    GetSlave,
    DeleteMaster,
    DeleteSlave,
    UpdateMaster,
    UpdateSlave,
    InsertMaster,
    InsertSlave,
    CountMasters,
    CountSlaves,
    DumpMasters,
    DumpSlaves,
    Check,
    Exit,
}

impl CommandType {
    /// Every command type, in console listing order
    pub const ALL: [CommandType; 14] = [
        CommandType::GetMaster,
        CommandType::GetSlave,
        CommandType::DeleteMaster,
        CommandType::DeleteSlave,
        CommandType::UpdateMaster,
        CommandType::UpdateSlave,
        CommandType::InsertMaster,
        CommandType::InsertSlave,
        CommandType::CountMasters,
        CommandType::CountSlaves,
        CommandType::DumpMasters,
        CommandType::DumpSlaves,
        CommandType::Check,
        CommandType::Exit,
    ];

    /// Console name
    pub fn name(&self) -> &'static str {
        match self {
            CommandType::GetMaster => "get-m",
            CommandType::GetSlave => "get-s",
            CommandType::DeleteMaster => "del-m",
            CommandType::DeleteSlave => "del-s",
            CommandType::UpdateMaster => "update-m",
            CommandType::UpdateSlave => "update-s",
            CommandType::InsertMaster => "insert-m",
            CommandType::InsertSlave => "insert-s",
            CommandType::CountMasters => "calc-m",
            CommandType::CountSlaves => "calc-s",
            CommandType::DumpMasters => "ut-m",
            CommandType::DumpSlaves => "ut-s",
            CommandType::Check => "check",
            CommandType::Exit => "exit",
        }
    }
}

impl FromStr for CommandType {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        CommandType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| LinkError::InvalidValue(format!("unknown command `{}`", s)))
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully parsed command with its arguments
#[derive(Debug, Clone)]
pub enum Command {
    /// Read a master by key
    GetMaster { key: i32 },

    /// Read a slave by owner key and ISBN
    GetSlave { key: i32, isbn: i32 },

    /// Delete a master and its whole chain
    DeleteMaster { key: i32 },

    /// Delete one slave
    DeleteSlave { key: i32, isbn: i32 },

    /// Change one master field
    UpdateMaster { key: i32, update: MasterUpdate },

    /// Change one slave field
    UpdateSlave { key: i32, isbn: i32, update: SlaveUpdate },

    /// Insert a master
    InsertMaster { record: MasterRecord },

    /// Insert a slave under `key`
    InsertSlave { key: i32, record: SlaveRecord },

    /// Count valid masters
    CountMasters,

    /// Count valid slaves and per-master counts
    CountSlaves,

    /// Dump the master file, index and master free-list
    DumpMasters,

    /// Dump the slave file and slave free-list
    DumpSlaves,

    /// Verify invariants
    Check,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::GetMaster { .. } => CommandType::GetMaster,
            Command::GetSlave { .. } => CommandType::GetSlave,
            Command::DeleteMaster { .. } => CommandType::DeleteMaster,
            Command::DeleteSlave { .. } => CommandType::DeleteSlave,
            Command::UpdateMaster { .. } => CommandType::UpdateMaster,
            Command::UpdateSlave { .. } => CommandType::UpdateSlave,
            Command::InsertMaster { .. } => CommandType::InsertMaster,
            Command::InsertSlave { .. } => CommandType::InsertSlave,
            Command::CountMasters => CommandType::CountMasters,
            Command::CountSlaves => CommandType::CountSlaves,
            Command::DumpMasters => CommandType::DumpMasters,
            Command::DumpSlaves => CommandType::DumpSlaves,
            Command::Check => CommandType::Check,
        }
    }
}
