//! Master record (buyer)
//!
//! Uniquely keyed by phone number; heads a chain of slave records.

use serde::{Deserialize, Serialize};

use crate::error::{LinkError, Result};

use super::{
    check_size, check_text, decode_text, encode_text, slot_from_raw, slot_to_raw,
    valid_from_raw, Record, SlotId, TEXT_WIDTH,
};

/// A buyer with the head of their book chain
#[derive(Debug, Clone, PartialEq)]
pub struct MasterRecord {
    /// Unique key (phone number)
    pub key: i32,
    pub name: String,
    pub address: String,
    /// First slave in the chain (newest)
    pub head_slave: Option<SlotId>,
    /// Number of live slaves reachable from `head_slave`
    pub slave_count: i32,
    pub valid: bool,
}

/// On-disk layout, serialized by bincode with fixed-width integers
#[derive(Serialize, Deserialize)]
struct RawMaster {
    key: i32,
    name: [u8; TEXT_WIDTH],
    address: [u8; TEXT_WIDTH],
    head_slave: i32,
    slave_count: i32,
    valid: i32,
}

impl MasterRecord {
    /// Create a fresh, valid master with an empty chain
    pub fn new(key: i32, name: impl Into<String>, address: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let address = address.into();
        check_text("name", &name)?;
        check_text("address", &address)?;

        Ok(Self {
            key,
            name,
            address,
            head_slave: None,
            slave_count: 0,
            valid: true,
        })
    }

    /// Apply a single-field update (the key is never touched)
    pub fn apply(&mut self, update: MasterUpdate) -> Result<()> {
        match update {
            MasterUpdate::Name(name) => {
                check_text("name", &name)?;
                self.name = name;
            }
            MasterUpdate::Address(address) => {
                check_text("address", &address)?;
                self.address = address;
            }
        }
        Ok(())
    }
}

impl Record for MasterRecord {
    const SIZE: u64 = 4 + TEXT_WIDTH as u64 * 2 + 4 + 4 + 4;
    const KIND: &'static str = "master";

    fn encode(&self) -> Result<Vec<u8>> {
        let raw = RawMaster {
            key: self.key,
            name: encode_text("name", &self.name)?,
            address: encode_text("address", &self.address)?,
            head_slave: slot_to_raw(self.head_slave)?,
            slave_count: self.slave_count,
            valid: self.valid as i32,
        };
        let bytes = bincode::serialize(&raw)?;
        check_size(Self::KIND, &bytes, Self::SIZE)?;
        Ok(bytes)
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        check_size(Self::KIND, bytes, Self::SIZE)?;
        let raw: RawMaster = bincode::deserialize(bytes)?;
        Ok(Self {
            key: raw.key,
            name: decode_text(&raw.name),
            address: decode_text(&raw.address),
            head_slave: slot_from_raw(raw.head_slave)?,
            slave_count: raw.slave_count,
            valid: valid_from_raw(raw.valid),
        })
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }
}

// =============================================================================
// Field Selection
// =============================================================================

/// Updatable (non-key) master fields, numbered as on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MasterField {
    Name = 1,
    Address = 2,
}

impl MasterField {
    /// Map a console choice to a field
    pub fn from_choice(choice: u8) -> Result<Self> {
        match choice {
            1 => Ok(MasterField::Name),
            2 => Ok(MasterField::Address),
            other => Err(LinkError::InvalidSelection(other)),
        }
    }

    /// Console label
    pub fn label(&self) -> &'static str {
        match self {
            MasterField::Name => "Name",
            MasterField::Address => "Address",
        }
    }

    /// Pair the field with a raw input value
    pub fn with_value(self, raw: &str) -> Result<MasterUpdate> {
        let value = raw.to_string();
        match self {
            MasterField::Name => Ok(MasterUpdate::Name(value)),
            MasterField::Address => Ok(MasterUpdate::Address(value)),
        }
    }
}

/// A single-field change to a master
#[derive(Debug, Clone, PartialEq)]
pub enum MasterUpdate {
    Name(String),
    Address(String),
}
