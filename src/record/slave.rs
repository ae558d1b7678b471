//! Slave record (book)
//!
//! Belongs to exactly one master; linked through `next`.

use serde::{Deserialize, Serialize};

use crate::error::{LinkError, Result};

use super::{
    check_size, check_text, decode_text, encode_text, slot_from_raw, slot_to_raw,
    valid_from_raw, Record, SlotId, TEXT_WIDTH,
};

/// A book owned by a buyer
#[derive(Debug, Clone, PartialEq)]
pub struct SlaveRecord {
    /// Owner's key; informational only, traversal goes through `next`
    pub owner_key: i32,
    /// Detail key within the owner's chain
    pub isbn: i32,
    pub title: String,
    pub author: String,
    pub price: f64,
    /// Next (older) slave in the chain
    pub next: Option<SlotId>,
    pub valid: bool,
}

/// On-disk layout, serialized by bincode with fixed-width integers
#[derive(Serialize, Deserialize)]
struct RawSlave {
    owner_key: i32,
    isbn: i32,
    title: [u8; TEXT_WIDTH],
    author: [u8; TEXT_WIDTH],
    price: f64,
    next: i32,
    valid: i32,
}

impl SlaveRecord {
    /// Create a fresh, valid, unlinked slave
    pub fn new(
        owner_key: i32,
        isbn: i32,
        title: impl Into<String>,
        author: impl Into<String>,
        price: f64,
    ) -> Result<Self> {
        let title = title.into();
        let author = author.into();
        check_text("title", &title)?;
        check_text("author", &author)?;
        check_price(price)?;

        Ok(Self {
            owner_key,
            isbn,
            title,
            author,
            price,
            next: None,
            valid: true,
        })
    }

    /// Apply a single-field update (owner and ISBN are never touched)
    pub fn apply(&mut self, update: SlaveUpdate) -> Result<()> {
        match update {
            SlaveUpdate::Title(title) => {
                check_text("title", &title)?;
                self.title = title;
            }
            SlaveUpdate::Author(author) => {
                check_text("author", &author)?;
                self.author = author;
            }
            SlaveUpdate::Price(price) => {
                check_price(price)?;
                self.price = price;
            }
        }
        Ok(())
    }
}

fn check_price(price: f64) -> Result<()> {
    if !price.is_finite() {
        return Err(LinkError::InvalidValue(format!("price {} is not finite", price)));
    }
    Ok(())
}

impl Record for SlaveRecord {
    const SIZE: u64 = 4 + 4 + TEXT_WIDTH as u64 * 2 + 8 + 4 + 4;
    const KIND: &'static str = "slave";

    fn encode(&self) -> Result<Vec<u8>> {
        let raw = RawSlave {
            owner_key: self.owner_key,
            isbn: self.isbn,
            title: encode_text("title", &self.title)?,
            author: encode_text("author", &self.author)?,
            price: self.price,
            next: slot_to_raw(self.next)?,
            valid: self.valid as i32,
        };
        let bytes = bincode::serialize(&raw)?;
        check_size(Self::KIND, &bytes, Self::SIZE)?;
        Ok(bytes)
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        check_size(Self::KIND, bytes, Self::SIZE)?;
        let raw: RawSlave = bincode::deserialize(bytes)?;
        Ok(Self {
            owner_key: raw.owner_key,
            isbn: raw.isbn,
            title: decode_text(&raw.title),
            author: decode_text(&raw.author),
            price: raw.price,
            next: slot_from_raw(raw.next)?,
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

/// Updatable (non-key) slave fields, numbered as on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SlaveField {
    Title = 1,
    Author = 2,
    Price = 3,
}

impl SlaveField {
    /// Map a console choice to a field
    pub fn from_choice(choice: u8) -> Result<Self> {
        match choice {
            1 => Ok(SlaveField::Title),
            2 => Ok(SlaveField::Author),
            3 => Ok(SlaveField::Price),
            other => Err(LinkError::InvalidSelection(other)),
        }
    }

    /// Console label
    pub fn label(&self) -> &'static str {
        match self {
            SlaveField::Title => "Title",
            SlaveField::Author => "Author",
            SlaveField::Price => "Price",
        }
    }

    /// Pair the field with a raw input value, parsing numbers as needed
    pub fn with_value(self, raw: &str) -> Result<SlaveUpdate> {
        match self {
            SlaveField::Title => Ok(SlaveUpdate::Title(raw.to_string())),
            SlaveField::Author => Ok(SlaveUpdate::Author(raw.to_string())),
            SlaveField::Price => raw
                .trim()
                .parse::<f64>()
                .map(SlaveUpdate::Price)
                .map_err(|_| LinkError::InvalidValue(format!("`{}` is not a price", raw.trim()))),
        }
    }
}

/// A single-field change to a slave
#[derive(Debug, Clone, PartialEq)]
pub enum SlaveUpdate {
    Title(String),
    Author(String),
    Price(f64),
}
