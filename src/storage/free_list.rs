//! Free List
//!
//! LIFO stack of invalidated slots available for reuse ("garbage zone").

use std::collections::HashSet;
use std::path::Path;

use crate::error::{LinkError, Result};
use crate::record::{Record, SlotId};

use super::{read_i32_artifact, write_i32_artifact, RecordStore};

/// Reusable slots of one data file, most recently released on top
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeList {
    /// Bottom → top
    slots: Vec<SlotId>,
}

impl FreeList {
    /// Create an empty free-list
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a persisted free-list (empty if the artifact does not exist)
    pub fn load(path: &Path) -> Result<Self> {
        let Some(values) = read_i32_artifact(path)? else {
            return Ok(Self::new());
        };

        let slots = values
            .into_iter()
            .map(|v| {
                SlotId::try_from(v).map_err(|_| {
                    LinkError::Corruption(format!(
                        "negative offset {} in {}",
                        v,
                        path.display()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { slots })
    }

    /// Persist the whole stack, bottom first
    pub fn persist(&self, path: &Path) -> Result<()> {
        let values = self
            .slots
            .iter()
            .map(|&s| {
                i32::try_from(s)
                    .map_err(|_| LinkError::Corruption(format!("slot {} does not fit in i32", s)))
            })
            .collect::<Result<Vec<_>>>()?;
        write_i32_artifact(path, &values)
    }

    /// Push a slot that has just been marked invalid
    pub fn release(&mut self, slot: SlotId) {
        self.slots.push(slot);
    }

    /// Pop the most recently released slot
    pub fn acquire(&mut self) -> Option<SlotId> {
        self.slots.pop()
    }

    /// Whether `slot` is listed
    pub fn contains(&self, slot: SlotId) -> bool {
        self.slots.contains(&slot)
    }

    /// Listed slots, bottom → top
    pub fn as_slice(&self) -> &[SlotId] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop every listed slot that cannot be reused
    ///
    /// A slot is kept only if it is in range, holds an invalid record in
    /// `store`, and is not listed again further down. Each dropped slot is
    /// logged. Returns the number of slots dropped.
    pub fn prune_against<R: Record>(&mut self, store: &RecordStore<R>) -> Result<usize> {
        if self.slots.is_empty() {
            return Ok(0);
        }

        let records = match store.scan() {
            Ok(records) => records,
            Err(LinkError::FileUnavailable { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };
        let mut seen = HashSet::with_capacity(self.slots.len());
        let before = self.slots.len();

        self.slots.retain(|&slot| {
            let reason = if !seen.insert(slot) {
                Some("listed more than once")
            } else {
                match records.get(slot as usize) {
                    None => Some("beyond end of file"),
                    Some((_, record)) if record.is_valid() => Some("holds a valid record"),
                    Some(_) => None,
                }
            };

            if let Some(reason) = reason {
                tracing::warn!(kind = R::KIND, slot, reason, "Dropping free-list entry");
                return false;
            }
            true
        });

        Ok(before - self.slots.len())
    }
}
