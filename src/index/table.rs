//! PrimaryIndex implementation
//!
//! Sorted-vector table with binary search.

use std::path::Path;

use crate::error::{LinkError, Result};
use crate::record::{MasterRecord, Record, SlotId};
use crate::storage::{read_i32_artifact, write_i32_artifact, RecordStore};

use super::IndexEntry;

/// Sorted key → slot table for masters
#[derive(Debug, Clone, Default)]
pub struct PrimaryIndex {
    /// Ascending by key, keys unique
    entries: Vec<IndexEntry>,
}

impl PrimaryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index
    ///
    /// A persisted artifact at `path` is trusted as-is. Without one the
    /// master file is scanned and every valid record indexed.
    pub fn load(path: &Path, masters: &RecordStore<MasterRecord>) -> Result<Self> {
        match read_i32_artifact(path)? {
            Some(values) => Self::from_artifact(path, &values),
            None => {
                tracing::warn!(path = %path.display(), "No index artifact, rebuilding from master file");
                Self::rebuild(masters)
            }
        }
    }

    /// Build the index from a full scan of the master file
    ///
    /// A missing master file yields an empty index.
    pub fn rebuild(masters: &RecordStore<MasterRecord>) -> Result<Self> {
        if !masters.exists() {
            return Ok(Self::new());
        }

        let mut entries: Vec<IndexEntry> = masters
            .scan()?
            .into_iter()
            .filter(|(_, m)| m.is_valid())
            .map(|(slot, m)| IndexEntry { key: m.key, slot })
            .collect();
        entries.sort_by_key(|e| e.key);

        if let Some(pair) = entries.windows(2).find(|w| w[0].key == w[1].key) {
            return Err(LinkError::Corruption(format!(
                "master key {} stored at slots {} and {}",
                pair[0].key, pair[0].slot, pair[1].slot
            )));
        }

        tracing::debug!(entries = entries.len(), "Rebuilt primary index");
        Ok(Self { entries })
    }

    /// Look up the slot for `key`
    pub fn lookup(&self, key: i32) -> Option<SlotId> {
        self.entries
            .binary_search_by_key(&key, |e| e.key)
            .ok()
            .map(|i| self.entries[i].slot)
    }

    /// Insert a new key, keeping the table sorted
    pub fn insert(&mut self, key: i32, slot: SlotId) -> Result<()> {
        match self.entries.binary_search_by_key(&key, |e| e.key) {
            Ok(_) => Err(LinkError::DuplicateKey(key)),
            Err(pos) => {
                self.entries.insert(pos, IndexEntry { key, slot });
                Ok(())
            }
        }
    }

    /// Remove `key`, returning its slot
    pub fn remove(&mut self, key: i32) -> Option<SlotId> {
        let pos = self.entries.binary_search_by_key(&key, |e| e.key).ok()?;
        Some(self.entries.remove(pos).slot)
    }

    /// Write the whole table to `path`, replacing any previous artifact
    pub fn persist(&self, path: &Path) -> Result<()> {
        let mut values = Vec::with_capacity(self.entries.len() * 2);
        for entry in &self.entries {
            values.push(entry.key);
            values.push(i32::try_from(entry.slot).map_err(|_| {
                LinkError::Corruption(format!("slot {} does not fit in i32", entry.slot))
            })?);
        }
        write_i32_artifact(path, &values)
    }

    /// Entries in ascending key order
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether keys are strictly ascending
    pub fn is_sorted_unique(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].key < w[1].key)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Parse `{key, slot}` pairs in persisted order
    fn from_artifact(path: &Path, values: &[i32]) -> Result<Self> {
        if values.len() % 2 != 0 {
            tracing::warn!(path = %path.display(), "Ignoring unpaired value at end of index");
        }

        let entries = values
            .chunks_exact(2)
            .map(|pair| {
                let slot = SlotId::try_from(pair[1]).map_err(|_| {
                    LinkError::Corruption(format!(
                        "negative slot {} for key {} in {}",
                        pair[1],
                        pair[0],
                        path.display()
                    ))
                })?;
                Ok(IndexEntry { key: pair[0], slot })
            })
            .collect::<Result<Vec<_>>>()?;

        let index = Self { entries };
        if !index.is_sorted_unique() {
            return Err(LinkError::Corruption(format!(
                "index {} is not sorted by unique key",
                path.display()
            )));
        }

        tracing::debug!(entries = index.len(), "Loaded primary index");
        Ok(index)
    }
}
