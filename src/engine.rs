//! Engine Module
//!
//! The operation layer that coordinates all components.
//!
//! ## Responsibilities
//! - Own the session state: primary index and both free-lists
//! - Resolve master keys through the index
//! - Compose record stores and chain operations per command
//! - Persist the index and free-lists on orderly shutdown

use std::fs;
use std::path::{Path, PathBuf};

use crate::check::{self, InvariantReport};
use crate::chain::ChainManager;
use crate::config::Config;
use crate::error::{LinkError, Result};
use crate::index::{IndexEntry, PrimaryIndex};
use crate::protocol::{Command, Response};
use crate::record::{MasterRecord, MasterUpdate, Record, SlaveRecord, SlaveUpdate, SlotId};
use crate::storage::{FreeList, RecordStore};

/// The master/slave record engine
///
/// ## Session Model
///
/// - Data files are written through on every operation; each store call
///   opens and closes its own handle.
/// - The index and free-lists live in memory for the whole session and
///   are only written by `flush()` / `close()`. Dropping an engine without
///   closing it loses their changes; the next `open` then rebuilds the
///   index by scanning if its artifact is missing.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Master (buyer) records
    masters: RecordStore<MasterRecord>,

    /// Slave (book) records
    slaves: RecordStore<SlaveRecord>,

    /// Master key → slot
    index: PrimaryIndex,

    /// Reusable master slots
    master_free: FreeList,

    /// Reusable slave slots
    slave_free: FreeList,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const MASTER_FILENAME: &'static str = "B.fl";
    const SLAVE_FILENAME: &'static str = "BK.fl";
    const INDEX_FILENAME: &'static str = "B.ind";
    const MASTER_GARBAGE_FILENAME: &'static str = "B.garbage";
    const SLAVE_GARBAGE_FILENAME: &'static str = "BK.garbage";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Load the index (or rebuild it from the master file)
    /// 3. Load both free-lists
    /// 4. Optionally drop free-list slots the data files no longer allow
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let masters = RecordStore::new(config.data_dir.join(Self::MASTER_FILENAME));
        let slaves = RecordStore::new(config.data_dir.join(Self::SLAVE_FILENAME));

        let index_path = config.data_dir.join(Self::INDEX_FILENAME);
        let index = if config.rebuild_index {
            tracing::info!("Rebuilding primary index on request");
            PrimaryIndex::rebuild(&masters)?
        } else {
            PrimaryIndex::load(&index_path, &masters)?
        };

        let mut master_free =
            FreeList::load(&config.data_dir.join(Self::MASTER_GARBAGE_FILENAME))?;
        let mut slave_free = FreeList::load(&config.data_dir.join(Self::SLAVE_GARBAGE_FILENAME))?;

        if config.verify_free_lists {
            let dropped = master_free.prune_against(&masters)? + slave_free.prune_against(&slaves)?;
            if dropped > 0 {
                tracing::warn!(dropped, "Free-lists were out of date with the data files");
            }
        }

        tracing::info!(
            data_dir = %config.data_dir.display(),
            masters = index.len(),
            free_masters = master_free.len(),
            free_slaves = slave_free.len(),
            "Engine opened"
        );

        Ok(Self {
            config,
            masters,
            slaves,
            index,
            master_free,
            slave_free,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&mut self, command: Command) -> Result<Response> {
        tracing::debug!(command = ?command.command_type(), "Executing command");

        match command {
            Command::GetMaster { key } => self.get_master(key).map(Response::Master),
            Command::GetSlave { key, isbn } => self.get_slave(key, isbn).map(Response::Slave),
            Command::DeleteMaster { key } => self
                .delete_master(key)
                .map(|slaves| Response::MasterDeleted { key, slaves }),
            Command::DeleteSlave { key, isbn } => self
                .delete_slave(key, isbn)
                .map(|_| Response::SlaveDeleted { key, isbn }),
            Command::UpdateMaster { key, update } => {
                self.update_master(key, update).map(Response::MasterUpdated)
            }
            Command::UpdateSlave { key, isbn, update } => self
                .update_slave(key, isbn, update)
                .map(Response::SlaveUpdated),
            Command::InsertMaster { record } => {
                let key = record.key;
                self.insert_master(record)
                    .map(|slot| Response::MasterInserted { key, slot })
            }
            Command::InsertSlave { key, record } => {
                let isbn = record.isbn;
                self.insert_slave(key, record)
                    .map(|slot| Response::SlaveInserted { key, isbn, slot })
            }
            Command::CountMasters => self.count_masters().map(Response::MasterCount),
            Command::CountSlaves => self.count_slaves().map(Response::SlaveCount),
            Command::DumpMasters => self.dump_masters().map(Response::MasterDump),
            Command::DumpSlaves => self.dump_slaves().map(Response::SlaveDump),
            Command::Check => self.check().map(Response::Check),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get a valid master by key
    pub fn get_master(&self, key: i32) -> Result<MasterRecord> {
        self.resolve_master(key).map(|(_, master)| master)
    }

    /// Get the newest valid slave with `isbn` in `key`'s chain
    pub fn get_slave(&self, key: i32, isbn: i32) -> Result<SlaveRecord> {
        let (_, master) = self.resolve_master(key)?;
        self.chain()
            .find(&master, |s| s.isbn == isbn)?
            .map(|(_, slave)| slave)
            .ok_or_else(|| Self::slave_not_found(key, isbn))
    }

    /// Valid slaves of `key`, newest first
    pub fn slaves_of(&self, key: i32) -> Result<Vec<SlaveRecord>> {
        let (_, master) = self.resolve_master(key)?;
        Ok(self
            .chain()
            .walk(&master)?
            .into_iter()
            .filter(|(_, s)| s.is_valid())
            .map(|(_, s)| s)
            .collect())
    }

    // =========================================================================
    // Inserts
    // =========================================================================

    /// Insert a new master, reusing a free slot if there is one
    ///
    /// The chain fields of `record` are reset. Returns the slot used.
    pub fn insert_master(&mut self, mut record: MasterRecord) -> Result<SlotId> {
        if self.index.lookup(record.key).is_some() {
            return Err(LinkError::DuplicateKey(record.key));
        }

        record.head_slave = None;
        record.slave_count = 0;
        record.valid = true;

        let slot = match self.master_free.acquire() {
            Some(slot) => {
                self.masters.write_at(slot, &record)?;
                tracing::debug!(slot, "Reused free master slot");
                slot
            }
            None => self.masters.append(&record)?,
        };

        self.index.insert(record.key, slot)?;

        tracing::debug!(key = record.key, slot, "Inserted master");
        Ok(slot)
    }

    /// Insert a slave at the head of `key`'s chain
    pub fn insert_slave(&mut self, key: i32, record: SlaveRecord) -> Result<SlotId> {
        let (master_slot, _) = self.resolve_master(key)?;
        let chain = ChainManager::new(&self.masters, &self.slaves);
        let slot = chain.insert_slave(master_slot, record, &mut self.slave_free)?;

        tracing::debug!(key, slot, "Inserted slave");
        Ok(slot)
    }

    // =========================================================================
    // Deletes
    // =========================================================================

    /// Delete a master and every slave in its chain
    ///
    /// Returns the number of slaves invalidated.
    pub fn delete_master(&mut self, key: i32) -> Result<usize> {
        let (slot, mut master) = self.resolve_master(key)?;

        let chain = ChainManager::new(&self.masters, &self.slaves);
        let removed = chain.delete_all_for_master(&master, &mut self.slave_free)?;

        master.set_valid(false);
        self.masters.write_at(slot, &master)?;
        self.master_free.release(slot);
        self.index.remove(key);

        tracing::debug!(key, slot, removed, "Deleted master");
        Ok(removed)
    }

    /// Delete the newest valid slave with `isbn` from `key`'s chain
    pub fn delete_slave(&mut self, key: i32, isbn: i32) -> Result<SlaveRecord> {
        let (master_slot, _) = self.resolve_master(key)?;
        let chain = ChainManager::new(&self.masters, &self.slaves);

        chain
            .delete_slave(master_slot, |s| s.isbn == isbn, &mut self.slave_free)
            .map_err(|e| match e {
                LinkError::NotFound(_) => Self::slave_not_found(key, isbn),
                other => other,
            })
    }

    // =========================================================================
    // Updates
    // =========================================================================

    /// Change one non-key field of a master
    pub fn update_master(&mut self, key: i32, update: MasterUpdate) -> Result<MasterRecord> {
        let (slot, mut master) = self.resolve_master(key)?;
        master.apply(update)?;
        self.masters.write_at(slot, &master)?;

        tracing::debug!(key, slot, "Updated master");
        Ok(master)
    }

    /// Change one non-key field of the newest slave with `isbn`
    pub fn update_slave(&mut self, key: i32, isbn: i32, update: SlaveUpdate) -> Result<SlaveRecord> {
        let (_, master) = self.resolve_master(key)?;
        let (slot, mut slave) = self
            .chain()
            .find(&master, |s| s.isbn == isbn)?
            .ok_or_else(|| Self::slave_not_found(key, isbn))?;

        slave.apply(update)?;
        self.slaves.write_at(slot, &slave)?;

        tracing::debug!(key, isbn, slot, "Updated slave");
        Ok(slave)
    }

    // =========================================================================
    // Counts & Dumps
    // =========================================================================

    /// Number of valid masters (full scan of the master file)
    pub fn count_masters(&self) -> Result<usize> {
        self.masters.count_valid()
    }

    /// Number of valid slaves plus each valid master's recorded count
    pub fn count_slaves(&self) -> Result<SlaveCounts> {
        let total = self.slaves.count_valid()?;
        let per_master = self
            .masters
            .scan()?
            .into_iter()
            .filter(|(_, m)| m.is_valid())
            .map(|(_, m)| (m.key, m.slave_count))
            .collect();

        Ok(SlaveCounts { total, per_master })
    }

    /// Every master slot, the index, and the master free-list
    pub fn dump_masters(&self) -> Result<MasterDump> {
        Ok(MasterDump {
            records: self.masters.scan()?,
            index: self.index.entries().to_vec(),
            free: self.master_free.as_slice().to_vec(),
        })
    }

    /// Every slave slot and the slave free-list
    pub fn dump_slaves(&self) -> Result<SlaveDump> {
        Ok(SlaveDump {
            records: self.slaves.scan()?,
            free: self.slave_free.as_slice().to_vec(),
        })
    }

    /// Check every structural invariant against the data files
    pub fn check(&self) -> Result<InvariantReport> {
        check::check_invariants(
            &self.masters,
            &self.slaves,
            &self.index,
            &self.master_free,
            &self.slave_free,
        )
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Persist the index and both free-lists
    pub fn flush(&self) -> Result<()> {
        let dir = &self.config.data_dir;
        self.index.persist(&dir.join(Self::INDEX_FILENAME))?;
        self.master_free
            .persist(&dir.join(Self::MASTER_GARBAGE_FILENAME))?;
        self.slave_free
            .persist(&dir.join(Self::SLAVE_GARBAGE_FILENAME))?;

        tracing::debug!(
            entries = self.index.len(),
            free_masters = self.master_free.len(),
            free_slaves = self.slave_free.len(),
            "Flushed session state"
        );
        Ok(())
    }

    /// Close the engine gracefully
    ///
    /// Writes the index and free-lists so the next open can trust them
    pub fn close(self) -> Result<()> {
        self.flush()?;
        tracing::info!("Engine closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Path of the persisted index
    pub fn index_path(&self) -> PathBuf {
        self.config.data_dir.join(Self::INDEX_FILENAME)
    }

    /// Get the primary index
    pub fn index(&self) -> &PrimaryIndex {
        &self.index
    }

    /// Get the master free-list
    pub fn master_free_list(&self) -> &FreeList {
        &self.master_free
    }

    /// Get the slave free-list
    pub fn slave_free_list(&self) -> &FreeList {
        &self.slave_free
    }

    /// Get the master record store
    pub fn masters(&self) -> &RecordStore<MasterRecord> {
        &self.masters
    }

    /// Get the slave record store
    pub fn slaves(&self) -> &RecordStore<SlaveRecord> {
        &self.slaves
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn chain(&self) -> ChainManager<'_> {
        ChainManager::new(&self.masters, &self.slaves)
    }

    /// Index lookup followed by a validity check on the master slot
    fn resolve_master(&self, key: i32) -> Result<(SlotId, MasterRecord)> {
        let slot = self
            .index
            .lookup(key)
            .ok_or_else(|| LinkError::NotFound(format!("master {}", key)))?;

        let master = self.masters.read_at(slot)?;
        if !master.is_valid() {
            return Err(LinkError::NotFound(format!("master {} (deleted)", key)));
        }
        if master.key != key {
            tracing::warn!(key, slot, found = master.key, "Index entry names another master");
            return Err(LinkError::NotFound(format!("master {} (stale index entry)", key)));
        }
        Ok((slot, master))
    }

    fn slave_not_found(key: i32, isbn: i32) -> LinkError {
        LinkError::NotFound(format!("slave {} of master {}", isbn, key))
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Result of counting slaves
#[derive(Debug, Clone, PartialEq)]
pub struct SlaveCounts {
    /// Valid slave slots in the slave file
    pub total: usize,

    /// `(key, slave_count)` of every valid master, in file order
    pub per_master: Vec<(i32, i32)>,
}

/// Full master file dump with session state
#[derive(Debug, Clone)]
pub struct MasterDump {
    pub records: Vec<(SlotId, MasterRecord)>,
    pub index: Vec<IndexEntry>,
    pub free: Vec<SlotId>,
}

/// Full slave file dump with session state
#[derive(Debug, Clone)]
pub struct SlaveDump {
    pub records: Vec<(SlotId, SlaveRecord)>,
    pub free: Vec<SlotId>,
}
