//! Chain Manager
//!
//! Insert, find and delete slaves within a master's chain.

use crate::error::{LinkError, Result};
use crate::record::{MasterRecord, Record, SlaveRecord, SlotId};
use crate::storage::{FreeList, RecordStore};

use super::ChainIter;

/// Chain operations over a master file and a slave file
///
/// Borrows the stores; the caller supplies the slave free-list to the
/// operations that allocate or release slots.
#[derive(Clone, Copy)]
pub struct ChainManager<'a> {
    masters: &'a RecordStore<MasterRecord>,
    slaves: &'a RecordStore<SlaveRecord>,
}

impl<'a> ChainManager<'a> {
    pub fn new(
        masters: &'a RecordStore<MasterRecord>,
        slaves: &'a RecordStore<SlaveRecord>,
    ) -> Self {
        Self { masters, slaves }
    }

    /// Walk the chain of `master`, newest first
    pub fn iter(&self, master: &MasterRecord) -> Result<ChainIter<'a>> {
        ChainIter::new(self.slaves, master.head_slave)
    }

    /// Collect the whole chain of `master`
    pub fn walk(&self, master: &MasterRecord) -> Result<Vec<(SlotId, SlaveRecord)>> {
        self.iter(master)?.collect()
    }

    /// First valid slave of `master` matching `pred`
    pub fn find<P>(&self, master: &MasterRecord, mut pred: P) -> Result<Option<(SlotId, SlaveRecord)>>
    where
        P: FnMut(&SlaveRecord) -> bool,
    {
        for item in self.iter(master)? {
            let (slot, slave) = item?;
            if slave.is_valid() && pred(&slave) {
                return Ok(Some((slot, slave)));
            }
        }
        Ok(None)
    }

    /// Link `slave` as the new head of the master at `master_slot`
    ///
    /// The slave lands in a slot popped from `free`, or is appended. The
    /// master's head and count are written back. Returns the slave's slot.
    pub fn insert_slave(
        &self,
        master_slot: SlotId,
        mut slave: SlaveRecord,
        free: &mut FreeList,
    ) -> Result<SlotId> {
        let mut master = self.read_live_master(master_slot)?;

        slave.owner_key = master.key;
        slave.next = master.head_slave;
        slave.valid = true;

        let slot = match free.acquire() {
            Some(slot) => {
                self.slaves.write_at(slot, &slave)?;
                tracing::debug!(slot, "Reused free slave slot");
                slot
            }
            None => self.slaves.append(&slave)?,
        };

        master.head_slave = Some(slot);
        master.slave_count += 1;
        self.masters.write_at(master_slot, &master)?;

        Ok(slot)
    }

    /// Unlink and invalidate the first valid slave matching `pred`
    ///
    /// Rewrites either the master's head or the predecessor's `next`,
    /// releases the slot, and writes the master back with the decremented
    /// count. Returns the removed slave.
    pub fn delete_slave<P>(
        &self,
        master_slot: SlotId,
        mut pred: P,
        free: &mut FreeList,
    ) -> Result<SlaveRecord>
    where
        P: FnMut(&SlaveRecord) -> bool,
    {
        let mut master = self.read_live_master(master_slot)?;

        let mut prev: Option<SlotId> = None;
        let mut found: Option<(SlotId, SlaveRecord)> = None;
        for item in self.iter(&master)? {
            let (slot, slave) = item?;
            if slave.is_valid() && pred(&slave) {
                found = Some((slot, slave));
                break;
            }
            prev = Some(slot);
        }

        let (slot, mut slave) = found.ok_or_else(|| {
            LinkError::NotFound(format!("slave record for master {}", master.key))
        })?;

        match prev {
            None => master.head_slave = slave.next,
            Some(prev_slot) => self.slaves.update_at(prev_slot, |p| {
                p.next = slave.next;
                Ok(())
            })?,
        }

        slave.set_valid(false);
        self.slaves.write_at(slot, &slave)?;
        free.release(slot);

        master.slave_count -= 1;
        self.masters.write_at(master_slot, &master)?;

        tracing::debug!(key = master.key, slot, "Spliced slave out of chain");
        Ok(slave)
    }

    /// Invalidate every valid slave in `master`'s chain
    ///
    /// Links are left as they are since the owning master is going away.
    /// Returns the number of slaves invalidated.
    pub fn delete_all_for_master(&self, master: &MasterRecord, free: &mut FreeList) -> Result<usize> {
        let chain = self.walk(master)?;

        let mut removed = 0;
        for (slot, mut slave) in chain {
            if !slave.is_valid() {
                continue;
            }
            slave.set_valid(false);
            self.slaves.write_at(slot, &slave)?;
            free.release(slot);
            removed += 1;
        }

        tracing::debug!(key = master.key, removed, "Invalidated slave chain");
        Ok(removed)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn read_live_master(&self, slot: SlotId) -> Result<MasterRecord> {
        let master = self.masters.read_at(slot)?;
        if !master.is_valid() {
            return Err(LinkError::NotFound(format!("master at slot {}", slot)));
        }
        Ok(master)
    }
}
