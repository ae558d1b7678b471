//! Chain Iterator
//!
//! Follows `next` pointers from a master's head slave.

use crate::error::{LinkError, Result};
use crate::record::{SlaveRecord, SlotId};
use crate::storage::RecordStore;

/// Walks one chain, newest slave first
///
/// Yields `(slot, slave)` for every linked node, valid or not. Stops with a
/// `Corruption` error after more steps than the slave file has slots, and
/// after the first error of any kind.
pub struct ChainIter<'a> {
    /// Slave file being walked
    slaves: &'a RecordStore<SlaveRecord>,
    /// Next slot to visit
    next: Option<SlotId>,
    /// Steps left before the walk is declared cyclic
    budget: u32,
    /// Set once an error has been yielded
    done: bool,
}

impl<'a> ChainIter<'a> {
    /// Start a walk at `head`
    pub(crate) fn new(slaves: &'a RecordStore<SlaveRecord>, head: Option<SlotId>) -> Result<Self> {
        let budget = match head {
            Some(_) if !slaves.exists() => {
                return Err(LinkError::FileUnavailable {
                    path: slaves.path().to_path_buf(),
                })
            }
            Some(_) => slaves.slot_count()?,
            None => 0,
        };

        Ok(Self {
            slaves,
            next: head,
            budget,
            done: false,
        })
    }
}

impl Iterator for ChainIter<'_> {
    type Item = Result<(SlotId, SlaveRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let slot = self.next?;

        if self.budget == 0 {
            self.done = true;
            return Some(Err(LinkError::Corruption(format!(
                "slave chain revisits slot {} (cycle or dangling link)",
                slot
            ))));
        }
        self.budget -= 1;

        match self.slaves.read_at(slot) {
            Ok(slave) => {
                self.next = slave.next;
                Some(Ok((slot, slave)))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
