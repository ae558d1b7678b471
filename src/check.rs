//! Invariant Checks
//!
//! Cross-checks the session state (index, free-lists) against full scans
//! of both data files.
//!
//! ## Checked
//! - Index strictly ascending, one entry per valid master, each entry
//!   pointing at a valid master with that key
//! - Every valid master's chain is finite, holds only valid slaves owned by
//!   that master, and matches `slave_count`
//! - No valid slave is orphaned or linked from two chains
//! - Free-lists list only invalid, in-range slots, each once

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::chain::ChainIter;
use crate::error::{LinkError, Result};
use crate::index::PrimaryIndex;
use crate::record::{MasterRecord, Record, SlaveRecord, SlotId};
use crate::storage::{FreeList, RecordStore};

/// A single broken invariant
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    IndexUnsorted,
    IndexDangling { key: i32, slot: SlotId },
    MasterNotIndexed { key: i32, slot: SlotId },
    ChainBroken { key: i32, reason: String },
    InvalidSlaveInChain { key: i32, slot: SlotId },
    ForeignSlave { key: i32, slot: SlotId, owner: i32 },
    SharedSlave { slot: SlotId },
    CountMismatch { key: i32, recorded: i32, actual: i32 },
    OrphanSlave { slot: SlotId },
    FreeSlotInUse { kind: &'static str, slot: SlotId },
    FreeSlotOutOfRange { kind: &'static str, slot: SlotId },
    FreeSlotRepeated { kind: &'static str, slot: SlotId },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::IndexUnsorted => write!(f, "index is not strictly ascending"),
            Violation::IndexDangling { key, slot } => {
                write!(f, "index entry {} -> {} does not name a valid master with that key", key, slot)
            }
            Violation::MasterNotIndexed { key, slot } => {
                write!(f, "valid master {} at slot {} is not indexed", key, slot)
            }
            Violation::ChainBroken { key, reason } => {
                write!(f, "chain of master {} is broken: {}", key, reason)
            }
            Violation::InvalidSlaveInChain { key, slot } => {
                write!(f, "chain of master {} links deleted slave slot {}", key, slot)
            }
            Violation::ForeignSlave { key, slot, owner } => {
                write!(f, "chain of master {} links slot {} owned by {}", key, slot, owner)
            }
            Violation::SharedSlave { slot } => {
                write!(f, "slave slot {} is linked from more than one chain", slot)
            }
            Violation::CountMismatch { key, recorded, actual } => {
                write!(f, "master {} records {} slaves, chain holds {}", key, recorded, actual)
            }
            Violation::OrphanSlave { slot } => {
                write!(f, "valid slave slot {} is not reachable from any master", slot)
            }
            Violation::FreeSlotInUse { kind, slot } => {
                write!(f, "free {} slot {} holds a valid record", kind, slot)
            }
            Violation::FreeSlotOutOfRange { kind, slot } => {
                write!(f, "free {} slot {} is beyond end of file", kind, slot)
            }
            Violation::FreeSlotRepeated { kind, slot } => {
                write!(f, "free {} slot {} is listed more than once", kind, slot)
            }
        }
    }
}

/// Outcome of an invariant check
#[derive(Debug, Clone, Default)]
pub struct InvariantReport {
    pub master_slots: usize,
    pub valid_masters: usize,
    pub slave_slots: usize,
    pub valid_slaves: usize,
    pub violations: Vec<Violation>,
}

impl InvariantReport {
    /// True when no invariant is broken
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Run every check
///
/// Missing data files are treated as empty.
pub fn check_invariants(
    masters: &RecordStore<MasterRecord>,
    slaves: &RecordStore<SlaveRecord>,
    index: &PrimaryIndex,
    master_free: &FreeList,
    slave_free: &FreeList,
) -> Result<InvariantReport> {
    let master_records = scan_or_empty(masters)?;
    let slave_records = scan_or_empty(slaves)?;

    let mut report = InvariantReport {
        master_slots: master_records.len(),
        valid_masters: master_records.iter().filter(|(_, m)| m.is_valid()).count(),
        slave_slots: slave_records.len(),
        valid_slaves: slave_records.iter().filter(|(_, s)| s.is_valid()).count(),
        violations: Vec::new(),
    };

    check_index(index, &master_records, &mut report.violations);
    check_chains(slaves, &master_records, &slave_records, &mut report.violations)?;
    check_free_list::<MasterRecord>(master_free, &master_records, &mut report.violations);
    check_free_list::<SlaveRecord>(slave_free, &slave_records, &mut report.violations);

    if !report.is_ok() {
        tracing::warn!(violations = report.violations.len(), "Invariant check failed");
    }
    Ok(report)
}

fn scan_or_empty<R: Record>(store: &RecordStore<R>) -> Result<Vec<(SlotId, R)>> {
    match store.scan() {
        Ok(records) => Ok(records),
        Err(LinkError::FileUnavailable { .. }) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

fn check_index(
    index: &PrimaryIndex,
    masters: &[(SlotId, MasterRecord)],
    out: &mut Vec<Violation>,
) {
    if !index.is_sorted_unique() {
        out.push(Violation::IndexUnsorted);
    }

    for entry in index.entries() {
        let ok = masters
            .get(entry.slot as usize)
            .is_some_and(|(_, m)| m.is_valid() && m.key == entry.key);
        if !ok {
            out.push(Violation::IndexDangling {
                key: entry.key,
                slot: entry.slot,
            });
        }
    }

    for (slot, master) in masters.iter().filter(|(_, m)| m.is_valid()) {
        if index.lookup(master.key) != Some(*slot) {
            out.push(Violation::MasterNotIndexed {
                key: master.key,
                slot: *slot,
            });
        }
    }
}

fn check_chains(
    slaves: &RecordStore<SlaveRecord>,
    masters: &[(SlotId, MasterRecord)],
    slave_records: &[(SlotId, SlaveRecord)],
    out: &mut Vec<Violation>,
) -> Result<()> {
    let mut linked: HashMap<SlotId, i32> = HashMap::new();

    for (_, master) in masters.iter().filter(|(_, m)| m.is_valid()) {
        let mut actual = 0;
        for item in ChainIter::new(slaves, master.head_slave)? {
            let (slot, slave) = match item {
                Ok(node) => node,
                Err(e) => {
                    out.push(Violation::ChainBroken {
                        key: master.key,
                        reason: e.to_string(),
                    });
                    break;
                }
            };

            if linked.insert(slot, master.key).is_some() {
                out.push(Violation::SharedSlave { slot });
            }
            if !slave.is_valid() {
                out.push(Violation::InvalidSlaveInChain {
                    key: master.key,
                    slot,
                });
                continue;
            }
            if slave.owner_key != master.key {
                out.push(Violation::ForeignSlave {
                    key: master.key,
                    slot,
                    owner: slave.owner_key,
                });
            }
            actual += 1;
        }

        if actual != master.slave_count {
            out.push(Violation::CountMismatch {
                key: master.key,
                recorded: master.slave_count,
                actual,
            });
        }
    }

    for (slot, _) in slave_records.iter().filter(|(_, s)| s.is_valid()) {
        if !linked.contains_key(slot) {
            out.push(Violation::OrphanSlave { slot: *slot });
        }
    }

    Ok(())
}

fn check_free_list<R: Record>(free: &FreeList, records: &[(SlotId, R)], out: &mut Vec<Violation>) {
    let mut seen = HashSet::new();
    for &slot in free.as_slice() {
        if !seen.insert(slot) {
            out.push(Violation::FreeSlotRepeated { kind: R::KIND, slot });
        }
        match records.get(slot as usize) {
            None => out.push(Violation::FreeSlotOutOfRange { kind: R::KIND, slot }),
            Some((_, record)) if record.is_valid() => {
                out.push(Violation::FreeSlotInUse { kind: R::KIND, slot })
            }
            Some(_) => {}
        }
    }
}
