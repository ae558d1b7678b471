//! Response definitions
//!
//! Results of executed commands and their console rendering.

use std::fmt;

use crate::check::InvariantReport;
use crate::engine::{MasterDump, SlaveCounts, SlaveDump};
use crate::record::{MasterRecord, SlaveRecord, SlotId};

/// A successful command result
#[derive(Debug, Clone)]
pub enum Response {
    Master(MasterRecord),
    Slave(SlaveRecord),
    MasterInserted { key: i32, slot: SlotId },
    SlaveInserted { key: i32, isbn: i32, slot: SlotId },
    MasterDeleted { key: i32, slaves: usize },
    SlaveDeleted { key: i32, isbn: i32 },
    MasterUpdated(MasterRecord),
    SlaveUpdated(SlaveRecord),
    MasterCount(usize),
    SlaveCount(SlaveCounts),
    MasterDump(MasterDump),
    SlaveDump(SlaveDump),
    Check(InvariantReport),
}

/// Render an optional slot the way it is stored
fn slot(s: Option<SlotId>) -> i64 {
    s.map_or(-1, i64::from)
}

fn write_free_list(f: &mut fmt::Formatter<'_>, label: &str, free: &[SlotId]) -> fmt::Result {
    write!(f, "{}:", label)?;
    for s in free {
        write!(f, " {}", s)?;
    }
    Ok(())
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Master(m) => {
                writeln!(f, "Buyer Record:")?;
                writeln!(f, "Phone: {}", m.key)?;
                writeln!(f, "Name: {}", m.name)?;
                writeln!(f, "Address: {}", m.address)?;
                writeln!(f, "First Book Index: {}", slot(m.head_slave))?;
                write!(f, "Book Count: {}", m.slave_count)
            }
            Response::Slave(s) => {
                writeln!(f, "Book Record:")?;
                writeln!(f, "Phone: {}", s.owner_key)?;
                writeln!(f, "ISBN: {}", s.isbn)?;
                writeln!(f, "Title: {}", s.title)?;
                writeln!(f, "Author: {}", s.author)?;
                writeln!(f, "Price: {}", s.price)?;
                write!(f, "Next Book Index: {}", slot(s.next))
            }
            Response::MasterInserted { key, slot } => {
                write!(f, "Buyer {} inserted at record {}.", key, slot)
            }
            Response::SlaveInserted { key, isbn, slot } => {
                write!(f, "Book {} of buyer {} inserted at record {}.", isbn, key, slot)
            }
            Response::MasterDeleted { key, slaves } => {
                write!(f, "Buyer {} and {} book(s) deleted.", key, slaves)
            }
            Response::SlaveDeleted { key, isbn } => {
                write!(f, "Book {} of buyer {} deleted.", isbn, key)
            }
            Response::MasterUpdated(m) => write!(f, "Buyer {} updated.", m.key),
            Response::SlaveUpdated(s) => {
                write!(f, "Book {} of buyer {} updated.", s.isbn, s.owner_key)
            }
            Response::MasterCount(n) => write!(f, "Total valid buyer records: {}", n),
            Response::SlaveCount(counts) => {
                write!(f, "Total valid book records: {}", counts.total)?;
                for (key, count) in &counts.per_master {
                    write!(f, "\nPhone {}: {} books.", key, count)?;
                }
                Ok(())
            }
            Response::MasterDump(dump) => {
                writeln!(f, "--- Master File Contents ---")?;
                for (n, m) in &dump.records {
                    writeln!(f, "Record {}:", n)?;
                    writeln!(f, "  Phone: {}", m.key)?;
                    writeln!(f, "  Name: {}", m.name)?;
                    writeln!(f, "  Address: {}", m.address)?;
                    writeln!(f, "  First Book Index: {}", slot(m.head_slave))?;
                    writeln!(f, "  Book Count: {}", m.slave_count)?;
                    writeln!(f, "  Valid: {}", m.valid as i32)?;
                }
                writeln!(f, "--- End of Master File ---")?;
                writeln!(f, "Index Table:")?;
                for entry in &dump.index {
                    writeln!(f, "  Phone: {}, Record Number: {}", entry.key, entry.slot)?;
                }
                write_free_list(f, "Master Garbage List", &dump.free)
            }
            Response::SlaveDump(dump) => {
                writeln!(f, "--- Slave File Contents ---")?;
                for (n, s) in &dump.records {
                    writeln!(f, "Record {}:", n)?;
                    writeln!(f, "  Phone: {}", s.owner_key)?;
                    writeln!(f, "  ISBN: {}", s.isbn)?;
                    writeln!(f, "  Title: {}", s.title)?;
                    writeln!(f, "  Author: {}", s.author)?;
                    writeln!(f, "  Price: {}", s.price)?;
                    writeln!(f, "  Next Book Index: {}", slot(s.next))?;
                    writeln!(f, "  Valid: {}", s.valid as i32)?;
                }
                writeln!(f, "--- End of Slave File ---")?;
                write_free_list(f, "Slave Garbage List", &dump.free)
            }
            Response::Check(report) => {
                write!(
                    f,
                    "{} of {} buyer records valid, {} of {} book records valid.",
                    report.valid_masters, report.master_slots, report.valid_slaves, report.slave_slots
                )?;
                if report.is_ok() {
                    return write!(f, "\nAll invariants hold.");
                }
                for violation in &report.violations {
                    write!(f, "\n  violation: {}", violation)?;
                }
                Ok(())
            }
        }
    }
}
