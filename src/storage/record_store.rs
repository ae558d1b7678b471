//! Record Store
//!
//! Slot-addressed access to one fixed-size record file.
//!
//! ## Responsibilities
//! - Read / overwrite a slot by offset
//! - Append a slot and report where it landed
//! - Full scans for counting, dumping and index rebuilds
//!
//! Every call opens its own handle and drops it before returning, so no
//! file stays open between operations.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::error::{LinkError, Result};
use crate::record::{Record, SlotId};

/// A file of fixed-size `R` slots
#[derive(Debug, Clone)]
pub struct RecordStore<R: Record> {
    /// Path to the data file (may not exist yet)
    path: PathBuf,
    _record: PhantomData<R>,
}

impl<R: Record> RecordStore<R> {
    /// Bind a store to a path. The file is created lazily by `append`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    /// Get the data file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the data file exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Number of whole slots in the file (0 if absent)
    pub fn slot_count(&self) -> Result<u32> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(Self::slots_in(meta.len())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the slot at `offset`
    pub fn read_at(&self, offset: SlotId) -> Result<R> {
        let mut file = self.open(false)?;
        file.seek(SeekFrom::Start(Self::byte_offset(offset)))?;

        let mut buf = vec![0u8; R::SIZE as usize];
        file.read_exact(&mut buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => LinkError::ShortRead { offset },
            _ => LinkError::Io(e),
        })?;

        tracing::trace!(kind = R::KIND, offset, "Read slot");
        R::decode(&buf)
    }

    /// Overwrite the slot at `offset` (must already exist)
    pub fn write_at(&self, offset: SlotId, record: &R) -> Result<()> {
        let bytes = record.encode()?;
        let mut file = self.open(true)?;

        let slots = Self::slots_in(file.metadata()?.len());
        if offset >= slots {
            return Err(LinkError::OffsetOutOfRange { offset, slots });
        }

        file.seek(SeekFrom::Start(Self::byte_offset(offset)))?;
        file.write_all(&bytes)?;

        tracing::trace!(kind = R::KIND, offset, "Wrote slot");
        Ok(())
    }

    /// Read, modify and write back the slot at `offset`
    pub fn update_at<T>(&self, offset: SlotId, f: impl FnOnce(&mut R) -> Result<T>) -> Result<T> {
        let mut record = self.read_at(offset)?;
        let out = f(&mut record)?;
        self.write_at(offset, &record)?;
        Ok(out)
    }

    /// Append a slot, creating the file if needed. Returns its offset.
    pub fn append(&self, record: &R) -> Result<SlotId> {
        let bytes = record.encode()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let len = file.metadata()?.len();
        if len % R::SIZE != 0 {
            return Err(LinkError::Corruption(format!(
                "{} holds a partial {} slot ({} trailing bytes)",
                self.path.display(),
                R::KIND,
                len % R::SIZE
            )));
        }

        let offset = Self::slots_in(len);
        file.write_all(&bytes)?;

        tracing::trace!(kind = R::KIND, offset, "Appended slot");
        Ok(offset)
    }

    /// Every whole slot in file order, valid or not
    pub fn scan(&self) -> Result<Vec<(SlotId, R)>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LinkError::FileUnavailable {
                    path: self.path.clone(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        data.chunks_exact(R::SIZE as usize)
            .enumerate()
            .map(|(i, chunk)| Ok((i as SlotId, R::decode(chunk)?)))
            .collect()
    }

    /// Number of valid slots (full scan)
    pub fn count_valid(&self) -> Result<usize> {
        Ok(self.scan()?.iter().filter(|(_, r)| r.is_valid()).count())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Open the existing file, mapping "not found" to `FileUnavailable`
    fn open(&self, writable: bool) -> Result<File> {
        OpenOptions::new()
            .read(true)
            .write(writable)
            .open(&self.path)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => LinkError::FileUnavailable {
                    path: self.path.clone(),
                },
                _ => LinkError::Io(e),
            })
    }

    fn byte_offset(offset: SlotId) -> u64 {
        offset as u64 * R::SIZE
    }

    fn slots_in(len: u64) -> u32 {
        (len / R::SIZE) as u32
    }
}
