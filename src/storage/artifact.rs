//! Flat `i32` artifacts
//!
//! The index and the free-lists are persisted as headerless sequences of
//! little-endian `i32` values, rewritten in full on every save.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::Result;

/// Read an artifact. Returns `None` if the file does not exist.
///
/// Trailing bytes that do not form a whole `i32` are dropped.
pub fn read_i32_artifact(path: &Path) -> Result<Option<Vec<i32>>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if data.len() % 4 != 0 {
        tracing::warn!(
            path = %path.display(),
            trailing = data.len() % 4,
            "Ignoring partial value at end of artifact"
        );
    }

    let mut buf = data.as_slice();
    let mut values = Vec::with_capacity(buf.len() / 4);
    while buf.remaining() >= 4 {
        values.push(buf.get_i32_le());
    }

    Ok(Some(values))
}

/// Write an artifact, replacing any previous content
pub fn write_i32_artifact(path: &Path, values: &[i32]) -> Result<()> {
    let mut buf = BytesMut::with_capacity(values.len() * 4);
    for value in values {
        buf.put_i32_le(*value);
    }

    let mut file = File::create(path)?;
    file.write_all(&buf)?;
    file.sync_all()?;

    Ok(())
}
