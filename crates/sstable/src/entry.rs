//! Entry codec: encodes/decodes `(key, value-or-tombstone)` records.
//!
//! ## Record layout
//!
//! ```text
//! [key_len: u32 LE][key][tag: u8][value_len: u32 LE][value]
//! ```
//!
//! `tag == 1` marks a live value, and `value_len` + `value` follow. `tag ==
//! 0` marks a tombstone; `value_len`/`value` are omitted entirely. The
//! on-disk format is not standardized across implementations — only
//! self-consistency between `encode` and `decode` is required.

use anyhow::{bail, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use memtable::EntryValue;
use std::io::Read;

/// Maximum key size accepted on decode (64 KiB). Bounds allocation when
/// reading a possibly-corrupt segment.
pub const MAX_KEY_BYTES: usize = 64 * 1024;
/// Maximum value size accepted on decode (10 MiB).
pub const MAX_VALUE_BYTES: usize = 10 * 1024 * 1024;

const TAG_TOMBSTONE: u8 = 0;
const TAG_LIVE: u8 = 1;

/// Serializes `(key, value)` into its on-disk record bytes.
pub fn encode(key: &[u8], value: &EntryValue) -> Vec<u8> {
    let mut buf = Vec::with_capacity(byte_length(key, value));
    buf.write_u32::<LittleEndian>(key.len() as u32).unwrap();
    buf.extend_from_slice(key);
    match value {
        EntryValue::Live(v) => {
            buf.write_u8(TAG_LIVE).unwrap();
            buf.write_u32::<LittleEndian>(v.len() as u32).unwrap();
            buf.extend_from_slice(v);
        }
        EntryValue::Tombstone => {
            buf.write_u8(TAG_TOMBSTONE).unwrap();
        }
    }
    buf
}

/// Returns the number of bytes `encode(key, value)` would produce, without
/// allocating. Used by the segment builder to track byte offsets while
/// appending.
pub fn byte_length(key: &[u8], value: &EntryValue) -> usize {
    let header = 4 + key.len() + 1;
    match value {
        EntryValue::Live(v) => header + 4 + v.len(),
        EntryValue::Tombstone => header,
    }
}

/// Decodes one entry from `r`, positioned at the start of a record.
///
/// Returns `(key, value)`. The reader is left positioned immediately after
/// the decoded record.
pub fn decode<R: Read>(r: &mut R) -> Result<(Vec<u8>, EntryValue)> {
    let key_len = r.read_u32::<LittleEndian>()? as usize;
    if key_len > MAX_KEY_BYTES {
        bail!("corrupt entry: key_len {} exceeds maximum {}", key_len, MAX_KEY_BYTES);
    }
    let mut key = vec![0u8; key_len];
    r.read_exact(&mut key)?;

    let tag = r.read_u8()?;
    let value = match tag {
        TAG_LIVE => {
            let value_len = r.read_u32::<LittleEndian>()? as usize;
            if value_len > MAX_VALUE_BYTES {
                bail!(
                    "corrupt entry: value_len {} exceeds maximum {}",
                    value_len,
                    MAX_VALUE_BYTES
                );
            }
            let mut value = vec![0u8; value_len];
            r.read_exact(&mut value)?;
            EntryValue::Live(value)
        }
        TAG_TOMBSTONE => EntryValue::Tombstone,
        other => bail!("corrupt entry: unknown tag {}", other),
    };

    Ok((key, value))
}
