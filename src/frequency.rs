//! Byte frequency tables and their container header encoding.
//!
//! The header layout is
//!
//! ```text
//! u32 entry_count
//! entry_count × { u8 byte_value, u32 occurrence_count }
//! ```
//!
//! with integers big-endian and entries in ascending byte order, so equal
//! inputs always produce equal headers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stream::{BitRead, BitWrite};

/// Longest input the container's 32-bit length field can describe.
pub const MAX_INPUT_LEN: u64 = u32::MAX as u64;

/// Occurrence count of every byte value present in an input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    counts: BTreeMap<u8, u32>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every byte of `source`, then rewind it.
    pub fn tabulate<R: BitRead + ?Sized>(source: &mut R) -> Result<Self> {
        Self::tabulate_up_to(source, MAX_INPUT_LEN)
    }

    /// Like [`tabulate`](Self::tabulate), failing as soon as more than
    /// `limit` bytes have been read.
    fn tabulate_up_to<R: BitRead + ?Sized>(source: &mut R, limit: u64) -> Result<Self> {
        let mut counts = [0u32; 256];
        let mut total = 0u64;
        while let Some(byte) = source.next_byte()? {
            total += 1;
            check_len(total, limit)?;
            // bounded by total, which is at most u32::MAX here
            counts[usize::from(byte)] += 1;
        }
        source.reset()?;

        let counts = (0u8..=255)
            .zip(counts)
            .filter(|&(_, count)| count > 0)
            .collect();

        Ok(Self { counts })
    }

    /// Count the bytes of an in-memory buffer.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        check_len(data.len() as u64, MAX_INPUT_LEN)?;
        let mut table = Self::new();
        for &byte in data {
            *table.counts.entry(byte).or_default() += 1;
        }
        Ok(table)
    }

    /// Set the count for `byte`; a zero count removes the entry.
    pub fn insert(&mut self, byte: u8, count: u32) {
        if count == 0 {
            self.counts.remove(&byte);
        } else {
            self.counts.insert(byte, count);
        }
    }

    pub fn get(&self, byte: u8) -> Option<u32> {
        self.counts.get(&byte).copied()
    }

    /// Number of distinct byte values.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, i.e. the length of the tabulated input.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    /// Entries in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.counts.iter().map(|(&b, &c)| (b, c))
    }

    /// Size of the serialized header in bytes.
    pub fn header_len(&self) -> u64 {
        4 + 5 * self.counts.len() as u64
    }

    pub fn write_to<W: BitWrite + ?Sized>(&self, sink: &mut W) -> Result<()> {
        // at most 256 entries
        sink.write_u32(self.counts.len() as u32)?;
        for (byte, count) in self.iter() {
            sink.write_byte(byte)?;
            sink.write_u32(count)?;
        }
        Ok(())
    }

    pub fn read_from<R: BitRead + ?Sized>(source: &mut R) -> Result<Self> {
        let entries = source
            .read_u32()
            .map_err(|e| header_error(e, "container ends before the entry count"))?;
        if entries > 256 {
            return Err(Error::malformed(format!(
                "entry count {entries} exceeds the 256 possible byte values"
            )));
        }

        let mut counts = BTreeMap::new();
        for index in 0..entries {
            let (byte, count) = read_entry(source).map_err(|e| {
                header_error(
                    e,
                    &format!("container ends at entry {index} of {entries}"),
                )
            })?;
            if count == 0 {
                return Err(Error::malformed(format!(
                    "byte 0x{byte:02x} has a zero count"
                )));
            }
            if counts.insert(byte, count).is_some() {
                return Err(Error::malformed(format!(
                    "byte 0x{byte:02x} appears more than once"
                )));
            }
        }

        Ok(Self { counts })
    }
}

fn check_len(len: u64, limit: u64) -> Result<()> {
    if len > limit {
        Err(Error::InputTooLarge { len })
    } else {
        Ok(())
    }
}

fn read_entry<R: BitRead + ?Sized>(source: &mut R) -> Result<(u8, u32)> {
    let byte = source.read_byte()?;
    let count = source.read_u32()?;
    Ok((byte, count))
}

/// Running out of content inside the header means the header lied.
fn header_error(err: Error, message: &str) -> Error {
    if err.is_end_of_stream() {
        Error::malformed(message)
    } else {
        err
    }
}

impl FromIterator<(u8, u32)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (u8, u32)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (byte, count) in iter {
            table.insert(byte, count);
        }
        table
    }
}
