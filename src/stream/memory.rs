//! In-memory bit streams.

use bitvec::prelude::*;

use super::{BitRead, BitWrite};
use crate::error::{Error, Result};

/// Reads bits from a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct MemoryReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    position: usize,
}

impl<'a> MemoryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            bits: data.view_bits::<Msb0>(),
            position: 0,
        }
    }

    /// Bits left before the end of the slice.
    pub fn remaining_bits(&self) -> usize {
        self.bits.len() - self.position
    }
}

impl BitRead for MemoryReader<'_> {
    fn read_bit(&mut self) -> Result<bool> {
        match self.bits.get(self.position) {
            Some(bit) => {
                self.position += 1;
                Ok(*bit)
            }
            None => Err(Error::EndOfStream {
                bits_read: self.position as u64,
            }),
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.position = 0;
        Ok(())
    }

    fn bits_read(&self) -> u64 {
        self.position as u64
    }

    // the slice length is already known, no need to scan
    fn byte_len(&mut self) -> Result<u64> {
        self.reset()?;
        Ok((self.bits.len() / 8) as u64)
    }
}

/// Accumulates written bits in a growable buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    bits: BitVec<u8, Msb0>,
    written: u64,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flush and hand over the written bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.pad();
        self.bits.into_vec()
    }

    fn pad(&mut self) {
        while self.bits.len() % 8 != 0 {
            self.bits.push(false);
        }
    }
}

impl BitWrite for MemoryWriter {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.bits.push(bit);
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.pad();
        Ok(())
    }

    fn bits_written(&self) -> u64 {
        self.written
    }
}
