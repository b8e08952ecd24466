//! Bit-granular sequential streams.
//!
//! [`BitRead`] and [`BitWrite`] are the only things the codec knows about its
//! input and output. Bits are addressed most-significant first within each
//! byte and multi-byte integers are big-endian, so a stream written through
//! one backing store reads back identically through any other.
//!
//! Two backing stores are provided: [`memory`] over byte slices and vectors,
//! and [`file`] over block-buffered OS files.

use bitvec::prelude::*;

use crate::error::Result;

pub mod file;
pub mod memory;

pub use file::{FileReader, FileWriter};
pub use memory::{MemoryReader, MemoryWriter};

/// Default number of bytes a file-backed stream buffers per block.
pub const BLOCK_SIZE: usize = 4096;

/// A sequential, rewindable source of bits.
pub trait BitRead {
    /// Read the next bit, failing with [`EndOfStream`](crate::Error::EndOfStream)
    /// once the content is exhausted.
    fn read_bit(&mut self) -> Result<bool>;

    /// Rewind to the first bit of the content.
    fn reset(&mut self) -> Result<()>;

    /// Number of bits consumed since the last reset.
    fn bits_read(&self) -> u64;

    /// Read 8 bits, most significant first.
    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | u8::from(self.read_bit()?);
        }
        Ok(byte)
    }

    /// Read 4 bytes as a big-endian integer.
    fn read_u32(&mut self) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..4 {
            value = (value << 8) | u32::from(self.read_byte()?);
        }
        Ok(value)
    }

    /// Like [`read_byte`](Self::read_byte), but end of data is `Ok(None)`.
    fn next_byte(&mut self) -> Result<Option<u8>> {
        match self.read_byte() {
            Ok(byte) => Ok(Some(byte)),
            Err(e) if e.is_end_of_stream() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Total number of whole bytes in the content.
    ///
    /// Scans the stream to exhaustion and rewinds it, so this costs a full
    /// pass and leaves the cursor at the start.
    fn byte_len(&mut self) -> Result<u64> {
        self.reset()?;
        let mut bytes = 0u64;
        while self.next_byte()?.is_some() {
            bytes += 1;
        }
        self.reset()?;
        Ok(bytes)
    }
}

/// A sequential sink of bits.
pub trait BitWrite {
    /// Append one bit.
    fn write_bit(&mut self, bit: bool) -> Result<()>;

    /// Push buffered bits to the backing store, zero-padding a partial
    /// trailing byte.
    fn flush(&mut self) -> Result<()>;

    /// Number of bits written by the caller, excluding padding.
    fn bits_written(&self) -> u64;

    /// Write 8 bits, most significant first.
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        for shift in (0..8).rev() {
            self.write_bit((byte >> shift) & 1 == 1)?;
        }
        Ok(())
    }

    /// Write a big-endian 32-bit integer.
    fn write_u32(&mut self, value: u32) -> Result<()> {
        for byte in value.to_be_bytes() {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Write every bit of `bits` in order.
    fn write_bits(&mut self, bits: &BitSlice<u8, Msb0>) -> Result<()> {
        for bit in bits.iter().by_vals() {
            self.write_bit(bit)?;
        }
        Ok(())
    }
}
