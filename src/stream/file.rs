//! File-backed bit streams.
//!
//! Both sides move data between the OS file and a fixed-size block: the
//! reader refills its block whenever the cursor runs off the end, the writer
//! spills its block whenever it fills up. The file handle is owned by the
//! stream and closed when the stream is dropped.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use bitvec::prelude::*;

use super::{BitRead, BitWrite, BLOCK_SIZE};
use crate::error::{Error, Result};

/// Reads bits from a file one block at a time.
#[derive(Debug)]
pub struct FileReader {
    path: PathBuf,
    file: File,
    block: Box<[u8]>,
    filled: usize,
    cursor: usize,
    consumed: u64,
}

impl FileReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_block_size(path, BLOCK_SIZE)
    }

    pub fn with_block_size(path: impl AsRef<Path>, block_size: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(Self {
            path,
            file,
            block: vec![0u8; block_size.max(1)].into_boxed_slice(),
            filled: 0,
            cursor: 0,
            consumed: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the next block, returning how many bytes it holds (0 at end of file).
    fn refill(&mut self) -> Result<usize> {
        loop {
            match self.file.read(&mut self.block) {
                Ok(n) => {
                    self.filled = n;
                    self.cursor = 0;
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl BitRead for FileReader {
    fn read_bit(&mut self) -> Result<bool> {
        if self.cursor >= self.filled * 8 && self.refill()? == 0 {
            return Err(Error::EndOfStream {
                bits_read: self.consumed,
            });
        }
        let bit = self.block[..self.filled].view_bits::<Msb0>()[self.cursor];
        self.cursor += 1;
        self.consumed += 1;
        Ok(bit)
    }

    // reopening gives a fresh handle positioned at the start, even if the
    // previous one hit an error
    fn reset(&mut self) -> Result<()> {
        self.file = File::open(&self.path)?;
        self.filled = 0;
        self.cursor = 0;
        self.consumed = 0;
        Ok(())
    }

    fn bits_read(&self) -> u64 {
        self.consumed
    }
}

/// Writes bits to a file, one block at a time.
///
/// Bits still in the block are only written by [`flush`](BitWrite::flush);
/// dropping the writer without flushing discards them.
#[derive(Debug)]
pub struct FileWriter {
    file: File,
    block: BitVec<u8, Msb0>,
    block_bits: usize,
    written: u64,
}

impl FileWriter {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_block_size(path, BLOCK_SIZE)
    }

    pub fn with_block_size(path: impl AsRef<Path>, block_size: usize) -> Result<Self> {
        let file = File::create(path)?;
        let block_bits = block_size.max(1) * 8;
        Ok(Self {
            file,
            block: BitVec::with_capacity(block_bits),
            block_bits,
            written: 0,
        })
    }

    /// Write the whole bytes currently in the block.
    fn spill(&mut self) -> Result<()> {
        if !self.block.is_empty() {
            self.file.write_all(self.block.as_raw_slice())?;
            self.block.clear();
        }
        Ok(())
    }
}

impl BitWrite for FileWriter {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.block.push(bit);
        self.written += 1;
        if self.block.len() == self.block_bits {
            self.spill()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        while self.block.len() % 8 != 0 {
            self.block.push(false);
        }
        self.spill()?;
        self.file.flush()?;
        Ok(())
    }

    fn bits_written(&self) -> u64 {
        self.written
    }
}
