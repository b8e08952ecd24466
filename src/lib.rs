//! # huffstream
//!
//! Static Huffman coding of byte streams into a self-describing container.
//!
//! The encoder counts byte frequencies, builds a minimum-weight code tree,
//! and writes the frequency table followed by the bit-packed codes. The
//! decoder rebuilds the identical tree from the table and walks it bit by
//! bit. Both sides work over the [`BitRead`] / [`BitWrite`] traits, so the
//! same code runs against memory buffers and files.
//!
//! ```rust
//! let data = b"AAAAABBBCC";
//! let container = huffstream::encode_bytes(data)?;
//! assert_eq!(huffstream::decode_bytes(&container)?, data);
//! # Ok::<(), huffstream::Error>(())
//! ```

pub mod code_table;
pub mod codec;
pub mod config;
pub mod error;
pub mod frequency;
pub mod stream;
pub mod tree;

pub use code_table::CodeTable;
pub use codec::{
    decode, decode_bytes, decode_file, encode, encode_bytes, encode_file, round_trip_file, Report,
};
pub use config::CodecConfig;
pub use error::{Error, Result};
pub use frequency::FrequencyTable;
pub use stream::{BitRead, BitWrite, FileReader, FileWriter, MemoryReader, MemoryWriter};
pub use tree::{HuffmanTree, Node};
