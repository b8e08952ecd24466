//! Encode and decode passes over any pair of bit streams.
//!
//! Container layout, all integers big-endian:
//!
//! ```text
//! header  u32 entry_count
//!         entry_count × { u8 byte_value, u32 occurrence_count }
//! body    u32 original_byte_count
//!         concatenated codes of every original byte, zero-padded to a byte
//! ```
//!
//! An input with a single distinct byte value has an empty code; its body is
//! just the length field and decoding repeats that byte.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::code_table::CodeTable;
use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;
use crate::stream::{BitRead, BitWrite, FileReader, FileWriter, MemoryReader, MemoryWriter};
use crate::tree::HuffmanTree;

/// Sizes observed by one encode or decode pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Length of the uncompressed data.
    pub original_bytes: u64,
    /// Length of the container.
    pub container_bytes: u64,
    /// Entries in the frequency table.
    pub distinct_bytes: usize,
    /// Code bits in the body, excluding padding.
    pub body_bits: u64,
}

impl Report {
    fn new(frequencies: &FrequencyTable, body_bits: u64) -> Self {
        Self {
            original_bytes: frequencies.total(),
            container_bytes: frequencies.header_len() + 4 + body_bits.div_ceil(8),
            distinct_bytes: frequencies.len(),
            body_bits,
        }
    }

    /// Container size over original size; 0 for empty input.
    pub fn ratio(&self) -> f64 {
        if self.original_bytes == 0 {
            0.0
        } else {
            self.container_bytes as f64 / self.original_bytes as f64
        }
    }
}

/// Compress everything `source` holds into `sink`.
///
/// The source is read twice, once to count and once to emit, so it must
/// yield the same content after [`reset`](BitRead::reset).
pub fn encode<R, W>(source: &mut R, sink: &mut W) -> Result<Report>
where
    R: BitRead + ?Sized,
    W: BitWrite + ?Sized,
{
    source.reset()?;
    let frequencies = FrequencyTable::tabulate(source)?;
    let codes = HuffmanTree::build(&frequencies)
        .map(|tree| CodeTable::from_tree(&tree))
        .unwrap_or_default();

    frequencies.write_to(sink)?;
    // tabulate rejects totals above u32::MAX
    let original_len = frequencies.total() as u32;
    sink.write_u32(original_len)?;

    let mut emitted = 0u64;
    let mut body_bits = 0u64;
    while let Some(byte) = source.next_byte()? {
        let code = codes.get(byte).ok_or_else(|| {
            Error::SourceModified(format!("byte 0x{byte:02x} was not seen while counting"))
        })?;
        sink.write_bits(code)?;
        emitted += 1;
        body_bits += code.len() as u64;
    }
    if emitted != u64::from(original_len) {
        return Err(Error::SourceModified(format!(
            "counted {original_len} bytes but emitted {emitted}"
        )));
    }
    sink.flush()?;

    let report = Report::new(&frequencies, body_bits);
    debug!(
        original = report.original_bytes,
        container = report.container_bytes,
        distinct = report.distinct_bytes,
        max_code_len = codes.max_code_len(),
        "encoded"
    );
    Ok(report)
}

/// Expand the container held by `source` into `sink`.
///
/// Bits after the last decoded byte are ignored.
pub fn decode<R, W>(source: &mut R, sink: &mut W) -> Result<Report>
where
    R: BitRead + ?Sized,
    W: BitWrite + ?Sized,
{
    let frequencies = FrequencyTable::read_from(source)?;
    let tree = HuffmanTree::build(&frequencies);

    let expected = source.read_u32().map_err(|e| {
        if e.is_end_of_stream() {
            Error::malformed("container ends before the original length field")
        } else {
            e
        }
    })?;
    if u64::from(expected) != frequencies.total() {
        return Err(Error::malformed(format!(
            "original length {expected} disagrees with frequency total {}",
            frequencies.total()
        )));
    }

    let body_start = source.bits_read();
    if let Some(tree) = &tree {
        for decoded in 0..u64::from(expected) {
            let byte = tree.decode_byte(source).map_err(|e| {
                if e.is_end_of_stream() {
                    Error::truncated(decoded, u64::from(expected))
                } else {
                    e
                }
            })?;
            sink.write_byte(byte)?;
        }
    }
    sink.flush()?;

    let report = Report::new(&frequencies, source.bits_read() - body_start);
    debug!(
        original = report.original_bytes,
        container = report.container_bytes,
        "decoded"
    );
    Ok(report)
}

/// Compress an in-memory buffer.
pub fn encode_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut source = MemoryReader::new(data);
    let mut sink = MemoryWriter::new();
    encode(&mut source, &mut sink)?;
    Ok(sink.into_bytes())
}

/// Expand an in-memory container.
pub fn decode_bytes(container: &[u8]) -> Result<Vec<u8>> {
    let mut source = MemoryReader::new(container);
    let mut sink = MemoryWriter::new();
    decode(&mut source, &mut sink)?;
    Ok(sink.into_bytes())
}

/// Compress the file at `input` into a container file at `output`.
pub fn encode_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &CodecConfig,
) -> Result<Report> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let report = run_file_pass(input, output, config, |source, sink| encode(source, sink))?;
    info!(
        input = %input.display(),
        output = %output.display(),
        original = report.original_bytes,
        container = report.container_bytes,
        "encoded file"
    );
    Ok(report)
}

/// Expand the container file at `input` into `output`.
pub fn decode_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &CodecConfig,
) -> Result<Report> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let report = run_file_pass(input, output, config, |source, sink| decode(source, sink))?;
    info!(
        input = %input.display(),
        output = %output.display(),
        original = report.original_bytes,
        "decoded file"
    );
    Ok(report)
}

/// Encode `input` next to itself, then decode that container into `output`.
///
/// Returns the path of the intermediate container alongside the encode report.
pub fn round_trip_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &CodecConfig,
) -> Result<(PathBuf, Report)> {
    let input = input.as_ref();
    let mut container = input.as_os_str().to_owned();
    container.push(&config.container_suffix);
    let container = PathBuf::from(container);

    let report = encode_file(input, &container, config)?;
    decode_file(&container, output, config)?;
    Ok((container, report))
}

/// Open `input`, create `output`, and run `op` over the pair.
///
/// Only a file this call created or truncated is removed when `op` fails;
/// if `input` cannot be opened, or names the same file as an existing
/// `output`, nothing at `output` is touched.
fn run_file_pass<F>(input: &Path, output: &Path, config: &CodecConfig, op: F) -> Result<Report>
where
    F: FnOnce(&mut FileReader, &mut FileWriter) -> Result<Report>,
{
    let mut source = FileReader::with_block_size(input, config.block_size)?;
    if output.exists() && fs::canonicalize(input)? == fs::canonicalize(output)? {
        return Err(Error::SamePath {
            path: output.to_path_buf(),
        });
    }
    let mut sink = FileWriter::with_block_size(output, config.block_size)?;

    let result = op(&mut source, &mut sink);
    // close both handles before touching the output
    drop(sink);
    drop(source);

    if let Err(err) = &result {
        if !config.keep_partial_output {
            match fs::remove_file(output) {
                Ok(()) => warn!(
                    output = %output.display(),
                    kind = err.category(),
                    "removed partial output after failure"
                ),
                Err(remove_err) => warn!(
                    output = %output.display(),
                    error = %remove_err,
                    "could not remove partial output"
                ),
            }
        }
    }
    result
}
