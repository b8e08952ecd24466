//! Error types for stream and codec operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for stream and codec operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Everything that can go wrong while reading, writing, encoding or decoding.
#[derive(Debug, Error)]
pub enum Error {
    /// The backing store could not be opened, read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A read was attempted past the end of the stream.
    #[error("end of stream after {bits_read} bits")]
    EndOfStream { bits_read: u64 },

    /// The frequency table header cannot be satisfied by the container.
    #[error("malformed header: {message}")]
    MalformedHeader { message: String },

    /// The body ran out of bits before every declared byte was decoded.
    #[error("truncated body: decoded {decoded} of {expected} bytes")]
    TruncatedBody { decoded: u64, expected: u64 },

    /// The source does not fit the 32-bit length fields of the container.
    #[error("input too large: {len} bytes exceeds the 32-bit length field")]
    InputTooLarge { len: u64 },

    /// The source changed between the counting pass and the emitting pass.
    #[error("source modified during encode: {0}")]
    SourceModified(String),

    /// Input and output name the same file, which writing would truncate.
    #[error("input and output are the same file: {}", path.display())]
    SamePath { path: PathBuf },
}

impl Error {
    /// Create a malformed header error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedHeader {
            message: message.into(),
        }
    }

    /// Create a truncated body error.
    pub fn truncated(decoded: u64, expected: u64) -> Self {
        Error::TruncatedBody { decoded, expected }
    }

    /// True if this error only signals that the stream has no more bits.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Error::EndOfStream { .. })
    }

    /// Short stable name of the error kind, used in log fields.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::EndOfStream { .. } => "end_of_stream",
            Error::MalformedHeader { .. } => "malformed_header",
            Error::TruncatedBody { .. } => "truncated_body",
            Error::InputTooLarge { .. } => "input_too_large",
            Error::SourceModified(_) => "source_modified",
            Error::SamePath { .. } => "same_path",
        }
    }
}
