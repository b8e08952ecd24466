use serde::{Deserialize, Serialize};

use crate::stream::BLOCK_SIZE;

/// Settings for the file-backed entry points.
///
/// The in-memory codec has nothing to configure; these only affect how
/// [`encode_file`](crate::encode_file) and friends touch the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Bytes buffered per file read or write.
    pub block_size: usize,

    /// Leave a partially written output file in place when an operation fails.
    pub keep_partial_output: bool,

    /// Appended to the input path to name the intermediate container of a round trip.
    pub container_suffix: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            block_size: BLOCK_SIZE,
            keep_partial_output: false,
            container_suffix: String::from("__compressed"),
        }
    }
}

impl CodecConfig {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn with_keep_partial_output(mut self, keep: bool) -> Self {
        self.keep_partial_output = keep;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = CodecConfig::default();
        assert_eq!(c.block_size, 4096);
        assert!(!c.keep_partial_output);
        assert_eq!(c.container_suffix, "__compressed");
    }

    #[test]
    fn zero_block_size_is_clamped() {
        assert_eq!(CodecConfig::default().with_block_size(0).block_size, 1);
    }

    #[test]
    fn missing_fields_take_defaults() {
        #[derive(Serialize)]
        struct Partial {
            keep_partial_output: bool,
        }

        let packed = rmp_serde::to_vec_named(&Partial {
            keep_partial_output: true,
        })
        .unwrap();
        let c: CodecConfig = rmp_serde::from_slice(&packed).unwrap();

        assert!(c.keep_partial_output);
        assert_eq!(c.block_size, 4096);
    }
}
