use std::collections::BTreeMap;

use bitvec::prelude::*;

use crate::frequency::FrequencyTable;
use crate::tree::{HuffmanTree, Node};

/// Byte → bit sequence mapping derived from a [`HuffmanTree`].
///
/// A `0` bit descends to the left child and a `1` bit to the right. For a
/// lone-leaf tree the single code is empty, and encoding emits no bits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, BitBox<u8, Msb0>>,
}

impl CodeTable {
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        // depth is bounded by the 256-symbol alphabet
        fn traverse(
            node: &Node,
            path: &mut BitVec<u8, Msb0>,
            codes: &mut BTreeMap<u8, BitBox<u8, Msb0>>,
        ) {
            match node {
                Node::Leaf { byte, .. } => {
                    codes.insert(*byte, path.clone().into_boxed_bitslice());
                }
                Node::Internal { left, right, .. } => {
                    path.push(false);
                    traverse(left, path, codes);
                    path.pop();

                    path.push(true);
                    traverse(right, path, codes);
                    path.pop();
                }
            }
        }

        let mut path = BitVec::new();
        let mut codes = BTreeMap::new();
        traverse(tree.root(), &mut path, &mut codes);

        Self { codes }
    }

    pub fn get(&self, byte: u8) -> Option<&BitSlice<u8, Msb0>> {
        self.codes.get(&byte).map(|code| code.as_bitslice())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitSlice<u8, Msb0>)> + '_ {
        self.codes.iter().map(|(&b, code)| (b, code.as_bitslice()))
    }

    pub fn max_code_len(&self) -> usize {
        self.codes.values().map(|code| code.len()).max().unwrap_or(0)
    }

    /// Number of body bits needed to encode an input with these frequencies.
    ///
    /// Bytes missing from the table contribute nothing.
    pub fn body_bits(&self, frequencies: &FrequencyTable) -> u64 {
        frequencies
            .iter()
            .filter_map(|(byte, count)| {
                self.get(byte)
                    .map(|code| code.len() as u64 * u64::from(count))
            })
            .sum()
    }

    /// True if no code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<_> = self.codes.values().collect();
        codes.iter().enumerate().all(|(i, a)| {
            codes
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !b.starts_with(a.as_bitslice()))
        })
    }
}
