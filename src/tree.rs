//! Minimum-weight binary tree construction.
//!
//! Nodes are merged two at a time out of a min-heap until one root remains.
//! The heap orders on `(weight, order)` only, where `order` is assigned as
//! nodes are created: leaves first in ascending byte value, then each
//! internal node in turn. Ties therefore go to the lower byte value, leaves
//! beat internal nodes, and older internal nodes beat newer ones. Encoder
//! and decoder both run this builder, so equal tables give equal trees.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use derivative::Derivative;
use tracing::debug;

use crate::error::Result;
use crate::frequency::FrequencyTable;
use crate::stream::BitRead;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        byte: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn leaf(byte: u8, weight: u64) -> Self {
        Node::Leaf { byte, weight }
    }

    fn from_children(left: Node, right: Node) -> Self {
        Node::Internal {
            weight: left.weight() + right.weight(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

/// Heap slot; compares on weight then creation order, never on the node itself.
#[derive(Debug, Derivative)]
#[derivative(PartialEq, Eq, PartialOrd, Ord)]
struct HeapEntry {
    weight: u64,
    order: usize,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(Ord = "ignore")]
    node: Node,
}

impl HeapEntry {
    fn new(node: Node, order: usize) -> Reverse<Self> {
        Reverse(Self {
            weight: node.weight(),
            order,
            node,
        })
    }
}

/// A Huffman tree over byte values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Box<Node>,
}

impl HuffmanTree {
    /// Build the tree for `frequencies`, or `None` when the table is empty.
    ///
    /// A table with a single byte value yields a lone leaf root.
    pub fn build(frequencies: &FrequencyTable) -> Option<Self> {
        let mut pq: BinaryHeap<_> = frequencies
            .iter()
            .enumerate()
            .map(|(order, (byte, count))| {
                HeapEntry::new(Node::leaf(byte, u64::from(count)), order)
            })
            .collect();
        let mut next_order = pq.len();

        while pq.len() > 1 {
            let (Some(Reverse(left)), Some(Reverse(right))) = (pq.pop(), pq.pop()) else {
                break;
            };
            pq.push(HeapEntry::new(
                Node::from_children(left.node, right.node),
                next_order,
            ));
            next_order += 1;
        }

        let root = pq.pop()?.0.node;
        let tree = Self {
            root: Box::new(root),
        };
        debug!(
            leaves = frequencies.len(),
            weight = tree.root.weight(),
            depth = tree.depth(),
            "built huffman tree"
        );
        Some(tree)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Length of the longest root-to-leaf path; 0 for a lone leaf.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root.as_ref(), 0usize)];
        while let Some((node, depth)) = stack.pop() {
            match node {
                Node::Leaf { .. } => deepest = deepest.max(depth),
                Node::Internal { left, right, .. } => {
                    stack.push((left.as_ref(), depth + 1));
                    stack.push((right.as_ref(), depth + 1));
                }
            }
        }
        deepest
    }

    /// Walk from the root, one bit per level, to the next leaf.
    ///
    /// When the root is itself a leaf no bits are read.
    pub fn decode_byte<R: BitRead + ?Sized>(&self, source: &mut R) -> Result<u8> {
        let mut node = self.root.as_ref();
        loop {
            match node {
                Node::Leaf { byte, .. } => return Ok(*byte),
                Node::Internal { left, right, .. } => {
                    node = if source.read_bit()? {
                        right.as_ref()
                    } else {
                        left.as_ref()
                    };
                }
            }
        }
    }
}

// Skewed trees can be as deep as the alphabet, so tear down with an
// explicit stack instead of the recursive drop glue.
impl Drop for HuffmanTree {
    fn drop(&mut self) {
        let root = std::mem::replace(&mut self.root, Box::new(Node::leaf(0, 0)));
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if let Node::Internal { left, right, .. } = *node {
                stack.push(left);
                stack.push(right);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryReader;

    fn table(entries: &[(u8, u32)]) -> FrequencyTable {
        entries.iter().copied().collect()
    }

    #[test]
    fn node_from_children() {
        let left = Node::leaf(b'a', 2);
        let right = Node::leaf(b'b', 3);

        let n = Node::from_children(left.clone(), right.clone());

        assert_eq!(n.weight(), 5);
        assert!(!n.is_leaf());
        assert_eq!(
            n,
            Node::Internal {
                weight: 5,
                left: Box::new(left),
                right: Box::new(right),
            }
        );
    }

    #[test]
    fn heap_entry_compares_weight_then_order_only() {
        let a = HeapEntry::new(Node::leaf(b'z', 4), 1);
        let b = HeapEntry::new(Node::leaf(b'a', 4), 1);
        assert!(a == b);

        for i in 1..=100u64 {
            let light = HeapEntry::new(Node::leaf(0, i), 50);
            let heavy = HeapEntry::new(Node::leaf(0, i + 1), 0);
            // reversed for the min-heap
            assert!(light > heavy);
        }

        let first = HeapEntry::new(Node::leaf(0, 7), 0);
        let second = HeapEntry::new(Node::leaf(0, 7), 1);
        assert!(first > second);
    }

    #[test]
    fn empty_table_has_no_tree() {
        assert!(HuffmanTree::build(&FrequencyTable::new()).is_none());
    }

    #[test]
    fn single_byte_is_lone_leaf() {
        let tree = HuffmanTree::build(&table(&[(b'A', 4)])).unwrap();
        assert_eq!(tree.root(), &Node::leaf(b'A', 4));
        assert_eq!(tree.depth(), 0);

        // decoding a lone leaf consumes nothing
        let mut r = MemoryReader::new(&[]);
        assert_eq!(tree.decode_byte(&mut r).unwrap(), b'A');
        assert_eq!(r.bits_read(), 0);
    }

    #[test]
    fn first_extracted_is_left_child() {
        let tree = HuffmanTree::build(&table(&[(b'A', 5), (b'B', 3), (b'C', 2)])).unwrap();

        // A(5) ties with the C+B node(5); the leaf was created first
        let Node::Internal { left, right, weight } = tree.root() else {
            panic!("root should be internal");
        };
        assert_eq!(*weight, 10);
        assert_eq!(**left, Node::leaf(b'A', 5));
        let Node::Internal { left, right, .. } = right.as_ref() else {
            panic!("right child should be internal");
        };
        assert_eq!(**left, Node::leaf(b'C', 2));
        assert_eq!(**right, Node::leaf(b'B', 3));
    }

    #[test]
    fn equal_weights_break_ties_by_byte_then_creation() {
        let tree =
            HuffmanTree::build(&table(&[(b'D', 1), (b'C', 1), (b'B', 1), (b'A', 1)])).unwrap();
        let Node::Internal { left, right, .. } = tree.root() else {
            panic!("root should be internal");
        };
        assert_eq!(
            **left,
            Node::from_children(Node::leaf(b'A', 1), Node::leaf(b'B', 1))
        );
        assert_eq!(
            **right,
            Node::from_children(Node::leaf(b'C', 1), Node::leaf(b'D', 1))
        );
    }

    #[test]
    fn decode_walk_follows_bits() {
        let tree = HuffmanTree::build(&table(&[(b'A', 5), (b'B', 3), (b'C', 2)])).unwrap();
        // A = 0, C = 10, B = 11
        let bytes = [0b0101_1000];
        let mut r = MemoryReader::new(&bytes);
        assert_eq!(tree.decode_byte(&mut r).unwrap(), b'A');
        assert_eq!(tree.decode_byte(&mut r).unwrap(), b'C');
        assert_eq!(tree.decode_byte(&mut r).unwrap(), b'B');
        assert_eq!(r.bits_read(), 5);
    }

    #[test]
    fn decode_walk_fails_when_bits_run_out() {
        let tree = HuffmanTree::build(&table(&[(b'x', 1), (b'y', 1)])).unwrap();
        let mut r = MemoryReader::new(&[]);
        assert!(tree.decode_byte(&mut r).unwrap_err().is_end_of_stream());
    }

    #[test]
    fn fibonacci_weights_give_a_maximally_skewed_tree() {
        let mut fib = vec![1u32, 1];
        while fib.len() < 40 {
            let next = fib[fib.len() - 1] + fib[fib.len() - 2];
            fib.push(next);
        }
        let freq: FrequencyTable = fib.iter().enumerate().map(|(i, &c)| (i as u8, c)).collect();

        let tree = HuffmanTree::build(&freq).unwrap();
        assert_eq!(tree.depth(), 39);
        assert_eq!(tree.root().weight(), freq.total());
        drop(tree);
    }

    #[test]
    fn full_alphabet() {
        let freq: FrequencyTable = (0u8..=255).map(|b| (b, u32::from(b) + 1)).collect();
        let tree = HuffmanTree::build(&freq).unwrap();
        assert_eq!(tree.root().weight(), freq.total());
        assert!(tree.depth() >= 8);
    }

    #[test]
    fn rebuild_is_deterministic() {
        let freq = FrequencyTable::from_bytes(b"abracadabra alakazam").unwrap();
        assert_eq!(HuffmanTree::build(&freq), HuffmanTree::build(&freq));
    }
}
