//! The shared Huffman tree over field-path operations.
//!
//! The tree shape is part of the wire format. It is rebuilt from the static
//! operation weights rather than transmitted, so construction must be
//! deterministic down to tie-breaking:
//!
//! - a weight of 0 counts as 1;
//! - leaves are ordered by symbol index, internal nodes by creation order
//!   after the last leaf;
//! - the two lightest nodes are merged first, and among equal weights the
//!   later node wins;
//! - the first node taken becomes the left child (bit 0), the second the
//!   right child (bit 1).

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::OnceLock;

use bitstream::{BitReader, BitResult};

use crate::error::TreeError;
use crate::op::FieldOp;

/// Maximum number of symbols a tree may hold, so every code fits in a `u64`.
pub const MAX_SYMBOLS: usize = 64;

/// A node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// A leaf carrying a symbol (operation-table index).
    Leaf { symbol: usize },
    /// An internal node with arena indices of its children.
    Internal { left: usize, right: usize },
}

/// The bit code for one symbol.
///
/// Bit `i` of [`bits`](Self::bits) is the `i`-th bit read during
/// traversal, which is also the order a least-significant-first writer emits
/// them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HuffmanCode {
    bits: u64,
    len: u8,
}

impl HuffmanCode {
    /// Returns the code bits, first traversal bit in the least significant position.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.bits
    }

    /// Returns the code length in bits.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(self) -> u8 {
        self.len
    }
}

impl fmt::Display for HuffmanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            let bit = (self.bits >> i) & 1;
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}

/// A binary prefix tree built from symbol weights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: usize,
    codes: Vec<HuffmanCode>,
}

#[derive(Debug, PartialEq, Eq)]
struct HeapEntry {
    weight: u64,
    node: usize,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the maximum: lightest first, then the later node.
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl HuffmanTree {
    /// Builds a tree from per-symbol weights.
    pub fn build(weights: &[u32]) -> Result<Self, TreeError> {
        if weights.len() < 2 {
            return Err(TreeError::TooFewSymbols {
                count: weights.len(),
            });
        }
        if weights.len() > MAX_SYMBOLS {
            return Err(TreeError::TooManySymbols {
                count: weights.len(),
                max: MAX_SYMBOLS,
            });
        }
        Ok(Self::from_weights(weights))
    }

    fn from_weights(weights: &[u32]) -> Self {
        // Arena index doubles as the tie-break ordinal.
        let mut nodes: Vec<Node> = (0..weights.len())
            .map(|symbol| Node::Leaf { symbol })
            .collect();
        let mut heap: BinaryHeap<HeapEntry> = weights
            .iter()
            .enumerate()
            .map(|(node, &weight)| HeapEntry {
                weight: u64::from(weight.max(1)),
                node,
            })
            .collect();

        while heap.len() > 1 {
            let (Some(left), Some(right)) = (heap.pop(), heap.pop()) else {
                break;
            };
            let node = nodes.len();
            nodes.push(Node::Internal {
                left: left.node,
                right: right.node,
            });
            heap.push(HeapEntry {
                weight: left.weight + right.weight,
                node,
            });
        }

        let root = heap.pop().map_or(0, |entry| entry.node);
        let codes = assign_codes(&nodes, root, weights.len());
        Self { nodes, root, codes }
    }

    /// Returns the arena index of the root node.
    #[must_use]
    pub const fn root(&self) -> usize {
        self.root
    }

    /// Returns the node at an arena index.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<Node> {
        self.nodes.get(index).copied()
    }

    /// Returns the number of leaf symbols.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.codes.len()
    }

    /// Returns the code assigned to `symbol`.
    #[must_use]
    pub fn code(&self, symbol: usize) -> Option<HuffmanCode> {
        self.codes.get(symbol).copied()
    }

    /// Returns every symbol's code, indexed by symbol.
    #[must_use]
    pub fn codes(&self) -> &[HuffmanCode] {
        &self.codes
    }

    /// Walks from the root one bit at a time (1 = right, 0 = left) and
    /// returns the symbol of the leaf reached.
    pub fn read_symbol(&self, reader: &mut BitReader<'_>) -> BitResult<usize> {
        let mut index = self.root;
        loop {
            match self.nodes[index] {
                Node::Leaf { symbol } => return Ok(symbol),
                Node::Internal { left, right } => {
                    index = if reader.read_bit()? { right } else { left };
                }
            }
        }
    }
}

fn assign_codes(nodes: &[Node], root: usize, symbols: usize) -> Vec<HuffmanCode> {
    let mut codes = vec![HuffmanCode { bits: 0, len: 0 }; symbols];
    let mut stack = vec![(root, HuffmanCode { bits: 0, len: 0 })];
    while let Some((index, code)) = stack.pop() {
        match nodes[index] {
            Node::Leaf { symbol } => codes[symbol] = code,
            Node::Internal { left, right } => {
                let len = code.len + 1;
                stack.push((
                    left,
                    HuffmanCode {
                        bits: code.bits,
                        len,
                    },
                ));
                stack.push((
                    right,
                    HuffmanCode {
                        bits: code.bits | (1 << code.len),
                        len,
                    },
                ));
            }
        }
    }
    codes
}

/// Returns the process-wide tree for the field-path operation table.
///
/// Built on first use; concurrent first callers observe a single build.
pub fn field_path_tree() -> &'static HuffmanTree {
    static TREE: OnceLock<HuffmanTree> = OnceLock::new();
    TREE.get_or_init(|| HuffmanTree::from_weights(&FieldOp::weights()))
}

#[cfg(test)]
mod tests {
    use bitstream::BitWriter;

    use super::*;

    const EXPECTED_CODES: [(FieldOp, &str); FieldOp::COUNT] = [
        (FieldOp::PlusOne, "0"),
        (FieldOp::PlusTwo, "1110"),
        (FieldOp::PlusThree, "110010"),
        (FieldOp::PlusFour, "11011111"),
        (FieldOp::PlusN, "11010"),
        (FieldOp::PushOneLeftDeltaZeroRightZero, "110110001101"),
        (FieldOp::PushOneLeftDeltaZeroRightNonZero, "110110001100101"),
        (FieldOp::PushOneLeftDeltaOneRightZero, "11011010"),
        (FieldOp::PushOneLeftDeltaOneRightNonZero, "11000"),
        (FieldOp::PushOneLeftDeltaNRightZero, "11011100"),
        (FieldOp::PushOneLeftDeltaNRightNonZero, "11011001"),
        (FieldOp::PushOneLeftDeltaNRightNonZeroPack6Bits, "1111"),
        (FieldOp::PushOneLeftDeltaNRightNonZeroPack8Bits, "110110110"),
        (FieldOp::PushTwoLeftDeltaZero, "1101100011001000"),
        (FieldOp::PushTwoPack5LeftDeltaZero, "11011000110010011"),
        (FieldOp::PushThreeLeftDeltaZero, "11011000110010010"),
        (FieldOp::PushThreePack5LeftDeltaZero, "11011000110011101"),
        (FieldOp::PushTwoLeftDeltaOne, "11011000110011100"),
        (FieldOp::PushTwoPack5LeftDeltaOne, "11011000110011111"),
        (FieldOp::PushThreeLeftDeltaOne, "11011000110011110"),
        (FieldOp::PushThreePack5LeftDeltaOne, "11011000110011001"),
        (FieldOp::PushTwoLeftDeltaN, "11011000110011000"),
        (FieldOp::PushTwoPack5LeftDeltaN, "11011000110011011"),
        (FieldOp::PushThreeLeftDeltaN, "11011000110011010"),
        (FieldOp::PushThreePack5LeftDeltaN, "1101100011000101"),
        (FieldOp::PushN, "1101100011000100"),
        (FieldOp::PushNAndNonTopological, "110111011"),
        (FieldOp::PopOnePlusOne, "110110001100001"),
        (FieldOp::PopOnePlusN, "1101100011000111"),
        (FieldOp::PopAllButOnePlusOne, "110011"),
        (FieldOp::PopAllButOnePlusN, "110110000"),
        (FieldOp::PopAllButOnePlusNPack3Bits, "110111010"),
        (FieldOp::PopAllButOnePlusNPack6Bits, "11011110"),
        (FieldOp::PopNPlusOne, "1101100011000110"),
        (FieldOp::PopNPlusN, "1101100011000001"),
        (FieldOp::PopNAndNonTopographical, "1101100011000000"),
        (FieldOp::NonTopoComplex, "11011000111"),
        (FieldOp::NonTopoPenultimatePlusOne, "110110111"),
        (FieldOp::NonTopoComplexPack4Bits, "1101100010"),
        (FieldOp::FieldPathEncodeFinish, "10"),
    ];

    #[test]
    fn field_path_codes_match_wire_table() {
        let tree = field_path_tree();
        assert_eq!(tree.symbol_count(), FieldOp::COUNT);
        for (op, expected) in EXPECTED_CODES {
            let code = tree.code(op.index()).unwrap();
            assert_eq!(code.to_string(), expected, "code for {}", op.name());
        }
    }

    #[test]
    fn build_is_deterministic() {
        let a = HuffmanTree::build(&FieldOp::weights()).unwrap();
        let b = HuffmanTree::build(&FieldOp::weights()).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a, field_path_tree());
    }

    #[test]
    fn singleton_is_shared() {
        assert!(std::ptr::eq(field_path_tree(), field_path_tree()));
    }

    #[test]
    fn internal_nodes_have_two_children() {
        let tree = field_path_tree();
        let mut leaves = 0;
        let mut internal = 0;
        for index in 0.. {
            match tree.node(index) {
                Some(Node::Leaf { .. }) => leaves += 1,
                Some(Node::Internal { left, right }) => {
                    assert_ne!(left, right);
                    internal += 1;
                }
                None => break,
            }
        }
        assert_eq!(leaves, FieldOp::COUNT);
        assert_eq!(internal, FieldOp::COUNT - 1);
    }

    #[test]
    fn finish_code_is_short() {
        let tree = field_path_tree();
        let finish = tree.code(FieldOp::FieldPathEncodeFinish.index()).unwrap();
        for op in FieldOp::ALL {
            if op.weight() < FieldOp::FieldPathEncodeFinish.weight() {
                assert!(finish.len() <= tree.code(op.index()).unwrap().len());
            }
        }
    }

    #[test]
    fn zero_weight_codes_are_longest() {
        let tree = field_path_tree();
        let longest_weighted = FieldOp::ALL
            .iter()
            .filter(|op| op.weight() > 0)
            .map(|op| tree.code(op.index()).unwrap().len())
            .max()
            .unwrap();
        for op in FieldOp::ALL.iter().filter(|op| op.weight() == 0) {
            assert!(tree.code(op.index()).unwrap().len() >= longest_weighted);
        }
    }

    #[test]
    fn codes_are_prefix_free() {
        let codes = field_path_tree().codes();
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i == j || a.len() > b.len() {
                    continue;
                }
                let mask = (1u64 << a.len()) - 1;
                assert_ne!(b.bits() & mask, a.bits(), "{a} prefixes {b}");
            }
        }
    }

    #[test]
    fn read_symbol_follows_codes() {
        let tree = field_path_tree();
        let mut writer = BitWriter::new();
        for op in FieldOp::ALL {
            let code = tree.code(op.index()).unwrap();
            writer.write_bits(code.bits(), code.len()).unwrap();
        }
        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        for op in FieldOp::ALL {
            assert_eq!(tree.read_symbol(&mut reader).unwrap(), op.index());
        }
    }

    #[test]
    fn equal_weights_prefer_later_nodes() {
        // Symbols 2 and 1 tie and merge first, later symbol on the left.
        let tree = HuffmanTree::build(&[5, 1, 1]).unwrap();
        assert_eq!(tree.code(0).unwrap().to_string(), "1");
        assert_eq!(tree.code(2).unwrap().to_string(), "00");
        assert_eq!(tree.code(1).unwrap().to_string(), "01");
    }

    #[test]
    fn zero_weight_counts_as_one() {
        let zero = HuffmanTree::build(&[3, 0, 1]).unwrap();
        let one = HuffmanTree::build(&[3, 1, 1]).unwrap();
        assert_eq!(zero, one);
    }

    #[test]
    fn build_rejects_bad_tables() {
        assert_eq!(
            HuffmanTree::build(&[7]),
            Err(TreeError::TooFewSymbols { count: 1 })
        );
        assert!(matches!(
            HuffmanTree::build(&[1; MAX_SYMBOLS + 1]),
            Err(TreeError::TooManySymbols { .. })
        ));
    }
}
