//! Incremental Merkle accumulator and inclusion proofs
//!
//! Fixed-depth (32), append-only binary tree with SHA3-256 hashing.
//! Unfilled branches hash to precomputed zero-subtree values, so the
//! root after N appends is reproducible purely from the leaf sequence
//! and each append touches only O(depth) nodes.
//!
//! The accumulator alone cannot produce inclusion proofs; the
//! [`ProvingTree`] retains the full leaf sequence and derives sibling
//! paths that verify against the accumulator's root.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::sync::OnceLock;

/// Fixed tree depth
pub const TREE_DEPTH: usize = 32;

/// Leaf slots in a depth-32 tree; usable capacity is `MAX_LEAVES - 1`
/// so every stored leaf keeps a branch level to live in.
pub const MAX_LEAVES: u64 = 1 << TREE_DEPTH;

/// Hash two child nodes into their parent
fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Zero-subtree hashes: `zero_hashes()[h]` is the root of an all-empty
/// subtree of height `h`, with the empty leaf being 32 zero bytes.
fn zero_hashes() -> &'static [[u8; 32]; TREE_DEPTH] {
    static ZEROES: OnceLock<[[u8; 32]; TREE_DEPTH]> = OnceLock::new();
    ZEROES.get_or_init(|| {
        let mut zeroes = [[0u8; 32]; TREE_DEPTH];
        let mut node = [0u8; 32];
        for zero in zeroes.iter_mut() {
            *zero = node;
            node = hash_pair(&node, &node);
        }
        zeroes
    })
}

/// Root of the completely empty tree
fn empty_root() -> [u8; 32] {
    let mut node = [0u8; 32];
    for zero in zero_hashes() {
        node = hash_pair(&node, zero);
    }
    node
}

/// Incremental Merkle accumulator
///
/// Stores only the left-edge branch of the tree plus the leaf count.
/// No deletion or mutation of existing leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleAccumulator {
    branch: [[u8; 32]; TREE_DEPTH],
    count: u64,
}

impl Default for MerkleAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl MerkleAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self {
            branch: [[0u8; 32]; TREE_DEPTH],
            count: 0,
        }
    }

    /// Append a leaf, returning its assigned index.
    ///
    /// Fails only when the tree is at capacity (`MAX_LEAVES - 1`
    /// leaves); a rejected append leaves count and root untouched.
    pub fn append(&mut self, leaf: [u8; 32]) -> Result<u64> {
        if self.count >= MAX_LEAVES - 1 {
            return Err(Error::TreeFull {
                capacity: MAX_LEAVES - 1,
            });
        }

        let index = self.count;
        self.count += 1;

        let mut node = leaf;
        let mut size = self.count;
        for parent in self.branch.iter_mut() {
            if size & 1 == 1 {
                *parent = node;
                return Ok(index);
            }
            node = hash_pair(parent, &node);
            size >>= 1;
        }

        // count < MAX_LEAVES here, so some level above took the node.
        Err(Error::TreeFull {
            capacity: MAX_LEAVES - 1,
        })
    }

    /// Current root over all appended leaves
    pub fn root(&self) -> [u8; 32] {
        let zeroes = zero_hashes();
        let mut node = [0u8; 32];
        let mut size = self.count;
        for (height, sibling) in self.branch.iter().enumerate() {
            if size & 1 == 1 {
                node = hash_pair(sibling, &node);
            } else {
                node = hash_pair(&node, &zeroes[height]);
            }
            size >>= 1;
        }
        node
    }

    /// Number of appended leaves
    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Prover-side tree: retains the full leaf sequence so sibling paths
/// can be derived for any leaf. Produces the same root as a
/// [`MerkleAccumulator`] fed the identical sequence.
#[derive(Debug, Clone, Default)]
pub struct ProvingTree {
    leaves: Vec<[u8; 32]>,
}

impl ProvingTree {
    /// Create an empty proving tree
    pub fn new() -> Self {
        Self { leaves: Vec::new() }
    }

    /// Ingest a leaf, returning its assigned index
    pub fn ingest(&mut self, leaf: [u8; 32]) -> Result<u64> {
        if self.leaves.len() as u64 >= MAX_LEAVES - 1 {
            return Err(Error::TreeFull {
                capacity: MAX_LEAVES - 1,
            });
        }
        self.leaves.push(leaf);
        Ok(self.leaves.len() as u64 - 1)
    }

    /// Number of ingested leaves
    pub fn count(&self) -> u64 {
        self.leaves.len() as u64
    }

    /// Materialize every tree level, zero-padded on the right
    fn levels(&self) -> Vec<Vec<[u8; 32]>> {
        let zeroes = zero_hashes();
        let mut levels: Vec<Vec<[u8; 32]>> = Vec::with_capacity(TREE_DEPTH + 1);
        levels.push(self.leaves.clone());

        for height in 0..TREE_DEPTH {
            let prev = &levels[height];
            let mut next = Vec::with_capacity(prev.len().div_ceil(2));
            for i in 0..prev.len().div_ceil(2) {
                let left = prev.get(2 * i).copied().unwrap_or(zeroes[height]);
                let right = prev.get(2 * i + 1).copied().unwrap_or(zeroes[height]);
                next.push(hash_pair(&left, &right));
            }
            levels.push(next);
        }

        levels
    }

    /// Root over all ingested leaves
    pub fn root(&self) -> [u8; 32] {
        self.levels()[TREE_DEPTH]
            .first()
            .copied()
            .unwrap_or_else(empty_root)
    }

    /// Inclusion proof for the leaf at `index`
    pub fn prove(&self, index: u64) -> Result<MerkleProof> {
        if index >= self.count() {
            return Err(Error::IndexOutOfBounds {
                index,
                count: self.count(),
            });
        }

        let zeroes = zero_hashes();
        let levels = self.levels();
        let mut path = [[0u8; 32]; TREE_DEPTH];
        for (height, entry) in path.iter_mut().enumerate() {
            let sibling = (index >> height) ^ 1;
            *entry = levels[height]
                .get(sibling as usize)
                .copied()
                .unwrap_or(zeroes[height]);
        }

        Ok(MerkleProof {
            leaf: self.leaves[index as usize],
            index,
            path,
        })
    }
}

/// Inclusion proof: leaf, its index, and the sibling path to the root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Leaf hash being proven
    pub leaf: [u8; 32],
    /// Leaf index in the accumulator
    pub index: u64,
    /// Sibling hashes, leaf level first
    pub path: [[u8; 32]; TREE_DEPTH],
}

impl MerkleProof {
    /// Root implied by this proof. The index bits decide left/right
    /// orientation at each level.
    pub fn compute_root(&self) -> [u8; 32] {
        let mut node = self.leaf;
        for (height, sibling) in self.path.iter().enumerate() {
            if (self.index >> height) & 1 == 1 {
                node = hash_pair(sibling, &node);
            } else {
                node = hash_pair(&node, sibling);
            }
        }
        node
    }

    /// Check this proof against an expected root
    pub fn verify(&self, expected_root: &[u8; 32]) -> bool {
        self.compute_root() == *expected_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(n: u8) -> [u8; 32] {
        [n; 32]
    }

    #[test]
    fn test_empty_roots_agree() {
        let accumulator = MerkleAccumulator::new();
        let prover = ProvingTree::new();
        assert_eq!(accumulator.root(), prover.root());
        assert_eq!(accumulator.count(), 0);
    }

    #[test]
    fn test_append_assigns_sequential_indices() {
        let mut accumulator = MerkleAccumulator::new();
        for i in 0..10u8 {
            assert_eq!(accumulator.append(leaf(i)).unwrap(), i as u64);
        }
        assert_eq!(accumulator.count(), 10);
    }

    #[test]
    fn test_incremental_matches_prover() {
        let mut accumulator = MerkleAccumulator::new();
        let mut prover = ProvingTree::new();

        for i in 0..33u8 {
            accumulator.append(leaf(i)).unwrap();
            prover.ingest(leaf(i)).unwrap();
            assert_eq!(accumulator.root(), prover.root(), "after {} leaves", i + 1);
        }
    }

    #[test]
    fn test_root_changes_with_each_append() {
        // Leaf values start at 1: an all-zero leaf is indistinguishable
        // from right-side zero padding, so its root equals the empty root.
        let mut accumulator = MerkleAccumulator::new();
        let mut seen = vec![accumulator.root()];
        for i in 1..=8u8 {
            accumulator.append(leaf(i)).unwrap();
            let root = accumulator.root();
            assert!(!seen.contains(&root));
            seen.push(root);
        }
    }

    #[test]
    fn test_proof_roundtrip_all_leaves() {
        let mut accumulator = MerkleAccumulator::new();
        let mut prover = ProvingTree::new();
        for i in 0..7u8 {
            accumulator.append(leaf(i)).unwrap();
            prover.ingest(leaf(i)).unwrap();
        }

        let root = accumulator.root();
        for i in 0..7u64 {
            let proof = prover.prove(i).unwrap();
            assert_eq!(proof.leaf, leaf(i as u8));
            assert!(proof.verify(&root), "proof for leaf {i}");
        }
    }

    #[test]
    fn test_proof_rejects_wrong_leaf() {
        let mut prover = ProvingTree::new();
        for i in 0..4u8 {
            prover.ingest(leaf(i)).unwrap();
        }
        let root = prover.root();

        let mut proof = prover.prove(2).unwrap();
        proof.leaf = leaf(0xFF);
        assert!(!proof.verify(&root));
    }

    #[test]
    fn test_proof_rejects_wrong_index() {
        let mut prover = ProvingTree::new();
        for i in 0..4u8 {
            prover.ingest(leaf(i)).unwrap();
        }
        let root = prover.root();

        let mut proof = prover.prove(2).unwrap();
        proof.index = 3;
        assert!(!proof.verify(&root));
    }

    #[test]
    fn test_prove_out_of_bounds() {
        let mut prover = ProvingTree::new();
        prover.ingest(leaf(1)).unwrap();

        let err = prover.prove(5).unwrap_err();
        assert_eq!(err, Error::IndexOutOfBounds { index: 5, count: 1 });
    }

    #[test]
    fn test_append_at_capacity_fails_without_mutation() {
        let mut accumulator = MerkleAccumulator::new();
        accumulator.append(leaf(1)).unwrap();
        accumulator.count = MAX_LEAVES - 1;
        let root_before = accumulator.root();

        let err = accumulator.append(leaf(2)).unwrap_err();
        assert_eq!(
            err,
            Error::TreeFull {
                capacity: MAX_LEAVES - 1
            }
        );

        // A rejected append is all-or-nothing.
        assert_eq!(accumulator.count(), MAX_LEAVES - 1);
        assert_eq!(accumulator.root(), root_before);
    }

    #[test]
    fn test_zero_hash_chain() {
        let zeroes = zero_hashes();
        assert_eq!(zeroes[0], [0u8; 32]);
        for h in 1..TREE_DEPTH {
            assert_eq!(zeroes[h], hash_pair(&zeroes[h - 1], &zeroes[h - 1]));
        }
    }
}
