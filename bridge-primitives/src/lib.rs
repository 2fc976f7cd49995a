//! CrossLink Bridge Primitives
//!
//! Stateless protocol layer for optimistic cross-domain messaging:
//! - Canonical message encoding and leaf-hash derivation
//! - Incremental Merkle accumulator with O(depth) appends
//! - Inclusion proofs against an accumulator root
//! - Domain-separated Ed25519 signature verification
//!
//! # Determinism
//!
//! Every hash in this crate is computed over hand-written big-endian
//! canonical bytes, never over derived serialization. Two parties that
//! agree on a leaf sequence agree on the root; two parties that agree
//! on a digest agree on what a signature attests to.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications, clippy::all)]

pub mod codec;
pub mod error;
pub mod merkle;
pub mod signature;

pub use codec::{CanonicalWriter, Message};
pub use error::{Error, Result};
pub use merkle::{MerkleAccumulator, MerkleProof, ProvingTree, MAX_LEAVES, TREE_DEPTH};
pub use signature::{checkpoint_digest, domain_hash, update_digest, verify, UpdaterKeypair};

/// Protocol version, bound into every signature digest via the domain hash.
pub const PROTOCOL_VERSION: u16 = 1;
