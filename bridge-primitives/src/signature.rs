//! Domain-separated signature construction and verification
//!
//! Every digest an updater signs is bound to an origin domain and the
//! protocol version through [`domain_hash`]. A signature produced for
//! one domain or protocol can never be replayed against another.
//!
//! The core only verifies; [`UpdaterKeypair`] is a software signer in
//! the spirit of an HSM mock, for tests and relay harnesses.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha3::{Digest, Sha3_256};

use crate::codec::CanonicalWriter;
use crate::PROTOCOL_VERSION;

/// Protocol-identifying separator mixed into every domain hash
const DOMAIN_SEPARATOR: &[u8] = b"CROSSLINK";

/// Domain hash: SHA3-256(domain BE || separator || protocol version BE).
///
/// All signing digests must be derived through this routine; a raw hash
/// of a payload alone is never a valid signing target.
pub fn domain_hash(domain: u32) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(domain.to_be_bytes());
    hasher.update(DOMAIN_SEPARATOR);
    hasher.update(PROTOCOL_VERSION.to_be_bytes());
    hasher.finalize().into()
}

/// Digest attesting to a root transition `old_root -> new_root` on the
/// given origin domain. Used identically by update and double-update
/// verification so the two call sites can never diverge.
pub fn update_digest(domain: u32, old_root: &[u8; 32], new_root: &[u8; 32]) -> [u8; 32] {
    let mut writer = CanonicalWriter::new();
    writer.write_bytes(&domain_hash(domain));
    writer.write_bytes(old_root);
    writer.write_bytes(new_root);
    writer.hash()
}

/// Digest attesting to a checkpoint snapshot `(root, index)` on the
/// given origin domain.
pub fn checkpoint_digest(domain: u32, root: &[u8; 32], index: u64) -> [u8; 32] {
    let mut writer = CanonicalWriter::new();
    writer.write_bytes(&domain_hash(domain));
    writer.write_bytes(root);
    writer.write_u64(index);
    writer.hash()
}

/// Verify an Ed25519 signature over a digest.
///
/// Stateless and infallible: malformed keys or signatures are simply
/// not valid, so callers decide how to react to `false`.
pub fn verify(signer: &[u8; 32], digest: &[u8; 32], signature: &[u8; 64]) -> bool {
    let verifying_key = match VerifyingKey::from_bytes(signer) {
        Ok(key) => key,
        Err(_) => return false,
    };
    let signature = Signature::from_bytes(signature);
    verifying_key.verify(digest, &signature).is_ok()
}

/// Software updater keypair (Ed25519)
///
/// Stands in for the out-of-scope signing capability: given a
/// domain-separated digest it returns a detached signature.
#[derive(Debug)]
pub struct UpdaterKeypair {
    signing_key: SigningKey,
}

impl UpdaterKeypair {
    /// Generate a random keypair
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&rand::random::<[u8; 32]>()),
        }
    }

    /// Deterministic keypair from a 32-byte seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Public identity of this updater
    pub fn public(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign an arbitrary digest
    pub fn sign_digest(&self, digest: &[u8; 32]) -> [u8; 64] {
        self.signing_key.sign(digest).to_bytes()
    }

    /// Sign a root transition for the given origin domain
    pub fn sign_update(&self, domain: u32, old_root: &[u8; 32], new_root: &[u8; 32]) -> [u8; 64] {
        self.sign_digest(&update_digest(domain, old_root, new_root))
    }

    /// Sign a checkpoint snapshot for the given origin domain
    pub fn sign_checkpoint(&self, domain: u32, root: &[u8; 32], index: u64) -> [u8; 64] {
        self.sign_digest(&checkpoint_digest(domain, root, index))
    }
}
