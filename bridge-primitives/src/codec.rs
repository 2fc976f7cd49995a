//! Canonical message encoding and leaf-hash derivation
//!
//! A message envelope is immutable once dispatched. Its canonical byte
//! form uses fixed field order and big-endian integers so that every
//! party derives the identical leaf hash from the identical envelope.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::fmt;

/// Cross-domain message envelope
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Origin domain identifier
    pub origin: u32,
    /// Sender identifier on the origin domain
    pub sender: [u8; 32],
    /// Position of this message in the origin's accumulator
    pub nonce: u32,
    /// Destination domain identifier
    pub destination: u32,
    /// Recipient identifier on the destination domain
    pub recipient: [u8; 32],
    /// Opaque message body
    pub body: Vec<u8>,
}

impl Message {
    /// Canonical bytes: origin, sender, nonce, destination, recipient,
    /// body length, body. Fixed order, big-endian integers.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut writer = CanonicalWriter::new();
        writer.write_u32(self.origin);
        writer.write_bytes(&self.sender);
        writer.write_u32(self.nonce);
        writer.write_u32(self.destination);
        writer.write_bytes(&self.recipient);
        writer.write_u32(self.body.len() as u32);
        writer.write_bytes(&self.body);
        writer.finalize()
    }

    /// Leaf hash: SHA3-256 of the canonical bytes.
    pub fn to_leaf(&self) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        hasher.update(self.canonical_bytes());
        hasher.finalize().into()
    }

    /// Destination and nonce packed into a single word, used as a
    /// compact routing key in dispatch records.
    pub fn destination_and_nonce(&self) -> u64 {
        ((self.destination as u64) << 32) | self.nonce as u64
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("origin", &self.origin)
            .field("sender", &hex::encode(self.sender))
            .field("nonce", &self.nonce)
            .field("destination", &self.destination)
            .field("recipient", &hex::encode(self.recipient))
            .field("body_len", &self.body.len())
            .finish()
    }
}

/// Canonical serializer: append-only byte writer with fixed-width
/// big-endian integer encoding.
#[derive(Debug, Default)]
pub struct CanonicalWriter {
    buffer: Vec<u8>,
}

impl CanonicalWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Append raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Append a u32 (big-endian)
    pub fn write_u32(&mut self, n: u32) {
        self.buffer.extend_from_slice(&n.to_be_bytes());
    }

    /// Append a u64 (big-endian)
    pub fn write_u64(&mut self, n: u64) {
        self.buffer.extend_from_slice(&n.to_be_bytes());
    }

    /// Consume the writer and return the accumulated bytes
    pub fn finalize(self) -> Vec<u8> {
        self.buffer
    }

    /// Consume the writer and return the SHA3-256 of the accumulated bytes
    pub fn hash(self) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        hasher.update(&self.buffer);
        hasher.finalize().into()
    }
}
