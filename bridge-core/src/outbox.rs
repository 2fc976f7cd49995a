//! Origin-side message outbox
//!
//! Owns the Merkle accumulator for one origin domain. Dispatch appends
//! a message leaf; checkpoint snapshots `(root, count)` for off-chain
//! signing. Checkpoints are copies: later dispatches never alter an
//! already-read snapshot.

use bridge_primitives::{Message, MerkleAccumulator};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::events::BridgeEvent;
use crate::Result;

/// Snapshot of an Outbox accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Accumulator root at snapshot time
    pub root: [u8; 32],
    /// Leaf count at snapshot time
    pub index: u64,
}

/// Record of one dispatched message, the relay's discovery surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRecord {
    /// Index the accumulator assigned
    pub leaf_index: u64,
    /// Destination domain and nonce packed into one word
    pub destination_and_nonce: u64,
    /// Leaf hash of the message
    pub leaf: [u8; 32],
    /// Full message envelope
    pub message: Message,
}

/// Origin-side outbox for one domain
#[derive(Debug)]
pub struct Outbox {
    origin_domain: u32,
    sender: [u8; 32],
    tree: MerkleAccumulator,
    dispatches: Vec<DispatchRecord>,
    events: Vec<BridgeEvent>,
}

impl Outbox {
    /// Create an empty outbox for an origin domain and sender identity
    pub fn new(origin_domain: u32, sender: [u8; 32]) -> Self {
        Self {
            origin_domain,
            sender,
            tree: MerkleAccumulator::new(),
            dispatches: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Dispatch a message: build the envelope with the next nonce,
    /// append its leaf, and record the dispatch. Returns the assigned
    /// leaf index.
    pub fn dispatch(
        &mut self,
        destination: u32,
        recipient: [u8; 32],
        body: Vec<u8>,
    ) -> Result<u64> {
        let nonce = self.tree.count() as u32;
        let message = Message {
            origin: self.origin_domain,
            sender: self.sender,
            nonce,
            destination,
            recipient,
            body,
        };

        let leaf = message.to_leaf();
        let leaf_index = self.tree.append(leaf)?;
        let destination_and_nonce = message.destination_and_nonce();

        self.dispatches.push(DispatchRecord {
            leaf_index,
            destination_and_nonce,
            leaf,
            message,
        });
        self.events.push(BridgeEvent::Dispatch {
            leaf_index,
            destination_and_nonce,
            leaf,
        });

        info!(
            origin = self.origin_domain,
            destination,
            leaf_index,
            leaf = %hex::encode(leaf),
            "message dispatched"
        );

        Ok(leaf_index)
    }

    /// Snapshot the current `(root, count)`. Pure read; calling it
    /// redundantly re-exposes the same snapshot.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            root: self.tree.root(),
            index: self.tree.count(),
        }
    }

    /// Canonical external accessor for the current snapshot
    pub fn latest_checkpoint(&self) -> Checkpoint {
        self.checkpoint()
    }

    /// Origin domain of this outbox
    pub fn origin_domain(&self) -> u32 {
        self.origin_domain
    }

    /// Current accumulator root
    pub fn root(&self) -> [u8; 32] {
        self.tree.root()
    }

    /// Number of dispatched messages
    pub fn count(&self) -> u64 {
        self.tree.count()
    }

    /// All dispatch records, in leaf order
    pub fn dispatches(&self) -> &[DispatchRecord] {
        &self.dispatches
    }

    /// Drain buffered events
    pub fn drain_events(&mut self) -> Vec<BridgeEvent> {
        std::mem::take(&mut self.events)
    }
}
