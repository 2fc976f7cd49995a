//! Event records emitted by bridge state machines
//!
//! Events are the discovery surface for the off-chain relay: the
//! Outbox records dispatches, the Replica records update acceptance,
//! delivery outcomes, and fraud. Each instance buffers its own events;
//! callers drain them after mutating calls.

use serde::{Deserialize, Serialize};

/// A state-machine notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeEvent {
    /// A message was appended to an Outbox accumulator
    Dispatch {
        /// Index the accumulator assigned to the leaf
        leaf_index: u64,
        /// Destination domain and nonce packed into one word
        destination_and_nonce: u64,
        /// Leaf hash of the dispatched message
        leaf: [u8; 32],
    },

    /// A signed update was accepted and enqueued
    Update {
        /// Origin domain the update attests for
        home_domain: u32,
        /// Root the update chained from
        old_root: [u8; 32],
        /// Newly enqueued root
        new_root: [u8; 32],
    },

    /// Conflicting signed updates proved updater fraud; the replica
    /// has halted permanently
    DoubleUpdate {
        /// Common prior root of both updates
        old_root: [u8; 32],
        /// The two conflicting new roots
        new_roots: [[u8; 32]; 2],
    },

    /// A delivery attempt completed
    Process {
        /// Leaf hash of the delivered message
        leaf: [u8; 32],
        /// Whether the recipient handler succeeded
        success: bool,
    },

    /// A recipient handler failed; the message remains retryable
    ProcessError {
        /// Leaf hash of the message
        leaf: [u8; 32],
        /// Recipient whose handler failed
        recipient: [u8; 32],
        /// Diagnostic data returned by the handler, if any
        diagnostic: Vec<u8>,
    },
}
