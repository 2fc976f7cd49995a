//! CrossLink Bridge Core
//!
//! Optimistic cross-domain message passing between independent ledgers.
//!
//! # Architecture
//!
//! - **Outbox**: origin-side accumulator of dispatched messages,
//!   snapshotted into signed checkpoints
//! - **Replica**: destination-side verifier and executor, one instance
//!   per (local, remote) domain pair
//! - **Optimistic delay**: a submitted checkpoint is only trusted after
//!   a per-replica delay window elapses
//! - **Fraud proof**: two conflicting signed updates from the same root
//!   permanently halt the replica
//!
//! # Invariants
//!
//! - Each Outbox/Replica is a strictly serialized state machine; all
//!   discipline is precondition checks, never internal locking
//! - Message status moves None -> Pending -> Processed, never backward
//! - The pending checkpoint queue is strict FIFO
//! - A Failed replica rejects every mutating operation forever

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications, clippy::all)]

pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod outbox;
pub mod queue;
pub mod replica;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use events::BridgeEvent;
pub use executor::{Budget, ExecutionOutcome, MessageRecipient, RecipientError};
pub use outbox::{Checkpoint, DispatchRecord, Outbox};
pub use queue::{CheckpointQueue, QueueEntry};
pub use replica::{MessageStatus, Replica, ReplicaState};

/// Protocol version (mirrors `bridge_primitives::PROTOCOL_VERSION`)
pub const PROTOCOL_VERSION: u16 = bridge_primitives::PROTOCOL_VERSION;

/// Resource ceiling forwarded to a recipient handler per delivery
pub const PROCESS_BUDGET: u64 = 850_000;

/// Working budget the replica keeps for its own bookkeeping after a
/// recipient call, regardless of recipient behavior
pub const RESERVE_BUDGET: u64 = 15_000;

/// Default optimistic delay window (seconds)
pub const DEFAULT_OPTIMISTIC_SECONDS: u64 = 3_600;
