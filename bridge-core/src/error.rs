//! Error types for bridge operations

use thiserror::Error;

/// Bridge result type
pub type Result<T> = std::result::Result<T, Error>;

/// Bridge errors
///
/// Every precondition violation aborts only the triggering call and
/// leaves all prior state unchanged. Recipient-handler failure inside
/// `process` is deliberately not an error; it is reported through a
/// `ProcessError` event instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Operation attempted outside its valid lifecycle state
    #[error("Invalid lifecycle state for {operation}: replica is {state}")]
    InvalidLifecycleState {
        /// Operation that was attempted
        operation: &'static str,
        /// Lifecycle state at the time of the call
        state: String,
    },

    /// Initialize called more than once
    #[error("Replica already initialized (remote domain {remote_domain})")]
    AlreadyInitialized {
        /// Remote domain of the existing initialization
        remote_domain: u32,
    },

    /// Signature did not verify under the updater identity
    #[error("Signature verification failed: {0}")]
    InvalidSignature(String),

    /// Update does not chain from the latest enqueued-or-current root
    #[error("Stale or non-chaining update: expected old root {expected}, got {actual}")]
    StaleUpdate {
        /// Root the update must chain from
        expected: String,
        /// Root the update claimed
        actual: String,
    },

    /// Merkle inclusion proof rejected
    #[error("Invalid Merkle proof: {0}")]
    InvalidProof(String),

    /// Message is not in the Pending state required for processing
    #[error("Message {leaf} not pending (status: {status})")]
    NotPending {
        /// Leaf hash of the message
        leaf: String,
        /// Status the message actually has
        status: String,
    },

    /// Resource budget cannot safely cover the reserve plus a nonzero
    /// forwarded amount
    #[error("Insufficient resource budget: {available} available, reserve is {reserve}")]
    InsufficientBudget {
        /// Budget available at entry
        available: u64,
        /// Reserve that must remain untouched
        reserve: u64,
    },

    /// Leaf index below the replica's start-processing floor
    #[error("Leaf index {actual} below processing floor {floor}")]
    BelowProcessingFloor {
        /// Lowest index this replica delivers
        floor: u32,
        /// Index of the rejected message
        actual: u32,
    },

    /// Message addressed to a different domain
    #[error("Wrong destination domain: expected {expected}, got {actual}")]
    WrongDestination {
        /// This replica's local domain
        expected: u32,
        /// Destination named by the message
        actual: u32,
    },

    /// Rejected double-update fraud evidence
    #[error("Invalid double-update evidence: {0}")]
    InvalidDoubleUpdate(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Primitive-layer error
    #[error("Primitive error: {0}")]
    Primitive(#[from] bridge_primitives::Error),
}
