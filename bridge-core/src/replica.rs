//! Destination-side replica state machine
//!
//! One Replica instance exists per (local domain, remote domain) pair.
//! It composes the checkpoint queue, signature verification, inclusion
//! proofs, and the bounded executor into the central state machine:
//!
//! ```text
//! Uninitialized --initialize--> Active --double_update--> Failed
//! ```
//!
//! Failed is terminal and unconditionally blocks every mutating
//! operation. Every precondition violation aborts only the triggering
//! call; prior state is never partially visible.

use std::collections::HashMap;

use bridge_primitives::{signature, Message, MerkleProof};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::events::BridgeEvent;
use crate::executor::{self, MessageRecipient};
use crate::queue::{CheckpointQueue, QueueEntry};
use crate::{Config, Error, Result, PROCESS_BUDGET, RESERVE_BUDGET};

/// Replica lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplicaState {
    /// Created but not yet initialized; only initialize is valid
    Uninitialized,
    /// Fully operational
    Active,
    /// Fraud proven; terminal, all mutating operations rejected
    Failed,
}

/// Delivery status of one message leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageStatus {
    /// Never proven against an acceptable root
    None,
    /// Proven; awaiting (or retrying) delivery
    Pending,
    /// Delivered successfully; terminal
    Processed,
}

/// Per-remote-domain verifier and executor of relayed messages
#[derive(Debug)]
pub struct Replica {
    local_domain: u32,
    remote_domain: u32,
    updater: [u8; 32],
    optimistic_seconds: u64,
    process_budget: u64,
    reserve_budget: u64,
    state: ReplicaState,
    current_root: [u8; 32],
    queue: CheckpointQueue,
    messages: HashMap<[u8; 32], MessageStatus>,
    next_to_process: u32,
    events: Vec<BridgeEvent>,
}

impl Replica {
    /// Create an uninitialized replica for a local domain
    pub fn new(local_domain: u32) -> Self {
        Self {
            local_domain,
            remote_domain: 0,
            updater: [0u8; 32],
            optimistic_seconds: 0,
            process_budget: PROCESS_BUDGET,
            reserve_budget: RESERVE_BUDGET,
            state: ReplicaState::Uninitialized,
            current_root: [0u8; 32],
            queue: CheckpointQueue::new(),
            messages: HashMap::new(),
            next_to_process: 0,
            events: Vec::new(),
        }
    }

    /// Create an uninitialized replica with budgets taken from config
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let mut replica = Self::new(config.local_domain);
        replica.process_budget = config.process_budget;
        replica.reserve_budget = config.reserve_budget;
        Ok(replica)
    }

    fn ensure_active(&self, operation: &'static str) -> Result<()> {
        if self.state != ReplicaState::Active {
            return Err(Error::InvalidLifecycleState {
                operation,
                state: format!("{:?}", self.state),
            });
        }
        Ok(())
    }

    /// Initialize the replica. Valid exactly once, from Uninitialized.
    pub fn initialize(
        &mut self,
        remote_domain: u32,
        updater: [u8; 32],
        current_root: [u8; 32],
        optimistic_seconds: u64,
        next_to_process: u32,
    ) -> Result<()> {
        if self.state != ReplicaState::Uninitialized {
            return Err(Error::AlreadyInitialized {
                remote_domain: self.remote_domain,
            });
        }

        self.remote_domain = remote_domain;
        self.updater = updater;
        self.current_root = current_root;
        self.optimistic_seconds = optimistic_seconds;
        self.next_to_process = next_to_process;
        self.state = ReplicaState::Active;

        info!(
            local = self.local_domain,
            remote = remote_domain,
            optimistic_seconds,
            "replica initialized"
        );
        Ok(())
    }

    /// Accept a signed root transition and enqueue the new root behind
    /// the optimistic delay.
    ///
    /// `old_root` must chain from the most recently enqueued root (or
    /// the current root when the queue is empty); the signature must
    /// verify under the updater identity for this replica's remote
    /// domain. Stale or forged updates are rejected without state
    /// change.
    pub fn update(
        &mut self,
        old_root: [u8; 32],
        new_root: [u8; 32],
        signature_bytes: &[u8; 64],
        now: u64,
    ) -> Result<()> {
        self.ensure_active("update")?;

        let expected = self.queue.last_root().unwrap_or(self.current_root);
        if old_root != expected {
            return Err(Error::StaleUpdate {
                expected: hex::encode(expected),
                actual: hex::encode(old_root),
            });
        }

        let digest = signature::update_digest(self.remote_domain, &old_root, &new_root);
        if !signature::verify(&self.updater, &digest, signature_bytes) {
            return Err(Error::InvalidSignature(
                "update not signed by updater".into(),
            ));
        }

        let eligible_at = now + self.optimistic_seconds;
        self.queue.enqueue(new_root, eligible_at);
        self.events.push(BridgeEvent::Update {
            home_domain: self.remote_domain,
            old_root,
            new_root,
        });

        info!(
            remote = self.remote_domain,
            new_root = %hex::encode(new_root),
            eligible_at,
            "update enqueued"
        );
        Ok(())
    }

    /// Promote every eligible pending root, in arrival order, setting
    /// the current root to the last promoted one. Returns the number
    /// of promoted checkpoints; 0 when nothing is eligible (no-op).
    pub fn confirm(&mut self, now: u64) -> Result<usize> {
        self.ensure_active("confirm")?;

        let drained = self.queue.confirm(now);
        if let Some(last) = drained.last() {
            self.current_root = last.root;
            info!(
                remote = self.remote_domain,
                confirmed = drained.len(),
                current_root = %hex::encode(self.current_root),
                "checkpoints confirmed"
            );
        }
        Ok(drained.len())
    }

    /// Whether a root may back inclusion proofs at `now`: either the
    /// confirmed current root, or any enqueued root whose optimistic
    /// delay has already elapsed (confirmed or not).
    pub fn acceptable_root(&self, root: [u8; 32], now: u64) -> bool {
        if root == self.current_root {
            return true;
        }
        self.queue
            .eligible_at(&root)
            .is_some_and(|eligible_at| eligible_at <= now)
    }

    /// Check an inclusion proof against any acceptable root. On
    /// success the leaf becomes Pending (idempotent for leaves already
    /// Pending or Processed). On failure, returns `Ok(false)` with no
    /// state change.
    pub fn prove(&mut self, proof: &MerkleProof, now: u64) -> Result<bool> {
        self.ensure_active("prove")?;

        let root = proof.compute_root();
        if !self.acceptable_root(root, now) {
            return Ok(false);
        }

        self.messages
            .entry(proof.leaf)
            .or_insert(MessageStatus::Pending);
        Ok(true)
    }

    /// Deliver a proven message to its recipient inside an isolated,
    /// resource-bounded frame.
    ///
    /// `budget` is the resource available to this call. The replica
    /// reserves its own working budget and forwards at most the
    /// process ceiling; if the reserve cannot be kept while forwarding
    /// a nonzero amount, the call fails closed. Recipient failure is
    /// captured (status stays Pending, retryable) rather than
    /// propagated; returns the recipient's success.
    pub fn process(
        &mut self,
        message: &Message,
        recipient: &mut dyn MessageRecipient,
        budget: u64,
    ) -> Result<bool> {
        self.ensure_active("process")?;

        if message.destination != self.local_domain {
            return Err(Error::WrongDestination {
                expected: self.local_domain,
                actual: message.destination,
            });
        }

        // Status before the floor: a replayed message must always
        // surface as not-pending, even after the floor moved past it.
        let leaf = message.to_leaf();
        let status = self.message_status(&leaf);
        if status != MessageStatus::Pending {
            return Err(Error::NotPending {
                leaf: hex::encode(leaf),
                status: format!("{:?}", status),
            });
        }
        if message.nonce < self.next_to_process {
            return Err(Error::BelowProcessingFloor {
                floor: self.next_to_process,
                actual: message.nonce,
            });
        }

        // Fail closed: never attempt a call without the reserve intact
        // and something nonzero to forward.
        if budget <= self.reserve_budget {
            return Err(Error::InsufficientBudget {
                available: budget,
                reserve: self.reserve_budget,
            });
        }
        let forwarded = (budget - self.reserve_budget).min(self.process_budget);

        let outcome = executor::execute(
            recipient,
            message.origin,
            message.sender,
            &message.body,
            forwarded,
        );

        self.events.push(BridgeEvent::Process {
            leaf,
            success: outcome.success,
        });

        if outcome.success {
            self.messages.insert(leaf, MessageStatus::Processed);
            if message.nonce == self.next_to_process {
                self.next_to_process += 1;
            }
            info!(
                remote = self.remote_domain,
                leaf = %hex::encode(leaf),
                budget_used = outcome.budget_used,
                "message processed"
            );
            Ok(true)
        } else {
            // Deliberate policy: a failed delivery stays Pending so the
            // message can be retried (at-least-once delivery).
            self.events.push(BridgeEvent::ProcessError {
                leaf,
                recipient: message.recipient,
                diagnostic: outcome.return_data,
            });
            warn!(
                remote = self.remote_domain,
                leaf = %hex::encode(leaf),
                recipient = %hex::encode(message.recipient),
                "recipient handler failed; message remains pending"
            );
            Ok(false)
        }
    }

    /// Prove then process in one call. Rejects with an invalid-proof
    /// error when the proof does not cover this message or no
    /// acceptable root backs it.
    pub fn prove_and_process(
        &mut self,
        message: &Message,
        proof: &MerkleProof,
        now: u64,
        recipient: &mut dyn MessageRecipient,
        budget: u64,
    ) -> Result<bool> {
        if proof.leaf != message.to_leaf() {
            return Err(Error::InvalidProof(
                "proof leaf does not match message".into(),
            ));
        }
        if !self.prove(proof, now)? {
            return Err(Error::InvalidProof(
                "no acceptable root for proof".into(),
            ));
        }
        self.process(message, recipient, budget)
    }

    /// Accept a double-update fraud proof: two distinct new roots,
    /// each validly signed by the updater over the same old root.
    ///
    /// On success the replica halts permanently. Message statuses are
    /// not reverted: halting is forward-looking, past deliveries were
    /// authorized under honestly confirmed roots.
    pub fn double_update(
        &mut self,
        old_root: [u8; 32],
        new_roots: [[u8; 32]; 2],
        signatures: [&[u8; 64]; 2],
    ) -> Result<()> {
        self.ensure_active("double_update")?;

        if new_roots[0] == new_roots[1] {
            return Err(Error::InvalidDoubleUpdate(
                "new roots are identical".into(),
            ));
        }
        for (new_root, signature_bytes) in new_roots.iter().zip(signatures) {
            let digest = signature::update_digest(self.remote_domain, &old_root, new_root);
            if !signature::verify(&self.updater, &digest, signature_bytes) {
                return Err(Error::InvalidDoubleUpdate(
                    "signature not from updater".into(),
                ));
            }
        }

        self.state = ReplicaState::Failed;
        self.events.push(BridgeEvent::DoubleUpdate {
            old_root,
            new_roots,
        });
        error!(
            remote = self.remote_domain,
            old_root = %hex::encode(old_root),
            "double update proven; replica failed permanently"
        );
        Ok(())
    }

    // ---------------------------------------------------------------
    // Introspection (read-only)
    // ---------------------------------------------------------------

    /// Current lifecycle state
    pub fn state(&self) -> ReplicaState {
        self.state
    }

    /// Latest confirmed root
    pub fn current_root(&self) -> [u8; 32] {
        self.current_root
    }

    /// Number of pending checkpoints
    pub fn queue_length(&self) -> usize {
        self.queue.len()
    }

    /// Whether a root is currently pending
    pub fn queue_contains(&self, root: &[u8; 32]) -> bool {
        self.queue.contains(root)
    }

    /// Front pending checkpoint, if any
    pub fn next_pending(&self) -> Option<QueueEntry> {
        self.queue.peek_next().copied()
    }

    /// Whether the front pending checkpoint is eligible at `now`
    pub fn can_confirm(&self, now: u64) -> bool {
        self.queue.can_confirm(now)
    }

    /// Eligibility time recorded for a root, pending or already
    /// confirmed
    pub fn confirm_at(&self, root: &[u8; 32]) -> Option<u64> {
        self.queue.eligible_at(root)
    }

    /// Most recently enqueued pending root, if any
    pub fn queue_end(&self) -> Option<[u8; 32]> {
        self.queue.last_root()
    }

    /// Delivery status of a message leaf
    pub fn message_status(&self, leaf: &[u8; 32]) -> MessageStatus {
        self.messages
            .get(leaf)
            .copied()
            .unwrap_or(MessageStatus::None)
    }

    /// Lowest leaf index this replica will deliver
    pub fn next_to_process(&self) -> u32 {
        self.next_to_process
    }

    /// Remote domain this replica verifies
    pub fn remote_domain(&self) -> u32 {
        self.remote_domain
    }

    /// Domain hash all accepted updates are bound to
    pub fn home_domain_hash(&self) -> [u8; 32] {
        signature::domain_hash(self.remote_domain)
    }

    /// Local domain this replica delivers into
    pub fn local_domain(&self) -> u32 {
        self.local_domain
    }

    /// Updater identity trusted by this replica
    pub fn updater(&self) -> [u8; 32] {
        self.updater
    }

    /// Configured optimistic delay window (seconds)
    pub fn optimistic_seconds(&self) -> u64 {
        self.optimistic_seconds
    }

    /// Drain buffered events
    pub fn drain_events(&mut self) -> Vec<BridgeEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{Budget, RecipientError};
    use bridge_primitives::UpdaterKeypair;

    const LOCAL: u32 = 2000;
    const REMOTE: u32 = 1000;
    const DELAY: u64 = 100;
    const AMPLE_BUDGET: u64 = 1_000_000;

    struct Accepting;

    impl MessageRecipient for Accepting {
        fn handle(
            &mut self,
            _origin: u32,
            _sender: [u8; 32],
            _body: &[u8],
            budget: &mut Budget,
        ) -> std::result::Result<Vec<u8>, RecipientError> {
            budget.charge(10)?;
            Ok(Vec::new())
        }
    }

    fn active_replica(updater: &UpdaterKeypair) -> Replica {
        let mut replica = Replica::new(LOCAL);
        replica
            .initialize(REMOTE, updater.public(), [0u8; 32], DELAY, 0)
            .unwrap();
        replica
    }

    fn pending_message(replica: &mut Replica, updater: &UpdaterKeypair, body: &[u8]) -> Message {
        let message = Message {
            origin: REMOTE,
            sender: [0x55u8; 32],
            nonce: 0,
            destination: LOCAL,
            recipient: [0x66u8; 32],
            body: body.to_vec(),
        };
        let mut prover = bridge_primitives::ProvingTree::new();
        prover.ingest(message.to_leaf()).unwrap();
        let proof = prover.prove(0).unwrap();
        let root = prover.root();

        let signature = updater.sign_update(REMOTE, &[0u8; 32], &root);
        replica.update([0u8; 32], root, &signature, 0).unwrap();
        assert!(replica.prove(&proof, DELAY).unwrap());
        message
    }

    #[test]
    fn test_operations_invalid_before_initialize() {
        let updater = UpdaterKeypair::generate();
        let mut replica = Replica::new(LOCAL);

        let signature = updater.sign_update(REMOTE, &[0u8; 32], &[1u8; 32]);
        let err = replica.update([0u8; 32], [1u8; 32], &signature, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidLifecycleState { operation: "update", .. }));
        assert!(matches!(
            replica.confirm(0).unwrap_err(),
            Error::InvalidLifecycleState { .. }
        ));
    }

    #[test]
    fn test_initialize_exactly_once() {
        let updater = UpdaterKeypair::generate();
        let mut replica = active_replica(&updater);

        let err = replica
            .initialize(REMOTE, updater.public(), [0u8; 32], DELAY, 0)
            .unwrap_err();
        assert_eq!(err, Error::AlreadyInitialized { remote_domain: REMOTE });
        assert_eq!(replica.state(), ReplicaState::Active);
        assert_eq!(
            replica.home_domain_hash(),
            bridge_primitives::domain_hash(REMOTE)
        );
    }

    #[test]
    fn test_update_chains_and_rejects_stale() {
        let updater = UpdaterKeypair::generate();
        let mut replica = active_replica(&updater);

        let first = updater.sign_update(REMOTE, &[0u8; 32], &[1u8; 32]);
        replica.update([0u8; 32], [1u8; 32], &first, 0).unwrap();

        // Chains from the enqueued root, not the current one.
        let second = updater.sign_update(REMOTE, &[1u8; 32], &[2u8; 32]);
        replica.update([1u8; 32], [2u8; 32], &second, 0).unwrap();

        // Replaying from the initial root must now fail.
        let stale = updater.sign_update(REMOTE, &[0u8; 32], &[3u8; 32]);
        let err = replica.update([0u8; 32], [3u8; 32], &stale, 0).unwrap_err();
        assert!(matches!(err, Error::StaleUpdate { .. }));
        assert_eq!(replica.queue_length(), 2);
    }

    #[test]
    fn test_update_rejects_foreign_signature() {
        let updater = UpdaterKeypair::generate();
        let impostor = UpdaterKeypair::generate();
        let mut replica = active_replica(&updater);

        let forged = impostor.sign_update(REMOTE, &[0u8; 32], &[1u8; 32]);
        let err = replica.update([0u8; 32], [1u8; 32], &forged, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidSignature(_)));
        assert_eq!(replica.queue_length(), 0);
    }

    #[test]
    fn test_confirm_respects_delay_and_order() {
        let updater = UpdaterKeypair::generate();
        let mut replica = active_replica(&updater);

        let s1 = updater.sign_update(REMOTE, &[0u8; 32], &[1u8; 32]);
        replica.update([0u8; 32], [1u8; 32], &s1, 0).unwrap();
        let s2 = updater.sign_update(REMOTE, &[1u8; 32], &[2u8; 32]);
        replica.update([1u8; 32], [2u8; 32], &s2, 10).unwrap();

        assert_eq!(replica.queue_end(), Some([2u8; 32]));
        assert_eq!(replica.confirm_at(&[1u8; 32]), Some(DELAY));
        assert_eq!(replica.confirm_at(&[2u8; 32]), Some(10 + DELAY));

        // Before the delay: no-op.
        assert!(!replica.can_confirm(DELAY - 1));
        assert_eq!(replica.confirm(DELAY - 1).unwrap(), 0);
        assert_eq!(replica.current_root(), [0u8; 32]);

        // First eligible only.
        assert!(replica.can_confirm(DELAY));
        assert_eq!(replica.confirm(DELAY).unwrap(), 1);
        assert_eq!(replica.current_root(), [1u8; 32]);

        // Batched catch-up.
        assert_eq!(replica.confirm(DELAY + 10).unwrap(), 1);
        assert_eq!(replica.current_root(), [2u8; 32]);
        assert_eq!(replica.queue_length(), 0);
    }

    #[test]
    fn test_acceptable_root_after_delay_without_confirm() {
        let updater = UpdaterKeypair::generate();
        let mut replica = active_replica(&updater);

        let signature = updater.sign_update(REMOTE, &[0u8; 32], &[1u8; 32]);
        replica.update([0u8; 32], [1u8; 32], &signature, 0).unwrap();

        assert!(!replica.acceptable_root([1u8; 32], DELAY - 1));
        assert!(replica.acceptable_root([1u8; 32], DELAY));
        // Still acceptable after formal confirmation.
        replica.confirm(DELAY).unwrap();
        assert!(replica.acceptable_root([1u8; 32], DELAY));
    }

    #[test]
    fn test_prove_unacceptable_root_returns_false() {
        let updater = UpdaterKeypair::generate();
        let mut replica = active_replica(&updater);

        let mut prover = bridge_primitives::ProvingTree::new();
        prover.ingest([7u8; 32]).unwrap();
        let proof = prover.prove(0).unwrap();

        assert!(!replica.prove(&proof, 0).unwrap());
        assert_eq!(replica.message_status(&[7u8; 32]), MessageStatus::None);
    }

    #[test]
    fn test_prove_is_idempotent() {
        let updater = UpdaterKeypair::generate();
        let mut replica = active_replica(&updater);
        let message = pending_message(&mut replica, &updater, b"payload");
        let leaf = message.to_leaf();

        assert_eq!(replica.message_status(&leaf), MessageStatus::Pending);

        // Re-prove while Pending: true, no change.
        let mut prover = bridge_primitives::ProvingTree::new();
        prover.ingest(leaf).unwrap();
        let proof = prover.prove(0).unwrap();
        assert!(replica.prove(&proof, DELAY).unwrap());
        assert_eq!(replica.message_status(&leaf), MessageStatus::Pending);

        // Re-prove after Processed: still true, status untouched.
        assert!(replica.process(&message, &mut Accepting, AMPLE_BUDGET).unwrap());
        assert!(replica.prove(&proof, DELAY).unwrap());
        assert_eq!(replica.message_status(&leaf), MessageStatus::Processed);
    }

    #[test]
    fn test_process_requires_pending() {
        let updater = UpdaterKeypair::generate();
        let mut replica = active_replica(&updater);

        let message = Message {
            origin: REMOTE,
            sender: [1u8; 32],
            nonce: 0,
            destination: LOCAL,
            recipient: [2u8; 32],
            body: b"unproven".to_vec(),
        };
        let err = replica
            .process(&message, &mut Accepting, AMPLE_BUDGET)
            .unwrap_err();
        assert!(matches!(err, Error::NotPending { .. }));
    }

    #[test]
    fn test_process_rejects_wrong_destination() {
        let updater = UpdaterKeypair::generate();
        let mut replica = active_replica(&updater);

        let message = Message {
            origin: REMOTE,
            sender: [1u8; 32],
            nonce: 0,
            destination: LOCAL + 1,
            recipient: [2u8; 32],
            body: vec![],
        };
        let err = replica
            .process(&message, &mut Accepting, AMPLE_BUDGET)
            .unwrap_err();
        assert_eq!(
            err,
            Error::WrongDestination {
                expected: LOCAL,
                actual: LOCAL + 1
            }
        );
    }

    #[test]
    fn test_process_rejects_below_floor() {
        let updater = UpdaterKeypair::generate();
        let mut replica = Replica::new(LOCAL);
        replica
            .initialize(REMOTE, updater.public(), [0u8; 32], DELAY, 5)
            .unwrap();

        // Proven (Pending) message whose nonce predates the floor.
        let message = Message {
            origin: REMOTE,
            sender: [1u8; 32],
            nonce: 3,
            destination: LOCAL,
            recipient: [2u8; 32],
            body: vec![],
        };
        let mut prover = bridge_primitives::ProvingTree::new();
        prover.ingest(message.to_leaf()).unwrap();
        let proof = prover.prove(0).unwrap();
        let root = prover.root();
        let signature = updater.sign_update(REMOTE, &[0u8; 32], &root);
        replica.update([0u8; 32], root, &signature, 0).unwrap();
        assert!(replica.prove(&proof, DELAY).unwrap());

        let err = replica
            .process(&message, &mut Accepting, AMPLE_BUDGET)
            .unwrap_err();
        assert_eq!(err, Error::BelowProcessingFloor { floor: 5, actual: 3 });
        assert_eq!(
            replica.message_status(&message.to_leaf()),
            MessageStatus::Pending
        );
    }

    #[test]
    fn test_process_fails_closed_without_reserve() {
        let updater = UpdaterKeypair::generate();
        let mut replica = active_replica(&updater);
        let message = pending_message(&mut replica, &updater, b"payload");

        let err = replica
            .process(&message, &mut Accepting, RESERVE_BUDGET)
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientBudget { .. }));
        // Rejection leaves the message retryable.
        assert_eq!(
            replica.message_status(&message.to_leaf()),
            MessageStatus::Pending
        );
    }

    #[test]
    fn test_process_success_then_reprocess_rejected() {
        let updater = UpdaterKeypair::generate();
        let mut replica = active_replica(&updater);
        let message = pending_message(&mut replica, &updater, b"payload");
        let leaf = message.to_leaf();

        assert!(replica.process(&message, &mut Accepting, AMPLE_BUDGET).unwrap());
        assert_eq!(replica.message_status(&leaf), MessageStatus::Processed);
        assert_eq!(replica.next_to_process(), 1);

        // The floor has moved past this nonce, but a replay must still
        // report the delivered status, not the floor.
        let err = replica
            .process(&message, &mut Accepting, AMPLE_BUDGET)
            .unwrap_err();
        assert!(matches!(err, Error::NotPending { .. }));
        assert_eq!(replica.message_status(&leaf), MessageStatus::Processed);
    }

    #[test]
    fn test_double_update_halts_permanently() {
        let updater = UpdaterKeypair::generate();
        let mut replica = active_replica(&updater);

        let sig_a = updater.sign_update(REMOTE, &[0u8; 32], &[1u8; 32]);
        let sig_b = updater.sign_update(REMOTE, &[0u8; 32], &[2u8; 32]);
        replica
            .double_update([0u8; 32], [[1u8; 32], [2u8; 32]], [&sig_a, &sig_b])
            .unwrap();

        assert_eq!(replica.state(), ReplicaState::Failed);
        let events = replica.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, BridgeEvent::DoubleUpdate { .. })));

        // Every mutating operation is now rejected.
        let signature = updater.sign_update(REMOTE, &[0u8; 32], &[3u8; 32]);
        assert!(matches!(
            replica.update([0u8; 32], [3u8; 32], &signature, 0).unwrap_err(),
            Error::InvalidLifecycleState { .. }
        ));
        assert!(matches!(
            replica.confirm(u64::MAX).unwrap_err(),
            Error::InvalidLifecycleState { .. }
        ));
    }

    #[test]
    fn test_double_update_rejects_bad_evidence() {
        let updater = UpdaterKeypair::generate();
        let impostor = UpdaterKeypair::generate();
        let mut replica = active_replica(&updater);

        // Identical roots are not a conflict.
        let sig = updater.sign_update(REMOTE, &[0u8; 32], &[1u8; 32]);
        let err = replica
            .double_update([0u8; 32], [[1u8; 32], [1u8; 32]], [&sig, &sig])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDoubleUpdate(_)));

        // A forged second signature is not evidence.
        let forged = impostor.sign_update(REMOTE, &[0u8; 32], &[2u8; 32]);
        let err = replica
            .double_update([0u8; 32], [[1u8; 32], [2u8; 32]], [&sig, &forged])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDoubleUpdate(_)));

        assert_eq!(replica.state(), ReplicaState::Active);
    }

    #[test]
    fn test_from_config_applies_budgets() {
        let config = Config {
            local_domain: LOCAL,
            optimistic_seconds: DELAY,
            process_budget: 500,
            reserve_budget: 50,
        };
        let replica = Replica::from_config(&config).unwrap();
        assert_eq!(replica.local_domain(), LOCAL);
        assert_eq!(replica.process_budget, 500);
        assert_eq!(replica.reserve_budget, 50);
    }
}
