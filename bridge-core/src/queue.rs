//! Delayed-confirmation checkpoint queue
//!
//! Strict FIFO of pending roots awaiting their optimistic delay.
//! Entries are only ever removed from the front, and only once their
//! eligibility time has passed; an entry can never overtake an
//! earlier, still-ineligible one.
//!
//! The queue also retains an eligibility history for every root ever
//! enqueued, so a proof can be checked against a root whose delay has
//! elapsed even before a formal confirm call promotes it.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// One pending checkpoint root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Checkpoint root awaiting trust
    pub root: [u8; 32],
    /// Ledger time at which the root becomes confirmable
    pub confirm_eligible_at: u64,
}

/// Per-remote-domain FIFO of pending checkpoint roots
#[derive(Debug, Clone, Default)]
pub struct CheckpointQueue {
    pending: VecDeque<QueueEntry>,
    /// Eligibility time for every root ever enqueued
    history: HashMap<[u8; 32], u64>,
}

impl CheckpointQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a root with its eligibility time.
    ///
    /// Callers must only enqueue in response to a validated update.
    pub fn enqueue(&mut self, root: [u8; 32], confirm_eligible_at: u64) {
        self.pending.push_back(QueueEntry {
            root,
            confirm_eligible_at,
        });
        self.history.insert(root, confirm_eligible_at);
    }

    /// True iff the front entry exists and is eligible at `now`
    pub fn can_confirm(&self, now: u64) -> bool {
        self.pending
            .front()
            .is_some_and(|entry| entry.confirm_eligible_at <= now)
    }

    /// Dequeue every eligible entry from the front, in arrival order,
    /// stopping at the first ineligible entry. A call with nothing
    /// eligible is a no-op returning an empty batch.
    pub fn confirm(&mut self, now: u64) -> Vec<QueueEntry> {
        let mut drained = Vec::new();
        while self.can_confirm(now) {
            // can_confirm guarantees a front entry
            if let Some(entry) = self.pending.pop_front() {
                drained.push(entry);
            }
        }
        drained
    }

    /// Front entry, if any
    pub fn peek_next(&self) -> Option<&QueueEntry> {
        self.pending.front()
    }

    /// Most recently enqueued pending root, if any
    pub fn last_root(&self) -> Option<[u8; 32]> {
        self.pending.back().map(|entry| entry.root)
    }

    /// Whether a root is currently pending
    pub fn contains(&self, root: &[u8; 32]) -> bool {
        self.pending.iter().any(|entry| entry.root == *root)
    }

    /// Eligibility time of a root anywhere in the queue history
    /// (pending or already confirmed)
    pub fn eligible_at(&self, root: &[u8; 32]) -> Option<u64> {
        self.history.get(root).copied()
    }

    /// Number of pending entries
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no entries are pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
