//! Resource-bounded, failure-isolated recipient invocation
//!
//! Recipient handlers are third-party code. They run against a metered
//! [`Budget`] capped at the forwarded amount, and any failure mode
//! (returned error, budget exhaustion, panic) is captured as an
//! [`ExecutionOutcome`] instead of propagating to the caller. The
//! replica's own bookkeeping can therefore always complete.

use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

/// Failure modes of a recipient handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientError {
    /// Handler rejected the message, with optional diagnostic data
    Reverted(Vec<u8>),
    /// Handler exhausted its forwarded budget
    OutOfBudget,
}

/// Metered resource budget handed to a recipient handler.
///
/// Metering is cooperative: handlers charge for the work they do, and
/// the forwarded cap bounds the total they may charge.
#[derive(Debug)]
pub struct Budget {
    remaining: u64,
}

impl Budget {
    /// Create a budget with the given forwarded amount
    pub fn new(forwarded: u64) -> Self {
        Self {
            remaining: forwarded,
        }
    }

    /// Charge `amount` units, failing once the budget is exhausted
    pub fn charge(&mut self, amount: u64) -> Result<(), RecipientError> {
        if amount > self.remaining {
            self.remaining = 0;
            return Err(RecipientError::OutOfBudget);
        }
        self.remaining -= amount;
        Ok(())
    }

    /// Units still available
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

/// A destination recipient: opaque, untrusted, resource-bounded.
pub trait MessageRecipient {
    /// Handle a delivered message. Work must be charged against
    /// `budget`; returned bytes are surfaced as diagnostic/return data.
    fn handle(
        &mut self,
        origin: u32,
        sender: [u8; 32],
        body: &[u8],
        budget: &mut Budget,
    ) -> Result<Vec<u8>, RecipientError>;
}

/// Outcome of one isolated recipient invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Whether the handler completed successfully
    pub success: bool,
    /// Return data on success, diagnostic data on failure
    pub return_data: Vec<u8>,
    /// Budget units the handler consumed
    pub budget_used: u64,
}

/// Invoke a recipient handler inside an isolated frame.
///
/// Never panics and never returns an error: every failure of the
/// handler is folded into the outcome.
pub fn execute(
    recipient: &mut dyn MessageRecipient,
    origin: u32,
    sender: [u8; 32],
    body: &[u8],
    forwarded: u64,
) -> ExecutionOutcome {
    let mut budget = Budget::new(forwarded);

    let call = catch_unwind(AssertUnwindSafe(|| {
        recipient.handle(origin, sender, body, &mut budget)
    }));
    let budget_used = forwarded - budget.remaining();

    match call {
        Ok(Ok(return_data)) => ExecutionOutcome {
            success: true,
            return_data,
            budget_used,
        },
        Ok(Err(RecipientError::Reverted(diagnostic))) => {
            warn!(origin, budget_used, "recipient handler reverted");
            ExecutionOutcome {
                success: false,
                return_data: diagnostic,
                budget_used,
            }
        }
        Ok(Err(RecipientError::OutOfBudget)) => {
            warn!(origin, forwarded, "recipient handler exhausted budget");
            ExecutionOutcome {
                success: false,
                return_data: Vec::new(),
                budget_used: forwarded,
            }
        }
        Err(_) => {
            warn!(origin, budget_used, "recipient handler panicked");
            ExecutionOutcome {
                success: false,
                return_data: Vec::new(),
                budget_used,
            }
        }
    }
}
