//! # Domain Entities
//!
//! The operation record and its approval bookkeeping.
//!
//! An operation is created once, collects approvals until it executes or its
//! deadline passes, and is never deleted: executed and expired records stay
//! for audit and keep their ids from being reused.

use super::errors::AuthorityError;
use super::value_objects::{Identity, OperationId, OperationKind};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Parameters of a requested operation.
///
/// Meaning of `target`, `value` and `extra` depends on `kind`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRequest {
    /// Operation type.
    pub kind: OperationKind,
    /// Identity parameter (recipient, signer to replace, new caller).
    pub target: Identity,
    /// Numeric parameter (amount, encoded new signer).
    pub value: U256,
    /// Secondary parameters (e.g. new cooldown).
    pub extra: Vec<u8>,
}

impl OperationRequest {
    /// Request with no identity or payload parameters.
    pub fn bare(kind: OperationKind) -> Self {
        Self {
            kind,
            target: Identity::ZERO,
            value: U256::zero(),
            extra: Vec::new(),
        }
    }

    /// Mint the fixed amount into the holding account.
    pub fn mint(amount: U256) -> Self {
        Self {
            value: amount,
            ..Self::bare(OperationKind::Mint)
        }
    }

    /// Burn `amount` from the holding account.
    pub fn burn(amount: U256) -> Self {
        Self {
            value: amount,
            ..Self::bare(OperationKind::Burn)
        }
    }

    /// Distribute `amount` from the holding account to `recipient`.
    pub fn distribute(recipient: Identity, amount: U256) -> Self {
        Self {
            target: recipient,
            value: amount,
            ..Self::bare(OperationKind::Distribute)
        }
    }

    /// Replace signer `old` with `new`.
    pub fn update_signer(old: Identity, new: Identity) -> Self {
        Self {
            target: old,
            value: new.to_u256(),
            ..Self::bare(OperationKind::UpdateSigner)
        }
    }

    /// Authorize `caller` for bridge-in.
    pub fn set_bridge_caller(caller: Identity) -> Self {
        Self {
            target: caller,
            ..Self::bare(OperationKind::SetBridgeCaller)
        }
    }

    /// New bridge-in maximum and cooldown (seconds, 32-byte big-endian in `extra`).
    pub fn set_bridge_limits(max_amount: U256, cooldown_secs: u64) -> Self {
        let mut extra = vec![0u8; 32];
        extra[24..].copy_from_slice(&cooldown_secs.to_be_bytes());
        Self {
            value: max_amount,
            extra,
            ..Self::bare(OperationKind::SetBridgeLimits)
        }
    }
}

/// A proposed, uniquely identified state transition awaiting threshold approval.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Unique identifier bound to content and domain.
    pub id: OperationId,
    /// Registry counter value the id was derived from.
    pub nonce: u64,
    /// Operation type.
    pub kind: OperationKind,
    /// Identity parameter.
    pub target: Identity,
    /// Numeric parameter.
    pub value: U256,
    /// Secondary payload.
    pub extra: Vec<u8>,
    /// Signer or owner that requested it.
    pub requester: Identity,
    /// Request timestamp.
    pub requested_at: u64,
    /// No approvals accepted after this time.
    pub deadline: u64,
    approvals: Vec<Identity>,
    executed: bool,
}

impl Operation {
    /// Create a fresh operation with no approvals.
    pub fn new(
        id: OperationId,
        nonce: u64,
        request: OperationRequest,
        requester: Identity,
        requested_at: u64,
        window_secs: u64,
    ) -> Self {
        Self {
            id,
            nonce,
            kind: request.kind,
            target: request.target,
            value: request.value,
            extra: request.extra,
            requester,
            requested_at,
            deadline: requested_at.saturating_add(window_secs),
            approvals: Vec::new(),
            executed: false,
        }
    }

    /// Approvers in submission order.
    pub fn approvals(&self) -> &[Identity] {
        &self.approvals
    }

    /// Number of approvals held.
    pub fn approval_count(&self) -> usize {
        self.approvals.len()
    }

    /// Check whether `signer` has approved.
    pub fn has_approved(&self, signer: &Identity) -> bool {
        self.approvals.contains(signer)
    }

    /// Keep only approvals for which `keep` holds; returns how many were dropped.
    ///
    /// An executed operation's approvals are its record and are left alone.
    pub fn retain_approvals<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Identity) -> bool,
    {
        if self.executed {
            return 0;
        }
        let before = self.approvals.len();
        self.approvals.retain(|a| keep(a));
        before - self.approvals.len()
    }

    /// Check whether the operation has executed.
    pub fn is_executed(&self) -> bool {
        self.executed
    }

    /// Check if the approval window has closed.
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.deadline
    }

    /// Fail unless the operation still accepts approvals.
    pub fn ensure_open(&self, now: u64) -> Result<(), AuthorityError> {
        if self.executed {
            return Err(AuthorityError::AlreadyExecuted(self.id));
        }
        if self.is_expired(now) {
            return Err(AuthorityError::DeadlineExpired {
                id: self.id,
                deadline: self.deadline,
                now,
            });
        }
        Ok(())
    }

    /// Fail if `signer` already holds an approval slot.
    pub fn ensure_not_approved(&self, signer: &Identity) -> Result<(), AuthorityError> {
        if self.has_approved(signer) {
            return Err(AuthorityError::DuplicateApproval {
                id: self.id,
                signer: *signer,
            });
        }
        Ok(())
    }

    /// Insert an approval. Returns the new approval count.
    pub fn record_approval(
        &mut self,
        signer: Identity,
        required: usize,
    ) -> Result<usize, AuthorityError> {
        self.ensure_not_approved(&signer)?;
        if self.approvals.len() >= required {
            return Err(AuthorityError::ThresholdAlreadyMet {
                id: self.id,
                approvals: self.approvals.len(),
                required,
            });
        }
        self.approvals.push(signer);
        Ok(self.approvals.len())
    }

    /// Flip `executed`. Happens exactly once per operation.
    pub fn mark_executed(&mut self) -> Result<(), AuthorityError> {
        if self.executed {
            return Err(AuthorityError::AlreadyExecuted(self.id));
        }
        self.executed = true;
        Ok(())
    }
}

/// Result of an accepted approval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalOutcome {
    /// Approvals held after this one.
    pub approvals: usize,
    /// Approvals required for the operation's kind.
    pub required: usize,
    /// True if this approval reached the threshold and the operation executed.
    pub executed: bool,
}
