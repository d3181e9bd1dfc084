//! # Event Log
//!
//! Append-only record of every state transition. Each record is sequenced
//! and timestamped and carries enough fields for an external indexer to
//! reconstruct history without replaying state.

use super::errors::Hash;
use super::value_objects::{ExecutionDomain, Identity, LaunchMode, OperationId, OperationKind};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// State transition emitted by the authority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuthorityEvent {
    /// A new operation awaits approvals.
    OperationRequested {
        /// Operation
        id: OperationId,
        /// Operation type
        kind: OperationKind,
        /// Signer or owner that requested it
        requester: Identity,
        /// Identity parameter
        target: Identity,
        /// Numeric parameter
        value: U256,
        /// Secondary payload
        extra: Vec<u8>,
        /// Approval deadline
        deadline: u64,
    },
    /// A signer's approval was accepted.
    ApprovalSubmitted {
        /// Operation
        id: OperationId,
        /// Approving identity
        signer: Identity,
        /// Approvals after this one
        count: usize,
        /// Approvals required
        required: usize,
    },
    /// Threshold reached and the handler succeeded.
    OperationExecuted {
        /// Operation
        id: OperationId,
        /// Operation type
        kind: OperationKind,
    },
    /// Fixed mint credited to the holding account.
    MintExecuted {
        /// Operation
        id: OperationId,
        /// Holding account
        account: Identity,
        /// Minted amount
        amount: U256,
        /// Supply before
        supply_before: U256,
        /// Supply after
        supply_after: U256,
    },
    /// Holdings destroyed.
    BurnExecuted {
        /// Operation
        id: OperationId,
        /// Holding account
        account: Identity,
        /// Burned amount
        amount: U256,
        /// Supply before
        supply_before: U256,
        /// Supply after
        supply_after: U256,
    },
    /// Holdings transferred to a recipient.
    Distributed {
        /// Operation
        id: OperationId,
        /// Holding account
        from: Identity,
        /// Recipient
        to: Identity,
        /// Transferred amount
        amount: U256,
        /// Holding balance after
        holding_after: U256,
    },
    /// Launch mode switched.
    ModeChanged {
        /// Operation
        id: OperationId,
        /// Mode before
        from: LaunchMode,
        /// Mode after
        to: LaunchMode,
    },
    /// Ledger transfer gate toggled.
    PauseChanged {
        /// Operation
        id: OperationId,
        /// Gate state after
        paused: bool,
    },
    /// Bridge-in caller replaced.
    BridgeCallerUpdated {
        /// Operation
        id: OperationId,
        /// Caller before
        previous: Option<Identity>,
        /// Caller after
        current: Identity,
    },
    /// Bridge-in limits replaced.
    BridgeLimitsUpdated {
        /// Operation
        id: OperationId,
        /// Max amount before
        previous_max: U256,
        /// Max amount after
        new_max: U256,
        /// Cooldown before
        previous_cooldown: u64,
        /// Cooldown after
        new_cooldown: u64,
    },
    /// A signer slot was rotated.
    SignerUpdated {
        /// Operation
        id: OperationId,
        /// Removed signer
        old: Identity,
        /// Added signer
        new: Identity,
        /// Slot index
        slot: usize,
    },
    /// Value destroyed here for release on another domain.
    BridgedOut {
        /// Holder
        from: Identity,
        /// Amount destroyed
        amount: U256,
        /// Destination address on the other side
        destination: String,
        /// Domain the call was made under
        domain: ExecutionDomain,
    },
    /// Value created here for a transfer originating elsewhere.
    BridgedIn {
        /// Recipient
        to: Identity,
        /// Amount created
        amount: U256,
        /// Domain the call was made under
        domain: ExecutionDomain,
        /// Off-system correlation id
        external_tx_id: Hash,
    },
}

impl AuthorityEvent {
    /// Operation the event belongs to (bridge transfers have none).
    pub fn operation_id(&self) -> Option<OperationId> {
        use AuthorityEvent::*;
        match self {
            OperationRequested { id, .. }
            | ApprovalSubmitted { id, .. }
            | OperationExecuted { id, .. }
            | MintExecuted { id, .. }
            | BurnExecuted { id, .. }
            | Distributed { id, .. }
            | ModeChanged { id, .. }
            | PauseChanged { id, .. }
            | BridgeCallerUpdated { id, .. }
            | BridgeLimitsUpdated { id, .. }
            | SignerUpdated { id, .. } => Some(*id),
            BridgedOut { .. } | BridgedIn { .. } => None,
        }
    }
}

/// Sequenced, timestamped event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    /// Time of the call that emitted it.
    pub timestamp: u64,
    /// The event.
    pub event: AuthorityEvent,
}

/// Append-only event log.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of events emitted at `timestamp`.
    pub fn extend(&mut self, timestamp: u64, events: impl IntoIterator<Item = AuthorityEvent>) {
        for event in events {
            let sequence = self.records.len() as u64;
            self.records.push(EventRecord {
                sequence,
                timestamp,
                event,
            });
        }
    }

    /// Append one event.
    pub fn append(&mut self, timestamp: u64, event: AuthorityEvent) {
        self.extend(timestamp, std::iter::once(event));
    }

    /// All records in order.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `sequence >= from`.
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = (from as usize).min(self.records.len());
        &self.records[start..]
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
