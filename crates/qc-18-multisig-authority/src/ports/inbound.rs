//! # Inbound Ports
//!
//! API trait defining what the Multi-Signer Authority can do.
//!
//! Read methods return `Result` because a call made from inside a running
//! dispatch (a ledger callback, for instance) is rejected with
//! `ReentrantExecution` like any other re-entrant call.

use crate::domain::{
    ApprovalOutcome, ApprovalSignature, AuthorityError, EventRecord, ExecutionDomain, Hash,
    Identity, Operation, OperationId, OperationKind, OperationRequest, PolicyState,
};
use primitive_types::U256;

/// Multi-Signer Authority API - inbound port.
pub trait MultisigAuthorityApi: Send + Sync {
    /// Register a new operation. Only a current signer or the owner may request.
    ///
    /// Returns the content- and domain-bound operation id.
    fn request_operation(
        &self,
        requester: Identity,
        request: OperationRequest,
    ) -> Result<OperationId, AuthorityError>;

    /// Submit `signer`'s approval of `id`.
    ///
    /// Executes the operation synchronously if this approval reaches the
    /// threshold. A failed execution rolls the whole call back.
    fn submit_approval(
        &self,
        id: &OperationId,
        signer: Identity,
        signature: &ApprovalSignature,
    ) -> Result<ApprovalOutcome, AuthorityError>;

    /// Whether the approval window of `id` has closed.
    fn is_expired(&self, id: &OperationId) -> Result<bool, AuthorityError>;

    /// Destroy `amount` from `caller` for release on another domain.
    fn bridge_out(
        &self,
        caller: Identity,
        amount: U256,
        destination: &str,
        domain: ExecutionDomain,
    ) -> Result<(), AuthorityError>;

    /// Create `amount` for `to` on behalf of the configured bridge caller.
    fn bridge_in(
        &self,
        caller: Identity,
        to: Identity,
        amount: U256,
        domain: ExecutionDomain,
        external_tx_id: Hash,
    ) -> Result<(), AuthorityError>;

    /// Snapshot of one operation.
    fn operation(&self, id: &OperationId) -> Result<Operation, AuthorityError>;

    /// Snapshot of every operation in request order.
    fn operations(&self) -> Result<Vec<Operation>, AuthorityError>;

    /// The hash a signer must sign to approve `id`.
    fn message_to_sign(&self, id: &OperationId) -> Result<Hash, AuthorityError>;

    /// Current signers in slot order.
    fn signers(&self) -> Result<Vec<Identity>, AuthorityError>;

    /// Current policy state.
    fn policy(&self) -> Result<PolicyState, AuthorityError>;

    /// Event records with `sequence >= from`.
    fn events_since(&self, from: u64) -> Result<Vec<EventRecord>, AuthorityError>;

    /// Ledger balance of `account`.
    fn balance_of(&self, account: &Identity) -> Result<U256, AuthorityError>;

    /// Ledger total supply.
    fn total_supply(&self) -> Result<U256, AuthorityError>;

    /// Whether the ledger's transfer gate is closed.
    fn is_paused(&self) -> Result<bool, AuthorityError>;

    /// Approvals needed to execute an operation of `kind`.
    fn approvals_required(&self, kind: OperationKind) -> usize;
}
