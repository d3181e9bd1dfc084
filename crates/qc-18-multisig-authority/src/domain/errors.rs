//! # Domain Errors
//!
//! Error types for the Multi-Signer Authority.
//!
//! Every failed call leaves all state unchanged; none of these errors is
//! retried inside the core.

use super::value_objects::{ExecutionDomain, Identity, LaunchMode, OperationId};
use primitive_types::U256;
use thiserror::Error;

/// 32-byte hash.
pub type Hash = [u8; 32];

/// Routing class of an [`AuthorityError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller is not allowed to do this. Never retried.
    Authorization,
    /// Caller/coordination mistake against the operation lifecycle.
    State,
    /// Business rule rejected the request; recoverable by waiting or adjusting.
    Policy,
    /// The ledger collaborator refused the mutation.
    Ledger,
    /// Malformed or out-of-range parameters.
    Input,
}

/// Signature recovery failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// R or S out of range.
    #[error("Invalid signature format")]
    InvalidFormat,

    /// Signature has high S value (EIP-2 malleability protection)
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// Invalid recovery ID (v must be 0, 1, 27, or 28)
    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// Failed to recover public key from signature
    #[error("Failed to recover public key")]
    RecoveryFailed,

    /// Recovery produced the null identity.
    #[error("Recovered zero identity")]
    ZeroIdentity,

    /// Secret key bytes are not a valid scalar.
    #[error("Invalid secret key")]
    InvalidSecretKey,

    /// Signing with a local key failed.
    #[error("Signing failed")]
    SigningFailed,
}

/// Errors surfaced by the ledger collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Mutations are blocked while the transfer gate is closed.
    #[error("Ledger is paused")]
    Paused,

    /// Pause requested while already paused.
    #[error("Ledger already paused")]
    AlreadyPaused,

    /// Unpause requested while not paused.
    #[error("Ledger not paused")]
    NotPaused,

    /// Debit exceeds the account balance.
    #[error("Insufficient balance for {account}: have {balance}, need {required}")]
    InsufficientBalance {
        /// Debited account
        account: Identity,
        /// Current balance
        balance: U256,
        /// Requested debit
        required: U256,
    },

    /// Total supply would overflow.
    #[error("Supply overflow")]
    SupplyOverflow,
}

/// Multi-Signer Authority error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorityError {
    // ---------------------------------------------------------------------
    // Authorization
    // ---------------------------------------------------------------------
    /// Caller is neither a signer nor the owner (or not the bridge caller).
    #[error("Unauthorized caller: {caller}")]
    Unauthorized {
        /// Rejected caller
        caller: Identity,
    },

    /// Recovered signer differs from the claimed submitter.
    #[error("Signer mismatch: claimed {claimed}, recovered {recovered}")]
    SignerMismatch {
        /// Identity the submitter claimed
        claimed: Identity,
        /// Identity recovered from the signature
        recovered: Identity,
    },

    /// Approver is not eligible for this operation.
    #[error("Invalid approver: {approver}")]
    InvalidApprover {
        /// Rejected approver
        approver: Identity,
    },

    /// Signature could not be recovered.
    #[error("Invalid signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    // ---------------------------------------------------------------------
    // State
    // ---------------------------------------------------------------------
    /// No operation with this id.
    #[error("Unknown operation: {0}")]
    UnknownOperation(OperationId),

    /// Operation already executed.
    #[error("Operation already executed: {0}")]
    AlreadyExecuted(OperationId),

    /// Derived id is already taken.
    #[error("Operation id collision: {0}")]
    OperationIdCollision(OperationId),

    /// Approval window has closed.
    #[error("Deadline expired for {id}: deadline={deadline}, now={now}")]
    DeadlineExpired {
        /// Operation
        id: OperationId,
        /// Absolute deadline
        deadline: u64,
        /// Current time
        now: u64,
    },

    /// Signer already approved this operation.
    #[error("Duplicate approval from {signer} for {id}")]
    DuplicateApproval {
        /// Operation
        id: OperationId,
        /// Repeating signer
        signer: Identity,
    },

    /// Operation already holds the required approvals.
    #[error("Threshold already met for {id}: {approvals}/{required}")]
    ThresholdAlreadyMet {
        /// Operation
        id: OperationId,
        /// Approvals held
        approvals: usize,
        /// Approvals required
        required: usize,
    },

    /// A call re-entered the registry while an operation was executing.
    #[error("Re-entrant execution rejected")]
    ReentrantExecution,

    // ---------------------------------------------------------------------
    // Policy
    // ---------------------------------------------------------------------
    /// Mint interval has not elapsed since the last mint.
    #[error("Mint interval not elapsed: next mint allowed at {next_allowed}, now={now}")]
    IntervalNotElapsed {
        /// Earliest allowed mint time
        next_allowed: u64,
        /// Current time
        now: u64,
    },

    /// Supply would exceed the cap.
    #[error("Supply cap exceeded: supply={supply}, amount={amount}, cap={cap}")]
    SupplyCapExceeded {
        /// Current total supply
        supply: U256,
        /// Amount to create
        amount: U256,
        /// Maximum supply
        cap: U256,
    },

    /// Operation not allowed in the current launch mode.
    #[error("Launch mode violation: requires {required}")]
    LaunchModeViolation {
        /// Mode the operation requires
        required: LaunchMode,
    },

    /// Already post-launch.
    #[error("Already post-launch")]
    AlreadyPostLaunch,

    /// Bridge-in amount above the configured maximum.
    #[error("Bridge limit exceeded: amount={amount}, max={max}")]
    LimitExceeded {
        /// Requested amount
        amount: U256,
        /// Configured maximum
        max: U256,
    },

    /// Bridge-in cooldown still running.
    #[error("Bridge cooldown active until {ready_at}, now={now}")]
    CooldownActive {
        /// Earliest allowed bridge-in
        ready_at: u64,
        /// Current time
        now: u64,
    },

    /// Holding account cannot cover the amount.
    #[error("Insufficient holdings: have {balance}, need {required}")]
    InsufficientHoldings {
        /// Holding account balance
        balance: U256,
        /// Requested amount
        required: U256,
    },

    /// Caller cannot cover a bridge-out.
    #[error("Insufficient balance for {account}: have {balance}, need {required}")]
    InsufficientBalance {
        /// Debited account
        account: Identity,
        /// Current balance
        balance: U256,
        /// Requested amount
        required: U256,
    },

    /// Domain argument differs from the configured execution domain.
    #[error("Domain mismatch: expected {expected}, got {got}")]
    DomainMismatch {
        /// Configured domain
        expected: ExecutionDomain,
        /// Supplied domain
        got: ExecutionDomain,
    },

    /// External bridge transaction id was already processed.
    #[error("Bridge transfer already processed: 0x{}", hex::encode(.0))]
    BridgeTransferReplayed(Hash),

    // ---------------------------------------------------------------------
    // Input
    // ---------------------------------------------------------------------
    /// Amount must be non-zero.
    #[error("Zero amount")]
    ZeroAmount,

    /// Amount differs from the only acceptable value.
    #[error("Invalid amount: expected {expected}, got {got}")]
    InvalidAmount {
        /// Acceptable amount
        expected: U256,
        /// Supplied amount
        got: U256,
    },

    /// Null identity where a real one is required.
    #[error("Invalid identity")]
    InvalidIdentity,

    /// New value equals the current one.
    #[error("No change")]
    NoChange,

    /// Bridge limit or cooldown must be positive.
    #[error("Invalid limit")]
    InvalidLimit,

    /// Secondary payload could not be decoded.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Identity is not a current signer.
    #[error("Signer not found: {0}")]
    SignerNotFound(Identity),

    /// Identity is already a signer.
    #[error("Signer already exists: {0}")]
    SignerAlreadyExists(Identity),

    /// Signer set is at capacity.
    #[error("Signer set full (capacity {capacity})")]
    SignerSetFull {
        /// Maximum signers
        capacity: usize,
    },

    // ---------------------------------------------------------------------
    // Ledger
    // ---------------------------------------------------------------------
    /// Ledger collaborator refused the mutation.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl AuthorityError {
    /// Classify for routing (§ error handling design).
    pub fn class(&self) -> ErrorClass {
        use AuthorityError::*;
        match self {
            Unauthorized { .. } | SignerMismatch { .. } | InvalidApprover { .. }
            | InvalidSignature(_) => ErrorClass::Authorization,
            UnknownOperation(_)
            | AlreadyExecuted(_)
            | OperationIdCollision(_)
            | DeadlineExpired { .. }
            | DuplicateApproval { .. }
            | ThresholdAlreadyMet { .. }
            | ReentrantExecution => ErrorClass::State,
            IntervalNotElapsed { .. }
            | SupplyCapExceeded { .. }
            | LaunchModeViolation { .. }
            | AlreadyPostLaunch
            | LimitExceeded { .. }
            | CooldownActive { .. }
            | InsufficientHoldings { .. }
            | InsufficientBalance { .. }
            | DomainMismatch { .. }
            | BridgeTransferReplayed(_) => ErrorClass::Policy,
            ZeroAmount
            | InvalidAmount { .. }
            | InvalidIdentity
            | NoChange
            | InvalidLimit
            | MalformedPayload(_)
            | SignerNotFound(_)
            | SignerAlreadyExists(_)
            | SignerSetFull { .. } => ErrorClass::Input,
            Ledger(_) => ErrorClass::Ledger,
        }
    }
}
