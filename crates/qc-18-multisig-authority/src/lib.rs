//! # QC-18 Multi-Signer Authority
//!
//! Threshold-approval authority over a token ledger.
//!
//! **Subsystem ID:** 18
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Every privileged action (minting, burning, distribution, launch-mode
//! switch, pause, bridge configuration, signer rotation) is a two-phase
//! operation:
//! - a signer or the owner **requests** it and receives a content-bound id
//! - signers **approve** it with secp256k1 signatures over that id and the
//!   execution domain
//! - the approval that reaches the kind's threshold **executes** it,
//!   exactly once, or rolls the whole call back
//!
//! Bridge transfers (`bridge_out` / `bridge_in`) sit outside the approval
//! protocol and are gated by launch mode, domain, limits, cooldown and an
//! external transaction id seen-set.
//!
//! ## Security Features
//!
//! | Defense | Description |
//! |---------|-------------|
//! | Domain binding | Ids and approvals hash the execution domain |
//! | Signer recovery | Recovered identity must equal the claimed submitter |
//! | Malleability | High-S signatures rejected |
//! | Exactly-once | `executed` flips once; re-entrant calls rejected |
//! | Atomic dispatch | Failed handlers leave every piece of state unchanged |
//! | Self-approval exclusion | A replaced signer never approves its own removal |
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-multisig-authority/
//! ├── domain/          # Operation, SignerSet, PolicyState, events, errors
//! ├── algorithms/      # Message binding, signature recovery, signing
//! ├── handlers/        # One policy handler per operation kind
//! ├── ports/           # MultisigAuthorityApi, TokenLedger, TimeSource
//! ├── adapters/        # In-memory ledger, manual clock
//! ├── service.rs       # AuthorityEngine + AuthorityService
//! ├── config.rs        # AuthorityConfig, ThresholdPolicy
//! └── distribution.rs  # Batch distribution driver
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod distribution;
pub mod domain;
pub mod handlers;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{InMemoryTokenLedger, ManualTimeSource};
pub use algorithms::{
    keccak256, recover_identity, signed_message_hash, ApprovalKey, MessageBinder,
    SignatureVerifier,
};
pub use config::{AuthorityConfig, ConfigError, SupplyLimits, ThresholdPolicy};
pub use distribution::{
    load_recipients, BatchDistributor, DistributionError, DistributionRecord,
    DistributionReport, DistributionSettings, Recipient, SkipReason,
};
pub use domain::{
    ApprovalOutcome, ApprovalSignature, AuthorityError, AuthorityEvent, ErrorClass, EventRecord,
    ExecutionDomain, Hash, Identity, LaunchMode, LedgerError, Operation, OperationId,
    OperationKind, OperationRequest, PolicyState, SignatureError, SignerSet,
};
pub use handlers::{handler_for, HandlerContext, PolicyHandler};
pub use ports::{MultisigAuthorityApi, SystemTimeSource, TimeSource, TokenLedger};
pub use service::{AuthorityEngine, AuthorityService, ServiceStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
