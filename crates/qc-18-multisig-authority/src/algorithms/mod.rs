//! # Algorithms
//!
//! Message binding and secp256k1 signing/recovery.

pub mod message_binder;
pub mod signature;
pub mod signing;

pub use message_binder::{keccak256, signed_message_hash, MessageBinder};
pub use signature::{identity_from_pubkey, recover_identity, SignatureVerifier};
pub use signing::ApprovalKey;
