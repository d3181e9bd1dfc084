//! # Message Binder
//!
//! Canonical byte encodings for operation ids and approval messages.
//!
//! ## Layout
//!
//! ```text
//! operation id  = keccak256(ID_TAG || nonce[32] || kind[1] || target[20]
//!                           || value[32] || domain[32] || len(extra)[32] || extra)
//! approval      = keccak256(APPROVAL_TAG || id[32] || kind[1] || target[20]
//!                           || value[32] || domain[32] || len(extra)[32] || extra)
//! message hash  = keccak256("\x19Ethereum Signed Message:\n32" || approval)
//! ```
//!
//! All integers are 32-byte big-endian words. The domain is included in both
//! hashes, so an id or approval produced for one deployment is meaningless on
//! another.

use crate::domain::{ExecutionDomain, Hash, Identity, Operation, OperationId, OperationKind};
use primitive_types::U256;
use sha3::{Digest, Keccak256};

/// Domain separator for operation id derivation.
pub const OPERATION_ID_TAG: &[u8] = b"QC18_OPERATION_ID_V1";

/// Domain separator for approval messages.
pub const APPROVAL_TAG: &[u8] = b"QC18_APPROVAL_V1";

/// Standard signed-message prefix for a 32-byte payload.
pub const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Wrap a 32-byte digest with the signed-message prefix and hash it.
///
/// Signing tools show the prefix, so a signer always sees an intent rather
/// than something that could be a raw transaction.
pub fn signed_message_hash(digest: &Hash) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(SIGNED_MESSAGE_PREFIX);
    hasher.update(digest);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

fn u256_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

fn encode_content(
    out: &mut Vec<u8>,
    kind: OperationKind,
    target: &Identity,
    value: U256,
    extra: &[u8],
    domain: ExecutionDomain,
) {
    out.push(kind.tag());
    out.extend_from_slice(target.as_bytes());
    out.extend_from_slice(&u256_word(value));
    out.extend_from_slice(&domain.to_word());
    out.extend_from_slice(&u256_word(U256::from(extra.len())));
    out.extend_from_slice(extra);
}

/// Builds ids and signable messages for one execution domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageBinder {
    domain: ExecutionDomain,
}

impl MessageBinder {
    /// Binder for `domain`.
    pub fn new(domain: ExecutionDomain) -> Self {
        Self { domain }
    }

    /// The bound execution domain.
    pub fn domain(&self) -> ExecutionDomain {
        self.domain
    }

    /// Derive a unique id from the registry counter and the operation content.
    pub fn operation_id(
        &self,
        nonce: u64,
        kind: OperationKind,
        target: &Identity,
        value: U256,
        extra: &[u8],
    ) -> OperationId {
        let mut preimage = Vec::with_capacity(OPERATION_ID_TAG.len() + 160 + extra.len());
        preimage.extend_from_slice(OPERATION_ID_TAG);
        preimage.extend_from_slice(&u256_word(U256::from(nonce)));
        encode_content(&mut preimage, kind, target, value, extra, self.domain);
        OperationId::new(keccak256(&preimage))
    }

    /// Canonical approval payload for `operation`.
    pub fn approval_payload(&self, operation: &Operation) -> Vec<u8> {
        let mut payload =
            Vec::with_capacity(APPROVAL_TAG.len() + 160 + operation.extra.len());
        payload.extend_from_slice(APPROVAL_TAG);
        payload.extend_from_slice(operation.id.as_bytes());
        encode_content(
            &mut payload,
            operation.kind,
            &operation.target,
            operation.value,
            &operation.extra,
            self.domain,
        );
        payload
    }

    /// keccak256 of the approval payload.
    pub fn approval_digest(&self, operation: &Operation) -> Hash {
        keccak256(&self.approval_payload(operation))
    }

    /// The hash a signer signs to approve `operation`.
    pub fn message_hash(&self, operation: &Operation) -> Hash {
        signed_message_hash(&self.approval_digest(operation))
    }
}
