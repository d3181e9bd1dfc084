//! # Approval Keys
//!
//! Signer-side helper: holds a secp256k1 secret and produces approvals the
//! verifier accepts (RFC 6979 nonces, low-S, `v` in {27, 28}).

use super::message_binder::MessageBinder;
use super::signature::{identity_from_pubkey, invert_s, is_low_s};
use crate::domain::{ApprovalSignature, Hash, Identity, Operation, SignatureError};
use k256::ecdsa::SigningKey;
use zeroize::Zeroize;

/// A signer's secret key.
pub struct ApprovalKey {
    signing_key: SigningKey,
    identity: Identity,
}

impl ApprovalKey {
    /// Generate a random key.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::random(&mut rand::thread_rng()))
    }

    /// Load from secret key bytes. The input copy is wiped.
    pub fn from_bytes(mut bytes: [u8; 32]) -> Result<Self, SignatureError> {
        let parsed = SigningKey::from_bytes((&bytes).into());
        bytes.zeroize();
        let signing_key = parsed.map_err(|_| SignatureError::InvalidSecretKey)?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let identity = identity_from_pubkey(signing_key.verifying_key());
        Self {
            signing_key,
            identity,
        }
    }

    /// Identity recovered from this key's signatures.
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Sign a prehashed message.
    pub fn sign_hash(&self, message_hash: &Hash) -> Result<ApprovalSignature, SignatureError> {
        let (sig, recid) = self
            .signing_key
            .sign_prehash_recoverable(message_hash)
            .map_err(|_| SignatureError::SigningFailed)?;

        let sig_bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&sig_bytes[..32]);
        s.copy_from_slice(&sig_bytes[32..]);

        // Flipping S flips the parity of R's y-coordinate.
        let (s, parity) = if is_low_s(&s) {
            (s, recid.to_byte() & 1)
        } else {
            (invert_s(&s), (recid.to_byte() & 1) ^ 1)
        };

        Ok(ApprovalSignature {
            r,
            s,
            v: 27 + parity,
        })
    }

    /// Approve `operation` under the binder's domain.
    pub fn sign_operation(
        &self,
        binder: &MessageBinder,
        operation: &Operation,
    ) -> Result<ApprovalSignature, SignatureError> {
        self.sign_hash(&binder.message_hash(operation))
    }
}

impl std::fmt::Debug for ApprovalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalKey")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
