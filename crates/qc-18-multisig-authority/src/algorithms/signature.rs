//! # Signature Verifier (secp256k1)
//!
//! Recovers the approving identity from a signature over a bound message.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: S must be strictly less than half the curve order
//! - **Scalar Range Validation**: R and S must be in [1, n-1]
//! - **Constant-Time Operations**: range checks use `subtle`
//! - A recovered identity is never trusted on its own; callers compare it
//!   against the claimed approver with [`SignatureVerifier::verify_approver`].

use super::message_binder::keccak256;
use crate::domain::{ApprovalSignature, AuthorityError, Hash, Identity, SignatureError};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// secp256k1 curve order n
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// n/2, upper bound (exclusive) for S.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Stateless recover-and-compare verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureVerifier;

impl SignatureVerifier {
    /// Create a new verifier.
    pub fn new() -> Self {
        Self
    }

    /// Recover the signing identity.
    pub fn recover(
        &self,
        message_hash: &Hash,
        signature: &ApprovalSignature,
    ) -> Result<Identity, SignatureError> {
        recover_identity(message_hash, signature)
    }

    /// Recover the signing identity and require it to be `claimed`.
    ///
    /// A valid signature forwarded by someone other than its signer fails
    /// with `SignerMismatch`.
    pub fn verify_approver(
        &self,
        message_hash: &Hash,
        signature: &ApprovalSignature,
        claimed: Identity,
    ) -> Result<Identity, AuthorityError> {
        let recovered = self.recover(message_hash, signature)?;
        if recovered != claimed {
            return Err(AuthorityError::SignerMismatch { claimed, recovered });
        }
        Ok(recovered)
    }
}

/// Recover the identity that produced `signature` over `message_hash`.
pub fn recover_identity(
    message_hash: &Hash,
    signature: &ApprovalSignature,
) -> Result<Identity, SignatureError> {
    if !is_valid_scalar(&signature.r) || !is_valid_scalar(&signature.s) {
        return Err(SignatureError::InvalidFormat);
    }
    if !is_low_s(&signature.s) {
        return Err(SignatureError::MalleableSignature);
    }

    let recovery_id = parse_recovery_id(signature.v)?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    let parsed = Signature::from_slice(&sig_bytes);
    sig_bytes.zeroize();
    let sig = parsed.map_err(|_| SignatureError::InvalidFormat)?;

    let recovered_key = VerifyingKey::recover_from_prehash(message_hash, &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    let identity = identity_from_pubkey(&recovered_key);
    if identity.is_zero() {
        return Err(SignatureError::ZeroIdentity);
    }
    Ok(identity)
}

/// Derive the Ethereum-style identity of a public key.
pub fn identity_from_pubkey(public_key: &VerifyingKey) -> Identity {
    let pubkey_bytes = public_key.to_encoded_point(false);
    let pubkey_slice = pubkey_bytes.as_bytes();

    // Skip the 0x04 prefix, keep the last 20 bytes of the hash.
    let hash = keccak256(&pubkey_slice[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Identity::new(address)
}

/// Constant-time `a < b` over big-endian 32-byte words.
fn ct_less_than(a: &[u8; 32], b: &[u8; 32]) -> Choice {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let not_decided = !(less | greater);
        let byte_less = Choice::from((a[i] < b[i]) as u8);
        let byte_greater = Choice::from((a[i] > b[i]) as u8);

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    less
}

/// S strictly below n/2 (EIP-2).
// Stricter than k256's `normalize_s`, which keeps s == floor(n/2) as low.
pub(crate) fn is_low_s(s: &[u8; 32]) -> bool {
    ct_less_than(s, &SECP256K1_HALF_ORDER).into()
}

/// Scalar in [1, n-1].
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let mut is_zero = Choice::from(1u8);
    for &byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }
    (!is_zero & ct_less_than(scalar, &SECP256K1_ORDER)).into()
}

/// Valid v values: 0, 1, 27, 28
fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignatureError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };

    RecoveryId::try_from(id).map_err(|_| SignatureError::InvalidRecoveryId(v))
}

/// s' = n - s
pub(crate) fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;

    for i in (0..32).rev() {
        let diff = (SECP256K1_ORDER[i] as i32) - (s[i] as i32) - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }

    result
}
