//! # Signer Set
//!
//! Fixed-capacity, ordered list of identities allowed to approve operations.
//! Only the signer-update handler mutates it after construction.

use super::errors::AuthorityError;
use super::value_objects::Identity;
use serde::{Deserialize, Serialize};

/// Ordered set of distinct, non-null signers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerSet {
    signers: Vec<Identity>,
    capacity: usize,
}

impl SignerSet {
    /// Build a set. Rejects null identities, duplicates and overflow.
    pub fn new(signers: Vec<Identity>, capacity: usize) -> Result<Self, AuthorityError> {
        if signers.len() > capacity {
            return Err(AuthorityError::SignerSetFull { capacity });
        }
        for (i, signer) in signers.iter().enumerate() {
            if signer.is_zero() {
                return Err(AuthorityError::InvalidIdentity);
            }
            if signers[..i].contains(signer) {
                return Err(AuthorityError::SignerAlreadyExists(*signer));
            }
        }
        Ok(Self { signers, capacity })
    }

    /// Check membership.
    pub fn contains(&self, identity: &Identity) -> bool {
        self.signers.contains(identity)
    }

    /// Slot index of `identity`.
    pub fn position(&self, identity: &Identity) -> Option<usize> {
        self.signers.iter().position(|s| s == identity)
    }

    /// Signers in slot order.
    pub fn as_slice(&self) -> &[Identity] {
        &self.signers
    }

    /// Number of signers.
    pub fn len(&self) -> usize {
        self.signers.len()
    }

    /// True when there are no signers.
    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }

    /// Maximum number of signers.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Replace `old` with `new` in place, keeping every other slot's position.
    ///
    /// Returns the replaced slot index.
    pub fn replace(&mut self, old: &Identity, new: Identity) -> Result<usize, AuthorityError> {
        if new.is_zero() {
            return Err(AuthorityError::InvalidIdentity);
        }
        let slot = self
            .position(old)
            .ok_or(AuthorityError::SignerNotFound(*old))?;
        if self.contains(&new) {
            return Err(AuthorityError::SignerAlreadyExists(new));
        }
        self.signers[slot] = new;
        Ok(slot)
    }
}
