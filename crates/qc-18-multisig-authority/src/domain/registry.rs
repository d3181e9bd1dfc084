//! # Operation Registry
//!
//! Arena of operation records indexed by id. Owns the monotonically
//! increasing counter ids are derived from; records are never removed.

use super::entities::Operation;
use super::errors::AuthorityError;
use super::value_objects::OperationId;
use std::collections::HashMap;

/// Id-indexed store of every operation ever requested.
#[derive(Clone, Debug, Default)]
pub struct OperationRegistry {
    operations: HashMap<OperationId, Operation>,
    order: Vec<OperationId>,
    next_nonce: u64,
}

impl OperationRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter value the next operation id will be derived from.
    pub fn next_nonce(&self) -> u64 {
        self.next_nonce
    }

    /// Store a freshly created operation and advance the counter.
    pub fn insert(&mut self, operation: Operation) -> Result<(), AuthorityError> {
        if self.operations.contains_key(&operation.id) {
            return Err(AuthorityError::OperationIdCollision(operation.id));
        }
        self.next_nonce = self.next_nonce.max(operation.nonce.saturating_add(1));
        self.order.push(operation.id);
        self.operations.insert(operation.id, operation);
        Ok(())
    }

    /// Look up an operation.
    pub fn get(&self, id: &OperationId) -> Result<&Operation, AuthorityError> {
        self.operations
            .get(id)
            .ok_or(AuthorityError::UnknownOperation(*id))
    }

    /// Replace a stored record with its updated copy.
    pub fn commit(&mut self, operation: Operation) -> Result<(), AuthorityError> {
        let slot = self
            .operations
            .get_mut(&operation.id)
            .ok_or(AuthorityError::UnknownOperation(operation.id))?;
        *slot = operation;
        Ok(())
    }

    /// Operations in request order.
    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.order.iter().filter_map(|id| self.operations.get(id))
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when nothing was requested yet.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
