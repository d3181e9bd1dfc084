//! Signer rotation.

use super::{HandlerContext, PolicyHandler};
use crate::domain::{AuthorityError, AuthorityEvent, Identity, Operation, OperationKind};
use primitive_types::U256;
use tracing::info;

/// Decode the replacement signer carried in an `UpdateSigner` value.
pub fn decode_new_signer(value: U256) -> Result<Identity, AuthorityError> {
    let identity = Identity::from_u256(value).ok_or_else(|| {
        AuthorityError::MalformedPayload("new signer wider than 160 bits".to_string())
    })?;
    if identity.is_zero() {
        return Err(AuthorityError::InvalidIdentity);
    }
    Ok(identity)
}

/// Replaces signer `target` with the identity encoded in `value`.
///
/// Membership is checked again here: other rotations may have executed
/// between request and execution.
pub struct UpdateSignerHandler;

impl PolicyHandler for UpdateSignerHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::UpdateSigner
    }

    fn apply(
        &self,
        operation: &Operation,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<AuthorityEvent, AuthorityError> {
        let old = operation.target;
        let new = decode_new_signer(operation.value)?;
        let slot = ctx.signers.replace(&old, new)?;

        info!("[qc-18] Signer slot {} rotated: {} -> {}", slot, old, new);
        Ok(AuthorityEvent::SignerUpdated {
            id: operation.id,
            old,
            new,
            slot,
        })
    }
}
