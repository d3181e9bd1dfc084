//! Bridge-in caller and limits.

use super::{HandlerContext, PolicyHandler};
use crate::domain::{AuthorityError, AuthorityEvent, Operation, OperationKind};
use tracing::info;

/// Decode the cooldown carried in a `SetBridgeLimits` payload.
///
/// Expects one 32-byte big-endian word whose value fits in 64 bits.
pub fn decode_cooldown(extra: &[u8]) -> Result<u64, AuthorityError> {
    if extra.len() != 32 {
        return Err(AuthorityError::MalformedPayload(format!(
            "cooldown must be a 32-byte word, got {} bytes",
            extra.len()
        )));
    }
    if extra[..24].iter().any(|b| *b != 0) {
        return Err(AuthorityError::MalformedPayload(
            "cooldown does not fit in 64 bits".to_string(),
        ));
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&extra[24..]);
    Ok(u64::from_be_bytes(raw))
}

/// Assigns the only identity allowed to call bridge-in.
pub struct SetBridgeCallerHandler;

impl PolicyHandler for SetBridgeCallerHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::SetBridgeCaller
    }

    fn apply(
        &self,
        operation: &Operation,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<AuthorityEvent, AuthorityError> {
        let caller = operation.target;
        if caller.is_zero() {
            return Err(AuthorityError::InvalidIdentity);
        }
        let previous = ctx.policy.bridge.in_caller;
        if previous == Some(caller) {
            return Err(AuthorityError::NoChange);
        }
        ctx.policy.bridge.in_caller = Some(caller);

        info!("[qc-18] Bridge-in caller set to {}", caller);
        Ok(AuthorityEvent::BridgeCallerUpdated {
            id: operation.id,
            previous,
            current: caller,
        })
    }
}

/// Replaces the bridge-in maximum amount and cooldown.
pub struct SetBridgeLimitsHandler;

impl PolicyHandler for SetBridgeLimitsHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::SetBridgeLimits
    }

    fn apply(
        &self,
        operation: &Operation,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<AuthorityEvent, AuthorityError> {
        let new_max = operation.value;
        let new_cooldown = decode_cooldown(&operation.extra)?;
        if new_max.is_zero() || new_cooldown == 0 {
            return Err(AuthorityError::InvalidLimit);
        }

        let bridge = &mut ctx.policy.bridge;
        let previous_max = bridge.max_in_amount;
        let previous_cooldown = bridge.in_cooldown_secs;
        bridge.max_in_amount = new_max;
        bridge.in_cooldown_secs = new_cooldown;

        info!(
            "[qc-18] Bridge limits updated: max {} -> {}, cooldown {}s -> {}s",
            previous_max, new_max, previous_cooldown, new_cooldown
        );
        Ok(AuthorityEvent::BridgeLimitsUpdated {
            id: operation.id,
            previous_max,
            new_max,
            previous_cooldown,
            new_cooldown,
        })
    }
}
