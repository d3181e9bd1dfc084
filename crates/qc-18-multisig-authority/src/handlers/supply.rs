//! Mint, burn and distribution from the holding account.

use super::{HandlerContext, PolicyHandler};
use crate::domain::{
    invariant_mint_interval, invariant_non_zero, invariant_sufficient_holdings,
    invariant_supply_cap, AuthorityError, AuthorityEvent, LaunchMode, Operation, OperationKind,
};
use tracing::info;

/// Credits the fixed mint amount to the holding account.
///
/// Check order: amount, interval, cap, launch mode.
pub struct MintHandler;

impl PolicyHandler for MintHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::Mint
    }

    fn apply(
        &self,
        operation: &Operation,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<AuthorityEvent, AuthorityError> {
        let amount = ctx.supply.fixed_mint_amount;
        if operation.value != amount {
            return Err(AuthorityError::InvalidAmount {
                expected: amount,
                got: operation.value,
            });
        }
        invariant_mint_interval(
            ctx.policy.last_mint_time,
            ctx.supply.mint_interval_secs,
            ctx.now,
        )?;
        let supply_before = ctx.ledger.total_supply();
        invariant_supply_cap(supply_before, amount, ctx.supply.max_supply)?;
        ctx.policy.ensure_mode(LaunchMode::PreLaunch)?;

        ctx.ledger.mint(&ctx.holding_account, amount)?;
        ctx.policy.last_mint_time = ctx.now;

        let supply_after = ctx.ledger.total_supply();
        info!(
            "[qc-18] Minted {} to holding account (supply {} -> {})",
            amount, supply_before, supply_after
        );
        Ok(AuthorityEvent::MintExecuted {
            id: operation.id,
            account: ctx.holding_account,
            amount,
            supply_before,
            supply_after,
        })
    }
}

/// Destroys `value` from the holding account.
pub struct BurnHandler;

impl PolicyHandler for BurnHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::Burn
    }

    fn apply(
        &self,
        operation: &Operation,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<AuthorityEvent, AuthorityError> {
        let amount = operation.value;
        invariant_non_zero(amount)?;
        invariant_sufficient_holdings(ctx.ledger.balance_of(&ctx.holding_account), amount)?;
        ctx.policy.ensure_mode(LaunchMode::PreLaunch)?;

        let supply_before = ctx.ledger.total_supply();
        ctx.ledger.burn(&ctx.holding_account, amount)?;
        let supply_after = ctx.ledger.total_supply();

        info!(
            "[qc-18] Burned {} from holding account (supply {} -> {})",
            amount, supply_before, supply_after
        );
        Ok(AuthorityEvent::BurnExecuted {
            id: operation.id,
            account: ctx.holding_account,
            amount,
            supply_before,
            supply_after,
        })
    }
}

/// Transfers `value` from the holding account to `target`.
pub struct DistributeHandler;

impl PolicyHandler for DistributeHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::Distribute
    }

    fn apply(
        &self,
        operation: &Operation,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<AuthorityEvent, AuthorityError> {
        let amount = operation.value;
        let recipient = operation.target;
        if recipient.is_zero() {
            return Err(AuthorityError::InvalidIdentity);
        }
        invariant_non_zero(amount)?;
        invariant_sufficient_holdings(ctx.ledger.balance_of(&ctx.holding_account), amount)?;

        ctx.ledger.transfer(&ctx.holding_account, &recipient, amount)?;
        let holding_after = ctx.ledger.balance_of(&ctx.holding_account);

        info!("[qc-18] Distributed {} to {}", amount, recipient);
        Ok(AuthorityEvent::Distributed {
            id: operation.id,
            from: ctx.holding_account,
            to: recipient,
            amount,
            holding_after,
        })
    }
}
