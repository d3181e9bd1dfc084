//! # Domain Invariants
//!
//! Numeric business rules, kept as pure functions so handlers and bridge
//! entry points share one definition of each check.

use super::errors::AuthorityError;
use primitive_types::U256;

/// Invariant: mints are at least `interval_secs` apart.
///
/// The first mint (`last_mint_time == 0`) is always allowed.
pub fn invariant_mint_interval(
    last_mint_time: u64,
    interval_secs: u64,
    now: u64,
) -> Result<(), AuthorityError> {
    if last_mint_time == 0 {
        return Ok(());
    }
    let next_allowed = last_mint_time.saturating_add(interval_secs);
    if now < next_allowed {
        return Err(AuthorityError::IntervalNotElapsed { next_allowed, now });
    }
    Ok(())
}

/// Invariant: total supply never exceeds the cap.
pub fn invariant_supply_cap(supply: U256, amount: U256, cap: U256) -> Result<(), AuthorityError> {
    match supply.checked_add(amount) {
        Some(total) if total <= cap => Ok(()),
        _ => Err(AuthorityError::SupplyCapExceeded {
            supply,
            amount,
            cap,
        }),
    }
}

/// Invariant: holding account covers a debit.
pub fn invariant_sufficient_holdings(balance: U256, required: U256) -> Result<(), AuthorityError> {
    if balance < required {
        return Err(AuthorityError::InsufficientHoldings { balance, required });
    }
    Ok(())
}

/// Invariant: amount is non-zero.
pub fn invariant_non_zero(amount: U256) -> Result<(), AuthorityError> {
    if amount.is_zero() {
        return Err(AuthorityError::ZeroAmount);
    }
    Ok(())
}

/// Invariant: a single bridge-in never exceeds the configured maximum.
pub fn invariant_bridge_limit(amount: U256, max: U256) -> Result<(), AuthorityError> {
    if amount > max {
        return Err(AuthorityError::LimitExceeded { amount, max });
    }
    Ok(())
}

/// Invariant: bridge-ins are at least `cooldown_secs` apart.
pub fn invariant_bridge_cooldown(
    last_in_time: u64,
    cooldown_secs: u64,
    now: u64,
) -> Result<(), AuthorityError> {
    if last_in_time == 0 {
        return Ok(());
    }
    let ready_at = last_in_time.saturating_add(cooldown_secs);
    if now < ready_at {
        return Err(AuthorityError::CooldownActive { ready_at, now });
    }
    Ok(())
}
