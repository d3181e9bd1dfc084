//! In-memory Token Ledger Adapter
//!
//! Implements the `TokenLedger` port with a balance map. Used by tests, the
//! distribution driver's dry runs and any embedding that keeps balances in
//! process.

use crate::domain::{Identity, LedgerError};
use crate::ports::outbound::TokenLedger;
use primitive_types::U256;
use std::collections::HashMap;
use tracing::debug;

/// Balance map with a pausable transfer gate.
#[derive(Clone, Debug, Default)]
pub struct InMemoryTokenLedger {
    balances: HashMap<Identity, U256>,
    total_supply: U256,
    paused: bool,
}

impl InMemoryTokenLedger {
    /// Empty, unpaused ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fund `account` (setup helper, bypasses the gate).
    pub fn with_balance(mut self, account: Identity, amount: U256) -> Self {
        let entry = self.balances.entry(account).or_insert_with(U256::zero);
        *entry = entry.saturating_add(amount);
        self.total_supply = self.total_supply.saturating_add(amount);
        self
    }

    fn ensure_open(&self) -> Result<(), LedgerError> {
        if self.paused {
            return Err(LedgerError::Paused);
        }
        Ok(())
    }

    fn debit(&mut self, account: &Identity, amount: U256) -> Result<(), LedgerError> {
        let balance = self.balance_of(account);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                account: *account,
                balance,
                required: amount,
            });
        }
        let remaining = balance - amount;
        if remaining.is_zero() {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, remaining);
        }
        Ok(())
    }

    fn credit(&mut self, account: &Identity, amount: U256) -> Result<(), LedgerError> {
        let balance = self.balance_of(account);
        let updated = balance
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow)?;
        self.balances.insert(*account, updated);
        Ok(())
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn mint(&mut self, account: &Identity, amount: U256) -> Result<(), LedgerError> {
        self.ensure_open()?;
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow)?;
        self.credit(account, amount)?;
        self.total_supply = supply;
        debug!("[qc-18] ledger mint {} to {}", amount, account);
        Ok(())
    }

    fn burn(&mut self, account: &Identity, amount: U256) -> Result<(), LedgerError> {
        self.ensure_open()?;
        self.debit(account, amount)?;
        self.total_supply = self.total_supply.saturating_sub(amount);
        debug!("[qc-18] ledger burn {} from {}", amount, account);
        Ok(())
    }

    fn transfer(
        &mut self,
        from: &Identity,
        to: &Identity,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.ensure_open()?;
        self.debit(from, amount)?;
        self.credit(to, amount)?;
        debug!("[qc-18] ledger transfer {} {} -> {}", amount, from, to);
        Ok(())
    }

    fn balance_of(&self, account: &Identity) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn total_supply(&self) -> U256 {
        self.total_supply
    }

    fn set_paused(&mut self, paused: bool) -> Result<(), LedgerError> {
        match (self.paused, paused) {
            (true, true) => Err(LedgerError::AlreadyPaused),
            (false, false) => Err(LedgerError::NotPaused),
            _ => {
                self.paused = paused;
                Ok(())
            }
        }
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}
