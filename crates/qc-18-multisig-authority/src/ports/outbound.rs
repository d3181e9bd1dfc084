//! Outbound (Driven) ports for the Multi-Signer Authority.
//!
//! These traits define the collaborators the authority drives: the
//! value-transfer ledger and a clock.

use crate::domain::{Identity, LedgerError};
use primitive_types::U256;
use std::sync::Arc;

/// Value-transfer ledger collaborator.
///
/// Balance storage and transfer mechanics live behind this trait; the
/// authority only decides *whether* a mutation happens. Every mutating call
/// except [`TokenLedger::set_paused`] must fail with [`LedgerError::Paused`]
/// while the transfer gate is closed.
///
/// The engine stages mutations on a clone of the ledger and keeps the clone
/// only if the whole call succeeds, so implementations used with
/// `AuthorityEngine` must also be `Clone`.
pub trait TokenLedger: Send {
    /// Create `amount` and credit it to `account`.
    fn mint(&mut self, account: &Identity, amount: U256) -> Result<(), LedgerError>;

    /// Destroy `amount` from `account`.
    fn burn(&mut self, account: &Identity, amount: U256) -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to`.
    fn transfer(&mut self, from: &Identity, to: &Identity, amount: U256)
        -> Result<(), LedgerError>;

    /// Current balance of `account`.
    fn balance_of(&self, account: &Identity) -> U256;

    /// Sum of all balances.
    fn total_supply(&self) -> U256;

    /// Close (`true`) or reopen (`false`) the transfer gate.
    ///
    /// # Errors
    /// - `AlreadyPaused` / `NotPaused` if already in the requested state
    fn set_paused(&mut self, paused: bool) -> Result<(), LedgerError>;

    /// Whether the transfer gate is closed.
    fn is_paused(&self) -> bool;
}

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time. Seconds since the
/// Unix epoch.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in seconds.
    fn now(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
