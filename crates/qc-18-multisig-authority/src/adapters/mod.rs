//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits.

mod in_memory_ledger;
mod manual_time;

pub use in_memory_ledger::InMemoryTokenLedger;
pub use manual_time::ManualTimeSource;
