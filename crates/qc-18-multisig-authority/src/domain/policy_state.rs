//! # Policy State
//!
//! Launch mode, mint accounting and bridge configuration.
//!
//! Mode and bridge parameters change only through approved operations; the
//! bridge timestamps and processed transfer ids are written directly by the
//! bridge entry points.

use super::errors::{AuthorityError, Hash};
use super::value_objects::{Identity, LaunchMode};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Bridge-in authorization and limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Only identity allowed to call bridge-in. `None` until assigned.
    pub in_caller: Option<Identity>,
    /// Maximum amount per bridge-in.
    pub max_in_amount: U256,
    /// Minimum seconds between bridge-ins.
    pub in_cooldown_secs: u64,
    /// Time of the last successful bridge-in (0 = never).
    pub last_in_time: u64,
}

/// Mutable policy state owned by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyState {
    /// One-way launch mode.
    pub mode: LaunchMode,
    /// Time of the last executed mint (0 = never).
    pub last_mint_time: u64,
    /// Bridge configuration.
    pub bridge: BridgeConfig,
    processed_bridge_transfers: BTreeSet<Hash>,
}

impl PolicyState {
    /// Fresh pre-launch state.
    pub fn new(max_in_amount: U256, in_cooldown_secs: u64) -> Self {
        Self {
            mode: LaunchMode::PreLaunch,
            last_mint_time: 0,
            bridge: BridgeConfig {
                in_caller: None,
                max_in_amount,
                in_cooldown_secs,
                last_in_time: 0,
            },
            processed_bridge_transfers: BTreeSet::new(),
        }
    }

    /// True while mint/burn are open.
    pub fn is_pre_launch(&self) -> bool {
        self.mode == LaunchMode::PreLaunch
    }

    /// Fail unless the current mode is `required`.
    pub fn ensure_mode(&self, required: LaunchMode) -> Result<(), AuthorityError> {
        if self.mode != required {
            return Err(AuthorityError::LaunchModeViolation { required });
        }
        Ok(())
    }

    /// Check whether an external bridge transaction id was already processed.
    pub fn is_bridge_transfer_processed(&self, external_tx_id: &Hash) -> bool {
        self.processed_bridge_transfers.contains(external_tx_id)
    }

    /// Record a processed external transaction id.
    pub fn record_bridge_transfer(&mut self, external_tx_id: Hash) -> Result<(), AuthorityError> {
        if !self.processed_bridge_transfers.insert(external_tx_id) {
            return Err(AuthorityError::BridgeTransferReplayed(external_tx_id));
        }
        Ok(())
    }
}
