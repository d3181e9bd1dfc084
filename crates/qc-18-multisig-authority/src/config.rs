//! # Authority Configuration
//!
//! Deployment parameters: owner, holding account, execution domain, initial
//! signers, approval thresholds and supply/bridge limits.
//!
//! Loaded from JSON, then optionally overridden from `QC_MSIG_*` environment
//! variables:
//!
//! - `QC_MSIG_DOMAIN`: execution domain id
//! - `QC_MSIG_THRESHOLD`: default approval threshold
//! - `QC_MSIG_APPROVAL_WINDOW_SECS`: approval window
//! - `QC_MSIG_MINT_INTERVAL_SECS`: minimum time between mints

use crate::domain::{ExecutionDomain, Identity, OperationKind, SignerSet};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

/// Seconds per day.
pub const DAY_SECS: u64 = 86_400;

/// Approvals required for every kind unless overridden.
pub const DEFAULT_THRESHOLD: usize = 3;

/// Signer set capacity.
pub const DEFAULT_MAX_SIGNERS: usize = 3;

/// Approval window.
pub const DEFAULT_APPROVAL_WINDOW_SECS: u64 = 3 * DAY_SECS;

/// Minimum time between mints.
pub const DEFAULT_MINT_INTERVAL_SECS: u64 = 30 * DAY_SECS;

/// Units credited per mint.
pub const DEFAULT_FIXED_MINT_AMOUNT: u64 = 3_000_000;

/// Supply cap.
pub const DEFAULT_MAX_SUPPLY: u64 = 1_000_000_000;

/// Initial maximum per bridge-in.
pub const DEFAULT_BRIDGE_MAX_IN_AMOUNT: u64 = 1_000_000;

/// Initial bridge-in cooldown.
pub const DEFAULT_BRIDGE_IN_COOLDOWN_SECS: u64 = 3600;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Owner must be a real identity.
    #[error("Owner must not be the zero identity")]
    ZeroOwner,

    /// Holding account must be a real identity.
    #[error("Holding account must not be the zero identity")]
    ZeroHoldingAccount,

    /// Initial signers violate the signer-set rules.
    #[error("Invalid signer set: {0}")]
    InvalidSignerSet(String),

    /// A kind requires zero approvals.
    #[error("Threshold for {kind} must be at least 1")]
    ZeroThreshold {
        /// Offending kind
        kind: OperationKind,
    },

    /// A kind requires more approvals than eligible approvers exist.
    #[error("Threshold for {kind} is {required} but only {available} approvers are eligible")]
    ThresholdUnreachable {
        /// Offending kind
        kind: OperationKind,
        /// Configured threshold
        required: usize,
        /// Eligible approvers in the worst case
        available: usize,
    },

    /// A single mint would exceed the cap.
    #[error("Fixed mint amount {amount} exceeds max supply {cap}")]
    MintExceedsCap {
        /// Fixed mint amount
        amount: U256,
        /// Max supply
        cap: U256,
    },

    /// Zero approval window or mint amount.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config JSON could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Approvals required per operation kind.
///
/// Signer replacement has used a smaller threshold than the general one in
/// some deployments, so each kind can be overridden.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    /// Threshold for kinds without an override.
    pub default: usize,
    /// Per-kind thresholds.
    #[serde(default)]
    pub overrides: BTreeMap<OperationKind, usize>,
}

impl ThresholdPolicy {
    /// Same threshold for every kind.
    pub fn uniform(threshold: usize) -> Self {
        Self {
            default: threshold,
            overrides: BTreeMap::new(),
        }
    }

    /// Override the threshold for one kind.
    pub fn with_override(mut self, kind: OperationKind, threshold: usize) -> Self {
        self.overrides.insert(kind, threshold);
        self
    }

    /// Approvals required for `kind`.
    pub fn required(&self, kind: OperationKind) -> usize {
        self.overrides.get(&kind).copied().unwrap_or(self.default)
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::uniform(DEFAULT_THRESHOLD)
    }
}

/// Supply rules applied by the mint and burn handlers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyLimits {
    /// Units credited to the holding account per mint.
    pub fixed_mint_amount: U256,
    /// Total supply never exceeds this.
    pub max_supply: U256,
    /// Minimum seconds between mints.
    pub mint_interval_secs: u64,
}

impl Default for SupplyLimits {
    fn default() -> Self {
        Self {
            fixed_mint_amount: U256::from(DEFAULT_FIXED_MINT_AMOUNT),
            max_supply: U256::from(DEFAULT_MAX_SUPPLY),
            mint_interval_secs: DEFAULT_MINT_INTERVAL_SECS,
        }
    }
}

/// Deployment configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// Administrative owner: may request any kind and approve signer updates.
    pub owner: Identity,
    /// Engine-controlled account receiving minted supply.
    pub holding_account: Identity,
    /// Execution domain bound into every id and approval.
    pub domain: ExecutionDomain,
    /// Initial signers, in slot order.
    pub signers: Vec<Identity>,
    /// Signer set capacity.
    pub max_signers: usize,
    /// Approvals required per kind.
    pub thresholds: ThresholdPolicy,
    /// Seconds an operation accepts approvals after being requested.
    pub approval_window_secs: u64,
    /// Mint/burn rules.
    pub supply: SupplyLimits,
    /// Initial maximum per bridge-in.
    pub bridge_max_in_amount: U256,
    /// Initial bridge-in cooldown.
    pub bridge_in_cooldown_secs: u64,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            owner: Identity::ZERO,
            holding_account: Identity::ZERO,
            domain: ExecutionDomain(1),
            signers: Vec::new(),
            max_signers: DEFAULT_MAX_SIGNERS,
            thresholds: ThresholdPolicy::default(),
            approval_window_secs: DEFAULT_APPROVAL_WINDOW_SECS,
            supply: SupplyLimits::default(),
            bridge_max_in_amount: U256::from(DEFAULT_BRIDGE_MAX_IN_AMOUNT),
            bridge_in_cooldown_secs: DEFAULT_BRIDGE_IN_COOLDOWN_SECS,
        }
    }
}

impl AuthorityConfig {
    /// Defaults with the three identities every deployment must supply.
    pub fn new(owner: Identity, holding_account: Identity, signers: Vec<Identity>) -> Self {
        Self {
            owner,
            holding_account,
            signers,
            ..Self::default()
        }
    }

    /// Builder-style method to set the execution domain.
    pub fn with_domain(mut self, domain: ExecutionDomain) -> Self {
        self.domain = domain;
        self
    }

    /// Builder-style method to set the threshold policy.
    pub fn with_thresholds(mut self, thresholds: ThresholdPolicy) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Builder-style method to set supply rules.
    pub fn with_supply(mut self, supply: SupplyLimits) -> Self {
        self.supply = supply;
        self
    }

    /// Builder-style method to set initial bridge limits.
    pub fn with_bridge_limits(mut self, max_in_amount: U256, cooldown_secs: u64) -> Self {
        self.bridge_max_in_amount = max_in_amount;
        self.bridge_in_cooldown_secs = cooldown_secs;
        self
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json(&raw)?;
        info!("[qc-18] Loaded authority config from {}", path.display());
        Ok(config)
    }

    /// Build the initial signer set.
    pub fn signer_set(&self) -> Result<SignerSet, ConfigError> {
        SignerSet::new(self.signers.clone(), self.max_signers)
            .map_err(|e| ConfigError::InvalidSignerSet(e.to_string()))
    }

    /// Approvers that remain eligible for `kind` in the worst case.
    ///
    /// A signer being replaced may not approve its own removal, while the
    /// owner may approve signer updates.
    fn eligible_approvers(&self, kind: OperationKind) -> usize {
        let signers = self.signers.len();
        if kind != OperationKind::UpdateSigner {
            return signers;
        }
        let owner_extra = usize::from(!self.signers.contains(&self.owner));
        signers.saturating_sub(1) + owner_extra
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.is_zero() {
            return Err(ConfigError::ZeroOwner);
        }
        if self.holding_account.is_zero() {
            return Err(ConfigError::ZeroHoldingAccount);
        }
        self.signer_set()?;

        for kind in OperationKind::ALL {
            let required = self.thresholds.required(kind);
            if required == 0 {
                return Err(ConfigError::ZeroThreshold { kind });
            }
            let available = self.eligible_approvers(kind);
            if required > available {
                return Err(ConfigError::ThresholdUnreachable {
                    kind,
                    required,
                    available,
                });
            }
        }

        if self.approval_window_secs == 0 {
            return Err(ConfigError::InvalidParameter(
                "approval_window_secs cannot be 0".to_string(),
            ));
        }
        if self.supply.fixed_mint_amount.is_zero() {
            return Err(ConfigError::InvalidParameter(
                "fixed_mint_amount cannot be 0".to_string(),
            ));
        }
        if self.supply.fixed_mint_amount > self.supply.max_supply {
            return Err(ConfigError::MintExceedsCap {
                amount: self.supply.fixed_mint_amount,
                cap: self.supply.max_supply,
            });
        }
        if self.bridge_max_in_amount.is_zero() || self.bridge_in_cooldown_secs == 0 {
            return Err(ConfigError::InvalidParameter(
                "bridge limits must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Override fields from `QC_MSIG_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Override fields from any name → value lookup.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(domain) = parse_override::<u64>(&lookup, "QC_MSIG_DOMAIN") {
            self.domain = ExecutionDomain(domain);
        }
        if let Some(threshold) = parse_override::<usize>(&lookup, "QC_MSIG_THRESHOLD") {
            self.thresholds.default = threshold;
        }
        if let Some(window) = parse_override::<u64>(&lookup, "QC_MSIG_APPROVAL_WINDOW_SECS") {
            self.approval_window_secs = window;
        }
        if let Some(interval) = parse_override::<u64>(&lookup, "QC_MSIG_MINT_INTERVAL_SECS") {
            self.supply.mint_interval_secs = interval;
        }
    }
}

fn parse_override<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("[qc-18] Ignoring {}: cannot parse {:?}", name, raw);
            None
        }
    }
}
