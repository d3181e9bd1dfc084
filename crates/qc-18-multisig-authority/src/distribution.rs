//! # Batch Distribution Driver
//!
//! Administrative convenience layer that turns a recipient list into
//! `Distribute` requests. It sits outside the authority's trust boundary:
//! everything it does is an ordinary `request_operation` call, and the
//! signers still approve each request.
//!
//! The driver keeps a local record of when each recipient was last requested
//! so a re-run does not issue duplicates sooner than `min_wait_secs`, and can
//! cross-check the event stream for a recent matching transfer. Per-recipient
//! failures are logged and reported; the batch carries on.

use crate::domain::{AuthorityError, AuthorityEvent, Identity, OperationId, OperationRequest};
use crate::ports::inbound::MultisigAuthorityApi;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Driver errors. Per-recipient request failures are not errors of the run;
/// they land in [`DistributionReport::failed`].
#[derive(Debug, Error)]
pub enum DistributionError {
    /// Reading or writing a list or record file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A list or record file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the event stream failed.
    #[error("Authority error: {0}")]
    Authority(#[from] AuthorityError),
}

/// One line of the recipient list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Label used in logs and reports.
    pub name: String,
    /// Receiving identity.
    pub identity: Identity,
    /// Amount to distribute.
    pub amount: u128,
}

/// Parse a JSON array of recipients.
pub fn load_recipients(path: &Path) -> Result<Vec<Recipient>, DistributionError> {
    let raw = std::fs::read_to_string(path)?;
    let recipients: Vec<Recipient> = serde_json::from_str(&raw)?;
    info!(
        "[qc-18] Loaded {} recipients from {}",
        recipients.len(),
        path.display()
    );
    Ok(recipients)
}

/// Last request made for one recipient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    /// When the `Distribute` request was made.
    pub last_requested: u64,
    /// The operation it created.
    pub operation_id: OperationId,
}

/// Local `{identity → last request}` record, persisted as JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistributionRecord {
    entries: BTreeMap<Identity, RecordEntry>,
}

impl DistributionRecord {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`; a missing file is an empty record.
    pub fn load(path: &Path) -> Result<Self, DistributionError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write to `path`.
    pub fn save(&self, path: &Path) -> Result<(), DistributionError> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Entry for `identity`, if one was recorded.
    pub fn get(&self, identity: &Identity) -> Option<&RecordEntry> {
        self.entries.get(identity)
    }

    /// Record a request.
    pub fn record(&mut self, identity: Identity, entry: RecordEntry) {
        self.entries.insert(identity, entry);
    }

    /// Number of recorded identities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Driver settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSettings {
    /// Signer or owner the requests are made as.
    pub requester: Identity,
    /// Minimum seconds between two requests for the same identity.
    pub min_wait_secs: u64,
    /// Look-back for matching `Distributed` events; `None` disables it.
    pub cross_check_window_secs: Option<u64>,
}

/// Why a recipient was not requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Requested less than `min_wait_secs` ago.
    RecentlyRequested {
        /// Time of the earlier request
        last_requested: u64,
    },
    /// A matching transfer executed inside the cross-check window.
    RecentlyDistributed {
        /// Time of the transfer
        at: u64,
    },
    /// Zero amount in the list.
    ZeroAmount,
}

/// Outcome of one batch run.
#[derive(Debug, Default)]
pub struct DistributionReport {
    /// Recipients for which a `Distribute` request was created.
    pub requested: Vec<(String, OperationId)>,
    /// Recipients left out, with the reason.
    pub skipped: Vec<(String, SkipReason)>,
    /// Recipients whose request was rejected.
    pub failed: Vec<(String, AuthorityError)>,
}

/// Turns a recipient list into `Distribute` requests.
pub struct BatchDistributor<'a, A: MultisigAuthorityApi + ?Sized> {
    api: &'a A,
    settings: DistributionSettings,
    record: DistributionRecord,
}

impl<'a, A: MultisigAuthorityApi + ?Sized> BatchDistributor<'a, A> {
    /// Create a driver over `api` with a previously saved record.
    pub fn new(api: &'a A, settings: DistributionSettings, record: DistributionRecord) -> Self {
        Self {
            api,
            settings,
            record,
        }
    }

    /// Record after the runs so far.
    pub fn record(&self) -> &DistributionRecord {
        &self.record
    }

    /// Consume the driver, returning its record for saving.
    pub fn into_record(self) -> DistributionRecord {
        self.record
    }

    /// Request a `Distribute` for every recipient that is due at `now`.
    pub fn run(
        &mut self,
        recipients: &[Recipient],
        now: u64,
    ) -> Result<DistributionReport, DistributionError> {
        let transfers = match self.settings.cross_check_window_secs {
            Some(window) => self.recent_transfers(now.saturating_sub(window))?,
            None => Vec::new(),
        };
        let mut report = DistributionReport::default();

        for recipient in recipients {
            let amount = U256::from(recipient.amount);
            if let Some(reason) = self.skip_reason(recipient, amount, now, &transfers) {
                info!("[qc-18] Skipping {}: {:?}", recipient.name, reason);
                report.skipped.push((recipient.name.clone(), reason));
                continue;
            }

            let request = OperationRequest::distribute(recipient.identity, amount);
            match self.api.request_operation(self.settings.requester, request) {
                Ok(id) => {
                    info!(
                        "[qc-18] Requested distribution of {} to {} ({})",
                        amount,
                        recipient.name,
                        id.short()
                    );
                    self.record.record(
                        recipient.identity,
                        RecordEntry {
                            last_requested: now,
                            operation_id: id,
                        },
                    );
                    report.requested.push((recipient.name.clone(), id));
                }
                Err(e) => {
                    warn!("[qc-18] Distribution to {} failed: {}", recipient.name, e);
                    report.failed.push((recipient.name.clone(), e));
                }
            }
        }

        info!(
            "[qc-18] Distribution batch done: {} requested, {} skipped, {} failed",
            report.requested.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }

    fn skip_reason(
        &self,
        recipient: &Recipient,
        amount: U256,
        now: u64,
        transfers: &[(Identity, U256, u64)],
    ) -> Option<SkipReason> {
        if amount.is_zero() {
            return Some(SkipReason::ZeroAmount);
        }
        if let Some(entry) = self.record.get(&recipient.identity) {
            if now < entry.last_requested.saturating_add(self.settings.min_wait_secs) {
                return Some(SkipReason::RecentlyRequested {
                    last_requested: entry.last_requested,
                });
            }
        }
        transfers
            .iter()
            .rev()
            .find(|(to, value, _)| *to == recipient.identity && *value == amount)
            .map(|(_, _, at)| SkipReason::RecentlyDistributed { at: *at })
    }

    /// `(recipient, amount, time)` of every `Distributed` event at or after `since`.
    fn recent_transfers(&self, since: u64) -> Result<Vec<(Identity, U256, u64)>, AuthorityError> {
        Ok(self
            .api
            .events_since(0)?
            .into_iter()
            .filter(|record| record.timestamp >= since)
            .filter_map(|record| match record.event {
                AuthorityEvent::Distributed { to, amount, .. } => {
                    Some((to, amount, record.timestamp))
                }
                _ => None,
            })
            .collect())
    }
}
