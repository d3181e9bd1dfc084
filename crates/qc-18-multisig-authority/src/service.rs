//! # Multi-Signer Authority Service
//!
//! [`AuthorityEngine`] is the single-threaded state machine: it owns the
//! signer set, policy state, operation registry, ledger and event log, and
//! implements request → approve → execute.
//!
//! [`AuthorityService`] wraps the engine for shared use. Calls are
//! serialized; a call made from inside a running dispatch (for example a
//! ledger that calls back into the service) is rejected with
//! `ReentrantExecution`.
//!
//! ## Atomicity
//!
//! Every call either applies completely or not at all. Execution runs the
//! handler against copies of the signer set, policy state and ledger; the
//! copies, the updated operation record and the call's events are committed
//! together only when the handler succeeds.

use crate::algorithms::{MessageBinder, SignatureVerifier};
use crate::config::{AuthorityConfig, ConfigError, SupplyLimits, ThresholdPolicy};
use crate::domain::{
    invariant_bridge_cooldown, invariant_bridge_limit, invariant_non_zero, invariant_supply_cap,
    ApprovalOutcome, ApprovalSignature, AuthorityError, AuthorityEvent, EventLog, EventRecord,
    ExecutionDomain, Hash, Identity, LaunchMode, Operation, OperationId, OperationKind,
    OperationRegistry, OperationRequest, PolicyState, SignerSet,
};
use crate::handlers::{decode_cooldown, decode_new_signer, handler_for, HandlerContext};
use crate::ports::inbound::MultisigAuthorityApi;
use crate::ports::outbound::{TimeSource, TokenLedger};
use parking_lot::{Mutex, ReentrantMutex};
use primitive_types::U256;
use std::cell::RefCell;
use std::sync::Arc;
use tracing::{debug, info, warn};

// =============================================================================
// ENGINE
// =============================================================================

/// Threshold-approval state machine.
pub struct AuthorityEngine<L: TokenLedger + Clone> {
    owner: Identity,
    holding_account: Identity,
    thresholds: ThresholdPolicy,
    approval_window_secs: u64,
    supply: SupplyLimits,
    binder: MessageBinder,
    verifier: SignatureVerifier,
    signers: SignerSet,
    policy: PolicyState,
    registry: OperationRegistry,
    ledger: L,
    events: EventLog,
    time: Arc<dyn TimeSource>,
}

impl<L: TokenLedger + Clone> AuthorityEngine<L> {
    /// Create an engine from a validated configuration.
    pub fn new(
        config: &AuthorityConfig,
        ledger: L,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let signers = config.signer_set()?;

        info!(
            "[qc-18] Authority initialized on {} with {} signers (default threshold {})",
            config.domain,
            signers.len(),
            config.thresholds.default
        );

        Ok(Self {
            owner: config.owner,
            holding_account: config.holding_account,
            thresholds: config.thresholds.clone(),
            approval_window_secs: config.approval_window_secs,
            supply: config.supply.clone(),
            binder: MessageBinder::new(config.domain),
            verifier: SignatureVerifier::new(),
            signers,
            policy: PolicyState::new(config.bridge_max_in_amount, config.bridge_in_cooldown_secs),
            registry: OperationRegistry::new(),
            ledger,
            events: EventLog::new(),
            time,
        })
    }

    // -------------------------------------------------------------------------
    // Operation lifecycle
    // -------------------------------------------------------------------------

    /// Register a new operation.
    pub fn request_operation(
        &mut self,
        requester: Identity,
        request: OperationRequest,
    ) -> Result<OperationId, AuthorityError> {
        let now = self.time.now();

        if !self.signers.contains(&requester) && requester != self.owner {
            return Err(AuthorityError::Unauthorized { caller: requester });
        }
        self.validate_payload(requester, &request)?;

        let nonce = self.registry.next_nonce();
        let id = self.binder.operation_id(
            nonce,
            request.kind,
            &request.target,
            request.value,
            &request.extra,
        );
        let operation = Operation::new(
            id,
            nonce,
            request,
            requester,
            now,
            self.approval_window_secs,
        );
        let event = AuthorityEvent::OperationRequested {
            id,
            kind: operation.kind,
            requester,
            target: operation.target,
            value: operation.value,
            extra: operation.extra.clone(),
            deadline: operation.deadline,
        };
        let kind = operation.kind;
        let deadline = operation.deadline;

        self.registry.insert(operation)?;
        self.events.append(now, event);

        info!(
            "[qc-18] {} requested by {} as {} (deadline {})",
            kind,
            requester,
            id.short(),
            deadline
        );
        Ok(id)
    }

    /// Reject payloads the handler would refuse at execution.
    fn validate_payload(
        &self,
        requester: Identity,
        request: &OperationRequest,
    ) -> Result<(), AuthorityError> {
        match request.kind {
            OperationKind::UpdateSigner => self.validate_signer_update(requester, request),
            OperationKind::Mint if request.value != self.supply.fixed_mint_amount => {
                Err(AuthorityError::InvalidAmount {
                    expected: self.supply.fixed_mint_amount,
                    got: request.value,
                })
            }
            OperationKind::SetBridgeLimits => decode_cooldown(&request.extra).map(|_| ()),
            _ => Ok(()),
        }
    }

    fn validate_signer_update(
        &self,
        requester: Identity,
        request: &OperationRequest,
    ) -> Result<(), AuthorityError> {
        if requester == request.target {
            return Err(AuthorityError::Unauthorized { caller: requester });
        }
        if !self.signers.contains(&request.target) {
            return Err(AuthorityError::SignerNotFound(request.target));
        }
        let new_signer = decode_new_signer(request.value)?;
        if self.signers.contains(&new_signer) {
            return Err(AuthorityError::SignerAlreadyExists(new_signer));
        }
        Ok(())
    }

    /// Accept `signer`'s approval of `id`, executing on threshold.
    pub fn submit_approval(
        &mut self,
        id: &OperationId,
        signer: Identity,
        signature: &ApprovalSignature,
    ) -> Result<ApprovalOutcome, AuthorityError> {
        let now = self.time.now();

        let mut operation = self.registry.get(id)?.clone();
        operation.ensure_open(now)?;
        operation.ensure_not_approved(&signer)?;

        let message = self.binder.message_hash(&operation);
        let approver = self.verifier.verify_approver(&message, signature, signer)?;
        self.ensure_eligible(&operation, approver)?;

        // Approvals from rotated-out signers no longer count.
        let kind = operation.kind;
        let target = operation.target;
        let dropped = operation.retain_approvals(|a| self.is_eligible(kind, &target, a));
        if dropped > 0 {
            debug!(
                "[qc-18] Dropped {} stale approval(s) from {}",
                dropped,
                id.short()
            );
        }

        let required = self.thresholds.required(operation.kind);
        let approvals = operation.record_approval(approver, required)?;

        let mut staged = vec![AuthorityEvent::ApprovalSubmitted {
            id: *id,
            signer: approver,
            count: approvals,
            required,
        }];

        if approvals < required {
            self.registry.commit(operation)?;
            self.events.extend(now, staged);
            debug!(
                "[qc-18] Approval {}/{} for {} from {}",
                approvals,
                required,
                id.short(),
                approver
            );
            return Ok(ApprovalOutcome {
                approvals,
                required,
                executed: false,
            });
        }

        // Threshold reached: execute against staged copies.
        operation.mark_executed()?;
        let mut signers = self.signers.clone();
        let mut policy = self.policy.clone();
        let mut ledger = self.ledger.clone();
        let result = {
            let mut ctx = HandlerContext {
                ledger: &mut ledger,
                signers: &mut signers,
                policy: &mut policy,
                supply: &self.supply,
                holding_account: self.holding_account,
                now,
            };
            handler_for(operation.kind).apply(&operation, &mut ctx)
        };
        let detail = match result {
            Ok(event) => event,
            Err(e) => {
                warn!(
                    "[qc-18] Execution of {} {} failed, rolled back: {}",
                    operation.kind,
                    id.short(),
                    e
                );
                return Err(e);
            }
        };

        staged.push(detail);
        staged.push(AuthorityEvent::OperationExecuted {
            id: *id,
            kind: operation.kind,
        });

        self.registry.commit(operation)?;
        self.signers = signers;
        self.policy = policy;
        self.ledger = ledger;
        self.events.extend(now, staged);

        info!(
            "[qc-18] Executed {} {} with {}/{} approvals",
            kind,
            id.short(),
            approvals,
            required
        );
        Ok(ApprovalOutcome {
            approvals,
            required,
            executed: true,
        })
    }

    fn ensure_eligible(
        &self,
        operation: &Operation,
        approver: Identity,
    ) -> Result<(), AuthorityError> {
        if self.is_eligible(operation.kind, &operation.target, &approver) {
            return Ok(());
        }
        if operation.kind == OperationKind::UpdateSigner {
            return Err(AuthorityError::InvalidApprover { approver });
        }
        Err(AuthorityError::Unauthorized { caller: approver })
    }

    /// Whether `approver` may currently approve an operation of `kind`.
    fn is_eligible(&self, kind: OperationKind, target: &Identity, approver: &Identity) -> bool {
        if kind == OperationKind::UpdateSigner {
            // The replaced signer never approves its own removal.
            let member = self.signers.contains(approver) || *approver == self.owner;
            return member && approver != target;
        }
        self.signers.contains(approver)
    }

    /// Whether the approval window of `id` has closed.
    pub fn is_expired(&self, id: &OperationId) -> Result<bool, AuthorityError> {
        Ok(self.registry.get(id)?.is_expired(self.time.now()))
    }

    // -------------------------------------------------------------------------
    // Bridge entry points
    // -------------------------------------------------------------------------

    fn ensure_domain(&self, domain: ExecutionDomain) -> Result<(), AuthorityError> {
        let expected = self.binder.domain();
        if domain != expected {
            return Err(AuthorityError::DomainMismatch {
                expected,
                got: domain,
            });
        }
        Ok(())
    }

    /// Destroy `amount` from `caller` for release on another domain.
    pub fn bridge_out(
        &mut self,
        caller: Identity,
        amount: U256,
        destination: &str,
        domain: ExecutionDomain,
    ) -> Result<(), AuthorityError> {
        let now = self.time.now();

        self.policy.ensure_mode(LaunchMode::PostLaunch)?;
        self.ensure_domain(domain)?;
        invariant_non_zero(amount)?;
        let balance = self.ledger.balance_of(&caller);
        if balance < amount {
            return Err(AuthorityError::InsufficientBalance {
                account: caller,
                balance,
                required: amount,
            });
        }

        let mut ledger = self.ledger.clone();
        ledger.burn(&caller, amount)?;
        self.ledger = ledger;
        self.events.append(
            now,
            AuthorityEvent::BridgedOut {
                from: caller,
                amount,
                destination: destination.to_string(),
                domain,
            },
        );

        info!("[qc-18] Bridged out {} from {} to {}", amount, caller, destination);
        Ok(())
    }

    /// Create `amount` for `to` on behalf of the configured bridge caller.
    pub fn bridge_in(
        &mut self,
        caller: Identity,
        to: Identity,
        amount: U256,
        domain: ExecutionDomain,
        external_tx_id: Hash,
    ) -> Result<(), AuthorityError> {
        let now = self.time.now();

        if self.policy.bridge.in_caller != Some(caller) {
            return Err(AuthorityError::Unauthorized { caller });
        }
        self.policy.ensure_mode(LaunchMode::PostLaunch)?;
        self.ensure_domain(domain)?;
        if to.is_zero() {
            return Err(AuthorityError::InvalidIdentity);
        }
        invariant_non_zero(amount)?;
        invariant_bridge_limit(amount, self.policy.bridge.max_in_amount)?;
        invariant_bridge_cooldown(
            self.policy.bridge.last_in_time,
            self.policy.bridge.in_cooldown_secs,
            now,
        )?;
        if self.policy.is_bridge_transfer_processed(&external_tx_id) {
            return Err(AuthorityError::BridgeTransferReplayed(external_tx_id));
        }
        invariant_supply_cap(self.ledger.total_supply(), amount, self.supply.max_supply)?;

        let mut ledger = self.ledger.clone();
        let mut policy = self.policy.clone();
        ledger.mint(&to, amount)?;
        policy.record_bridge_transfer(external_tx_id)?;
        policy.bridge.last_in_time = now;

        self.ledger = ledger;
        self.policy = policy;
        self.events.append(
            now,
            AuthorityEvent::BridgedIn {
                to,
                amount,
                domain,
                external_tx_id,
            },
        );

        info!(
            "[qc-18] Bridged in {} to {} (external tx 0x{})",
            amount,
            to,
            hex::encode(&external_tx_id[..4])
        );
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Look up an operation.
    pub fn operation(&self, id: &OperationId) -> Result<&Operation, AuthorityError> {
        self.registry.get(id)
    }

    /// Every operation in request order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.registry.iter()
    }

    /// The hash a signer must sign to approve `id`.
    pub fn message_to_sign(&self, id: &OperationId) -> Result<Hash, AuthorityError> {
        Ok(self.binder.message_hash(self.registry.get(id)?))
    }

    /// Message binder for this engine's domain.
    pub fn binder(&self) -> &MessageBinder {
        &self.binder
    }

    /// Current signer set.
    pub fn signers(&self) -> &SignerSet {
        &self.signers
    }

    /// Current policy state.
    pub fn policy(&self) -> &PolicyState {
        &self.policy
    }

    /// Event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Ledger collaborator.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Administrative owner.
    pub fn owner(&self) -> Identity {
        self.owner
    }

    /// Engine-controlled holding account.
    pub fn holding_account(&self) -> Identity {
        self.holding_account
    }

    /// Approvals needed to execute an operation of `kind`.
    pub fn approvals_required(&self, kind: OperationKind) -> usize {
        self.thresholds.required(kind)
    }
}

// =============================================================================
// SERVICE
// =============================================================================

/// Call counters for the service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Operations registered.
    pub operations_requested: u64,
    /// Approvals accepted.
    pub approvals_accepted: u64,
    /// Operations executed.
    pub operations_executed: u64,
    /// Bridge-out and bridge-in calls that succeeded.
    pub bridge_transfers: u64,
    /// Mutating calls that failed.
    pub rejected_calls: u64,
}

/// Thread-safe, re-entrancy-guarded facade over [`AuthorityEngine`].
pub struct AuthorityService<L: TokenLedger + Clone> {
    engine: ReentrantMutex<RefCell<AuthorityEngine<L>>>,
    thresholds: ThresholdPolicy,
    stats: Mutex<ServiceStats>,
}

impl<L: TokenLedger + Clone> AuthorityService<L> {
    /// Create a service from a validated configuration.
    pub fn new(
        config: &AuthorityConfig,
        ledger: L,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        let engine = AuthorityEngine::new(config, ledger, time)?;
        Ok(Self {
            engine: ReentrantMutex::new(RefCell::new(engine)),
            thresholds: config.thresholds.clone(),
            stats: Mutex::new(ServiceStats::default()),
        })
    }

    /// Current call counters.
    pub fn stats(&self) -> ServiceStats {
        self.stats.lock().clone()
    }

    /// Run a mutating call with exclusive access to the engine.
    fn mutate<R>(
        &self,
        f: impl FnOnce(&mut AuthorityEngine<L>) -> Result<R, AuthorityError>,
    ) -> Result<R, AuthorityError> {
        let result = {
            let guard = self.engine.lock();
            let outcome = match guard.try_borrow_mut() {
                Ok(mut engine) => f(&mut engine),
                Err(_) => {
                    warn!("[qc-18] Re-entrant call rejected");
                    Err(AuthorityError::ReentrantExecution)
                }
            };
            outcome
        };
        if result.is_err() {
            self.stats.lock().rejected_calls += 1;
        }
        result
    }

    /// Run a read with shared access to the engine.
    pub fn read<R>(&self, f: impl FnOnce(&AuthorityEngine<L>) -> R) -> Result<R, AuthorityError> {
        let guard = self.engine.lock();
        let engine = guard
            .try_borrow()
            .map_err(|_| AuthorityError::ReentrantExecution)?;
        Ok(f(&engine))
    }
}

impl<L: TokenLedger + Clone> MultisigAuthorityApi for AuthorityService<L> {
    fn request_operation(
        &self,
        requester: Identity,
        request: OperationRequest,
    ) -> Result<OperationId, AuthorityError> {
        let id = self.mutate(|engine| engine.request_operation(requester, request))?;
        self.stats.lock().operations_requested += 1;
        Ok(id)
    }

    fn submit_approval(
        &self,
        id: &OperationId,
        signer: Identity,
        signature: &ApprovalSignature,
    ) -> Result<ApprovalOutcome, AuthorityError> {
        let outcome = self
            .mutate(|engine| engine.submit_approval(id, signer, signature))
            .inspect_err(|e| {
                warn!(
                    "[qc-18] Approval of {} by {} rejected: {}",
                    id.short(),
                    signer,
                    e
                )
            })?;
        let mut stats = self.stats.lock();
        stats.approvals_accepted += 1;
        if outcome.executed {
            stats.operations_executed += 1;
        }
        Ok(outcome)
    }

    fn is_expired(&self, id: &OperationId) -> Result<bool, AuthorityError> {
        self.read(|engine| engine.is_expired(id))?
    }

    fn bridge_out(
        &self,
        caller: Identity,
        amount: U256,
        destination: &str,
        domain: ExecutionDomain,
    ) -> Result<(), AuthorityError> {
        self.mutate(|engine| engine.bridge_out(caller, amount, destination, domain))?;
        self.stats.lock().bridge_transfers += 1;
        Ok(())
    }

    fn bridge_in(
        &self,
        caller: Identity,
        to: Identity,
        amount: U256,
        domain: ExecutionDomain,
        external_tx_id: Hash,
    ) -> Result<(), AuthorityError> {
        self.mutate(|engine| engine.bridge_in(caller, to, amount, domain, external_tx_id))?;
        self.stats.lock().bridge_transfers += 1;
        Ok(())
    }

    fn operation(&self, id: &OperationId) -> Result<Operation, AuthorityError> {
        self.read(|engine| engine.operation(id).cloned())?
    }

    fn operations(&self) -> Result<Vec<Operation>, AuthorityError> {
        self.read(|engine| engine.operations().cloned().collect())
    }

    fn message_to_sign(&self, id: &OperationId) -> Result<Hash, AuthorityError> {
        self.read(|engine| engine.message_to_sign(id))?
    }

    fn signers(&self) -> Result<Vec<Identity>, AuthorityError> {
        self.read(|engine| engine.signers().as_slice().to_vec())
    }

    fn policy(&self) -> Result<PolicyState, AuthorityError> {
        self.read(|engine| engine.policy().clone())
    }

    fn events_since(&self, from: u64) -> Result<Vec<EventRecord>, AuthorityError> {
        self.read(|engine| engine.events().since(from).to_vec())
    }

    fn balance_of(&self, account: &Identity) -> Result<U256, AuthorityError> {
        self.read(|engine| engine.ledger().balance_of(account))
    }

    fn total_supply(&self) -> Result<U256, AuthorityError> {
        self.read(|engine| engine.ledger().total_supply())
    }

    fn is_paused(&self) -> Result<bool, AuthorityError> {
        self.read(|engine| engine.ledger().is_paused())
    }

    fn approvals_required(&self, kind: OperationKind) -> usize {
        self.thresholds.required(kind)
    }
}
