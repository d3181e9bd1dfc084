//! # Shared Fixtures
//!
//! A three-signer authority over the in-memory ledger, driven by a manual
//! clock, with real secp256k1 keys for every signer and the owner.

use primitive_types::U256;
use qc_18_multisig_authority::{
    ApprovalKey, ApprovalOutcome, AuthorityConfig, AuthorityError, AuthorityService,
    Identity, InMemoryTokenLedger, ManualTimeSource, MultisigAuthorityApi, OperationId,
    OperationKind, OperationRequest,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Clock start for every fixture.
pub const START: u64 = 1_700_000_000;

/// Holding account used by every fixture.
pub const HOLDING: Identity = Identity::new([0xB0; 20]);

/// Route `tracing` output to the test writer (`RUST_LOG=debug` to see it).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Authority under test.
pub struct Authority {
    pub service: Arc<AuthorityService<InMemoryTokenLedger>>,
    pub clock: Arc<ManualTimeSource>,
    pub signers: Vec<ApprovalKey>,
    pub owner: ApprovalKey,
}

impl Authority {
    /// Default configuration: three signers, threshold 3 for every kind.
    pub fn new() -> Self {
        Self::with_config(|c| c)
    }

    /// Default configuration adjusted by `adjust`.
    pub fn with_config(adjust: impl FnOnce(AuthorityConfig) -> AuthorityConfig) -> Self {
        init_tracing();
        let signers: Vec<ApprovalKey> = (0..3).map(|_| ApprovalKey::generate()).collect();
        let owner = ApprovalKey::generate();
        let config = adjust(AuthorityConfig::new(
            owner.identity(),
            HOLDING,
            signers.iter().map(|k| k.identity()).collect(),
        ));
        let clock = Arc::new(ManualTimeSource::new(START));
        let service = AuthorityService::new(&config, InMemoryTokenLedger::new(), clock.clone())
            .expect("valid fixture config");
        Self {
            service: Arc::new(service),
            clock,
            signers,
            owner,
        }
    }

    /// Identity of signer `i`.
    pub fn signer(&self, i: usize) -> Identity {
        self.signers[i].identity()
    }

    /// Request `request` as signer 0.
    pub fn request(&self, request: OperationRequest) -> Result<OperationId, AuthorityError> {
        self.service.request_operation(self.signer(0), request)
    }

    /// Sign the current message for `id` with `key` and submit it.
    pub fn approve_with(
        &self,
        id: &OperationId,
        key: &ApprovalKey,
    ) -> Result<ApprovalOutcome, AuthorityError> {
        let hash = self.service.message_to_sign(id)?;
        let signature = key.sign_hash(&hash)?;
        self.service.submit_approval(id, key.identity(), &signature)
    }

    /// Approve `id` as signer `i`.
    pub fn approve(&self, id: &OperationId, i: usize) -> Result<ApprovalOutcome, AuthorityError> {
        self.approve_with(id, &self.signers[i])
    }

    /// Request `request` and approve it with every signer.
    pub fn execute(&self, request: OperationRequest) -> Result<OperationId, AuthorityError> {
        let id = self.request(request)?;
        for i in 0..self.signers.len() {
            self.approve(&id, i)?;
        }
        Ok(id)
    }

    /// Mint the default fixed amount into the holding account.
    pub fn mint_default(&self) -> Result<OperationId, AuthorityError> {
        self.execute(OperationRequest::mint(U256::from(3_000_000u64)))
    }

    /// Switch to post-launch.
    pub fn launch(&self) -> Result<OperationId, AuthorityError> {
        self.execute(OperationRequest::bare(OperationKind::SwitchToPostLaunch))
    }
}

impl Default for Authority {
    fn default() -> Self {
        Self::new()
    }
}
