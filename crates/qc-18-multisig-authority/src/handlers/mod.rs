//! # Policy Handlers
//!
//! Per-kind business rules run once an operation reaches its threshold.
//!
//! Each handler mutates exactly one area of state through the
//! [`HandlerContext`] and returns a detail event with the before/after values
//! an auditor needs. Handlers see staged copies of the state: if one fails,
//! nothing it touched is kept.

mod bridge;
mod mode;
mod signers;
mod supply;

pub use bridge::{decode_cooldown, SetBridgeCallerHandler, SetBridgeLimitsHandler};
pub use mode::{PauseToggleHandler, SwitchToPostLaunchHandler};
pub use signers::{decode_new_signer, UpdateSignerHandler};
pub use supply::{BurnHandler, DistributeHandler, MintHandler};

use crate::config::SupplyLimits;
use crate::domain::{
    AuthorityError, AuthorityEvent, Identity, Operation, OperationKind, PolicyState, SignerSet,
};
use crate::ports::outbound::TokenLedger;

/// Mutable state a handler may touch, plus the call's clock reading.
pub struct HandlerContext<'a> {
    /// Ledger collaborator (staged copy).
    pub ledger: &'a mut dyn TokenLedger,
    /// Signer set (staged copy).
    pub signers: &'a mut SignerSet,
    /// Policy state (staged copy).
    pub policy: &'a mut PolicyState,
    /// Supply rules.
    pub supply: &'a SupplyLimits,
    /// Engine-controlled account receiving minted supply.
    pub holding_account: Identity,
    /// Time of the approval that triggered execution.
    pub now: u64,
}

/// Business rule for one operation kind.
pub trait PolicyHandler: Send + Sync {
    /// Kind this handler executes.
    fn kind(&self) -> OperationKind;

    /// Apply `operation` and return its detail event.
    fn apply(
        &self,
        operation: &Operation,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<AuthorityEvent, AuthorityError>;
}

static MINT: MintHandler = MintHandler;
static BURN: BurnHandler = BurnHandler;
static DISTRIBUTE: DistributeHandler = DistributeHandler;
static SWITCH_TO_POST_LAUNCH: SwitchToPostLaunchHandler = SwitchToPostLaunchHandler;
static PAUSE: PauseToggleHandler = PauseToggleHandler { pause: true };
static UNPAUSE: PauseToggleHandler = PauseToggleHandler { pause: false };
static SET_BRIDGE_CALLER: SetBridgeCallerHandler = SetBridgeCallerHandler;
static SET_BRIDGE_LIMITS: SetBridgeLimitsHandler = SetBridgeLimitsHandler;
static UPDATE_SIGNER: UpdateSignerHandler = UpdateSignerHandler;

/// The handler for `kind`.
pub fn handler_for(kind: OperationKind) -> &'static dyn PolicyHandler {
    match kind {
        OperationKind::Mint => &MINT,
        OperationKind::Burn => &BURN,
        OperationKind::Distribute => &DISTRIBUTE,
        OperationKind::SwitchToPostLaunch => &SWITCH_TO_POST_LAUNCH,
        OperationKind::Pause => &PAUSE,
        OperationKind::Unpause => &UNPAUSE,
        OperationKind::SetBridgeCaller => &SET_BRIDGE_CALLER,
        OperationKind::SetBridgeLimits => &SET_BRIDGE_LIMITS,
        OperationKind::UpdateSigner => &UPDATE_SIGNER,
    }
}
