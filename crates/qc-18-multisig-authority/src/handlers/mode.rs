//! Launch mode switch and the ledger's transfer gate.

use super::{HandlerContext, PolicyHandler};
use crate::domain::{AuthorityError, AuthorityEvent, LaunchMode, Operation, OperationKind};
use tracing::{info, warn};

/// One-way switch from pre-launch to post-launch.
pub struct SwitchToPostLaunchHandler;

impl PolicyHandler for SwitchToPostLaunchHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::SwitchToPostLaunch
    }

    fn apply(
        &self,
        operation: &Operation,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<AuthorityEvent, AuthorityError> {
        if !ctx.policy.is_pre_launch() {
            return Err(AuthorityError::AlreadyPostLaunch);
        }
        let from = ctx.policy.mode;
        ctx.policy.mode = LaunchMode::PostLaunch;

        info!("[qc-18] Launch mode switched: {} -> {}", from, ctx.policy.mode);
        Ok(AuthorityEvent::ModeChanged {
            id: operation.id,
            from,
            to: ctx.policy.mode,
        })
    }
}

/// Closes or reopens the ledger's transfer gate.
///
/// Toggling into the current state is rejected by the ledger.
pub struct PauseToggleHandler {
    /// Target gate state.
    pub pause: bool,
}

impl PolicyHandler for PauseToggleHandler {
    fn kind(&self) -> OperationKind {
        if self.pause {
            OperationKind::Pause
        } else {
            OperationKind::Unpause
        }
    }

    fn apply(
        &self,
        operation: &Operation,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<AuthorityEvent, AuthorityError> {
        ctx.ledger.set_paused(self.pause)?;
        if self.pause {
            warn!("[qc-18] Ledger paused by operation {}", operation.id.short());
        } else {
            info!("[qc-18] Ledger unpaused by operation {}", operation.id.short());
        }
        Ok(AuthorityEvent::PauseChanged {
            id: operation.id,
            paused: self.pause,
        })
    }
}
