//! # Signer Rotation
//!
//! `UpdateSigner` at threshold 3 (needs the owner, since the replaced
//! signer may not approve) and at threshold 2. A replaced signer's
//! approvals on still-pending operations stop counting.

#[cfg(test)]
mod tests {
    use crate::fixtures::{Authority, HOLDING, START};
    use qc_18_multisig_authority::{
        ApprovalKey, AuthorityConfig, AuthorityError, AuthorityEvent, AuthorityService,
        ConfigError, Identity, InMemoryTokenLedger, ManualTimeSource, MultisigAuthorityApi,
        OperationKind, OperationRequest, ThresholdPolicy,
    };
    use std::sync::Arc;

    #[test]
    fn test_rotation_at_threshold_three_needs_owner() {
        let auth = Authority::new();
        let fresh = ApprovalKey::generate();
        let (s0, s1, s2) = (auth.signer(0), auth.signer(1), auth.signer(2));

        let id = auth
            .request(OperationRequest::update_signer(s2, fresh.identity()))
            .unwrap();
        assert_eq!(auth.service.approvals_required(OperationKind::UpdateSigner), 3);

        assert_eq!(
            auth.approve(&id, 2),
            Err(AuthorityError::InvalidApprover { approver: s2 })
        );
        auth.approve(&id, 0).unwrap();
        auth.approve(&id, 1).unwrap();
        let outcome = auth.approve_with(&id, &auth.owner).unwrap();
        assert!(outcome.executed);

        assert_eq!(auth.service.signers().unwrap(), vec![s0, s1, fresh.identity()]);
        let rotated = auth
            .service
            .events_since(0)
            .unwrap()
            .into_iter()
            .find_map(|r| match r.event {
                AuthorityEvent::SignerUpdated { old, new, slot, .. } => Some((old, new, slot)),
                _ => None,
            });
        assert_eq!(rotated, Some((s2, fresh.identity(), 2)));
    }

    #[test]
    fn test_rotated_signers_take_effect() {
        let auth = Authority::new();
        let fresh = ApprovalKey::generate();
        let id = auth
            .request(OperationRequest::update_signer(auth.signer(2), fresh.identity()))
            .unwrap();
        auth.approve(&id, 0).unwrap();
        auth.approve(&id, 1).unwrap();
        auth.approve_with(&id, &auth.owner).unwrap();

        let pause = auth.request(OperationRequest::bare(OperationKind::Pause)).unwrap();
        assert_eq!(
            auth.approve(&pause, 2),
            Err(AuthorityError::Unauthorized {
                caller: auth.signer(2)
            })
        );
        assert_eq!(
            auth.service
                .request_operation(auth.signer(2), OperationRequest::bare(OperationKind::Pause)),
            Err(AuthorityError::Unauthorized {
                caller: auth.signer(2)
            })
        );
        auth.approve(&pause, 0).unwrap();
        auth.approve(&pause, 1).unwrap();
        assert!(auth.approve_with(&pause, &fresh).unwrap().executed);
    }

    #[test]
    fn test_replaced_signer_pending_approval_revoked() {
        let auth = Authority::new();
        let fresh = ApprovalKey::generate();
        let (s0, s1, s2) = (auth.signer(0), auth.signer(1), auth.signer(2));

        let pause = auth.request(OperationRequest::bare(OperationKind::Pause)).unwrap();
        auth.approve(&pause, 2).unwrap();

        let id = auth
            .request(OperationRequest::update_signer(s2, fresh.identity()))
            .unwrap();
        auth.approve(&id, 0).unwrap();
        auth.approve(&id, 1).unwrap();
        assert!(auth.approve_with(&id, &auth.owner).unwrap().executed);

        let outcome = auth.approve(&pause, 0).unwrap();
        assert_eq!(outcome.approvals, 1);
        let outcome = auth.approve(&pause, 1).unwrap();
        assert_eq!(outcome.approvals, 2);
        assert!(!outcome.executed);
        assert!(!auth.service.is_paused().unwrap());

        let op = auth.service.operation(&pause).unwrap();
        assert_eq!(op.approvals(), &[s0, s1]);

        let outcome = auth.approve_with(&pause, &fresh).unwrap();
        assert!(outcome.executed);
        assert!(auth.service.is_paused().unwrap());
        assert_eq!(
            auth.service.operation(&pause).unwrap().approvals(),
            &[s0, s1, fresh.identity()]
        );
    }

    #[test]
    fn test_rotation_at_threshold_two() {
        let auth = Authority::with_config(|c| {
            c.with_thresholds(ThresholdPolicy::uniform(3).with_override(OperationKind::UpdateSigner, 2))
        });
        let fresh = Identity::new([0x77; 20]);
        let id = auth
            .request(OperationRequest::update_signer(auth.signer(1), fresh))
            .unwrap();
        auth.approve(&id, 0).unwrap();
        let outcome = auth.approve(&id, 2).unwrap();
        assert!(outcome.executed);
        assert_eq!(outcome.required, 2);
        assert_eq!(
            auth.service.signers().unwrap(),
            vec![auth.signer(0), fresh, auth.signer(2)]
        );
    }

    #[test]
    fn test_conflicting_rotations() {
        let auth = Authority::new();
        let target = auth.signer(2);
        let first = auth
            .request(OperationRequest::update_signer(target, Identity::new([0x71; 20])))
            .unwrap();
        let second = auth
            .request(OperationRequest::update_signer(target, Identity::new([0x72; 20])))
            .unwrap();

        for id in [&first, &second] {
            auth.approve(id, 0).unwrap();
            auth.approve(id, 1).unwrap();
        }
        assert!(auth.approve_with(&first, &auth.owner).unwrap().executed);
        assert_eq!(
            auth.approve_with(&second, &auth.owner),
            Err(AuthorityError::SignerNotFound(target))
        );
        assert!(!auth.service.operation(&second).unwrap().is_executed());
    }

    #[test]
    fn test_rotation_request_rules() {
        let auth = Authority::new();
        assert_eq!(
            auth.service.request_operation(
                auth.signer(1),
                OperationRequest::update_signer(auth.signer(1), Identity::new([0x70; 20]))
            ),
            Err(AuthorityError::Unauthorized {
                caller: auth.signer(1)
            })
        );
        assert_eq!(
            auth.request(OperationRequest::update_signer(auth.signer(1), Identity::ZERO)),
            Err(AuthorityError::InvalidIdentity)
        );
        assert_eq!(
            auth.request(OperationRequest::update_signer(auth.signer(1), auth.signer(2))),
            Err(AuthorityError::SignerAlreadyExists(auth.signer(2)))
        );
        // The owner may request a rotation of any signer.
        auth.service
            .request_operation(
                auth.owner.identity(),
                OperationRequest::update_signer(auth.signer(0), Identity::new([0x70; 20])),
            )
            .unwrap();
    }

    #[test]
    fn test_unreachable_rotation_threshold_rejected() {
        // Owner doubles as a signer: only two identities can approve a rotation.
        let keys: Vec<ApprovalKey> = (0..3).map(|_| ApprovalKey::generate()).collect();
        let config = AuthorityConfig::new(
            keys[0].identity(),
            HOLDING,
            keys.iter().map(|k| k.identity()).collect(),
        );
        let clock = Arc::new(ManualTimeSource::new(START));
        let result = AuthorityService::new(&config, InMemoryTokenLedger::new(), clock);
        assert!(matches!(
            result,
            Err(ConfigError::ThresholdUnreachable {
                kind: OperationKind::UpdateSigner,
                required: 3,
                available: 2,
            })
        ));
    }
}
