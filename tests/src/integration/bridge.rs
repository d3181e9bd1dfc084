//! # Bridge Transfers
//!
//! Bridge-out / bridge-in gating: launch mode, domain, caller, limits,
//! cooldown, external transaction id replay and the supply cap.

#[cfg(test)]
mod tests {
    use crate::fixtures::{Authority, HOLDING};
    use primitive_types::U256;
    use qc_18_multisig_authority::{
        AuthorityError, AuthorityEvent, ErrorClass, ExecutionDomain, Identity, LaunchMode,
        MultisigAuthorityApi, OperationRequest, SupplyLimits,
    };

    const RELAY: Identity = Identity::new([0x5E; 20]);
    const USER: Identity = Identity::new([0x33; 20]);
    const DOMAIN: ExecutionDomain = ExecutionDomain(1);

    fn tx(b: u8) -> [u8; 32] {
        [b; 32]
    }

    /// Launched authority with a configured relay and a funded user.
    fn launched() -> Authority {
        let auth = Authority::new();
        auth.mint_default().unwrap();
        auth.execute(OperationRequest::distribute(USER, U256::from(10_000)))
            .unwrap();
        auth.launch().unwrap();
        auth.execute(OperationRequest::set_bridge_caller(RELAY))
            .unwrap();
        auth
    }

    #[test]
    fn test_bridge_closed_before_launch() {
        let auth = Authority::new();
        auth.execute(OperationRequest::set_bridge_caller(RELAY))
            .unwrap();
        let err = auth
            .service
            .bridge_in(RELAY, USER, U256::from(1), DOMAIN, tx(1))
            .unwrap_err();
        assert_eq!(
            err,
            AuthorityError::LaunchModeViolation {
                required: LaunchMode::PostLaunch
            }
        );
        assert_eq!(err.class(), ErrorClass::Policy);
        assert!(matches!(
            auth.service.bridge_out(USER, U256::from(1), "dest", DOMAIN),
            Err(AuthorityError::LaunchModeViolation { .. })
        ));
    }

    #[test]
    fn test_bridge_out_burns_and_emits() {
        let auth = launched();
        let supply = auth.service.total_supply().unwrap();
        auth.service
            .bridge_out(USER, U256::from(4_000), "0xdeadbeef", DOMAIN)
            .unwrap();
        assert_eq!(auth.service.balance_of(&USER).unwrap(), U256::from(6_000));
        assert_eq!(
            auth.service.total_supply().unwrap(),
            supply - U256::from(4_000)
        );

        let last = auth.service.events_since(0).unwrap().pop().unwrap();
        assert_eq!(
            last.event,
            AuthorityEvent::BridgedOut {
                from: USER,
                amount: U256::from(4_000),
                destination: "0xdeadbeef".to_string(),
                domain: DOMAIN,
            }
        );
    }

    #[test]
    fn test_bridge_out_rejections() {
        let auth = launched();
        assert!(matches!(
            auth.service
                .bridge_out(USER, U256::from(1), "dest", ExecutionDomain(2)),
            Err(AuthorityError::DomainMismatch { .. })
        ));
        assert_eq!(
            auth.service.bridge_out(USER, U256::zero(), "dest", DOMAIN),
            Err(AuthorityError::ZeroAmount)
        );
        assert!(matches!(
            auth.service
                .bridge_out(USER, U256::from(10_001), "dest", DOMAIN),
            Err(AuthorityError::InsufficientBalance { .. })
        ));
        assert_eq!(auth.service.balance_of(&USER).unwrap(), U256::from(10_000));
    }

    #[test]
    fn test_bridge_in_caller_and_domain() {
        let auth = launched();
        assert_eq!(
            auth.service
                .bridge_in(USER, USER, U256::from(1), DOMAIN, tx(1)),
            Err(AuthorityError::Unauthorized { caller: USER })
        );
        assert!(matches!(
            auth.service
                .bridge_in(RELAY, USER, U256::from(1), ExecutionDomain(9), tx(1)),
            Err(AuthorityError::DomainMismatch { .. })
        ));
        assert_eq!(
            auth.service
                .bridge_in(RELAY, Identity::ZERO, U256::from(1), DOMAIN, tx(1)),
            Err(AuthorityError::InvalidIdentity)
        );
    }

    #[test]
    fn test_bridge_in_limit_and_cooldown() {
        let auth = launched();
        assert!(matches!(
            auth.service
                .bridge_in(RELAY, USER, U256::from(1_000_001), DOMAIN, tx(1)),
            Err(AuthorityError::LimitExceeded { .. })
        ));

        auth.service
            .bridge_in(RELAY, USER, U256::from(1_000_000), DOMAIN, tx(1))
            .unwrap();
        auth.clock.advance(3_599);
        assert!(matches!(
            auth.service
                .bridge_in(RELAY, USER, U256::from(5), DOMAIN, tx(2)),
            Err(AuthorityError::CooldownActive { .. })
        ));
        auth.clock.advance(1);
        auth.service
            .bridge_in(RELAY, USER, U256::from(5), DOMAIN, tx(2))
            .unwrap();
        assert_eq!(
            auth.service.balance_of(&USER).unwrap(),
            U256::from(1_010_005u64)
        );
    }

    #[test]
    fn test_bridge_in_replay_rejected() {
        let auth = launched();
        auth.service
            .bridge_in(RELAY, USER, U256::from(7), DOMAIN, tx(9))
            .unwrap();
        auth.clock.advance(3_600);
        assert_eq!(
            auth.service
                .bridge_in(RELAY, USER, U256::from(7), DOMAIN, tx(9)),
            Err(AuthorityError::BridgeTransferReplayed(tx(9)))
        );
        assert!(auth
            .service
            .policy()
            .unwrap()
            .is_bridge_transfer_processed(&tx(9)));
    }

    #[test]
    fn test_bridge_limits_updated_by_operation() {
        let auth = launched();
        auth.execute(OperationRequest::set_bridge_limits(U256::from(50), 10))
            .unwrap();
        assert!(matches!(
            auth.service
                .bridge_in(RELAY, USER, U256::from(51), DOMAIN, tx(1)),
            Err(AuthorityError::LimitExceeded { .. })
        ));
        auth.service
            .bridge_in(RELAY, USER, U256::from(50), DOMAIN, tx(1))
            .unwrap();
        auth.clock.advance(10);
        auth.service
            .bridge_in(RELAY, USER, U256::from(50), DOMAIN, tx(2))
            .unwrap();
    }

    #[test]
    fn test_bridge_in_respects_supply_cap() {
        let auth = Authority::with_config(|c| {
            c.with_supply(SupplyLimits {
                fixed_mint_amount: U256::from(3_000_000u64),
                max_supply: U256::from(3_000_100u64),
                mint_interval_secs: 1,
            })
        });
        auth.mint_default().unwrap();
        auth.launch().unwrap();
        auth.execute(OperationRequest::set_bridge_caller(RELAY))
            .unwrap();

        assert!(matches!(
            auth.service
                .bridge_in(RELAY, USER, U256::from(101), DOMAIN, tx(1)),
            Err(AuthorityError::SupplyCapExceeded { .. })
        ));
        auth.service
            .bridge_in(RELAY, USER, U256::from(100), DOMAIN, tx(1))
            .unwrap();
        assert_eq!(
            auth.service.total_supply().unwrap(),
            U256::from(3_000_100u64)
        );
        assert_eq!(
            auth.service.balance_of(&HOLDING).unwrap(),
            U256::from(3_000_000u64)
        );
    }
}
