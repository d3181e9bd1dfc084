//! # Re-entrancy
//!
//! A hostile ledger calls back into the authority from inside `mint`, the
//! way a token hook would. Every nested call must be rejected with
//! `ReentrantExecution` while the outer dispatch completes exactly once.

#[cfg(test)]
mod tests {
    use crate::fixtures::{init_tracing, HOLDING, START};
    use parking_lot::Mutex;
    use primitive_types::U256;
    use qc_18_multisig_authority::{
        ApprovalKey, AuthorityConfig, AuthorityError, AuthorityEvent, AuthorityService,
        ExecutionDomain, Identity, InMemoryTokenLedger, LedgerError, ManualTimeSource,
        MultisigAuthorityApi, OperationId, OperationKind, OperationRequest, TokenLedger,
    };
    use std::sync::{Arc, Weak};

    type Hook = Box<dyn FnOnce() + Send>;

    /// Ledger that runs a one-shot callback before every mint.
    #[derive(Clone, Default)]
    struct HookedLedger {
        inner: InMemoryTokenLedger,
        hook: Arc<Mutex<Option<Hook>>>,
    }

    impl HookedLedger {
        fn fire(&self) {
            let hook = self.hook.lock().take();
            if let Some(hook) = hook {
                hook();
            }
        }
    }

    impl TokenLedger for HookedLedger {
        fn mint(&mut self, account: &Identity, amount: U256) -> Result<(), LedgerError> {
            self.fire();
            self.inner.mint(account, amount)
        }

        fn burn(&mut self, account: &Identity, amount: U256) -> Result<(), LedgerError> {
            self.inner.burn(account, amount)
        }

        fn transfer(
            &mut self,
            from: &Identity,
            to: &Identity,
            amount: U256,
        ) -> Result<(), LedgerError> {
            self.inner.transfer(from, to, amount)
        }

        fn balance_of(&self, account: &Identity) -> U256 {
            self.inner.balance_of(account)
        }

        fn total_supply(&self) -> U256 {
            self.inner.total_supply()
        }

        fn set_paused(&mut self, paused: bool) -> Result<(), LedgerError> {
            self.inner.set_paused(paused)
        }

        fn is_paused(&self) -> bool {
            self.inner.is_paused()
        }
    }

    type Service = AuthorityService<HookedLedger>;

    struct Setup {
        service: Arc<Service>,
        hook: Arc<Mutex<Option<Hook>>>,
        clock: Arc<ManualTimeSource>,
        keys: Vec<ApprovalKey>,
    }

    fn setup() -> Setup {
        init_tracing();
        let keys: Vec<ApprovalKey> = (0..3).map(|_| ApprovalKey::generate()).collect();
        let config = AuthorityConfig::new(
            Identity::new([0xA0; 20]),
            HOLDING,
            keys.iter().map(|k| k.identity()).collect(),
        );
        let ledger = HookedLedger::default();
        let hook = ledger.hook.clone();
        let clock = Arc::new(ManualTimeSource::new(START));
        let service = Arc::new(AuthorityService::new(&config, ledger, clock.clone()).unwrap());
        Setup {
            service,
            hook,
            clock,
            keys,
        }
    }

    fn approve(service: &Service, id: &OperationId, key: &ApprovalKey) -> Result<bool, AuthorityError> {
        let hash = service.message_to_sign(id)?;
        let signature = key.sign_hash(&hash)?;
        Ok(service
            .submit_approval(id, key.identity(), &signature)?
            .executed)
    }

    /// Install a hook that runs `call` against the service and stores its result.
    fn arm<R: Send + 'static>(
        setup: &Setup,
        call: impl FnOnce(&Service) -> Result<R, AuthorityError> + Send + 'static,
    ) -> Arc<Mutex<Option<Result<R, AuthorityError>>>> {
        let slot = Arc::new(Mutex::new(None));
        let sink = slot.clone();
        let weak: Weak<Service> = Arc::downgrade(&setup.service);
        *setup.hook.lock() = Some(Box::new(move || {
            if let Some(service) = weak.upgrade() {
                *sink.lock() = Some(call(&service));
            }
        }));
        slot
    }

    fn mint_count(service: &Service) -> usize {
        service
            .events_since(0)
            .unwrap()
            .iter()
            .filter(|r| matches!(r.event, AuthorityEvent::MintExecuted { .. }))
            .count()
    }

    #[test]
    fn test_nested_approval_rejected() {
        let setup = setup();
        let service = &setup.service;
        let requester = setup.keys[0].identity();

        let mint = service
            .request_operation(requester, OperationRequest::mint(U256::from(3_000_000u64)))
            .unwrap();
        let pause = service
            .request_operation(requester, OperationRequest::bare(OperationKind::Pause))
            .unwrap();
        // Signature prepared outside, submitted from inside the mint.
        let hash = service.message_to_sign(&pause).unwrap();
        let signature = setup.keys[2].sign_hash(&hash).unwrap();
        let signer = setup.keys[2].identity();
        let nested = arm(&setup, move |s| s.submit_approval(&pause, signer, &signature));

        approve(service, &mint, &setup.keys[0]).unwrap();
        approve(service, &mint, &setup.keys[1]).unwrap();
        assert!(approve(service, &mint, &setup.keys[2]).unwrap());

        assert_eq!(
            nested.lock().take(),
            Some(Err(AuthorityError::ReentrantExecution))
        );
        assert_eq!(service.operation(&pause).unwrap().approval_count(), 0);
        assert_eq!(mint_count(service), 1);
        assert_eq!(
            service.balance_of(&HOLDING).unwrap(),
            U256::from(3_000_000u64)
        );
    }

    #[test]
    fn test_nested_read_rejected() {
        let setup = setup();
        let service = &setup.service;
        let mint = service
            .request_operation(
                setup.keys[0].identity(),
                OperationRequest::mint(U256::from(3_000_000u64)),
            )
            .unwrap();
        let nested = arm(&setup, |s| s.total_supply());

        for key in &setup.keys {
            approve(service, &mint, key).unwrap();
        }
        assert_eq!(
            nested.lock().take(),
            Some(Err(AuthorityError::ReentrantExecution))
        );
        assert_eq!(service.total_supply().unwrap(), U256::from(3_000_000u64));
    }

    #[test]
    fn test_nested_request_rejected() {
        let setup = setup();
        let service = &setup.service;
        let requester = setup.keys[0].identity();
        let mint = service
            .request_operation(requester, OperationRequest::mint(U256::from(3_000_000u64)))
            .unwrap();
        let nested = arm(&setup, move |s| {
            s.request_operation(requester, OperationRequest::bare(OperationKind::Pause))
        });

        for key in &setup.keys {
            approve(service, &mint, key).unwrap();
        }
        assert_eq!(
            nested.lock().take(),
            Some(Err(AuthorityError::ReentrantExecution))
        );
        assert_eq!(service.operations().unwrap().len(), 1);
    }

    #[test]
    fn test_nested_bridge_in_rejected() {
        let setup = setup();
        let service = &setup.service;
        let relay = Identity::new([0x5E; 20]);
        let user = Identity::new([0x33; 20]);
        let domain = ExecutionDomain(1);

        for request in [
            OperationRequest::bare(OperationKind::SwitchToPostLaunch),
            OperationRequest::set_bridge_caller(relay),
        ] {
            let id = service
                .request_operation(setup.keys[0].identity(), request)
                .unwrap();
            for key in &setup.keys {
                approve(service, &id, key).unwrap();
            }
        }

        // A second bridge-in with a fresh external id, fired from inside the first.
        let nested = arm(&setup, move |s| {
            s.bridge_in(relay, user, U256::from(500), domain, [2u8; 32])
        });
        service
            .bridge_in(relay, user, U256::from(500), domain, [1u8; 32])
            .unwrap();

        assert_eq!(
            nested.lock().take(),
            Some(Err(AuthorityError::ReentrantExecution))
        );
        assert_eq!(service.balance_of(&user).unwrap(), U256::from(500));
        assert!(!service
            .policy()
            .unwrap()
            .is_bridge_transfer_processed(&[2u8; 32]));
    }

    #[test]
    fn test_concurrent_callers_serialized() {
        let setup = setup();
        let service = setup.service.clone();
        let mint = service
            .request_operation(
                setup.keys[0].identity(),
                OperationRequest::mint(U256::from(3_000_000u64)),
            )
            .unwrap();
        let hash = service.message_to_sign(&mint).unwrap();
        let approvals: Vec<_> = setup
            .keys
            .iter()
            .map(|k| (k.identity(), k.sign_hash(&hash).unwrap()))
            .collect();

        let handles: Vec<_> = approvals
            .into_iter()
            .map(|(signer, signature)| {
                let service = service.clone();
                std::thread::spawn(move || service.submit_approval(&mint, signer, &signature))
            })
            .collect();
        let executed = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .filter(|outcome| outcome.executed)
            .count();

        assert_eq!(executed, 1);
        assert_eq!(mint_count(&service), 1);
        assert_eq!(
            service.total_supply().unwrap(),
            U256::from(3_000_000u64)
        );
    }
}
