//! # QC-18 Multi-Signer Authority Benchmarks
//!
//! Hot paths of the approval protocol:
//! - Signer recovery from an approval signature
//! - Operation id derivation and message binding
//! - Full request → 3 approvals → execute round

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use primitive_types::U256;
use qc_18_multisig_authority::{
    ApprovalKey, AuthorityConfig, AuthorityService, ExecutionDomain, Identity,
    InMemoryTokenLedger, ManualTimeSource, MessageBinder, MultisigAuthorityApi, OperationKind,
    OperationRequest, SignatureVerifier,
};
use std::sync::Arc;
use std::time::Duration;

fn authority(keys: &[ApprovalKey]) -> AuthorityService<InMemoryTokenLedger> {
    let config = AuthorityConfig::new(
        Identity::new([0xA0; 20]),
        Identity::new([0xB0; 20]),
        keys.iter().map(|k| k.identity()).collect(),
    );
    let clock = Arc::new(ManualTimeSource::new(1_700_000_000));
    AuthorityService::new(&config, InMemoryTokenLedger::new(), clock)
        .expect("valid benchmark config")
}

pub fn bench_signer_recovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18/signer_recovery");
    group.measurement_time(Duration::from_secs(10));

    let key = ApprovalKey::generate();
    let verifier = SignatureVerifier::new();
    let hash = [0x5Au8; 32];
    let signature = key.sign_hash(&hash).expect("sign");

    group.bench_function("verify_approver", |b| {
        b.iter(|| black_box(verifier.verify_approver(&hash, &signature, key.identity())))
    });

    group.finish();
}

pub fn bench_message_binding(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18/message_binding");
    let binder = MessageBinder::new(ExecutionDomain(1));

    for extra_len in [0usize, 32, 1024] {
        let extra = vec![0xEEu8; extra_len];
        group.throughput(Throughput::Bytes(extra_len as u64));
        group.bench_with_input(
            BenchmarkId::new("operation_id", extra_len),
            &extra,
            |b, extra| {
                b.iter(|| {
                    black_box(binder.operation_id(
                        7,
                        OperationKind::SetBridgeLimits,
                        &Identity::new([1u8; 20]),
                        U256::from(1_000),
                        extra,
                    ))
                })
            },
        );
    }

    group.finish();
}

pub fn bench_approval_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18/approval_round");
    group.measurement_time(Duration::from_secs(10));

    let keys: Vec<ApprovalKey> = (0..3).map(|_| ApprovalKey::generate()).collect();
    let service = authority(&keys);

    group.bench_function("request_and_execute_distribute", |b| {
        b.iter(|| {
            // Distribute fails at execution with empty holdings; the round
            // still exercises request, three recoveries and a rolled-back dispatch.
            let id = service
                .request_operation(
                    keys[0].identity(),
                    OperationRequest::distribute(Identity::new([2u8; 20]), U256::one()),
                )
                .expect("request");
            let hash = service.message_to_sign(&id).expect("message");
            for key in &keys {
                let signature = key.sign_hash(&hash).expect("sign");
                let _ = black_box(service.submit_approval(&id, key.identity(), &signature));
            }
        })
    });

    group.finish();
}

pub fn bench_pause_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18/pause_round");
    let keys: Vec<ApprovalKey> = (0..3).map(|_| ApprovalKey::generate()).collect();

    group.bench_function("pause_unpause", |b| {
        let service = authority(&keys);
        let mut pause = true;
        b.iter(|| {
            let kind = if pause {
                OperationKind::Pause
            } else {
                OperationKind::Unpause
            };
            let id = service
                .request_operation(keys[0].identity(), OperationRequest::bare(kind))
                .expect("request");
            let hash = service.message_to_sign(&id).expect("message");
            for key in &keys {
                let signature = key.sign_hash(&hash).expect("sign");
                black_box(
                    service
                        .submit_approval(&id, key.identity(), &signature)
                        .expect("approve"),
                );
            }
            pause = !pause;
        })
    });

    group.finish();
}
