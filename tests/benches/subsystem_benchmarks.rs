//! # Quantum-Chain Subsystem Benchmarks
//!
//! | Subsystem | Path | Target |
//! |-----------|------|--------|
//! | qc-18 Multi-Signer Authority | Signer recovery | < 1ms |
//! | qc-18 Multi-Signer Authority | Operation id derivation | < 50μs |
//! | qc-18 Multi-Signer Authority | Request + 3 approvals + execute | < 5ms |

use criterion::{criterion_group, criterion_main};
use qc_tests::benchmarks::qc_18_authority::{
    bench_approval_round, bench_message_binding, bench_pause_round, bench_signer_recovery,
};

criterion_group!(
    benches,
    bench_signer_recovery,
    bench_message_binding,
    bench_approval_round,
    bench_pause_round
);
criterion_main!(benches);
