//! # Cipher-Signal Aggregation Benchmarks
//!
//! Cost of the hot paths per batch round:
//!
//! | Path | Scales with | Target |
//! |------|-------------|--------|
//! | Aggregation | Providers in the batch | < 1ms for 1000 providers |
//! | Commitment | Fixed (one handle) | < 5µs |
//! | Callback verification | Fixed | < 10µs |
//! | Full round through the engine | Providers in the batch | < 10ms for 1000 providers |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use signal_aggregation::{
    aggregate_signals, commit_aggregate, compute_state_hash, encode_cleartext, verify_callback,
    AggregateRecord, AggregationConfig, CiphertextHandle, DecryptionContext, InMemoryConfidentialRuntime, MockDecryptionOracle,
    ProofKey, SignalAggregationApi, SignalAggregationService, MOCK_VALID_PROOF,
};
use shared_bus::InMemoryEventBus;
use shared_types::{Address, CallContext};
use std::sync::Arc;
use std::time::Duration;

const OWNER: Address = [0x01; 20];
const CONTRACT: Address = [0x5a; 20];

fn provider(i: usize) -> Address {
    let mut address = [0x10; 20];
    address[12..20].copy_from_slice(&(i as u64 + 1).to_be_bytes());
    address
}

fn contributions(
    runtime: &InMemoryConfidentialRuntime,
    size: usize,
) -> Vec<(Address, CiphertextHandle)> {
    let mut rng = rand::thread_rng();
    (0..size)
        .map(|i| (provider(i), runtime.encrypt(rng.gen_range(0..1_000_000))))
        .collect()
}

// ============================================================================
// Aggregation
// ============================================================================

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");
    group.measurement_time(Duration::from_secs(5));

    for size in [10, 100, 1_000] {
        let runtime = InMemoryConfidentialRuntime::new();
        let signals = contributions(&runtime, size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("aggregate_signals", size), &signals, |b, signals| {
            b.iter(|| black_box(aggregate_signals(&runtime, 0, signals).is_ok()))
        });
    }

    group.finish();
}

// ============================================================================
// Commitment and callback verification
// ============================================================================

fn bench_commitment(c: &mut Criterion) {
    let handle = CiphertextHandle::new([0xab; 32]);

    c.bench_function("compute_state_hash", |b| {
        b.iter(|| black_box(compute_state_hash(&[handle], 1, &CONTRACT)))
    });
}

fn bench_callback_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("callback_verification");

    let record = AggregateRecord::next(CiphertextHandle::new([0xcd; 32]), None);
    let context = DecryptionContext::new(7, 0, commit_aggregate(&record, &CONTRACT), 3, 0);
    let cleartexts = encode_cleartext(42);

    let oracle = MockDecryptionOracle::new();
    group.bench_function("mock_oracle", |b| {
        b.iter(|| {
            black_box(verify_callback(
                &context,
                Some(&record),
                &CONTRACT,
                &oracle,
                &cleartexts,
                MOCK_VALID_PROOF,
            ))
        })
    });

    let key = ProofKey::generate();
    let proof = key.sign(7, &cleartexts);
    group.bench_function("keyed_proof", |b| {
        b.iter(|| black_box(key.verify(7, &cleartexts, &proof)))
    });

    group.finish();
}

// ============================================================================
// Full round through the engine
// ============================================================================

fn bench_engine_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_round");
    group.sample_size(20);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    for size in [10, 100, 1_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("submit_aggregate_reveal", size), &size, |b, &size| {
            b.iter(|| {
                rt.block_on(async {
                    let runtime = Arc::new(InMemoryConfidentialRuntime::new());
                    let engine = SignalAggregationService::new(
                        AggregationConfig::for_testing(),
                        OWNER,
                        runtime.clone(),
                        Arc::new(MockDecryptionOracle::new()),
                        Arc::new(InMemoryEventBus::new()),
                    )
                    .unwrap();
                    let owner = CallContext::new(OWNER, 0);

                    for i in 0..size {
                        engine.add_provider(owner, provider(i)).await.unwrap();
                    }
                    engine.open_batch(owner).await.unwrap();
                    for i in 0..size {
                        let ctx = CallContext::new(provider(i), 0);
                        engine
                            .submit_signal(ctx, runtime.encrypt(i as u64))
                            .await
                            .unwrap();
                    }
                    let ticket = engine
                        .aggregate_and_request_decryption(owner)
                        .await
                        .unwrap();
                    let sum = (0..size as u64).sum::<u64>();
                    black_box(
                        engine
                            .decryption_callback(
                                ticket.request_id,
                                &encode_cleartext(sum),
                                MOCK_VALID_PROOF,
                            )
                            .await
                            .unwrap(),
                    )
                })
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_aggregation,
    bench_commitment,
    bench_callback_verification,
    bench_engine_round
);
criterion_main!(benches);
