//! # Oracle Pipeline Tests
//!
//! Exercises the asynchronous half of a round with the real adapters:
//!
//! ```text
//! Engine ──request──→ ChannelDecryptionOracle ──job──→ DevDecryptor
//!    ↑                                                     │
//!    └──────────── CallbackRelay ←──── signed answer ──────┘
//! ```
//!
//! Answers are pumped by hand where ordering matters, and through the
//! spawned tasks for the happy path and for bus ordering under instant
//! answers.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use node_runtime::{CallbackRelay, DevDecryptor, OracleCallback};
    use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, SignalEvent};
    use signal_aggregation::{
        AggregationConfig, ChannelDecryptionOracle, DecryptionJob, InMemoryConfidentialRuntime,
        ProofKey, SignalAggregationApi, SignalAggregationService, SignalError,
    };
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use crate::fixtures::{at, ALICE, BOB, COOLDOWN, OWNER};

    type ChannelEngine =
        SignalAggregationService<InMemoryConfidentialRuntime, ChannelDecryptionOracle>;

    struct Pipeline {
        engine: Arc<ChannelEngine>,
        runtime: Arc<InMemoryConfidentialRuntime>,
        bus: Arc<InMemoryEventBus>,
        decryptor: DevDecryptor,
        jobs: mpsc::UnboundedReceiver<DecryptionJob>,
    }

    async fn pipeline() -> Pipeline {
        let key = ProofKey::generate();
        let runtime = Arc::new(InMemoryConfidentialRuntime::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let (oracle, jobs) = ChannelDecryptionOracle::new(key.clone());
        let engine = Arc::new(
            SignalAggregationService::new(
                AggregationConfig::for_testing(),
                OWNER,
                runtime.clone(),
                Arc::new(oracle),
                bus.clone(),
            )
            .unwrap(),
        );

        engine.add_provider(at(OWNER, 0), ALICE).await.unwrap();
        engine.add_provider(at(OWNER, 0), BOB).await.unwrap();
        engine.open_batch(at(OWNER, 0)).await.unwrap();

        Pipeline {
            decryptor: DevDecryptor::new(runtime.clone(), key, Duration::ZERO),
            engine,
            runtime,
            bus,
            jobs,
        }
    }

    fn next_answer(p: &mut Pipeline) -> OracleCallback {
        let job = p.jobs.try_recv().expect("job queued");
        p.decryptor.answer(&job).expect("decryptable")
    }

    #[tokio::test]
    async fn test_signed_answer_finalizes() {
        let mut p = pipeline().await;
        let relay = CallbackRelay::new(p.engine.clone());

        p.engine
            .submit_signal(at(ALICE, 0), p.runtime.encrypt(19))
            .await
            .unwrap();
        p.engine
            .submit_signal(at(BOB, 0), p.runtime.encrypt(23))
            .await
            .unwrap();
        let ticket = p
            .engine
            .aggregate_and_request_decryption(at(ALICE, 0))
            .await
            .unwrap();

        let answer = next_answer(&mut p);
        assert_eq!(answer.request_id, ticket.request_id);
        assert_eq!(relay.deliver(answer).await, Ok(42));
        assert!(p.engine.pending_requests().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_order_answers() {
        let mut p = pipeline().await;
        let relay = CallbackRelay::new(p.engine.clone());

        p.engine
            .submit_signal(at(ALICE, 0), p.runtime.encrypt(1))
            .await
            .unwrap();
        p.engine
            .submit_signal(at(BOB, 0), p.runtime.encrypt(2))
            .await
            .unwrap();
        let first = p
            .engine
            .aggregate_and_request_decryption(at(ALICE, 0))
            .await
            .unwrap();
        let second = p
            .engine
            .aggregate_and_request_decryption(at(BOB, 0))
            .await
            .unwrap();

        let first_answer = next_answer(&mut p);
        let second_answer = next_answer(&mut p);

        // Newest request lands first, then the orphaned one arrives late
        assert_eq!(relay.deliver(second_answer).await, Ok(3));
        assert_eq!(
            relay.deliver(first_answer).await,
            Err(SignalError::StateMismatch(first.request_id))
        );
        assert_eq!(p.engine.pending_requests(), vec![first.request_id]);
        assert!(p.engine.is_stale(first.request_id));
    }

    #[tokio::test]
    async fn test_answer_signed_with_wrong_key_rejected() {
        let mut p = pipeline().await;
        let relay = CallbackRelay::new(p.engine.clone());

        p.engine
            .submit_signal(at(ALICE, 0), p.runtime.encrypt(8))
            .await
            .unwrap();
        p.engine.open_batch(at(OWNER, 1)).await.unwrap();
        p.engine
            .submit_signal(at(BOB, 1), p.runtime.encrypt(9))
            .await
            .unwrap();
        p.engine.close_batch(at(OWNER, 1)).await.unwrap();
        p.engine.open_batch(at(OWNER, 1)).await.unwrap();

        let ticket = p
            .engine
            .aggregate_and_request_decryption(at(BOB, 1))
            .await
            .unwrap();
        let answer = next_answer(&mut p);

        let forged = OracleCallback {
            request_id: ticket.request_id,
            cleartexts: answer.cleartexts.clone(),
            proof: ProofKey::generate().sign(ticket.request_id, &answer.cleartexts),
        };
        assert_eq!(
            relay.deliver(forged).await,
            Err(SignalError::InvalidProof(ticket.request_id))
        );
        assert_eq!(relay.deliver(answer).await, Ok(9));
    }

    #[tokio::test]
    async fn test_spawned_tasks_complete_round() {
        let Pipeline {
            engine,
            runtime,
            bus,
            decryptor,
            jobs,
        } = pipeline().await;
        let mut completions = bus.subscribe(EventFilter::topics(vec![EventTopic::Decryption]));

        let (callback_tx, callback_rx) = mpsc::unbounded_channel();
        tokio::spawn(decryptor.run(jobs, callback_tx));
        tokio::spawn(CallbackRelay::new(engine.clone()).run(callback_rx));

        engine
            .submit_signal(at(ALICE, 0), runtime.encrypt(1_000))
            .await
            .unwrap();
        let ticket = engine
            .aggregate_and_request_decryption(at(ALICE, 0))
            .await
            .unwrap();

        let requested = completions.recv().await.unwrap();
        assert!(matches!(requested, SignalEvent::DecryptionRequested { .. }));
        let completed = timeout(Duration::from_secs(5), completions.recv())
            .await
            .expect("callback within timeout")
            .unwrap();
        assert_eq!(
            completed,
            SignalEvent::DecryptionCompleted {
                request_id: ticket.request_id,
                batch_id: 0,
                value: 1_000,
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_instant_answers_never_overtake_request_events() {
        const ROUNDS: u64 = 20;
        let Pipeline {
            engine,
            runtime,
            bus,
            decryptor,
            jobs,
        } = pipeline().await;
        let mut events = bus.subscribe(EventFilter::topics(vec![EventTopic::Decryption]));

        let (callback_tx, callback_rx) = mpsc::unbounded_channel();
        tokio::spawn(decryptor.run(jobs, callback_tx));
        tokio::spawn(CallbackRelay::new(engine.clone()).run(callback_rx));

        for round in 0..ROUNDS {
            let now = round * COOLDOWN;
            if round > 0 {
                engine.open_batch(at(OWNER, now)).await.unwrap();
            }
            engine
                .submit_signal(at(ALICE, now), runtime.encrypt(round))
                .await
                .unwrap();
            engine
                .aggregate_and_request_decryption(at(ALICE, now))
                .await
                .unwrap();
        }

        let mut requested = HashSet::new();
        let mut completed = 0;
        while completed < ROUNDS {
            let event = timeout(Duration::from_secs(5), events.recv())
                .await
                .expect("all rounds answered")
                .unwrap();
            match event {
                SignalEvent::DecryptionRequested { request_id, .. } => {
                    requested.insert(request_id);
                }
                SignalEvent::DecryptionCompleted { request_id, .. } => {
                    assert!(
                        requested.contains(&request_id),
                        "completion of {request_id} published before its request"
                    );
                    completed += 1;
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
    }
}
