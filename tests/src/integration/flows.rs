//! # Integration Test Flows
//!
//! Drives the aggregation engine through full batch rounds and checks the
//! events observed on the shared bus.
//!
//! ## Flows Tested:
//!
//! 1. **Round trip**: submit → aggregate → request → verified callback
//! 2. **Batch isolation**: signals never leak across batches
//! 3. **Re-aggregation**: an outstanding request is orphaned by a newer one,
//!    including when a lone contributor yields the same aggregate handle
//! 4. **Rate limiting**: resubmission after the cooldown overwrites

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use shared_bus::{EventFilter, EventTopic, SignalEvent};
    use signal_aggregation::{
        encode_cleartext, SignalAggregationApi, SignalError, MOCK_VALID_PROOF,
    };

    use crate::fixtures::{at, completions, TestEngine, ALICE, BOB, CAROL, COOLDOWN, OWNER};

    // =============================================================================
    // ROUND TRIP
    // =============================================================================

    #[tokio::test]
    async fn test_round_trip_reveals_sum_once() {
        let t = TestEngine::new().with_open_batch(&[ALICE, BOB, CAROL]).await;
        let mut events = t.subscribe();

        t.submit(ALICE, 5, 0).await;
        t.submit(BOB, 7, 0).await;
        t.submit(CAROL, 30, 0).await;

        let ticket = t
            .engine
            .aggregate_and_request_decryption(at(BOB, 1))
            .await
            .unwrap();
        assert_eq!(ticket.batch_id, 0);
        assert_eq!(ticket.contributors, 3);

        let value = t
            .engine
            .decryption_callback(ticket.request_id, &encode_cleartext(42), MOCK_VALID_PROOF)
            .await
            .unwrap();
        assert_eq!(value, 42);

        let done = completions(&mut events);
        assert_eq!(
            done,
            vec![SignalEvent::DecryptionCompleted {
                request_id: ticket.request_id,
                batch_id: 0,
                value: 42,
            }]
        );
    }

    #[tokio::test]
    async fn test_event_order_for_one_round() {
        let t = TestEngine::new();
        let mut events = t.subscribe();

        t.engine.add_provider(at(OWNER, 0), ALICE).await.unwrap();
        t.engine.open_batch(at(OWNER, 0)).await.unwrap();
        t.submit(ALICE, 3, 0).await;
        let ticket = t
            .engine
            .aggregate_and_request_decryption(at(ALICE, 0))
            .await
            .unwrap();
        t.engine
            .decryption_callback(ticket.request_id, &encode_cleartext(3), MOCK_VALID_PROOF)
            .await
            .unwrap();

        let topics: Vec<EventTopic> = events.drain().iter().map(SignalEvent::topic).collect();
        assert_eq!(
            topics,
            vec![
                EventTopic::Governance,
                EventTopic::Batch,
                EventTopic::Submission,
                EventTopic::Decryption,
                EventTopic::Decryption,
            ]
        );
    }

    #[tokio::test]
    async fn test_completion_keeps_request_time_batch() {
        let t = TestEngine::new().with_open_batch(&[ALICE]).await;
        let mut decryption = t
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Decryption]));

        t.submit(ALICE, 11, 0).await;
        let ticket = t
            .engine
            .aggregate_and_request_decryption(at(ALICE, 0))
            .await
            .unwrap();

        // Batch moves on while the request is outstanding
        t.engine.close_batch(at(OWNER, 1)).await.unwrap();
        t.engine.open_batch(at(OWNER, 2)).await.unwrap();
        t.engine.open_batch(at(OWNER, 3)).await.unwrap();
        t.engine.open_batch(at(OWNER, 4)).await.unwrap();
        assert_eq!(t.engine.current_batch(), 2);

        t.engine
            .decryption_callback(ticket.request_id, &encode_cleartext(11), MOCK_VALID_PROOF)
            .await
            .unwrap();

        let events = decryption.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            SignalEvent::DecryptionCompleted {
                request_id: ticket.request_id,
                batch_id: 0,
                value: 11,
            }
        );
    }

    // =============================================================================
    // BATCH ISOLATION
    // =============================================================================

    #[tokio::test]
    async fn test_aggregation_uses_only_current_batch() {
        let t = TestEngine::new().with_open_batch(&[ALICE]).await;

        let s1 = t.encrypt(100);
        t.engine.submit_signal(at(ALICE, 0), s1).await.unwrap();

        // Reopening a closed batch keeps its id; advancing takes a second open
        t.engine.close_batch(at(OWNER, 1)).await.unwrap();
        assert_eq!(t.engine.open_batch(at(OWNER, 2)).await.unwrap(), 0);
        assert_eq!(t.engine.open_batch(at(OWNER, 2)).await.unwrap(), 1);

        let s2 = t.encrypt(1);
        t.engine
            .submit_signal(at(ALICE, COOLDOWN), s2)
            .await
            .unwrap();

        let ticket = t
            .engine
            .aggregate_and_request_decryption(at(ALICE, COOLDOWN))
            .await
            .unwrap();
        assert_eq!(ticket.batch_id, 1);
        assert_eq!(ticket.contributors, 1);

        let aggregate = t.engine.aggregated_signal(1).unwrap().unwrap();
        assert_eq!(t.runtime.reveal(&aggregate), Some(1));
        assert_eq!(t.engine.signal_of(&ALICE, 0), Some(s1));
        assert_eq!(t.engine.aggregated_signal(0).unwrap(), None);
    }

    #[tokio::test]
    async fn test_no_signals_leaves_aggregate_unset() {
        let t = TestEngine::new().with_open_batch(&[ALICE]).await;
        let mut events = t.subscribe();

        let err = t
            .engine
            .aggregate_and_request_decryption(at(ALICE, 0))
            .await
            .unwrap_err();
        assert_eq!(err, SignalError::NoSignalsToAggregate(0));
        assert_eq!(t.engine.aggregated_signal(0).unwrap(), None);
        assert!(t.engine.pending_requests().is_empty());
        assert!(events.drain().is_empty());
        assert!(t.oracle.requests().is_empty());
    }

    // =============================================================================
    // RE-AGGREGATION
    // =============================================================================

    #[tokio::test]
    async fn test_reaggregation_orphans_earlier_request() {
        let t = TestEngine::new().with_open_batch(&[ALICE, BOB]).await;
        let mut events = t.subscribe();

        t.submit(ALICE, 2, 0).await;
        t.submit(BOB, 3, 0).await;

        let first = t
            .engine
            .aggregate_and_request_decryption(at(ALICE, 0))
            .await
            .unwrap();
        let second = t
            .engine
            .aggregate_and_request_decryption(at(BOB, 0))
            .await
            .unwrap();
        assert_ne!(first.state_hash, second.state_hash);
        assert!(t.engine.is_stale(first.request_id));
        assert!(!t.engine.is_stale(second.request_id));

        let err = t
            .engine
            .decryption_callback(first.request_id, &encode_cleartext(5), MOCK_VALID_PROOF)
            .await
            .unwrap_err();
        assert_eq!(err, SignalError::StateMismatch(first.request_id));

        let value = t
            .engine
            .decryption_callback(second.request_id, &encode_cleartext(5), MOCK_VALID_PROOF)
            .await
            .unwrap();
        assert_eq!(value, 5);

        // Orphaned context stays pending, untouched
        assert_eq!(t.engine.pending_requests(), vec![first.request_id]);
        let orphan = t.engine.decryption_context(first.request_id).unwrap();
        assert!(!orphan.processed);
        assert_eq!(orphan.revealed, None);

        let done = completions(&mut events);
        assert_eq!(done.len(), 1);
    }

    #[tokio::test]
    async fn test_single_contributor_reaggregation_orphans_earlier_request() {
        let t = TestEngine::new().with_open_batch(&[ALICE]).await;
        let mut events = t.subscribe();

        t.submit(ALICE, 7, 0).await;

        let first = t
            .engine
            .aggregate_and_request_decryption(at(ALICE, 0))
            .await
            .unwrap();
        let aggregate = t.engine.aggregated_signal(0).unwrap();
        let second = t
            .engine
            .aggregate_and_request_decryption(at(ALICE, COOLDOWN))
            .await
            .unwrap();

        // Same ciphertext, new aggregation
        assert_eq!(t.engine.aggregated_signal(0).unwrap(), aggregate);
        assert_ne!(first.state_hash, second.state_hash);
        assert!(t.engine.is_stale(first.request_id));
        assert!(!t.engine.is_stale(second.request_id));

        let err = t
            .engine
            .decryption_callback(first.request_id, &encode_cleartext(7), MOCK_VALID_PROOF)
            .await
            .unwrap_err();
        assert_eq!(err, SignalError::StateMismatch(first.request_id));

        let value = t
            .engine
            .decryption_callback(second.request_id, &encode_cleartext(7), MOCK_VALID_PROOF)
            .await
            .unwrap();
        assert_eq!(value, 7);

        assert_eq!(t.engine.pending_requests(), vec![first.request_id]);
        assert_eq!(completions(&mut events).len(), 1);
    }

    // =============================================================================
    // RATE LIMITING
    // =============================================================================

    #[tokio::test]
    async fn test_resubmission_after_cooldown_overwrites() {
        let t = TestEngine::new().with_open_batch(&[ALICE]).await;

        let first = t.encrypt(1);
        let second = t.encrypt(2);
        t.engine.submit_signal(at(ALICE, 100), first).await.unwrap();

        let err = t
            .engine
            .submit_signal(at(ALICE, 100 + COOLDOWN - 1), second)
            .await
            .unwrap_err();
        assert!(matches!(err, SignalError::CooldownActive { .. }));
        assert_eq!(t.engine.signal_of(&ALICE, 0), Some(first));

        t.engine
            .submit_signal(at(ALICE, 100 + COOLDOWN), second)
            .await
            .unwrap();
        assert_eq!(t.engine.signal_of(&ALICE, 0), Some(second));
        assert_eq!(t.engine.last_submission_time(&ALICE), Some(100 + COOLDOWN));
    }

    #[tokio::test]
    async fn test_providers_rate_limited_independently() {
        let t = TestEngine::new().with_open_batch(&[ALICE, BOB]).await;
        t.submit(ALICE, 1, 50).await;
        t.submit(BOB, 1, 51).await;
        assert_eq!(t.engine.last_submission_time(&ALICE), Some(50));
        assert_eq!(t.engine.last_submission_time(&BOB), Some(51));
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_aggregate_is_sum_of_latest_signals(values in prop::collection::vec(0u64..1_000_000, 1..6)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let providers: Vec<_> = (0..values.len()).map(|i| [0x40 + i as u8; 20]).collect();
                let t = TestEngine::new().with_open_batch(&providers).await;
                for (provider, value) in providers.iter().zip(&values) {
                    t.submit(*provider, *value, 0).await;
                }
                t.engine
                    .aggregate_and_request_decryption(at(OWNER, 0))
                    .await
                    .unwrap();
                let aggregate = t.engine.aggregated_signal(0).unwrap().unwrap();
                assert_eq!(t.runtime.reveal(&aggregate), Some(values.iter().sum::<u64>()));
            });
        }
    }
}
