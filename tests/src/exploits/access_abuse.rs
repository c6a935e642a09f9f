//! # Access Abuse
//!
//! Unauthorized callers, paused systems and rate-limit evasion. A failed
//! call must leave every view unchanged and publish nothing.

#[cfg(test)]
mod tests {
    use signal_aggregation::{
        CiphertextHandle, CooldownAction, SignalAggregationApi, SignalError,
    };

    use crate::fixtures::{at, TestEngine, ALICE, BOB, COOLDOWN, MALLORY, OWNER};

    #[tokio::test]
    async fn test_non_provider_rejected_in_every_state() {
        let t = TestEngine::new();
        let mut events = t.subscribe();
        let handle = t.encrypt(1);

        // Closed batch
        let err = t
            .engine
            .submit_signal(at(MALLORY, 0), handle)
            .await
            .unwrap_err();
        assert_eq!(err, SignalError::NotProvider(MALLORY));

        // Open batch
        t.engine.open_batch(at(OWNER, 0)).await.unwrap();
        let err = t
            .engine
            .submit_signal(at(MALLORY, 0), handle)
            .await
            .unwrap_err();
        assert_eq!(err, SignalError::NotProvider(MALLORY));

        // Paused
        t.engine.pause(at(OWNER, 0)).await.unwrap();
        let err = t
            .engine
            .submit_signal(at(MALLORY, 0), handle)
            .await
            .unwrap_err();
        assert_eq!(err, SignalError::NotProvider(MALLORY));

        assert_eq!(t.engine.signal_of(&MALLORY, 0), None);
        assert_eq!(t.engine.last_submission_time(&MALLORY), None);
        assert_eq!(events.drain().len(), 2);
    }

    #[tokio::test]
    async fn test_admin_calls_require_owner() {
        let t = TestEngine::new().with_open_batch(&[ALICE]).await;
        let mut events = t.subscribe();

        let expected = SignalError::NotOwner(MALLORY);
        assert_eq!(
            t.engine.transfer_ownership(at(MALLORY, 0), MALLORY).await,
            Err(expected.clone())
        );
        assert_eq!(
            t.engine.add_provider(at(MALLORY, 0), MALLORY).await,
            Err(expected.clone())
        );
        assert_eq!(
            t.engine.remove_provider(at(MALLORY, 0), ALICE).await,
            Err(expected.clone())
        );
        assert_eq!(t.engine.pause(at(MALLORY, 0)).await, Err(expected.clone()));
        assert_eq!(
            t.engine.set_cooldown(at(MALLORY, 0), 1).await,
            Err(expected.clone())
        );
        assert_eq!(
            t.engine.open_batch(at(MALLORY, 0)).await,
            Err(expected.clone())
        );
        assert_eq!(t.engine.close_batch(at(MALLORY, 0)).await, Err(expected));

        assert_eq!(t.engine.owner(), OWNER);
        assert_eq!(t.engine.providers(), vec![ALICE]);
        assert!(!t.engine.is_paused());
        assert_eq!(t.engine.cooldown_secs(), COOLDOWN);
        assert!(t.engine.is_batch_open());
        assert!(events.drain().is_empty());
    }

    #[tokio::test]
    async fn test_previous_owner_locked_out() {
        let t = TestEngine::new();
        t.engine
            .transfer_ownership(at(OWNER, 0), BOB)
            .await
            .unwrap();

        assert_eq!(
            t.engine.open_batch(at(OWNER, 1)).await,
            Err(SignalError::NotOwner(OWNER))
        );
        assert_eq!(t.engine.open_batch(at(BOB, 1)).await, Ok(0));
    }

    #[tokio::test]
    async fn test_transfer_to_zero_address_rejected() {
        let t = TestEngine::new();
        assert_eq!(
            t.engine.transfer_ownership(at(OWNER, 0), [0; 20]).await,
            Err(SignalError::InvalidAddress)
        );
        assert_eq!(t.engine.owner(), OWNER);
    }

    #[tokio::test]
    async fn test_removed_provider_cannot_submit() {
        let t = TestEngine::new().with_open_batch(&[ALICE, BOB]).await;
        t.submit(ALICE, 50, 0).await;
        t.engine
            .remove_provider(at(OWNER, 0), ALICE)
            .await
            .unwrap();

        let err = t
            .engine
            .submit_signal(at(ALICE, COOLDOWN), t.encrypt(1))
            .await
            .unwrap_err();
        assert_eq!(err, SignalError::NotProvider(ALICE));

        // Earlier signal is ignored by aggregation
        t.submit(BOB, 1, 0).await;
        let ticket = t
            .engine
            .aggregate_and_request_decryption(at(BOB, 0))
            .await
            .unwrap();
        assert_eq!(ticket.contributors, 1);
        let aggregate = t.engine.aggregated_signal(0).unwrap().unwrap();
        assert_eq!(t.runtime.reveal(&aggregate), Some(1));
    }

    #[tokio::test]
    async fn test_pause_blocks_user_actions() {
        let t = TestEngine::new().with_open_batch(&[ALICE]).await;
        t.submit(ALICE, 4, 0).await;
        t.engine.pause(at(OWNER, 1)).await.unwrap();

        assert_eq!(
            t.engine.submit_signal(at(ALICE, 100), t.encrypt(5)).await,
            Err(SignalError::Paused)
        );
        assert_eq!(
            t.engine
                .aggregate_and_request_decryption(at(ALICE, 100))
                .await,
            Err(SignalError::Paused)
        );
        assert_eq!(t.engine.open_batch(at(OWNER, 100)).await, Err(SignalError::Paused));
        assert_eq!(t.engine.close_batch(at(OWNER, 100)).await, Err(SignalError::Paused));
        assert_eq!(t.engine.pause(at(OWNER, 100)).await, Err(SignalError::Paused));

        t.engine.unpause(at(OWNER, 101)).await.unwrap();
        assert_eq!(t.engine.unpause(at(OWNER, 101)).await, Err(SignalError::NotPaused));
        t.engine
            .aggregate_and_request_decryption(at(ALICE, 101))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_decryption_request_spam_rate_limited() {
        let t = TestEngine::new().with_open_batch(&[ALICE]).await;
        t.submit(ALICE, 4, 0).await;

        t.engine
            .aggregate_and_request_decryption(at(MALLORY, 100))
            .await
            .unwrap();
        let err = t
            .engine
            .aggregate_and_request_decryption(at(MALLORY, 100 + COOLDOWN - 1))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SignalError::CooldownActive {
                action: CooldownAction::DecryptionRequest,
                ready_at: 100 + COOLDOWN,
                now: 100 + COOLDOWN - 1,
            }
        );
        assert_eq!(t.oracle.requests().len(), 1);
        assert_eq!(t.engine.last_decryption_request_time(&MALLORY), Some(100));
    }

    #[tokio::test]
    async fn test_uninitialized_ciphertext_not_aggregated() {
        let t = TestEngine::new().with_open_batch(&[ALICE]).await;
        let bogus = CiphertextHandle::new([0x77; 32]);
        t.engine.submit_signal(at(ALICE, 0), bogus).await.unwrap();

        let err = t
            .engine
            .aggregate_and_request_decryption(at(ALICE, 0))
            .await
            .unwrap_err();
        assert_eq!(err, SignalError::NoSignalsToAggregate(0));
        assert_eq!(t.engine.aggregated_signal(0).unwrap(), None);
    }

    #[tokio::test]
    async fn test_cooldown_shortening_takes_effect_immediately() {
        let t = TestEngine::new().with_open_batch(&[ALICE]).await;
        t.submit(ALICE, 1, 100).await;
        t.engine.set_cooldown(at(OWNER, 100), 1).await.unwrap();
        t.submit(ALICE, 2, 101).await;
        assert_eq!(
            t.engine.set_cooldown(at(OWNER, 101), 0).await,
            Err(SignalError::InvalidCooldown)
        );
        assert_eq!(t.engine.cooldown_secs(), 1);
    }
}
