use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::OtpRecord;
use crate::errors::{DomainError, StoreError};
use crate::repositories::MockOtpRecordRepository;
use crate::services::clock::FixedClock;
use crate::services::verification::{
    VerificationOutcome, VerificationService, VerificationServiceConfig,
};

const EXPIRES_AT: i64 = 1_700_000_300;

async fn setup() -> (
    Arc<MockOtpRecordRepository>,
    Arc<FixedClock>,
    VerificationService<MockOtpRecordRepository>,
) {
    let store = Arc::new(MockOtpRecordRepository::new());
    store
        .insert(OtpRecord::new("T1", "482913", "a@b.com", EXPIRES_AT))
        .await;
    let clock = Arc::new(FixedClock::new(EXPIRES_AT - 120));
    let service = VerificationService::new(
        store.clone(),
        clock.clone(),
        VerificationServiceConfig {
            store_timeout: Duration::from_millis(200),
        },
    );
    (store, clock, service)
}

#[tokio::test]
async fn test_verify_before_expiry() {
    let (_, _, service) = setup().await;
    let outcome = service.verify("T1", "482913").await.unwrap();
    assert_eq!(outcome, VerificationOutcome::Verified);
}

#[tokio::test]
async fn test_verify_is_repeatable() {
    let (store, _, service) = setup().await;
    let before = store.records().await;

    assert_eq!(service.verify("T1", "482913").await.unwrap(), VerificationOutcome::Verified);
    assert_eq!(service.verify("T1", "482913").await.unwrap(), VerificationOutcome::Verified);

    assert_eq!(store.records().await, before);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_expiry_boundary() {
    let (_, clock, service) = setup().await;

    clock.set(EXPIRES_AT);
    assert_eq!(service.verify("T1", "482913").await.unwrap(), VerificationOutcome::Verified);

    clock.set(EXPIRES_AT + 1);
    assert_eq!(service.verify("T1", "482913").await.unwrap(), VerificationOutcome::Expired);
}

#[tokio::test]
async fn test_unknown_pair_is_not_found() {
    let (_, _, service) = setup().await;

    assert_eq!(service.verify("T1", "000000").await.unwrap(), VerificationOutcome::NotFound);
    assert_eq!(service.verify("T2", "482913").await.unwrap(), VerificationOutcome::NotFound);
}

#[tokio::test]
async fn test_separator_in_input_skips_lookup() {
    let (store, _, service) = setup().await;

    // "T1_4" + "82913" would otherwise build a key that looks plausible
    let outcome = service.verify("T1_4", "82913").await.unwrap();

    assert_eq!(outcome, VerificationOutcome::NotFound);
    assert_eq!(store.read_count(), 0);
}

#[tokio::test]
async fn test_reserved_characters_are_not_found_without_lookup() {
    let (store, _, service) = setup().await;

    for (token, otp) in [("a:b", "1"), ("T1", "48291x"), ("T 1", "482913"), ("T1", "4829-3")] {
        assert_eq!(
            service.verify(token, otp).await.unwrap(),
            VerificationOutcome::NotFound,
            "{:?}/{:?}",
            token,
            otp
        );
    }
    assert_eq!(store.read_count(), 0);
}

#[tokio::test]
async fn test_empty_input_rejected() {
    let (store, _, service) = setup().await;

    assert!(matches!(
        service.verify("", "482913").await,
        Err(DomainError::InvalidInput { ref field, .. }) if field == "sessionToken"
    ));
    assert!(matches!(
        service.verify("T1", "").await,
        Err(DomainError::InvalidInput { ref field, .. }) if field == "otp"
    ));
    assert_eq!(store.read_count(), 0);
}

#[tokio::test]
async fn test_store_failure_is_not_reported_as_not_found() {
    let (store, _, service) = setup().await;
    store.set_should_fail(true);

    let result = service.verify("T1", "482913").await;

    assert!(matches!(
        result,
        Err(DomainError::Storage(StoreError::Unavailable { .. }))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_slow_store_times_out() {
    let (store, _, service) = setup().await;
    store.set_delay(Some(Duration::from_secs(5))).await;

    let result = service.verify("T1", "482913").await;

    assert!(matches!(
        result,
        Err(DomainError::Storage(StoreError::Timeout { .. }))
    ));
}

#[tokio::test]
async fn test_store_health_reports_unreachable_store() {
    let (store, _, service) = setup().await;
    assert_eq!(service.store_health().await, Ok(()));

    store.set_should_fail(true);
    assert!(matches!(
        service.store_health().await,
        Err(StoreError::Unavailable { .. })
    ));
}
