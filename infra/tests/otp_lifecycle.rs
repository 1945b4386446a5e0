//! End-to-end passcode lifecycle on the in-process store
//!
//! Issue a passcode, let the dispatcher deliver the email from the change
//! feed, then verify before and after expiry.

use std::sync::Arc;
use std::time::Duration;

use otp_core::domain::entities::identity_key;
use otp_core::repositories::{ChangeFeed, OtpRecordRepository};
use otp_core::services::{
    FixedClock, IssuanceService, IssuanceServiceConfig, NotificationDispatcher, OtpEmailTemplate,
    VerificationOutcome, VerificationService, VerificationServiceConfig,
};
use otp_infra::{InMemoryChangeFeed, InMemoryOtpStore, MockEmailChannel};

const NOW: i64 = 1_700_000_000;
const REDELIVERY_DELAY: Duration = Duration::from_secs(30);

struct Harness {
    clock: Arc<FixedClock>,
    store: Arc<InMemoryOtpStore>,
    feed: Arc<InMemoryChangeFeed>,
    channel: Arc<MockEmailChannel>,
    issuance: IssuanceService<InMemoryOtpStore>,
    verification: VerificationService<InMemoryOtpStore>,
    dispatcher: NotificationDispatcher<MockEmailChannel>,
}

fn harness(ttl_minutes: u32) -> Harness {
    harness_with_batch(ttl_minutes, 25)
}

fn harness_with_batch(ttl_minutes: u32, batch_size: usize) -> Harness {
    let clock = Arc::new(FixedClock::new(NOW));
    let (store, feed) = InMemoryOtpStore::new(clock.clone(), batch_size);
    let store = Arc::new(store);
    let feed = Arc::new(feed.with_redelivery_delay(REDELIVERY_DELAY));
    let channel = Arc::new(MockEmailChannel::new());

    let issuance = IssuanceService::new(
        store.clone(),
        clock.clone(),
        IssuanceServiceConfig {
            ttl_minutes,
            otp_length: 6,
            store_timeout: Duration::from_secs(1),
        },
    );
    let verification = VerificationService::new(
        store.clone(),
        clock.clone(),
        VerificationServiceConfig::default(),
    );
    let dispatcher = NotificationDispatcher::new(
        channel.clone(),
        OtpEmailTemplate::new("RosePay").with_ttl_hint(ttl_minutes),
        Duration::from_millis(20),
    );

    Harness {
        clock,
        store,
        feed,
        channel,
        issuance,
        verification,
        dispatcher,
    }
}

/// Extract the passcode from the `<h1>` element of a rendered email
fn otp_from_email(html: &str) -> String {
    let start = html.find("<h1>").expect("no <h1> in email") + 4;
    let end = html[start..].find("</h1>").expect("unterminated <h1>") + start;
    html[start..end].to_string()
}

#[tokio::test]
async fn test_full_lifecycle() {
    let h = harness(5);

    let issued = h.issuance.issue("a@b.com").await.unwrap();
    assert_eq!(issued.session_token.len(), 32);
    assert_eq!(issued.expires_at, NOW + 300);

    // The creation event reaches the dispatcher through the feed
    let deliveries = h.feed.poll().await.unwrap();
    assert_eq!(deliveries.len(), 1);
    let report = h.dispatcher.handle_deliveries(h.feed.as_ref(), deliveries).await;
    assert_eq!(report.sent, 1);
    assert!(h.feed.poll().await.unwrap().is_empty());

    let sent = h.channel.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@b.com");
    let otp = otp_from_email(&sent[0].html_body);
    assert_eq!(otp.len(), 6);

    // The record is stored under the composite key
    let record = h
        .store
        .get(&identity_key(&issued.session_token, &otp))
        .await
        .unwrap()
        .expect("record stored under composite key");
    assert_eq!(record.email, "a@b.com");

    h.clock.advance(60);
    assert_eq!(
        h.verification.verify(&issued.session_token, &otp).await.unwrap(),
        VerificationOutcome::Verified
    );
    // Repeatable until expiry
    assert_eq!(
        h.verification.verify(&issued.session_token, &otp).await.unwrap(),
        VerificationOutcome::Verified
    );

    h.clock.set(issued.expires_at);
    assert_eq!(
        h.verification.verify(&issued.session_token, &otp).await.unwrap(),
        VerificationOutcome::Verified
    );

    h.clock.set(issued.expires_at + 1);
    assert_eq!(
        h.verification.verify(&issued.session_token, &otp).await.unwrap(),
        VerificationOutcome::Expired
    );

    let wrong = if otp == "000000" { "111111" } else { "000000" };
    assert_eq!(
        h.verification.verify(&issued.session_token, wrong).await.unwrap(),
        VerificationOutcome::NotFound
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_email_is_redelivered() {
    let h = harness(5);
    h.channel.set_simulate_failure(true);

    h.issuance.issue("a@b.com").await.unwrap();

    let deliveries = h.feed.poll().await.unwrap();
    let report = h.dispatcher.handle_deliveries(h.feed.as_ref(), deliveries).await;
    assert_eq!(report.failed, 1);
    assert_eq!(h.feed.in_flight().await, 1);

    h.channel.set_simulate_failure(false);
    assert!(h.feed.poll().await.unwrap().is_empty());

    tokio::time::advance(REDELIVERY_DELAY).await;
    let deliveries = h.feed.poll().await.unwrap();
    assert_eq!(deliveries.len(), 1);
    let report = h.dispatcher.handle_deliveries(h.feed.as_ref(), deliveries).await;
    assert_eq!(report.sent, 1);
    assert_eq!(h.feed.in_flight().await, 0);
    assert_eq!(h.channel.message_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failing_recipients_do_not_block_new_events() {
    let h = harness_with_batch(5, 2);
    h.channel.fail_for("bounce1@example.com");
    h.channel.fail_for("bounce2@example.com");

    h.issuance.issue("bounce1@example.com").await.unwrap();
    h.issuance.issue("bounce2@example.com").await.unwrap();
    h.issuance.issue("good@example.com").await.unwrap();

    for _ in 0..50 {
        let deliveries = h.feed.poll().await.unwrap();
        h.dispatcher.handle_deliveries(h.feed.as_ref(), deliveries).await;
        tokio::time::advance(REDELIVERY_DELAY).await;
    }

    let recipients: Vec<String> = h.channel.sent_messages().into_iter().map(|m| m.to).collect();
    assert_eq!(recipients, vec!["good@example.com"]);
    // The failing deliveries are still pending, not dropped
    assert_eq!(h.feed.in_flight().await, 2);
}

#[tokio::test]
async fn test_dispatcher_task_delivers_in_background() {
    let h = harness(5);
    let dispatcher = Arc::new(h.dispatcher);
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let task = {
        let dispatcher = dispatcher.clone();
        let feed = h.feed.clone();
        tokio::spawn(async move { dispatcher.run(feed, shutdown_rx).await })
    };

    h.issuance.issue("a@b.com").await.unwrap();
    h.issuance.issue("c@d.com").await.unwrap();

    let mut waited = 0;
    while h.channel.message_count() < 2 && waited < 50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += 1;
    }
    assert_eq!(h.channel.message_count(), 2);

    shutdown_tx.send(true).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn test_many_issuances_are_unique() {
    let h = harness(5);

    for _ in 0..1_000 {
        h.issuance.issue("a@b.com").await.unwrap();
    }

    assert_eq!(h.store.len().await, 1_000);
}
