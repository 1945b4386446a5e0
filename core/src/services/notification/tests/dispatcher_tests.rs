use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::domain::entities::OtpRecord;
use crate::domain::events::{ChangeEvent, ChangeKind, RecordImage};
use crate::errors::NotificationError;
use crate::services::notification::{
    DispatchOutcome, NotificationDispatcher, OtpEmailTemplate, SkipReason,
};

use super::mocks::{RecordingEmailChannel, ScriptedChangeFeed};

fn dispatcher(channel: Arc<RecordingEmailChannel>) -> NotificationDispatcher<RecordingEmailChannel> {
    NotificationDispatcher::new(
        channel,
        OtpEmailTemplate::new("RosePay").with_ttl_hint(5),
        Duration::from_millis(100),
    )
}

fn created(token: &str, otp: &str, email: &str) -> ChangeEvent {
    ChangeEvent::created(&OtpRecord::new(token, otp, email, 1_000))
}

#[tokio::test]
async fn test_creation_event_sends_email() {
    let channel = Arc::new(RecordingEmailChannel::new());
    let dispatcher = dispatcher(channel.clone());

    let outcome = dispatcher.dispatch(&created("T1", "482913", "a@b.com")).await;

    assert_eq!(
        outcome,
        DispatchOutcome::Sent {
            message_id: "msg-1".to_string()
        }
    );
    let sent = channel.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@b.com");
    assert_eq!(sent[0].subject, "Your one-time code for RosePay");
    assert!(sent[0].html_body.contains("482913"));
}

#[tokio::test]
async fn test_non_creation_events_are_skipped() {
    let channel = Arc::new(RecordingEmailChannel::new());
    let dispatcher = dispatcher(channel.clone());

    for kind in [ChangeKind::Modify, ChangeKind::Remove] {
        let mut event = created("T1", "482913", "a@b.com");
        event.kind = kind;
        assert_eq!(
            dispatcher.dispatch(&event).await,
            DispatchOutcome::Skipped(SkipReason::NotACreation)
        );
    }
    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn test_incomplete_events_are_skipped() {
    let channel = Arc::new(RecordingEmailChannel::new());
    let dispatcher = dispatcher(channel.clone());

    let missing_image = ChangeEvent {
        kind: ChangeKind::Insert,
        new_image: None,
    };
    let missing_email = ChangeEvent {
        kind: ChangeKind::Insert,
        new_image: Some(RecordImage {
            otp: Some("482913".to_string()),
            ..RecordImage::default()
        }),
    };
    let empty_otp = created("T1", "", "a@b.com");

    for event in [missing_image, missing_email, empty_otp] {
        assert_eq!(
            dispatcher.dispatch(&event).await,
            DispatchOutcome::Skipped(SkipReason::MissingAttribute)
        );
    }
    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn test_undeliverable_address_is_skipped() {
    let channel = Arc::new(RecordingEmailChannel::new());
    let dispatcher = dispatcher(channel.clone());

    let outcome = dispatcher.dispatch(&created("T1", "482913", "not-an-address")).await;

    assert_eq!(outcome, DispatchOutcome::Skipped(SkipReason::InvalidRecipient));
    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn test_channel_failure_is_reported() {
    let channel = Arc::new(RecordingEmailChannel::new());
    channel.set_fail_all(true);
    let dispatcher = dispatcher(channel.clone());

    let outcome = dispatcher.dispatch(&created("T1", "482913", "a@b.com")).await;

    assert!(matches!(
        outcome,
        DispatchOutcome::Failed(NotificationError::Channel { .. })
    ));
}

#[tokio::test]
async fn test_duplicate_events_send_duplicate_emails() {
    let channel = Arc::new(RecordingEmailChannel::new());
    let dispatcher = dispatcher(channel.clone());
    let event = created("T1", "482913", "a@b.com");

    let report = dispatcher.dispatch_batch(&[event.clone(), event]).await;

    assert_eq!(report.sent, 2);
    assert_eq!(channel.sent().len(), 2);
}

#[tokio::test]
async fn test_batch_isolates_failures() {
    let channel = Arc::new(RecordingEmailChannel::new());
    channel.fail_for("bad@b.com");
    let dispatcher = dispatcher(channel.clone());

    let mut remove = created("T0", "1", "a@b.com");
    remove.kind = ChangeKind::Remove;
    let events = vec![
        created("T1", "111111", "a@b.com"),
        created("T2", "222222", "bad@b.com"),
        remove,
        created("T3", "333333", "c@d.com"),
    ];

    let report = dispatcher.dispatch_batch(&events).await;

    assert_eq!((report.sent, report.skipped, report.failed), (2, 1, 1));
    assert_eq!(report.total(), 4);
    assert_eq!(report.outcomes.len(), 4);
    assert!(matches!(report.outcomes[1], DispatchOutcome::Failed(_)));
    assert_eq!(
        report.outcomes[2],
        DispatchOutcome::Skipped(SkipReason::NotACreation)
    );
    let recipients: Vec<String> = channel.sent().into_iter().map(|m| m.to).collect();
    assert_eq!(recipients, vec!["a@b.com", "c@d.com"]);
}

#[tokio::test]
async fn test_only_settled_deliveries_are_acknowledged() {
    let channel = Arc::new(RecordingEmailChannel::new());
    channel.fail_for("bad@b.com");
    let dispatcher = dispatcher(channel.clone());

    let feed = ScriptedChangeFeed::new();
    let mut modify = created("T0", "1", "a@b.com");
    modify.kind = ChangeKind::Modify;
    feed.push("1-0", created("T1", "111111", "a@b.com"));
    feed.push("2-0", created("T2", "222222", "bad@b.com"));
    feed.push("3-0", modify);

    let deliveries = crate::repositories::ChangeFeed::poll(&feed).await.unwrap();
    let report = dispatcher.handle_deliveries(&feed, deliveries).await;

    assert_eq!(report.failed, 1);
    assert_eq!(feed.acked(), vec!["1-0", "3-0"]);
    assert_eq!(feed.pending_ids(), vec!["2-0"]);
}

#[tokio::test]
async fn test_permanent_rejection_is_acknowledged() {
    let channel = Arc::new(RecordingEmailChannel::new());
    channel.reject_for("bounce@b.com");
    channel.fail_for("busy@b.com");
    let dispatcher = dispatcher(channel.clone());

    let feed = ScriptedChangeFeed::new();
    feed.push("1-0", created("T1", "111111", "bounce@b.com"));
    feed.push("2-0", created("T2", "222222", "busy@b.com"));
    feed.push("3-0", created("T3", "333333", "a@b.com"));

    let deliveries = crate::repositories::ChangeFeed::poll(&feed).await.unwrap();
    let report = dispatcher.handle_deliveries(&feed, deliveries).await;

    assert_eq!((report.sent, report.failed), (1, 2));
    assert!(report.outcomes[0].is_settled());
    assert!(!report.outcomes[1].is_settled());
    // The rejected address is dropped; only the transient failure stays pending
    assert_eq!(feed.acked(), vec!["1-0", "3-0"]);
    assert_eq!(feed.pending_ids(), vec!["2-0"]);
}

#[tokio::test]
async fn test_run_redelivers_until_sent_and_stops_on_shutdown() {
    let channel = Arc::new(RecordingEmailChannel::new());
    channel.set_fail_all(true);
    let dispatcher = Arc::new(dispatcher(channel.clone()));

    let feed = Arc::new(ScriptedChangeFeed::new());
    feed.push("1-0", created("T1", "482913", "a@b.com"));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = {
        let dispatcher = dispatcher.clone();
        let feed = feed.clone();
        tokio::spawn(async move { dispatcher.run(feed, shutdown_rx).await })
    };

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(channel.sent().is_empty());
    assert_eq!(feed.pending_ids(), vec!["1-0"]);

    channel.set_fail_all(false);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(channel.sent().len(), 1);
    assert!(feed.pending_ids().is_empty());
    assert_eq!(feed.acked(), vec!["1-0"]);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("dispatcher did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_run_backs_off_when_feed_fails() {
    let channel = Arc::new(RecordingEmailChannel::new());
    let dispatcher = dispatcher(channel);

    let feed = Arc::new(ScriptedChangeFeed::new());
    feed.set_fail_polls(true);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let run = dispatcher.run(feed.clone(), shutdown_rx);
    let stop = async {
        tokio::time::sleep(Duration::from_millis(250)).await;
        shutdown_tx.send(true).unwrap();
    };
    tokio::join!(run, stop);

    // One poll per 100ms interval, not a busy loop
    assert!(feed.poll_count() <= 4, "polled {} times", feed.poll_count());
}

#[tokio::test]
async fn test_run_stops_when_sender_dropped() {
    let channel = Arc::new(RecordingEmailChannel::new());
    let dispatcher = dispatcher(channel);
    let feed = Arc::new(ScriptedChangeFeed::new());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    drop(shutdown_tx);

    tokio::time::timeout(Duration::from_secs(1), dispatcher.run(feed, shutdown_rx))
        .await
        .expect("dispatcher did not stop");
}
