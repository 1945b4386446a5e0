//! Change feed consumer that emails newly issued passcodes

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use otp_shared::utils::{is_valid_email, mask_email};

use crate::domain::events::{ChangeDelivery, ChangeEvent};
use crate::repositories::ChangeFeed;

use super::template::OtpEmailTemplate;
use super::traits::EmailChannel;
use super::types::{BatchReport, DispatchOutcome, SkipReason};

/// Sends one email per record creation event
pub struct NotificationDispatcher<E: EmailChannel + ?Sized> {
    channel: Arc<E>,
    template: OtpEmailTemplate,
    poll_interval: Duration,
}

impl<E: EmailChannel + ?Sized> NotificationDispatcher<E> {
    pub fn new(channel: Arc<E>, template: OtpEmailTemplate, poll_interval: Duration) -> Self {
        Self {
            channel,
            template,
            poll_interval,
        }
    }

    /// Handle a single change event
    ///
    /// Duplicate deliveries of the same event send duplicate emails.
    pub async fn dispatch(&self, event: &ChangeEvent) -> DispatchOutcome {
        if !event.is_creation() {
            tracing::debug!(kind = %event.kind, event = "notification_skipped", "Ignoring non-creation event");
            return DispatchOutcome::Skipped(SkipReason::NotACreation);
        }

        let image = event.new_image.as_ref();
        let otp = image.and_then(|i| i.otp.as_deref()).filter(|v| !v.is_empty());
        let email = image.and_then(|i| i.email.as_deref()).filter(|v| !v.is_empty());

        let (Some(otp), Some(email)) = (otp, email) else {
            tracing::warn!(
                has_otp = otp.is_some(),
                has_email = email.is_some(),
                event = "notification_skipped",
                "Creation event is missing required attributes"
            );
            return DispatchOutcome::Skipped(SkipReason::MissingAttribute);
        };

        if !is_valid_email(email) {
            tracing::warn!(
                email = %mask_email(email),
                event = "notification_skipped",
                "Creation event carries an undeliverable address"
            );
            return DispatchOutcome::Skipped(SkipReason::InvalidRecipient);
        }

        let message = self.template.render(otp);
        match self
            .channel
            .send(email, &message.subject, &message.html_body)
            .await
        {
            Ok(message_id) => {
                tracing::info!(
                    email = %mask_email(email),
                    provider = self.channel.provider_name(),
                    message_id = %message_id,
                    event = "notification_sent",
                    "Passcode email sent"
                );
                DispatchOutcome::Sent { message_id }
            }
            Err(e) => {
                tracing::error!(
                    email = %mask_email(email),
                    provider = self.channel.provider_name(),
                    error = %e,
                    permanent = e.is_permanent(),
                    event = "notification_failed",
                    "Failed to send passcode email"
                );
                DispatchOutcome::Failed(e)
            }
        }
    }

    /// Handle a batch of events, isolating failures per event
    pub async fn dispatch_batch<'a, I>(&self, events: I) -> BatchReport
    where
        I: IntoIterator<Item = &'a ChangeEvent>,
    {
        let mut report = BatchReport::default();
        for event in events {
            report.record(self.dispatch(event).await);
        }
        report
    }

    /// Handle feed deliveries and acknowledge every settled one
    ///
    /// Transient failures are left unacknowledged so the feed hands them out again.
    pub async fn handle_deliveries<F>(&self, feed: &F, deliveries: Vec<ChangeDelivery>) -> BatchReport
    where
        F: ChangeFeed + ?Sized,
    {
        let events: Vec<&ChangeEvent> = deliveries.iter().map(|d| &d.event).collect();
        let report = self.dispatch_batch(events).await;

        for (delivery, outcome) in deliveries.iter().zip(&report.outcomes) {
            if !outcome.is_settled() {
                continue;
            }
            if let Err(e) = feed.acknowledge(&delivery.delivery_id).await {
                tracing::warn!(
                    delivery_id = %delivery.delivery_id,
                    error = %e,
                    event = "delivery_ack_failed",
                    "Failed to acknowledge delivery; it will be redelivered"
                );
            }
        }
        report
    }

    /// Consume the change feed until `shutdown` turns true or its sender is dropped
    pub async fn run<F>(&self, feed: Arc<F>, mut shutdown: watch::Receiver<bool>)
    where
        F: ChangeFeed + ?Sized,
    {
        tracing::info!(
            provider = self.channel.provider_name(),
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            event = "dispatcher_started",
            "Notification dispatcher started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let polled = tokio::select! {
                polled = feed.poll() => polled,
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            };

            let idle = match polled {
                Ok(deliveries) if deliveries.is_empty() => true,
                Ok(deliveries) => {
                    let report = self.handle_deliveries(feed.as_ref(), deliveries).await;
                    tracing::debug!(
                        total = report.total(),
                        sent = report.sent,
                        skipped = report.skipped,
                        failed = report.failed,
                        event = "dispatch_batch_completed",
                        "Processed change feed batch"
                    );
                    // Back off while the channel is failing every delivery
                    report.failed == report.total()
                }
                Err(e) => {
                    tracing::warn!(error = %e, event = "feed_poll_failed", "Failed to poll change feed");
                    true
                }
            };

            if idle {
                tokio::select! {
                    _ = tokio::time::sleep(self.poll_interval) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }

        tracing::info!(event = "dispatcher_stopped", "Notification dispatcher stopped");
    }
}
