//! Result types for the notification dispatcher

use crate::errors::NotificationError;

/// Why an event was not turned into an email
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Only record creations trigger a notification
    NotACreation,
    /// The event image lacks the passcode or the recipient
    MissingAttribute,
    /// The recipient is not a deliverable address; redelivery would not help
    InvalidRecipient,
}

/// Result of handling a single change event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent { message_id: String },
    Skipped(SkipReason),
    Failed(NotificationError),
}

impl DispatchOutcome {
    /// Whether the event is finished with and may be acknowledged on the feed
    ///
    /// Permanent send failures are settled: redelivery would fail the same way.
    pub fn is_settled(&self) -> bool {
        match self {
            DispatchOutcome::Failed(e) => e.is_permanent(),
            _ => true,
        }
    }
}

/// Outcomes across a batch of events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
    /// One outcome per event, in batch order
    pub outcomes: Vec<DispatchOutcome>,
}

impl BatchReport {
    pub fn record(&mut self, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Sent { .. } => self.sent += 1,
            DispatchOutcome::Skipped(_) => self.skipped += 1,
            DispatchOutcome::Failed(_) => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.sent + self.skipped + self.failed
    }
}
