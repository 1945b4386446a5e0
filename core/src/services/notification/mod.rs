//! Email notification for newly created passcode records.
//!
//! The dispatcher consumes the record store's change feed. Each delivery is
//! handled on its own: a failed send never affects other deliveries, and
//! deliveries that were not handled stay on the feed for redelivery.

mod dispatcher;
mod template;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use dispatcher::NotificationDispatcher;
pub use template::{OtpEmail, OtpEmailTemplate};
pub use traits::EmailChannel;
pub use types::{BatchReport, DispatchOutcome, SkipReason};
