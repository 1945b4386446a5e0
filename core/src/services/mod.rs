//! Business services containing domain logic and use cases.

pub mod clock;
pub mod credentials;
pub mod deadline;
pub mod issuance;
pub mod notification;
pub mod verification;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use issuance::{IssuanceService, IssuanceServiceConfig, IssuedOtp};
pub use notification::{
    BatchReport, DispatchOutcome, EmailChannel, NotificationDispatcher, OtpEmail, OtpEmailTemplate,
    SkipReason,
};
pub use verification::{VerificationOutcome, VerificationService, VerificationServiceConfig};
