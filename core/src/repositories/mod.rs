//! Persistence traits implemented by the infrastructure layer.

pub mod change_feed;
pub mod otp_record;

pub use change_feed::ChangeFeed;
pub use otp_record::OtpRecordRepository;

#[cfg(test)]
pub use otp_record::MockOtpRecordRepository;
