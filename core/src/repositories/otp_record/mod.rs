pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;

pub use r#trait::OtpRecordRepository;

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub use mock::MockOtpRecordRepository;

#[cfg(test)]
mod tests;
