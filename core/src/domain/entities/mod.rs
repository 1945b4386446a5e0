//! Domain entities representing core business objects.

mod otp_record;


// Re-export commonly used types
pub use otp_record::{
    identity_key, is_well_formed_pair, OtpRecord, IDENTITY_KEY_SEPARATOR, SESSION_TOKEN_LENGTH,
};
