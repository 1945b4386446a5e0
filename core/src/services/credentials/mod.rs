//! Random credential generation for session tokens and passcodes.

mod generator;

pub use generator::{generate, generate_otp, generate_session_token, Alphabet};
