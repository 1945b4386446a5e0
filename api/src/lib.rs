//! HTTP surface for the OTP relay: passcode issuance and verification routes,
//! plus the application factory used by the binary and the integration tests.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::create_app;
pub use routes::otp::AppState;
