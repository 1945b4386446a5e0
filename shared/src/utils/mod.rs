//! Common utility functions

pub mod validation;

// Re-export commonly used utilities
pub use validation::{is_valid_email, mask_email};
