//! Domain layer containing the passcode record entity and store change events.

pub mod entities;
pub mod events;

// Re-export commonly used domain types
pub use entities::*;
pub use events::*;
