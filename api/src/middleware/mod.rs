//! Middleware components for the API server

pub mod cors;

pub use cors::create_cors;
