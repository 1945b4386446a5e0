//! CORS middleware configuration for cross-origin requests.
//!
//! The passcode endpoints are called from browser front ends on arbitrary
//! origins, so every response carries `Access-Control-Allow-Origin: *`.
//! Credentials are never allowed with the wildcard.

use actix_cors::Cors;
use actix_web::http::{header, Method};

/// Preflight cache lifetime in seconds
const MAX_AGE: usize = 3600;

/// Creates the CORS middleware
pub fn create_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .max_age(MAX_AGE)
}
