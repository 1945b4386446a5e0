//! Application factory
//!
//! Builds the Actix-web application around an already wired `AppState`.

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use otp_core::repositories::OtpRecordRepository;
use otp_shared::errors::{error_codes, ErrorResponse};

use crate::handlers::json_error_handler;
use crate::middleware::create_cors;
use crate::routes::otp::{issue_otp, verify_otp, AppState};

/// Create and configure the application with all dependencies
pub fn create_app<R>(
    app_state: web::Data<AppState<R>>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    R: OtpRecordRepository + ?Sized + 'static,
{
    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        // Registration order: CORS runs inside the tracing span
        .wrap(create_cors())
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check::<R>))
        .service(
            web::scope("/api/v1")
                .route("/otp", web::post().to(issue_otp::<R>))
                .route("/otp/verify", web::post().to(verify_otp::<R>)),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
///
/// Reports 503 while the record store is unreachable.
async fn health_check<R>(state: web::Data<AppState<R>>) -> HttpResponse
where
    R: OtpRecordRepository + ?Sized + 'static,
{
    let body = |status: &str| {
        serde_json::json!({
            "status": status,
            "service": "otp-relay-api",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })
    };

    match state.verification.store_health().await {
        Ok(()) => HttpResponse::Ok().json(body("healthy")),
        Err(e) => {
            tracing::warn!(error = %e, event = "health_check_failed", "Record store unreachable");
            let mut body = body("unhealthy");
            body["error"] = serde_json::json!(error_codes::SERVICE_UNAVAILABLE);
            HttpResponse::ServiceUnavailable().json(body)
        }
    }
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
