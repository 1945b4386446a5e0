use actix_web::{web, HttpResponse};
use validator::Validate;

use otp_core::errors::DomainError;
use otp_core::repositories::OtpRecordRepository;

use crate::dto::otp::{IssueOtpRequest, IssueOtpResponse};
use crate::handlers::error::{domain_error_response, Operation};

use super::AppState;

/// Handler for POST /api/v1/otp
///
/// Generates a passcode for the given address and stores it. The email is
/// sent asynchronously by the notification dispatcher once the store reports
/// the new record.
///
/// # Request Body
///
/// ```json
/// { "email": "user@example.com" }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "message": "OTP generated", "data": { "token": "aB3dE5..." } }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Body is not valid JSON
/// - 422 Unprocessable Entity: Email missing or not a valid address
/// - 500 Internal Server Error: The record could not be stored
pub async fn issue_otp<R>(
    state: web::Data<AppState<R>>,
    request: web::Json<IssueOtpRequest>,
) -> HttpResponse
where
    R: OtpRecordRepository + ?Sized + 'static,
{
    let request = request.into_inner();
    if request.validate().is_err() {
        return domain_error_response(
            Operation::Issue,
            &DomainError::invalid_input("email", "required"),
        );
    }
    let email = request.email.unwrap_or_default();

    match state.issuance.issue(email.trim()).await {
        Ok(issued) => HttpResponse::Ok().json(IssueOtpResponse::new(issued.session_token)),
        Err(e) => domain_error_response(Operation::Issue, &e),
    }
}
