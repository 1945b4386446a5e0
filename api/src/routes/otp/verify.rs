use actix_web::{web, HttpResponse};
use validator::Validate;

use otp_core::errors::DomainError;
use otp_core::repositories::OtpRecordRepository;
use otp_core::services::VerificationOutcome;
use otp_shared::errors::{error_codes, MessageResponse};

use crate::dto::otp::VerifyOtpRequest;
use crate::handlers::error::{domain_error_response, Operation};

use super::AppState;

/// Handler for POST /api/v1/otp/verify
///
/// # Request Body
///
/// ```json
/// { "sessionToken": "aB3dE5...", "otp": "482913" }
/// ```
///
/// # Response
/// - 200 OK: `OTP verified successfully`
/// - 400 Bad Request: `OTP expired`, a missing field, or an unparsable body
/// - 404 Not Found: `OTP not found`
/// - 500 Internal Server Error: The record store could not be read
pub async fn verify_otp<R>(
    state: web::Data<AppState<R>>,
    request: web::Json<VerifyOtpRequest>,
) -> HttpResponse
where
    R: OtpRecordRepository + ?Sized + 'static,
{
    let request = request.into_inner();
    if request.validate().is_err() {
        return domain_error_response(
            Operation::Verify,
            &DomainError::invalid_input("sessionToken", "sessionToken and otp are required"),
        );
    }
    let session_token = request.session_token.unwrap_or_default();
    let otp = request.otp.unwrap_or_default();

    match state.verification.verify(&session_token, &otp).await {
        Ok(VerificationOutcome::Verified) => {
            HttpResponse::Ok().json(MessageResponse::new("OTP verified successfully"))
        }
        Ok(VerificationOutcome::Expired) => HttpResponse::BadRequest()
            .json(MessageResponse::new("OTP expired").with_error(error_codes::OTP_EXPIRED)),
        Ok(VerificationOutcome::NotFound) => HttpResponse::NotFound()
            .json(MessageResponse::new("OTP not found").with_error(error_codes::OTP_NOT_FOUND)),
        Err(e) => domain_error_response(Operation::Verify, &e),
    }
}
