//! Mapping of domain errors and request-parsing failures to HTTP responses

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{HttpRequest, HttpResponse};

use otp_core::errors::DomainError;
use otp_shared::errors::{error_codes, MessageResponse};

/// Endpoint an error occurred in; the response messages differ per endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Issue,
    Verify,
}

impl Operation {
    fn invalid_input_response(&self) -> HttpResponse {
        match self {
            Operation::Issue => HttpResponse::UnprocessableEntity().json(
                MessageResponse::new("Required field email not found or invalid")
                    .with_error(error_codes::VALIDATION_ERROR),
            ),
            Operation::Verify => HttpResponse::BadRequest().json(
                MessageResponse::new("Missing sessionToken or otp")
                    .with_error(error_codes::VALIDATION_ERROR),
            ),
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Operation::Issue => "OTP generation failed",
            Operation::Verify => "OTP verification failed",
        }
    }
}

/// Convert a domain error into the response for `operation`
pub fn domain_error_response(operation: Operation, error: &DomainError) -> HttpResponse {
    match error {
        DomainError::InvalidInput { .. } => operation.invalid_input_response(),
        DomainError::Storage(e) => {
            tracing::error!(error = %e, retryable = e.is_retryable(), "Record store failure");
            HttpResponse::InternalServerError().json(
                MessageResponse::new(operation.failure_message()).with_error(error_codes::STORE_ERROR),
            )
        }
    }
}

/// Response for a body that is not valid JSON for the endpoint
pub fn invalid_body_response() -> HttpResponse {
    HttpResponse::BadRequest()
        .json(MessageResponse::new("Invalid request body").with_error(error_codes::BAD_REQUEST))
}

/// `JsonConfig` error handler
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %error, "Rejected unparsable request body");
    InternalError::from_response(error, invalid_body_response()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use otp_core::errors::StoreError;

    #[test]
    fn test_invalid_input_status_per_operation() {
        let error = DomainError::invalid_input("email", "bad");

        assert_eq!(
            domain_error_response(Operation::Issue, &error).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            domain_error_response(Operation::Verify, &error).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_storage_error_is_server_error() {
        let error = DomainError::Storage(StoreError::Timeout {
            operation: "get".to_string(),
            timeout_ms: 3000,
        });

        assert_eq!(
            domain_error_response(Operation::Verify, &error).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_body_is_bad_request() {
        assert_eq!(invalid_body_response().status(), StatusCode::BAD_REQUEST);
    }
}
