//! API error type that converts application errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::SignUpError;
use crate::domain::foundation::{AuthError, DomainError, ErrorCode};
use crate::domain::referral::ReferralError;

/// JSON error body: `{ "code": ..., "message": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unauthenticated() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "UNAUTHENTICATED",
            "Authentication required",
        )
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, "Request failed: {}", self.message);
        }
        let body = ErrorResponse {
            code: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::InvalidCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", message)
            }
            AuthError::UserAlreadyExists => {
                Self::new(StatusCode::CONFLICT, "USER_ALREADY_EXISTS", message)
            }
            AuthError::InvalidToken => Self::new(StatusCode::UNAUTHORIZED, "INVALID_TOKEN", message),
            AuthError::Rejected(reason) => {
                Self::new(StatusCode::BAD_REQUEST, "AUTH_REJECTED", reason)
            }
            AuthError::ServiceUnavailable(_) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "AUTH_UNAVAILABLE", message)
            }
        }
    }
}

impl From<SignUpError> for ApiError {
    fn from(err: SignUpError) -> Self {
        match err {
            SignUpError::InvalidReferralCode { message } => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_REFERRAL_CODE", message)
            }
            SignUpError::Auth(e) => e.into(),
        }
    }
}

impl From<ReferralError> for ApiError {
    fn from(err: ReferralError) -> Self {
        DomainError::from(err).into()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = match err.code {
            ErrorCode::ValidationFailed | ErrorCode::SelfReferral => StatusCode::BAD_REQUEST,
            ErrorCode::ProfileNotFound
            | ErrorCode::ReferralNotFound
            | ErrorCode::ReferralCodeNotFound => StatusCode::NOT_FOUND,
            ErrorCode::ProfileExists
            | ErrorCode::ReferralCodeExists
            | ErrorCode::ReferralCodeTaken
            | ErrorCode::ReferralExists
            | ErrorCode::InvalidStateTransition => StatusCode::CONFLICT,
            ErrorCode::ExternalServiceError => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let code = error_code_name(err.code);
        // Store details stay in the logs.
        let message = if status.is_server_error() {
            tracing::error!(code, "Store error: {}", err);
            "Something went wrong. Please try again later.".to_string()
        } else {
            err.message
        };
        Self::new(status, code, message)
    }
}

fn error_code_name(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::ValidationFailed => "VALIDATION_FAILED",
        ErrorCode::ProfileNotFound => "PROFILE_NOT_FOUND",
        ErrorCode::ReferralNotFound => "REFERRAL_NOT_FOUND",
        ErrorCode::ReferralCodeNotFound => "REFERRAL_CODE_NOT_FOUND",
        ErrorCode::ProfileExists => "PROFILE_EXISTS",
        ErrorCode::ReferralCodeExists => "REFERRAL_CODE_EXISTS",
        ErrorCode::ReferralCodeTaken => "REFERRAL_CODE_TAKEN",
        ErrorCode::ReferralExists => "REFERRAL_EXISTS",
        ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
        ErrorCode::SelfReferral => "SELF_REFERRAL",
        ErrorCode::ExternalServiceError => "EXTERNAL_SERVICE_ERROR",
        ErrorCode::DatabaseError => "DATABASE_ERROR",
        ErrorCode::InternalError => "INTERNAL_ERROR",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_referral_code_is_bad_request_with_message() {
        let err = ApiError::from(SignUpError::InvalidReferralCode {
            message: "Referral code not found or inactive".into(),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "INVALID_REFERRAL_CODE");
        assert_eq!(err.message, "Referral code not found or inactive");
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::UserAlreadyExists).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(AuthError::service_unavailable("down")).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn referral_errors_map_through_domain_codes() {
        assert_eq!(
            ApiError::from(ReferralError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ReferralError::SelfReferral).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ReferralError::AlreadyReferred).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn database_errors_hide_details() {
        let err = ApiError::from(DomainError::database("connection refused on 10.0.0.3"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("10.0.0.3"));
    }

    #[test]
    fn error_code_names_match_display() {
        for code in [
            ErrorCode::ValidationFailed,
            ErrorCode::ReferralCodeTaken,
            ErrorCode::ReferralExists,
            ErrorCode::SelfReferral,
            ErrorCode::DatabaseError,
        ] {
            assert_eq!(error_code_name(code), code.to_string());
        }
    }

    #[tokio::test]
    async fn response_body_has_code_and_message() {
        let response = ApiError::unauthenticated().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.code, "UNAUTHENTICATED");
        assert_eq!(body.message, "Authentication required");
    }
}
