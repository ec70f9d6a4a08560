use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::auth::errors::AuthError;
use tracing::{error, warn};

/// Code for request bodies that could not be parsed at all.
pub const MALFORMED_BODY_CODE: u16 = 1000;

/// Error body returned to clients: a message that is safe to show plus the
/// stable code from [`AuthError::code`]. Internal detail only goes to the log.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: String,
    pub code: u16,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: u16, message: impl Into<String>) -> Self {
        Self { status, body: ErrorBody { message: message.into(), code } }
    }

    /// Map a service error. `failure` is the operation-level message used
    /// for 5xx responses, e.g. "Signup failed".
    pub fn from_auth(err: AuthError, failure: &str) -> Self {
        let code = err.code();
        let (status, message) = match &err {
            AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AuthError::Conflict => (StatusCode::BAD_REQUEST, "User already exists".to_string()),
            AuthError::NotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            AuthError::FederatedAccount => (StatusCode::BAD_REQUEST, "Please login using Google".to_string()),
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()),
            AuthError::TokenError(_) => (StatusCode::UNAUTHORIZED, "Google authentication failed".to_string()),
            AuthError::HashError(_) | AuthError::Repository(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, failure.to_string())
            }
        };
        if status.is_server_error() {
            error!(code, error = %err, "{failure}");
        } else {
            warn!(code, status = status.as_u16(), error = %err, "request rejected");
        }
        Self::new(status, code, message)
    }

    pub fn from_rejection(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "malformed request body");
        Self::new(StatusCode::BAD_REQUEST, MALFORMED_BODY_CODE, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
