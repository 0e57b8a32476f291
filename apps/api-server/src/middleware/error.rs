//! Error handling - maps domain failures onto the JSON error body.

use actix_web::{HttpRequest, HttpResponse, ResponseError, error, http::StatusCode};
use uuid::Uuid;
use validator::ValidationErrors;

use agora_core::DomainError;
use agora_core::ports::AuthError;
use agora_shared::{ErrorResponse, FieldError};

pub const SERVER_ERROR: &str = "Server error";
pub const INVALID_TOKEN: &str = "Invalid token";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Application-level error type rendered as `{message, errors?, reference?}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// The cause is logged under `reference` and never sent to the client.
    #[error("{message}")]
    Internal { message: String, reference: Uuid },
}

impl AppError {
    pub fn validation(errors: &ValidationErrors, location: &str) -> Self {
        let body = ErrorResponse::validation(errors, location);
        AppError::Validation(body.errors.unwrap_or_default())
    }

    /// Log `cause` and return an opaque internal error.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        let reference = Uuid::new_v4();
        tracing::error!(reference = %reference, error = %cause, "Internal error");
        AppError::Internal {
            message: SERVER_ERROR.to_string(),
            reference,
        }
    }

    /// Replace the client-facing message of an internal error.
    pub fn or_internal(self, message: &str) -> Self {
        match self {
            AppError::Internal { reference, .. } => AppError::Internal {
                message: message.to_string(),
                reference,
            },
            other => other,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(errors) => {
                ErrorResponse::new(self.to_string()).with_errors(errors.clone())
            }
            AppError::Internal { message, reference } => {
                ErrorResponse::new(message.clone()).with_reference(*reference)
            }
            other => ErrorResponse::new(other.to_string()),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Unauthorized(INVALID_CREDENTIALS.to_string()),
            AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                tracing::debug!(error = %err, "Token rejected");
                AppError::Unauthorized(INVALID_TOKEN.to_string())
            }
            AuthError::MissingAuth => {
                AppError::Unauthorized("Not authorized, no token".to_string())
            }
            AuthError::HashingError(_) | AuthError::SigningError(_) => AppError::internal(err),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => AppError::NotFound(err.to_string()),
            DomainError::Validation(msg) | DomainError::Conflict(msg) => AppError::BadRequest(msg),
            DomainError::Forbidden(msg) => AppError::Forbidden(msg),
            DomainError::Auth(auth) => auth.into(),
            DomainError::Store(_) => AppError::internal(err),
        }
    }
}

/// Malformed JSON bodies become 400s with the common error body.
pub fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected request body");
    AppError::BadRequest(format!("Invalid request body: {err}")).into()
}

/// Unparsable query strings become 400s with the common error body.
pub fn query_error_handler(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected query string");
    AppError::BadRequest(format!("Invalid query string: {err}")).into()
}

/// Unparsable path segments (e.g. a non-UUID id) become 400s.
pub fn path_error_handler(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected path parameter");
    AppError::BadRequest("Invalid id".to_string()).into()
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
