//! Error taxonomy for the authentication and recovery endpoints.
//!
//! Every failure is a typed value carrying a stable identifier, an HTTP
//! status, and a human-readable reason. Clients key off the identifier;
//! the reason text may change freely.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Reason a password (or similar input) was rejected by policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInputReason {
    #[error("Password is invalid")]
    Generic,
    #[error("Value is too short")]
    TooShort,
    #[error("Value doesn't match its verification")]
    NotMatching,
    #[error("Value needs additional special characters")]
    NeedsSpecialCharacters,
    #[error("Value needs numbers")]
    NeedsNumericCharacters,
    #[error("{0}")]
    Custom(String),
}

/// Authentication error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Bad or missing credentials or token
    #[error("Authentication has failed")]
    AuthenticationFailed,

    /// Signature valid but wrong purpose, or malformed payload
    #[error("Invalid token")]
    InvalidToken,

    /// Signature valid, clock past expiry
    #[error("Token has expired")]
    Expired,

    /// Email is invalid
    #[error("Invalid email")]
    InvalidEmail,

    /// Password rejected by policy
    #[error("Invalid password ({0})")]
    InvalidPassword(InvalidInputReason),

    /// Email dispatcher reported failure
    #[error("Failed to send email")]
    EmailFailedToSend,

    /// Resolved entity absent after a valid-looking token
    #[error("Not found")]
    NotFound,

    /// Server error
    #[error("Server error")]
    ServerError,
}

impl AuthError {
    /// Stable error code returned to clients.
    #[must_use]
    pub const fn identifier(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "auth_error.authentication_failed",
            Self::InvalidToken => "auth_error.invalid_token",
            Self::Expired => "auth_error.token_expired",
            Self::InvalidEmail => "auth_error.invalid_email",
            Self::InvalidPassword(_) => "auth_error.invalid_password",
            Self::EmailFailedToSend => "auth_error.email_failed_to_send",
            Self::NotFound => "auth_error.not_found",
            Self::ServerError => "auth_error.server_error",
        }
    }

    /// HTTP status code for the error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::AuthenticationFailed | Self::InvalidToken | Self::Expired => {
                StatusCode::UNAUTHORIZED
            }
            Self::InvalidEmail | Self::InvalidPassword(_) => StatusCode::NOT_ACCEPTABLE,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::EmailFailedToSend | Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Wire shape of a failed request.
#[derive(Serialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub reason: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.identifier().to_string(),
            reason: self.to_string(),
        });

        (self.status(), body).into_response()
    }
}

// Storage and other internal failures are logged at the call site and
// surfaced as an opaque ServerError so no detail leaks to clients.
impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("internal error: {err:#}");
        Self::ServerError
    }
}
