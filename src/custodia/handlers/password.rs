//! Standalone password policy check endpoint.

use axum::{extract::Extension, response::IntoResponse, Json};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::custodia::{
    error::{AuthError, InvalidInputReason},
    state::AuthState,
};

use super::SuccessResponse;

#[derive(ToSchema, Deserialize, Debug)]
pub struct PasswordCheck {
    pub password: String,
    /// Optional second field for two-field forms; must match when present.
    pub verification: Option<String>,
}

#[utoipa::path(
    post,
    path = "/auth/password-check",
    request_body = PasswordCheck,
    responses(
        (status = 200, description = "Password passes policy", body = SuccessResponse),
        (status = 406, description = "Password rejected with reason code")
    ),
    tag = "auth"
)]
pub async fn password_check(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<PasswordCheck>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(check)) = payload else {
        return Err(AuthError::InvalidPassword(InvalidInputReason::Generic));
    };

    if let Some(verification) = &check.verification {
        if !state.policy().matches(&check.password, verification) {
            return Err(AuthError::InvalidPassword(InvalidInputReason::NotMatching));
        }
    }

    state
        .policy()
        .validate(&check.password)
        .map_err(AuthError::InvalidPassword)?;

    Ok(Json(SuccessResponse::new(
        "auth.password_ok",
        "Password seems to be valid",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custodia::password::{PasswordHasher, PasswordPolicy};
    use crate::custodia::state::AuthConfig;
    use crate::custodia::token::TokenSigner;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use secrecy::SecretString;

    fn auth_state() -> Arc<AuthState> {
        Arc::new(AuthState::new(
            AuthConfig::new("http://localhost:8080".to_string()),
            TokenSigner::new(SecretString::from("test-secret".to_string())),
            PasswordHasher::new(true),
            PasswordPolicy::new(),
        ))
    }

    fn check(password: &str, verification: Option<&str>) -> Option<Json<PasswordCheck>> {
        Some(Json(PasswordCheck {
            password: password.to_string(),
            verification: verification.map(str::to_string),
        }))
    }

    #[tokio::test]
    async fn accepts_valid_password() {
        let response = password_check(Extension(auth_state()), check("correct-horse-1", None))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn accepts_matching_verification() {
        let response = password_check(
            Extension(auth_state()),
            check("correct-horse-1", Some("correct-horse-1")),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn rejects_short_password_with_reason() {
        let response = password_check(Extension(auth_state()), check("ab1", None))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            value.get("error").and_then(serde_json::Value::as_str),
            Some("auth_error.invalid_password")
        );
        assert!(value
            .get("reason")
            .and_then(serde_json::Value::as_str)
            .is_some_and(|reason| reason.contains("too short")));
    }

    #[tokio::test]
    async fn rejects_mismatched_verification() {
        let response = password_check(
            Extension(auth_state()),
            check("correct-horse-1", Some("other-horse-1")),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    }

    #[tokio::test]
    async fn rejects_missing_payload() {
        let response = password_check(Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    }
}
