//! Token exchange: permanent token in, fresh signed access token out.

use axum::{extract::Extension, http::HeaderMap, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::custodia::{
    error::AuthError,
    state::AuthState,
    store::tokens,
    token::{unix_now, TokenPayload, TokenPurpose},
};

use super::authorization_value;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    /// Short-lived signed access token.
    pub access_token: String,
    /// Unix expiry of the access token.
    pub expires: i64,
}

#[utoipa::path(
    get,
    path = "/token",
    params(
        ("Authorization" = String, Header, description = "Permanent token")
    ),
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 401, description = "Authentication failed")
    ),
    tag = "auth"
)]
pub async fn exchange_header(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, AuthError> {
    let token = authorization_value(&headers).ok_or(AuthError::AuthenticationFailed)?;

    exchange(&pool, &state, &token).await
}

#[utoipa::path(
    post,
    path = "/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 401, description = "Authentication failed")
    ),
    tag = "auth"
)]
pub async fn exchange_body(
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<TokenRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::AuthenticationFailed);
    };

    exchange(&pool, &state, &request.token).await
}

async fn exchange(
    pool: &PgPool,
    state: &AuthState,
    token: &str,
) -> Result<Json<TokenResponse>, AuthError> {
    let permanent = tokens::find(pool, token)
        .await?
        .ok_or(AuthError::AuthenticationFailed)?;

    let payload = TokenPayload::new(
        permanent.user_id,
        TokenPurpose::Authentication,
        None,
        unix_now(),
        state.config().access_token_ttl_seconds(),
    );
    let access_token = state.signer().sign(&payload).map_err(|err| {
        tracing::error!("failed to sign access token: {err}");
        AuthError::ServerError
    })?;

    Ok(Json(TokenResponse {
        access_token,
        expires: payload.exp,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custodia::password::{PasswordHasher, PasswordPolicy};
    use crate::custodia::state::AuthConfig;
    use crate::custodia::token::TokenSigner;
    use anyhow::Result;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    fn auth_state() -> Arc<AuthState> {
        Arc::new(AuthState::new(
            AuthConfig::new("http://localhost:8080".to_string()),
            TokenSigner::new(SecretString::from("test-secret".to_string())),
            PasswordHasher::new(false),
            PasswordPolicy::new(),
        ))
    }

    #[tokio::test]
    async fn exchange_header_missing_header() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = exchange_header(HeaderMap::new(), Extension(pool), Extension(auth_state()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn exchange_body_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = exchange_body(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }
}
