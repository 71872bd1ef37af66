//! Login endpoints.
//!
//! Credentials arrive either as an `Authorization` header carrying base64
//! `email:password`, or as a JSON body. Both paths converge on the same
//! [`login`] call and the same failure kind.

use axum::{extract::Extension, http::HeaderMap, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use crate::custodia::{
    error::AuthError,
    state::AuthState,
    store::{tokens, users},
    token::{unix_now, TokenPayload, TokenPurpose},
};

use super::{authorization_value, decode_basic_credentials, valid_email};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    /// Long-lived permanent token; exchange it for access tokens.
    pub token: String,
    /// Short-lived signed access token.
    pub access_token: String,
    /// Unix expiry of the access token.
    pub expires: i64,
}

#[utoipa::path(
    get,
    path = "/auth",
    params(
        ("Authorization" = String, Header, description = "base64(email:password)")
    ),
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Authentication failed")
    ),
    tag = "auth"
)]
pub async fn login_header(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, AuthError> {
    let value = authorization_value(&headers).ok_or(AuthError::AuthenticationFailed)?;
    let (email, password) =
        decode_basic_credentials(&value).ok_or(AuthError::AuthenticationFailed)?;

    login(&pool, &state, Login { email, password }).await
}

#[utoipa::path(
    post,
    path = "/auth",
    request_body = Login,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Authentication failed")
    ),
    tag = "auth"
)]
pub async fn login_body(
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<Login>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(credentials)) = payload else {
        return Err(AuthError::AuthenticationFailed);
    };

    login(&pool, &state, credentials).await
}

/// Verify credentials, mint a permanent token, and sign an access token
/// bound to the authenticated user.
async fn login(
    pool: &PgPool,
    state: &AuthState,
    credentials: Login,
) -> Result<Json<LoginResponse>, AuthError> {
    if !valid_email(&credentials.email) {
        return Err(AuthError::AuthenticationFailed);
    }

    let user = users::find_by_email(pool, &credentials.email)
        .await?
        .ok_or(AuthError::AuthenticationFailed)?;

    let verified = state
        .hasher()
        .verify(&credentials.password, &user.password)?;
    if !verified {
        debug!("password mismatch");
        return Err(AuthError::AuthenticationFailed);
    }

    let permanent = tokens::create(pool, user.id).await?;

    let payload = TokenPayload::new(
        user.id,
        TokenPurpose::Authentication,
        None,
        unix_now(),
        state.config().access_token_ttl_seconds(),
    );
    let access_token = state.signer().sign(&payload).map_err(|err| {
        tracing::error!("failed to sign access token: {err}");
        AuthError::ServerError
    })?;

    Ok(Json(LoginResponse {
        token: permanent.token,
        access_token,
        expires: payload.exp,
    }))
}
