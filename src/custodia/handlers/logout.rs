//! Logout endpoints: revoke one permanent token, or every token the
//! presenting user owns.

use axum::{extract::Extension, http::HeaderMap, response::IntoResponse, Json};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::debug;
use utoipa::ToSchema;

use crate::custodia::{error::AuthError, store::tokens};

use super::{authorization_value, SuccessResponse};

#[derive(ToSchema, Deserialize, Debug)]
pub struct LogoutRequest {
    pub token: String,
}

#[utoipa::path(
    get,
    path = "/logout",
    params(
        ("Authorization" = String, Header, description = "Permanent token")
    ),
    responses(
        (status = 200, description = "Token revoked", body = SuccessResponse),
        (status = 401, description = "Authentication failed")
    ),
    tag = "auth"
)]
pub async fn logout_header(
    headers: HeaderMap,
    pool: Extension<PgPool>,
) -> Result<impl IntoResponse, AuthError> {
    let token = authorization_value(&headers).ok_or(AuthError::AuthenticationFailed)?;

    logout(&pool, &token).await
}

#[utoipa::path(
    post,
    path = "/logout",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Token revoked", body = SuccessResponse),
        (status = 401, description = "Authentication failed")
    ),
    tag = "auth"
)]
pub async fn logout_body(
    pool: Extension<PgPool>,
    payload: Option<Json<LogoutRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::AuthenticationFailed);
    };

    logout(&pool, &request.token).await
}

#[utoipa::path(
    get,
    path = "/logout/all",
    params(
        ("Authorization" = String, Header, description = "Permanent token")
    ),
    responses(
        (status = 200, description = "All tokens revoked", body = SuccessResponse),
        (status = 401, description = "Authentication failed")
    ),
    tag = "auth"
)]
pub async fn logout_all_header(
    headers: HeaderMap,
    pool: Extension<PgPool>,
) -> Result<impl IntoResponse, AuthError> {
    let token = authorization_value(&headers).ok_or(AuthError::AuthenticationFailed)?;

    logout_all(&pool, &token).await
}

#[utoipa::path(
    post,
    path = "/logout/all",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "All tokens revoked", body = SuccessResponse),
        (status = 401, description = "Authentication failed")
    ),
    tag = "auth"
)]
pub async fn logout_all_body(
    pool: Extension<PgPool>,
    payload: Option<Json<LogoutRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::AuthenticationFailed);
    };

    logout_all(&pool, &request.token).await
}

/// Revoke the presented token only.
async fn logout(pool: &PgPool, token: &str) -> Result<Json<SuccessResponse>, AuthError> {
    let removed = tokens::delete(pool, token).await?;
    if removed == 0 {
        return Err(AuthError::AuthenticationFailed);
    }

    Ok(Json(SuccessResponse::new(
        "auth.logged_out",
        "Token has been revoked",
    )))
}

/// Resolve the owning user from the presented token, then revoke every
/// token the user owns. Presenting one valid token is enough to revoke
/// all of them.
async fn logout_all(pool: &PgPool, token: &str) -> Result<Json<SuccessResponse>, AuthError> {
    let permanent = tokens::find(pool, token)
        .await?
        .ok_or(AuthError::AuthenticationFailed)?;

    let removed = tokens::delete_all(pool, permanent.user_id).await?;
    debug!(count = removed, "revoked permanent tokens");

    Ok(Json(SuccessResponse::new(
        "auth.logged_out",
        "All active tokens have been revoked",
    )))
}
