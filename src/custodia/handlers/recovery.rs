//! Password recovery flow.
//!
//! The flow is stateless across requests: everything a recovery needs
//! (target user, purpose, optional redirect, expiry) rides inside the
//! signed token carried by the emailed link. Nothing is persisted between
//! starting a recovery and finishing it.

use axum::{
    extract::{Extension, FromRequest, Query, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::custodia::{
    email::{EmailMessage, Mailer},
    error::{AuthError, InvalidInputReason},
    state::AuthState,
    store::users,
    templates, token,
    token::{unix_now, TokenPayload, TokenPurpose},
};

use super::{valid_email, SuccessResponse};

#[derive(ToSchema, Deserialize, Debug)]
pub struct EmailConfirmation {
    pub email: String,
    /// Where to send the user after a finished recovery; also used as the
    /// link target instead of the built-in input form when provided.
    #[serde(rename = "targetUri")]
    pub target_uri: Option<String>,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct PasswordInput {
    pub password: String,
    pub verification: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct RecoveryQuery {
    pub token: Option<String>,
}

#[utoipa::path(
    post,
    path = "/auth/start-recovery",
    request_body = EmailConfirmation,
    responses(
        (status = 201, description = "Recovery email sent", body = SuccessResponse),
        (status = 404, description = "Unknown email"),
        (status = 500, description = "Email failed to send")
    ),
    tag = "recovery"
)]
pub async fn start_recovery(
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    mailer: Extension<Arc<dyn Mailer>>,
    payload: Option<Json<EmailConfirmation>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(recovery)) = payload else {
        return Err(AuthError::InvalidEmail);
    };
    if !valid_email(&recovery.email) {
        return Err(AuthError::InvalidEmail);
    }

    // An unknown address is reported as an explicit 404. This leaks
    // account existence; an opaque 201 would harden it at the cost of
    // feedback to legitimate users.
    let user = users::find_by_email(&pool, &recovery.email)
        .await?
        .ok_or(AuthError::NotFound)?;

    let payload = TokenPayload::new(
        user.id,
        TokenPurpose::PasswordRecovery,
        recovery.target_uri.clone(),
        unix_now(),
        state.config().recovery_token_ttl_seconds(),
    );
    let recovery_token = state.signer().sign(&payload).map_err(|err| {
        error!("failed to sign recovery token: {err}");
        AuthError::ServerError
    })?;

    let input_link = recovery
        .target_uri
        .unwrap_or_else(|| state.config().input_recovery_url());
    let link = format!("{input_link}?token={recovery_token}");

    let (text, html) = templates::recovery_email(&link);
    let message = EmailMessage {
        from: state.config().mail_from().to_string(),
        to: user.email,
        subject: "Password recovery".to_string(),
        text,
        html: Some(html),
    };

    if let Err(err) = mailer.send(&message) {
        error!("failed to dispatch recovery email: {err:#}");
        return Err(AuthError::EmailFailedToSend);
    }

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(
            "auth.recovery_sent",
            "Password recovery email has been sent",
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/auth/input-recovery",
    params(
        ("token" = String, Query, description = "Signed recovery token")
    ),
    responses(
        (status = 200, description = "Recovery form", content_type = "text/html"),
        (status = 401, description = "Invalid or expired token"),
        (status = 404, description = "User no longer exists")
    ),
    tag = "recovery"
)]
pub async fn input_recovery(
    Query(query): Query<RecoveryQuery>,
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, AuthError> {
    let token = query.token.ok_or(AuthError::AuthenticationFailed)?;
    let payload = verify_recovery_token(&state, &token)?;

    let user = users::find_by_id(&pool, payload.user_id)
        .await?
        .ok_or(AuthError::NotFound)?;

    let action = format!("/auth/finish-recovery?token={token}");
    Ok(Html(templates::recovery_form(&user.email, &action)))
}

#[utoipa::path(
    post,
    path = "/auth/finish-recovery",
    params(
        ("token" = String, Query, description = "Signed recovery token")
    ),
    request_body = PasswordInput,
    responses(
        (status = 200, description = "Password changed (confirmation page)", content_type = "text/html"),
        (status = 303, description = "Password changed (redirect to embedded target)"),
        (status = 401, description = "Invalid or expired token"),
        (status = 404, description = "User no longer exists"),
        (status = 406, description = "New password rejected by policy")
    ),
    tag = "recovery"
)]
pub async fn finish_recovery(
    Query(query): Query<RecoveryQuery>,
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    request: Request,
) -> Result<Response, AuthError> {
    let token = query.token.ok_or(AuthError::AuthenticationFailed)?;
    let payload = verify_recovery_token(&state, &token)?;

    let input = read_password_input(request).await?;

    let user = users::find_by_id(&pool, payload.user_id)
        .await?
        .ok_or(AuthError::NotFound)?;

    // A rejected password stops the flow here, before anything is
    // written, so the caller never sees a success-looking response for a
    // failed recovery.
    if let Some(verification) = &input.verification {
        if !state.policy().matches(&input.password, verification) {
            return Err(AuthError::InvalidPassword(InvalidInputReason::NotMatching));
        }
    }
    state
        .policy()
        .validate(&input.password)
        .map_err(AuthError::InvalidPassword)?;

    let credential = state.hasher().hash(&input.password)?;
    users::update_password(&pool, user.id, &credential).await?;

    match payload.redirect_uri.as_deref() {
        Some(redirect_uri) if !redirect_uri.is_empty() => {
            Ok(Redirect::to(redirect_uri).into_response())
        }
        _ => Ok(Html(templates::info_page(
            "Success",
            "Your password has been changed",
        ))
        .into_response()),
    }
}

/// Map token verification failures onto the HTTP error taxonomy:
/// malformed or forged tokens read as a missing credential, while expiry
/// and purpose mismatch stay distinguishable.
fn verify_recovery_token(state: &AuthState, token: &str) -> Result<TokenPayload, AuthError> {
    state
        .signer()
        .verify(token, TokenPurpose::PasswordRecovery, unix_now())
        .map_err(|err| match err {
            token::Error::Expired => AuthError::Expired,
            token::Error::PurposeMismatch => AuthError::InvalidToken,
            _ => AuthError::AuthenticationFailed,
        })
}

/// Accept the new password as JSON or as a classic web form post.
async fn read_password_input(request: Request) -> Result<PasswordInput, AuthError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("application/json") {
        let Json(input) = Json::<PasswordInput>::from_request(request, &())
            .await
            .map_err(|_| AuthError::InvalidPassword(InvalidInputReason::Generic))?;
        Ok(input)
    } else {
        let Form(input) = Form::<PasswordInput>::from_request(request, &())
            .await
            .map_err(|_| AuthError::InvalidPassword(InvalidInputReason::Generic))?;
        Ok(input)
    }
}
