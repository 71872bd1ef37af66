//! OpenAPI document assembly.

use utoipa::OpenApi;

use crate::custodia::{
    error::ErrorResponse,
    handlers::{auth, health, logout, password, recovery, token, SuccessResponse},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "custodia",
        description = "Authentication and password recovery service"
    ),
    paths(
        health::health,
        auth::login_header,
        auth::login_body,
        token::exchange_header,
        token::exchange_body,
        logout::logout_header,
        logout::logout_body,
        logout::logout_all_header,
        logout::logout_all_body,
        password::password_check,
        recovery::start_recovery,
        recovery::input_recovery,
        recovery::finish_recovery,
    ),
    components(schemas(
        health::Health,
        auth::Login,
        auth::LoginResponse,
        token::TokenRequest,
        token::TokenResponse,
        logout::LogoutRequest,
        password::PasswordCheck,
        recovery::EmailConfirmation,
        recovery::PasswordInput,
        SuccessResponse,
        ErrorResponse,
    )),
    tags(
        (name = "auth", description = "Login, token exchange and logout"),
        (name = "recovery", description = "Password recovery flow"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
