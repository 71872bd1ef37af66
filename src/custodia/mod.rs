//! Server wiring: pool, router, middleware, and graceful shutdown.

use crate::cli::globals::GlobalArgs;
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::get,
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod email;
pub mod error;
pub mod handlers;
pub mod password;
pub mod state;
pub mod store;
pub mod templates;
pub mod token;

mod openapi;

pub use self::openapi::ApiDoc;

use self::email::Mailer;
use self::handlers::{
    auth, health, logout, password as password_check, recovery, token as token_exchange,
};
use self::password::{PasswordHasher, PasswordPolicy};
use self::state::{AuthConfig, AuthState};
use self::token::TokenSigner;

/// Build the application router.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/auth", get(auth::login_header).post(auth::login_body))
        .route(
            "/token",
            get(token_exchange::exchange_header).post(token_exchange::exchange_body),
        )
        .route(
            "/logout",
            get(logout::logout_header).post(logout::logout_body),
        )
        .route(
            "/logout/all",
            get(logout::logout_all_header).post(logout::logout_all_body),
        )
        .route(
            "/auth/password-check",
            axum::routing::post(password_check::password_check),
        )
        .route(
            "/auth/start-recovery",
            axum::routing::post(recovery::start_recovery),
        )
        .route("/auth/input-recovery", get(recovery::input_recovery))
        .route(
            "/auth/finish-recovery",
            axum::routing::post(recovery::finish_recovery),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    dsn: String,
    globals: &GlobalArgs,
    config: AuthConfig,
    mailer: Arc<dyn Mailer>,
) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    // The signing secret and hashing mode live for the whole process.
    let auth_state = Arc::new(AuthState::new(
        config,
        TokenSigner::new(globals.signing_secret.clone()),
        PasswordHasher::new(globals.hashing_enabled),
        PasswordPolicy::new(),
    ));

    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    let app = router()
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &Request<Body>| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(auth_state))
                .layer(Extension(mailer))
                .layer(Extension(pool)),
        );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
