#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::unused_async)]

//! # portfolio-secrets
//!
//! Small backend for a portfolio site: exchanges a static admin credential
//! pair for a short-lived session token, serves a fixed set of configured
//! secrets behind that token, and proxies chat messages to an OpenAI-style
//! completion API with a fixed system prompt.
//!
//! ## API surface
//!
//! | Method | Path                  | Auth   | Description                          |
//! |--------|-----------------------|--------|--------------------------------------|
//! | GET    | `/health`             | No     | Liveness probe                       |
//! | POST   | `/auth`               | No     | Credentials → session token          |
//! | GET    | `/api/secrets/openai` | Bearer | Completion API key                   |
//! | GET    | `/api/secrets/{name}` | Bearer | Named secret (`openai`, `firebase`)  |
//! | POST   | `/api/chat`           | Bearer | One message → one completion reply   |
//!
//! ## Architecture
//!
//! ```text
//! main.rs          entry point, clap CLI, tracing init, graceful shutdown
//! config.rs        TOML + .env + env-var configuration
//! error.rs         ApiError, the JSON {"error"} envelope
//! token.rs         HS256 session tokens (issue / validate)
//! auth.rs          bearer token middleware, constant-time comparison
//! secrets.rs       closed SecretName set, SecretStore lookup
//! chat/
//!   mod.rs         CompletionClient, wire types
//!   prompt.rs      compiled-in system prompt
//! state.rs         AppState built once from Config
//! routes/
//!   health.rs      GET /health
//!   auth.rs        POST /auth
//!   secrets.rs     GET /api/secrets/*
//!   chat.rs        POST /api/chat
//! ```

pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod routes;
pub mod secrets;
pub mod state;
pub mod token;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::{warn, Level};

pub use config::Config;
pub use error::ApiError;
pub use state::AppState;
pub use token::{Claims, TokenService};

/// Build the full application router.
///
/// Layers, outermost first: request tracing, CORS, then routing. The token
/// gate is a route layer on the `/api/*` group, so it only runs for matched
/// protected routes.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(routes::health::health))
        .route("/auth", post(routes::auth::login));

    let authed_routes = Router::new()
        .route("/api/secrets/openai", get(routes::secrets::openai_key))
        .route("/api/secrets/{name}", get(routes::secrets::get_secret))
        .route("/api/chat", post(routes::chat::chat))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ));

    let cors = cors_layer(&state.config.server.origins());

    Router::new()
        .merge(public_routes)
        .merge(authed_routes)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                )
                .layer(cors),
        )
        .with_state(state)
}

/// CORS for the given origins: GET/POST/OPTIONS, any request header,
/// credentials allowed. Origins that are not valid header values are skipped.
///
/// A `*` entry allows every origin. Credentials forbid a literal `*` in the
/// response, so the request origin is echoed back instead.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        warn!("CORS wildcard configured; every origin is allowed");
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {o:?}");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    // Credentials forbid the `*` header wildcard, so request headers are mirrored.
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
