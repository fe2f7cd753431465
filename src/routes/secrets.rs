//! Secret retrieval endpoints (token-gated).
//!
//! - `GET /api/secrets/openai`: completion API key shortcut
//! - `GET /api/secrets/{name}`: any name in [`SecretName`]

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::secrets::{SecretError, SecretName};
use crate::token::Claims;
use crate::AppState;

#[derive(Serialize)]
pub struct SecretResponse {
    pub secret: String,
}

/// `GET /api/secrets/openai`.
///
/// # Errors
///
/// - `500 Internal Server Error`: key not configured
pub async fn openai_key(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SecretResponse>, ApiError> {
    respond(&state, &claims, SecretName::OpenAi.as_str())
}

/// `GET /api/secrets/{name}`.
///
/// # Errors
///
/// - `403 Forbidden`: `name` is not an allowed secret
/// - `500 Internal Server Error`: secret not configured
pub async fn get_secret(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(name): Path<String>,
) -> Result<Json<SecretResponse>, ApiError> {
    respond(&state, &claims, &name)
}

fn respond(state: &AppState, claims: &Claims, name: &str) -> Result<Json<SecretResponse>, ApiError> {
    info!(secret = %name, user = %claims.username, "Secret requested");
    match state.secrets.lookup(name) {
        Ok(value) => {
            info!(secret = %name, "Secret provided");
            Ok(Json(SecretResponse {
                secret: value.to_string(),
            }))
        }
        Err(e) => {
            match &e {
                SecretError::NotAllowed(_) => warn!("Forbidden secret requested: {name:?}"),
                SecretError::NotConfigured(_) => warn!("Secret {name} not configured"),
            }
            Err(e.into())
        }
    }
}
