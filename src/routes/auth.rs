//! Credential exchange endpoint.
//!
//! - `POST /auth`: trade the configured admin username/password for a
//!   session token

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::constant_time_eq;
use crate::error::ApiError;
use crate::AppState;

/// Request body for `POST /auth`. Missing fields are treated as empty.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// `POST /auth`: check credentials and issue a 24 hour session token.
///
/// # Errors
///
/// - `400 Bad Request`: body is not valid JSON
/// - `401 Unauthorized`: any field empty or not matching configuration
/// - `500 Internal Server Error`: token signing failed
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        warn!("Authentication failed: invalid request body - {e}");
        ApiError::BadRequest("Invalid request body")
    })?;

    info!(username = %req.username, "Authentication attempt");

    let expected = &state.config.auth;
    // Evaluate both comparisons so timing does not reveal which field failed.
    let user_ok = constant_time_eq(expected.username.as_bytes(), req.username.as_bytes());
    let pass_ok = constant_time_eq(expected.password.as_bytes(), req.password.as_bytes());
    if req.username.is_empty() || req.password.is_empty() || !(user_ok & pass_ok) {
        warn!(username = %req.username, "Authentication failed: invalid credentials");
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let token = state.tokens.issue(&req.username).map_err(|e| {
        warn!("Authentication failed: {e}");
        ApiError::from(e)
    })?;

    info!(username = %req.username, "Authentication successful");
    Ok(Json(LoginResponse { token }))
}
