//! Chat endpoint (token-gated).
//!
//! - `POST /api/chat`: forward one message to the completion API

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chat::ChatError;
use crate::error::ApiError;
use crate::token::Claims;
use crate::AppState;

/// Request body for `POST /api/chat`.
#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// `POST /api/chat`: one stateless completion round-trip.
///
/// The key check runs before the body is looked at, so an unconfigured
/// server answers 500 without touching the network.
///
/// # Errors
///
/// - `400 Bad Request`: body is not `{"message": string}`
/// - `500 Internal Server Error`: key not configured, request
///   encode/build failure, undecodable or empty upstream reply
/// - `502 Bad Gateway`: upstream unreachable, timed out, or non-200
pub async fn chat(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    info!(user = %claims.username, "Chat requested");

    if !state.chat.is_configured() {
        warn!("OpenAI API key not configured");
        return Err(ChatError::NotConfigured.into());
    }

    let Json(req) = payload.map_err(|e| {
        warn!("Invalid chat request body: {e}");
        ApiError::BadRequest("Invalid request body")
    })?;

    match state.chat.complete(&req.message).await {
        Ok(response) => {
            info!("Chat response sent");
            Ok(Json(ChatResponse { response }))
        }
        Err(e) => {
            warn!("Chat failed: {e}");
            Err(e.into())
        }
    }
}
