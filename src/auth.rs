//! Session-token gate for the protected `/api/*` routes.
//!
//! Requests must carry `Authorization: Bearer <token>` where the token was
//! issued by `POST /auth`. Validation is stateless, see [`crate::token`].

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::token::TokenError;
use crate::AppState;

/// Axum middleware that rejects requests without a valid bearer token.
///
/// On success the validated [`crate::token::Claims`] are inserted into the
/// request extensions for downstream handlers.
///
/// # Error responses
///
/// All rejections are `401 Unauthorized` with a JSON `{"error": ...}` body:
///
/// - `Authorization header required`: header missing or not valid UTF-8
/// - `Bearer token required`: header present without the `Bearer ` prefix
/// - `Invalid token`: bad signature, malformed, or expired
pub async fn require_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path().to_owned();

    let header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(TokenError::MissingHeader);

    let claims = match header.and_then(|h| state.tokens.validate_header(h)) {
        Ok(claims) => claims,
        Err(e) => {
            warn!(%path, "Token rejected: {e}");
            return Err(e.into());
        }
    };

    debug!(%path, user = %claims.username, "Token accepted");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Constant-time byte comparison to prevent timing side-channel attacks.
///
/// Always iterates over the full length of `expected` regardless of `provided`
/// length, so an attacker cannot determine the length from response times.
pub fn constant_time_eq(expected: &[u8], provided: &[u8]) -> bool {
    let mut diff = u8::from(expected.len() != provided.len());
    for (i, e) in expected.iter().enumerate() {
        let p = provided.get(i).copied().unwrap_or(0xff);
        diff |= e ^ p;
    }
    diff == 0
}
