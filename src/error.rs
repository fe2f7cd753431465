//! Client-facing error taxonomy.
//!
//! Every handler and the token gate return [`ApiError`] on failure. It renders
//! as `{"error": "<message>"}` with the matching status code, so all error
//! responses share one JSON shape. Messages are generic and never carry
//! upstream bodies or configured values.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::chat::ChatError;
use crate::secrets::SecretError;
use crate::token::TokenError;

/// An error that maps directly onto an HTTP response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed client input (400).
    #[error("{0}")]
    BadRequest(&'static str),
    /// Missing or invalid credentials or token (401).
    #[error("{0}")]
    Unauthorized(&'static str),
    /// Access to a resource name outside the allowed set (403).
    #[error("{0}")]
    Forbidden(&'static str),
    /// Local failure: misconfiguration, encode/decode, signing (500).
    #[error("{0}")]
    Internal(&'static str),
    /// The upstream dependency failed or returned a non-success status (502).
    #[error("{0}")]
    BadGateway(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::Internal(m)
            | Self::BadGateway(m) => m,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MissingHeader => Self::Unauthorized("Authorization header required"),
            TokenError::MissingBearerPrefix => Self::Unauthorized("Bearer token required"),
            TokenError::Invalid(_) => Self::Unauthorized("Invalid token"),
            TokenError::Signing(_) => Self::Internal("Failed to generate token"),
        }
    }
}

impl From<SecretError> for ApiError {
    fn from(err: SecretError) -> Self {
        match err {
            SecretError::NotAllowed(_) => Self::Forbidden("Secret not allowed"),
            SecretError::NotConfigured(_) => Self::Internal("Secret not configured"),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::NotConfigured => Self::Internal("OpenAI API key not configured"),
            ChatError::Encode(_) => Self::Internal("Failed to prepare OpenAI request"),
            ChatError::Build(_) => Self::Internal("Failed to create OpenAI request"),
            ChatError::Transport(_) => Self::BadGateway("Failed to contact OpenAI API"),
            ChatError::Upstream(_) => Self::BadGateway("OpenAI API error"),
            ChatError::Decode(_) => Self::Internal("Failed to decode OpenAI response"),
            ChatError::EmptyReply => Self::Internal("No response from OpenAI"),
        }
    }
}
