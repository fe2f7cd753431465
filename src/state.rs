//! Shared application state passed to every handler via Axum's `State` extractor.

use std::sync::Arc;

use crate::chat::CompletionClient;
use crate::config::Config;
use crate::secrets::SecretStore;
use crate::token::TokenService;

/// Shared, read-only application state. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Immutable configuration loaded at startup.
    pub config: Arc<Config>,
    /// Issues and validates session tokens under `auth.jwt_secret`.
    pub tokens: Arc<TokenService>,
    /// Values served by `/api/secrets/*`.
    pub secrets: Arc<SecretStore>,
    /// Outbound client for `/api/chat`.
    pub chat: Arc<CompletionClient>,
}

impl AppState {
    /// Build every component from one configuration value.
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let tokens = TokenService::new(&config.auth.jwt_secret);
        let secrets = SecretStore::new(&config.secrets);
        let chat = CompletionClient::new(&config.chat, &config.secrets.openai_api_key)?;
        Ok(Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            secrets: Arc::new(secrets),
            chat: Arc::new(chat),
        })
    }
}
