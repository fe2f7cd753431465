//! Gated lookup of the configured secret values.
//!
//! The set of names is closed: only the variants of [`SecretName`] can be
//! requested, and there is no way to add one at runtime.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::config::SecretsConfig;

/// Names that may be requested from `/api/secrets/{name}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretName {
    OpenAi,
    Firebase,
}

impl SecretName {
    pub const ALL: [SecretName; 2] = [SecretName::OpenAi, SecretName::Firebase];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Firebase => "firebase",
        }
    }
}

impl fmt::Display for SecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretName {
    type Err = SecretError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| SecretError::NotAllowed(s.to_string()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecretError {
    #[error("secret {0:?} is not in the allowed set")]
    NotAllowed(String),
    #[error("secret {0} is not configured")]
    NotConfigured(SecretName),
}

/// Immutable snapshot of the secret values taken from configuration.
#[derive(Debug, Clone)]
pub struct SecretStore {
    openai: String,
    firebase: String,
}

impl SecretStore {
    pub fn new(config: &SecretsConfig) -> Self {
        Self {
            openai: config.openai_api_key.clone(),
            firebase: config.firebase_api_key.clone(),
        }
    }

    /// Value for `name`, or [`SecretError::NotConfigured`] if it is empty.
    pub fn get(&self, name: SecretName) -> Result<&str, SecretError> {
        let value = match name {
            SecretName::OpenAi => &self.openai,
            SecretName::Firebase => &self.firebase,
        };
        if value.is_empty() {
            return Err(SecretError::NotConfigured(name));
        }
        Ok(value)
    }

    /// Parse a path segment and look it up.
    pub fn lookup(&self, name: &str) -> Result<&str, SecretError> {
        self.get(name.parse()?)
    }

    pub fn is_configured(&self, name: SecretName) -> bool {
        self.get(name).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(openai: &str, firebase: &str) -> SecretStore {
        SecretStore::new(&SecretsConfig {
            openai_api_key: openai.into(),
            firebase_api_key: firebase.into(),
        })
    }

    #[test]
    fn parse_known_names() {
        assert_eq!("openai".parse::<SecretName>(), Ok(SecretName::OpenAi));
        assert_eq!("firebase".parse::<SecretName>(), Ok(SecretName::Firebase));
    }

    #[test]
    fn parse_is_exact() {
        for bad in ["OpenAI", "openai ", "", "aws", "../openai"] {
            assert_eq!(
                bad.parse::<SecretName>(),
                Err(SecretError::NotAllowed(bad.to_string()))
            );
        }
    }

    #[test]
    fn lookup_configured() {
        let s = store("sk-1", "fb-1");
        assert_eq!(s.lookup("openai"), Ok("sk-1"));
        assert_eq!(s.lookup("firebase"), Ok("fb-1"));
    }

    #[test]
    fn lookup_unconfigured() {
        let s = store("", "fb-1");
        assert_eq!(
            s.lookup("openai"),
            Err(SecretError::NotConfigured(SecretName::OpenAi))
        );
        assert!(!s.is_configured(SecretName::OpenAi));
        assert!(s.is_configured(SecretName::Firebase));
    }

    #[test]
    fn unknown_name_wins_over_configuration() {
        let s = store("sk-1", "fb-1");
        assert!(matches!(s.lookup("github"), Err(SecretError::NotAllowed(_))));
        assert!(matches!(
            store("", "").lookup("github"),
            Err(SecretError::NotAllowed(_))
        ));
    }
}
