//! Signed session tokens.
//!
//! Tokens are HS256 JWTs carrying the authenticated username and a 24 hour
//! expiry. Nothing is stored server-side: a token is valid exactly when its
//! signature verifies under the configured secret and `exp` lies in the
//! future. There is no revocation, so a leaked token stays valid until it
//! expires.

use std::time::Duration;

use jsonwebtoken::{
    decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Lifetime of an issued token.
pub const TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const BEARER_PREFIX: &str = "Bearer ";

/// Payload embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    /// Expiry, Unix seconds.
    pub exp: u64,
    /// Issued-at, Unix seconds.
    pub iat: u64,
    /// Random token id so tokens minted in the same second differ.
    pub jti: String,
}

/// Why a token could not be issued or accepted.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("authorization header missing")]
    MissingHeader,
    #[error("authorization header is not a bearer token")]
    MissingBearerPrefix,
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Issues and validates session tokens under one signing secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Mint a token for `username` expiring [`TOKEN_TTL`] from now.
    pub fn issue(&self, username: &str) -> Result<String, TokenError> {
        let now = get_current_timestamp();
        self.sign(&Claims {
            username: username.to_string(),
            exp: now + TOKEN_TTL.as_secs(),
            iat: now,
            jti: Uuid::new_v4().to_string(),
        })
    }

    /// Sign arbitrary claims with the service secret.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Verify signature, structure, and expiry of a raw token.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }

    /// Validate the value of an `Authorization` header. The `Bearer ` prefix
    /// is required and matched case-sensitively.
    pub fn validate_header(&self, header: &str) -> Result<Claims, TokenError> {
        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or(TokenError::MissingBearerPrefix)?;
        self.validate(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret")
    }

    #[test]
    fn issue_then_validate() {
        let svc = service();
        let token = svc.issue("admin").unwrap();
        let claims = svc.validate(&token).unwrap();
        assert_eq!(claims.username, "admin");

        let now = get_current_timestamp();
        let ttl = TOKEN_TTL.as_secs();
        assert!(claims.exp > now + ttl - 5 && claims.exp <= now + ttl);
        assert!(claims.iat <= now);
    }

    #[test]
    fn tokens_are_distinct() {
        let svc = service();
        let a = svc.issue("admin").unwrap();
        let b = svc.issue("admin").unwrap();
        assert_ne!(a, b);
        assert!(svc.validate(&a).is_ok());
        assert!(svc.validate(&b).is_ok());
    }

    #[test]
    fn other_secret_rejected() {
        let token = TokenService::new("one").issue("admin").unwrap();
        let err = TokenService::new("two").validate(&token).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn tampered_signature_rejected() {
        let svc = service();
        let token = svc.issue("admin").unwrap();
        let (head, sig) = token.rsplit_once('.').unwrap();
        let flipped = if sig.starts_with('A') { "B" } else { "A" };
        let tampered = format!("{head}.{flipped}{}", &sig[1..]);
        assert!(matches!(
            svc.validate(&tampered),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn expired_rejected() {
        let svc = service();
        let now = get_current_timestamp();
        let token = svc
            .sign(&Claims {
                username: "admin".into(),
                exp: now - 10,
                iat: now - 100,
                jti: "x".into(),
            })
            .unwrap();
        let err = svc.validate(&token).unwrap_err();
        match err {
            TokenError::Invalid(e) => assert_eq!(
                *e.kind(),
                jsonwebtoken::errors::ErrorKind::ExpiredSignature
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_rejected() {
        assert!(matches!(
            service().validate("not-a-jwt"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn header_requires_bearer_prefix() {
        let svc = service();
        let token = svc.issue("admin").unwrap();
        assert!(svc.validate_header(&format!("Bearer {token}")).is_ok());
        assert!(matches!(
            svc.validate_header(&token),
            Err(TokenError::MissingBearerPrefix)
        ));
        assert!(matches!(
            svc.validate_header(&format!("Basic {token}")),
            Err(TokenError::MissingBearerPrefix)
        ));
    }
}
