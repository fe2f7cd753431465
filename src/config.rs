//! Configuration loading and defaults.
//!
//! Configuration is resolved in order of precedence (highest wins):
//!
//! 1. **Environment variables**: `JWT_SECRET`, `PORT`, `ALLOWED_ORIGINS`,
//!    `VITE_SECRETS_SERVICE_USERNAME`, `VITE_SECRETS_SERVICE_PASSWORD`,
//!    `OPENAI_API_KEY`, `FIREBASE_API_KEY`, `OPENAI_API_URL`,
//!    `OPENAI_TIMEOUT_SECS`. A `.env` file in the working directory is loaded
//!    into the process environment first (existing variables win). Empty
//!    values are treated as unset.
//! 2. **Config file**: path via `--config <path>`, or
//!    `portfolio-secrets.toml` in CWD
//! 3. **Compiled defaults**: see each field's default value below
//!
//! The TOML file mirrors the struct hierarchy:
//!
//! ```toml
//! [server]
//! port = 8080
//! allowed_origins = "https://ethanmerrill.com"
//!
//! [auth]
//! jwt_secret = "long-random-string"
//! username = "admin"
//! password = "changeme"
//!
//! [secrets]
//! openai_api_key = "sk-..."
//! firebase_api_key = ""
//!
//! [chat]
//! api_url = "https://api.openai.com/v1/chat/completions"
//! timeout_secs = 30
//!
//! [logging]
//! level = "info"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Signing secret used when nothing is configured. Triggers a startup warning.
pub const DEFAULT_JWT_SECRET: &str = "your-jwt-secret-change-this";

/// Development origins that are always allowed in addition to the configured list.
pub const DEV_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:5173"];

const DEFAULT_CONFIG_FILE: &str = "portfolio-secrets.toml";
const DOTENV_FILE: &str = ".env";

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub secrets: SecretsConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener and CORS settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// TCP port bound on all interfaces (default 8080). Override with `PORT`.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Comma-separated list of allowed CORS origins. Override with
    /// `ALLOWED_ORIGINS`. Use [`ServerConfig::origins`] for the effective list.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
}

/// Token signing and the static admin credential pair.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for session tokens. Override with `JWT_SECRET`.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Override with `VITE_SECRETS_SERVICE_USERNAME`.
    #[serde(default = "default_username")]
    pub username: String,
    /// Override with `VITE_SECRETS_SERVICE_PASSWORD`.
    #[serde(default = "default_password")]
    pub password: String,
}

/// Values served by the secret endpoints. Empty means "not configured".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretsConfig {
    /// Completion API key; also enables `/api/chat`. Override with `OPENAI_API_KEY`.
    #[serde(default)]
    pub openai_api_key: String,
    /// Override with `FIREBASE_API_KEY`.
    #[serde(default)]
    pub firebase_api_key: String,
}

/// Outbound chat-completion settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Completion endpoint. Override with `OPENAI_API_URL`.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Whole-request timeout in seconds (default 30). Override with `OPENAI_TIMEOUT_SECS`.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter level (default `info`). Overridden by `RUST_LOG` env var.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Failures while assembling the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("invalid config value {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
    #[error("failed to load {path}: {source}")]
    DotEnv {
        path: String,
        source: dotenvy::Error,
    },
}

fn default_port() -> u16 {
    8080
}
fn default_allowed_origins() -> String {
    "https://ethanmerrill.com".to_string()
}
fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}
fn default_username() -> String {
    "admin".to_string()
}
fn default_password() -> String {
    "changeme".to_string()
}
fn default_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            username: default_username(),
            password: default_password(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Effective CORS origins: the configured comma-separated list (trimmed,
    /// empty entries dropped) followed by [`DEV_ORIGINS`].
    pub fn origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = self
            .allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
        for dev in DEV_ORIGINS {
            if !origins.iter().any(|o| o == dev) {
                origins.push(dev.to_string());
            }
        }
        origins
    }
}

impl Config {
    /// Load configuration with the precedence chain: env vars > file > defaults.
    ///
    /// If `path` is `Some`, that file must exist and parse. Otherwise looks for
    /// `portfolio-secrets.toml` in the current directory, falling back to
    /// compiled defaults.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = Self::file_layer(path, DEFAULT_CONFIG_FILE)?;
        load_dotenv(Path::new(DOTENV_FILE))?;
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// The explicit file if given, else `fallback` when it exists, else defaults.
    fn file_layer(path: Option<&str>, fallback: &str) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None if Path::new(fallback).exists() => Self::from_file(fallback),
            None => Ok(Config::default()),
        }
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Apply env var overrides using `lookup` as the variable source.
    ///
    /// Empty values are ignored so an exported-but-blank variable keeps the
    /// file or default value.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.is_empty());

        if let Some(v) = get("JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Some(v) = get("PORT") {
            self.server.port = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { var: "PORT", value: v })?;
        }
        if let Some(v) = get("ALLOWED_ORIGINS") {
            self.server.allowed_origins = v;
        }
        if let Some(v) = get("VITE_SECRETS_SERVICE_USERNAME") {
            self.auth.username = v;
        }
        if let Some(v) = get("VITE_SECRETS_SERVICE_PASSWORD") {
            self.auth.password = v;
        }
        if let Some(v) = get("OPENAI_API_KEY") {
            self.secrets.openai_api_key = v;
        }
        if let Some(v) = get("FIREBASE_API_KEY") {
            self.secrets.firebase_api_key = v;
        }
        if let Some(v) = get("OPENAI_API_URL") {
            self.chat.api_url = v;
        }
        if let Some(v) = get("OPENAI_TIMEOUT_SECS") {
            self.chat.timeout_secs = match v.trim().parse() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: "OPENAI_TIMEOUT_SECS",
                        value: v,
                    })
                }
            };
        }
        Ok(())
    }

    /// Reject values that parse but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chat.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "chat.timeout_secs",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Whether the insecure compiled-in signing secret is in use.
    pub fn uses_default_jwt_secret(&self) -> bool {
        self.auth.jwt_secret == DEFAULT_JWT_SECRET
    }
}

/// Load `path` into the process environment without overriding existing
/// variables. A missing file is the normal case in production; a file that
/// exists but does not parse is an error, since dotenvy stops at the bad line.
fn load_dotenv(path: &Path) -> Result<(), ConfigError> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(source) => Err(ConfigError::DotEnv {
            path: path.display().to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.username, "admin");
        assert_eq!(config.auth.password, "changeme");
        assert!(config.uses_default_jwt_secret());
        assert!(config.secrets.openai_api_key.is_empty());
        assert!(config.secrets.firebase_api_key.is_empty());
        assert_eq!(config.chat.timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn env_overrides_defaults() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("JWT_SECRET", "s3cret"),
                ("PORT", "9090"),
                ("VITE_SECRETS_SERVICE_USERNAME", "ethan"),
                ("VITE_SECRETS_SERVICE_PASSWORD", "hunter2"),
                ("OPENAI_API_KEY", "sk-test"),
                ("FIREBASE_API_KEY", "fb-test"),
                ("OPENAI_TIMEOUT_SECS", "5"),
            ]))
            .unwrap();
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert!(!config.uses_default_jwt_secret());
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.auth.username, "ethan");
        assert_eq!(config.auth.password, "hunter2");
        assert_eq!(config.secrets.openai_api_key, "sk-test");
        assert_eq!(config.secrets.firebase_api_key, "fb-test");
        assert_eq!(config.chat.timeout_secs, 5);
    }

    #[test]
    fn empty_env_value_keeps_existing() {
        let mut config = Config::default();
        config
            .apply_env(env(&[("VITE_SECRETS_SERVICE_USERNAME", ""), ("PORT", "")]))
            .unwrap();
        assert_eq!(config.auth.username, "admin");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "PORT", .. }));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env(env(&[("OPENAI_TIMEOUT_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                var: "OPENAI_TIMEOUT_SECS",
                ..
            }
        ));

        let config: Config = toml::from_str("[chat]\ntimeout_secs = 0\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "chat.timeout_secs",
                ..
            })
        ));
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn toml_then_env() {
        let mut config: Config = toml::from_str(
            r#"
            [server]
            port = 3001

            [auth]
            username = "file-user"

            [secrets]
            firebase_api_key = "from-file"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.auth.password, "changeme");

        config
            .apply_env(env(&[("VITE_SECRETS_SERVICE_USERNAME", "env-user")]))
            .unwrap();
        assert_eq!(config.auth.username, "env-user");
        assert_eq!(config.secrets.firebase_api_key, "from-file");
    }

    #[test]
    fn origins_append_dev_hosts() {
        let server = ServerConfig {
            allowed_origins: " https://a.example , ,https://b.example".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(
            server.origins(),
            vec![
                "https://a.example",
                "https://b.example",
                "http://localhost:3000",
                "http://localhost:5173",
            ]
        );
    }

    #[test]
    fn origins_do_not_duplicate_dev_hosts() {
        let server = ServerConfig {
            allowed_origins: "http://localhost:3000".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(
            server.origins(),
            vec!["http://localhost:3000", "http://localhost:5173"]
        );
    }

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn explicit_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "custom.toml", "[server]\nport = 4000\n");
        let config = Config::file_layer(Some(&path), "does-not-exist.toml").unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.auth.username, "admin");
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let err = Config::file_layer(missing.to_str(), "does-not-exist.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.toml", "[server\nport = \"eighty\"\n");
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn fallback_file_used_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = write(&dir, DEFAULT_CONFIG_FILE, "[auth]\nusername = \"from-file\"\n");
        let config = Config::file_layer(None, &fallback).unwrap();
        assert_eq!(config.auth.username, "from-file");

        let absent = dir.path().join("absent.toml");
        let config = Config::file_layer(None, &absent.to_string_lossy()).unwrap();
        assert_eq!(config.auth.username, "admin");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn missing_dotenv_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dotenv(&dir.path().join(".env")).is_ok());
    }

    #[test]
    fn malformed_dotenv_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, ".env", "NOT VALID LINE\nJWT_SECRET=never-applied\n");
        let err = load_dotenv(Path::new(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::DotEnv { .. }));
    }
}
