#![deny(clippy::all)]
#![warn(clippy::pedantic)]

//! `portfolio-secrets` binary: load configuration, report it, serve until
//! SIGINT/SIGTERM.

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use portfolio_secrets::{
    router,
    secrets::{SecretName, SecretStore},
    AppState, Config,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Token-gated secrets and chat-completion proxy.
#[derive(Parser)]
#[command(name = "portfolio-secrets", version)]
struct Cli {
    /// Path to TOML config file.
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli.config.as_deref()).await {
        // Config errors happen before the subscriber is installed.
        eprintln!("portfolio-secrets: {e:#}");
        std::process::exit(1);
    }
}

async fn run(config_path: Option<&str>) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;

    // Initialize tracing
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.level.clone());
    tracing_subscriber::fmt().with_env_filter(log_filter).init();

    info!("portfolio-secrets v{} starting", env!("CARGO_PKG_VERSION"));
    report_config(&config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let state = AppState::new(config).context("failed to build HTTP client")?;
    let app = router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Server ready, listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Goodbye");
    Ok(())
}

/// Log what is configured without logging any secret values.
fn report_config(config: &Config) {
    info!("Port: {}", config.server.port);
    info!("Auth username: {}", config.auth.username);
    info!("JWT secret configured: {}", !config.auth.jwt_secret.is_empty());
    let secrets = SecretStore::new(&config.secrets);
    for name in SecretName::ALL {
        info!("Secret {name} configured: {}", secrets.is_configured(name));
    }
    info!("Completion API: {}", config.chat.api_url);
    info!("CORS origins: {:?}", config.server.origins());

    if config.uses_default_jwt_secret() {
        warn!("Using default JWT secret; set JWT_SECRET, this is insecure for production");
    }
    if config.auth.password == "changeme" {
        warn!("Using default admin password; set VITE_SECRETS_SERVICE_PASSWORD");
    }
    if !secrets.is_configured(SecretName::OpenAi) {
        warn!("OPENAI_API_KEY is not set; /api/chat is disabled");
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received SIGINT"),
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                }
            }
            Err(e) => {
                warn!("Failed to register SIGTERM handler: {e}");
                ctrl_c.await.ok();
                info!("Received SIGINT");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received SIGINT");
    }
}
