//! Axum server setup
//!
//! - Localhost-only CORS unless `cors_permissive` is set
//! - Request tracing and a request timeout
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::config::AppConfig;
use crate::mail::{LogMailer, MailError, Mailer, SmtpMailer};

/// Shared application state
pub struct AppState {
    pub pool: PgPool,
    pub mailer: Arc<dyn Mailer>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(pool: PgPool, mailer: Arc<dyn Mailer>, config: AppConfig) -> Self {
        Self {
            pool,
            mailer,
            config,
        }
    }

    /// State with the mailer the config asks for.
    pub fn from_config(pool: PgPool, config: AppConfig) -> Result<Self, MailError> {
        let mailer = mailer_for(&config)?;
        Ok(Self::new(pool, mailer, config))
    }
}

/// SMTP when credentials are configured, otherwise log-only delivery.
pub fn mailer_for(config: &AppConfig) -> Result<Arc<dyn Mailer>, MailError> {
    match config.smtp_settings() {
        Some(settings) => {
            tracing::info!(host = %settings.host, port = settings.port, "SMTP mail transport");
            Ok(Arc::new(SmtpMailer::new(&settings)?))
        }
        None => {
            tracing::warn!("SMTP not configured, emails will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

fn cors_layer(permissive: bool) -> CorsLayer {
    if permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }
    CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config.server.cors_permissive);
    let timeout = state.config.request_timeout();

    Router::new()
        .merge(routes::health::router())
        .merge(routes::pages::router())
        .merge(routes::auth::router())
        .merge(routes::journal::router())
        .merge(routes::workshops::router())
        .merge(routes::bookings::router())
        .merge(routes::analyses::router())
        .merge(routes::articles::router())
        .merge(routes::contact::router())
        .merge(routes::admin::router())
        .layer(cors)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives.
pub async fn run_server(state: AppState) -> Result<(), ServerError> {
    let bind_addr: SocketAddr = state
        .config
        .server
        .bind
        .parse()
        .map_err(|_| ServerError::Bind(state.config.server.bind.clone()))?;

    let app = build_router(Arc::new(state));

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid bind address: {0}")]
    Bind(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_mailer_without_smtp() {
        let mailer = mailer_for(&AppConfig::default()).unwrap();
        assert_eq!(mailer.transport(), "log");
    }

    #[tokio::test]
    async fn smtp_mailer_with_credentials() {
        let mut config = AppConfig::default();
        config.mail.smtp_email = Some("hello@thementallap.com".into());
        config.mail.smtp_password = Some("app-password".into());
        let mailer = mailer_for(&config).unwrap();
        assert_eq!(mailer.transport(), "smtp");
    }

    #[tokio::test]
    async fn bad_bind_address() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/mentallap")
            .unwrap();
        let mut config = AppConfig::default();
        config.server.bind = "not-an-address".into();
        let state = AppState::new(pool, Arc::new(LogMailer), config);
        assert!(matches!(run_server(state).await, Err(ServerError::Bind(_))));
    }
}
