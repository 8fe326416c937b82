//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use anyhow::Context;
use auth::application::sweep_expired_pending;
use auth::{AuthConfig, EmailVerificationMailer, PgAuthRepository, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use chrono::Utc;
use platform::mail::{SmtpMailer, SmtpSettings};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,platform=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let auth_config = load_auth_config()?;
    let mailer = build_mailer(&auth_config)?;
    let auth_repo = PgAuthRepository::new(pool.clone());

    // Startup cleanup: drop expired pending registrations, bounded by the
    // store timeout. Errors here should not prevent server startup
    match sweep_expired_pending(&auth_repo, &auth_config, Utc::now()).await {
        Ok(deleted) => {
            tracing::info!(
                pending_deleted = deleted,
                "Pending registration cleanup completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Pending registration cleanup failed, continuing anyway"
            );
        }
    }

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::HeaderName::from_static("token"),
        ]));

    // Build router
    let app = Router::new()
        .merge(auth_router(auth_repo, mailer, auth_config)?)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port: u16 = match env::var("PORT") {
        Ok(raw) => raw.parse().context("PORT must be a port number")?,
        Err(_) => 8000,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Auth settings from the environment
///
/// `SECRET_KEY` is mandatory in release builds; debug builds fall back to a
/// random per-process secret, so tokens do not survive a restart.
fn load_auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = match env::var("SECRET_KEY") {
        Ok(secret) if !secret.is_empty() => AuthConfig {
            jwt_secret: secret.into_bytes(),
            ..AuthConfig::default()
        },
        _ if cfg!(debug_assertions) => {
            tracing::warn!("SECRET_KEY not set, using a random signing secret");
            AuthConfig::with_random_secret()
        }
        _ => anyhow::bail!("SECRET_KEY must be set in production"),
    };

    if let Ok(raw) = env::var("STORE_TIMEOUT_SECS") {
        let secs: u64 = raw.parse().context("STORE_TIMEOUT_SECS must be whole seconds")?;
        config.store_timeout = Duration::from_secs(secs);
    }
    if let Ok(pepper) = env::var("PASSWORD_PEPPER") {
        config.password_pepper = Some(pepper.into_bytes());
    }
    if let Ok(base) = env::var("VERIFY_LINK_BASE") {
        config.verify_link_base = base;
    }

    Ok(config)
}

/// SMTP relay when `SMTP_HOST` is set; debug builds may log links instead
fn build_mailer(config: &AuthConfig) -> anyhow::Result<EmailVerificationMailer> {
    let Ok(host) = env::var("SMTP_HOST") else {
        if cfg!(debug_assertions) {
            tracing::warn!("SMTP_HOST not set, verification links will only be logged");
            return Ok(EmailVerificationMailer::log_only(&config.verify_link_base));
        }
        anyhow::bail!("SMTP_HOST must be set in production");
    };

    let from = env::var("EMAIL_FROM").context("EMAIL_FROM must be set with SMTP_HOST")?;
    let settings = SmtpSettings {
        host,
        port: match env::var("SMTP_PORT") {
            Ok(raw) => raw.parse().context("SMTP_PORT must be a port number")?,
            Err(_) => 587,
        },
        username: from.clone(),
        password: env::var("EMAIL_PASSWORD").context("EMAIL_PASSWORD must be set with SMTP_HOST")?,
        from,
    };
    tracing::info!(host = %settings.host, port = settings.port, "SMTP relay configured");

    let smtp = SmtpMailer::new(&settings, config.mail_timeout)?;
    Ok(EmailVerificationMailer::smtp(smtp, &config.verify_link_base))
}
