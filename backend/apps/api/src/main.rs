//! API Server Entry Point
//!
//! Application entry point and server initialization. Uses `anyhow` for
//! startup errors; request-path errors are `auth::AuthError`.

use auth::{AnyMailer, AuthConfig, Janitor, PgAuthStore, auth_router, run_sweep};
use axum::{
    Router, http,
    http::{Method, header},
};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

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

    let auth_config = auth_config_from_env();
    let store = PgAuthStore::new(pool.clone());

    // Startup cleanup: errors here should not prevent server startup
    match run_sweep(&store, &auth_config).await {
        Ok(report) => {
            tracing::info!(
                sessions_deleted = report.sessions,
                verification_tokens_deleted = report.verification_tokens,
                reset_tokens_deleted = report.reset_tokens,
                stale_users_deleted = report.stale_users,
                "Startup cleanup completed"
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, "Startup cleanup failed, continuing anyway");
        }
    }

    // The janitor owns its task handle for the life of the process
    let janitor = Janitor::start(
        Arc::new(store.clone()),
        Arc::new(auth_config.clone()),
    );

    let mailer = AnyMailer::from_env()?;

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/auth", auth_router(store, mailer, auth_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3006);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the background sweep before exiting
    janitor.stop().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Auth configuration from the environment. Development builds fall back
/// to random secrets and an insecure cookie; production requires explicit
/// signing secrets.
fn auth_config_from_env() -> AuthConfig {
    let mut config = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        let access = env::var("ACCESS_TOKEN_SECRET")
            .expect("ACCESS_TOKEN_SECRET must be set in production");
        let refresh = env::var("REFRESH_TOKEN_SECRET")
            .expect("REFRESH_TOKEN_SECRET must be set in production");

        AuthConfig {
            access_secret: access.into_bytes(),
            refresh_secret: refresh.into_bytes(),
            ..AuthConfig::default()
        }
    };

    if let Ok(base_url) = env::var("APP_BASE_URL") {
        config.base_url = base_url;
    }
    if let Ok(pepper) = env::var("PASSWORD_PEPPER") {
        config.password_pepper = Some(pepper.into_bytes());
    }

    config
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
