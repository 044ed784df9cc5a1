//! Auth Router

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::mailer::Mailer;
use crate::domain::repository::AuthStore;
use crate::infra::postgres::PgAuthStore;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthMiddlewareState, require_auth};

/// Create the auth router with the PostgreSQL store
pub fn auth_router<M>(store: PgAuthStore, mailer: M, config: AuthConfig) -> Router
where
    M: Mailer + Send + Sync + 'static,
{
    auth_router_generic(store, mailer, config)
}

/// Create an auth router for any store implementation
pub fn auth_router_generic<R, M>(store: R, mailer: M, config: AuthConfig) -> Router
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    let config = Arc::new(config);

    let state = AuthAppState {
        store: Arc::new(store),
        mailer: Arc::new(mailer),
        config: config.clone(),
    };

    let middleware_state = AuthMiddlewareState { config };

    // Routes behind the bearer-token middleware
    let protected = Router::new()
        .route("/get_auth_user", get(handlers::get_auth_user::<R, M>))
        .route(
            "/terminate_all_sessions",
            get(handlers::terminate_all_sessions::<R, M>),
        )
        .route("/delete_account", delete(handlers::delete_account::<R, M>))
        .route_layer(axum::middleware::from_fn_with_state(
            middleware_state,
            require_auth,
        ));

    Router::new()
        .route("/sign_up", post(handlers::sign_up::<R, M>))
        .route("/sign_up_check", post(handlers::sign_up_check::<R, M>))
        .route("/sign_in", post(handlers::sign_in::<R, M>))
        .route("/refresh_token", get(handlers::refresh_token::<R, M>))
        .route("/sign_out", get(handlers::sign_out::<R, M>))
        .route("/verify_user/{token}", get(handlers::verify_user::<R, M>))
        .route(
            "/resend_verification_email",
            post(handlers::resend_verification_email::<R, M>),
        )
        .route(
            "/reset_password_request",
            post(handlers::reset_password_request::<R, M>),
        )
        .route(
            "/reset_password_check/{token}",
            post(handlers::reset_password_check::<R, M>),
        )
        .route(
            "/reset_password/{token}",
            post(handlers::reset_password::<R, M>),
        )
        .merge(protected)
        .with_state(state)
}
