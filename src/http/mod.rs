//! HTTP surface
//!
//! Public routes serve the auth callback and OAuth redirect; the
//! register/verify/lookup routes are internal and require the shared
//! `X-Internal-API-Key` header.
pub mod callback;
pub mod users;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::provider::IdentityProvider;
use crate::services::{AccountService, VerificationFlow};
use crate::store::UserStore;

#[derive(Clone)]
pub struct HttpServerState {
    pub flow: VerificationFlow,
    pub account: AccountService,
    pub store: Arc<dyn UserStore>,
    pub provider: Arc<dyn IdentityProvider>,
    pub internal_api_key: Option<String>,
    pub default_redirect_url: Option<String>,
}

/// Routes reserved for trusted internal callers
const INTERNAL_PATHS: [&str; 3] = [
    "/api/auth/register-user",
    "/api/auth/verify-user",
    "/api/auth/users/",
];

async fn internal_auth_middleware(
    State(state): State<HttpServerState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let path = request.uri().path();
    let internal = INTERNAL_PATHS
        .iter()
        .any(|p| path == p.trim_end_matches('/') || path.starts_with(p));

    if internal {
        let Some(expected) = state.internal_api_key.as_deref() else {
            warn!("internal endpoint called but INTERNAL_API_KEY is not configured");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        };

        let presented = request
            .headers()
            .get("X-Internal-API-Key")
            .and_then(|v| v.to_str().ok());
        if presented != Some(expected) {
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    Ok(next.run(request).await)
}

async fn health() -> &'static str {
    "OK"
}

pub fn build_router(state: HttpServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/callback", post(callback::handle_callback))
        .route("/api/auth/register-user", post(users::register_user))
        .route("/api/auth/verify-user", post(users::verify_user))
        .route("/api/auth/users/:identity_id", get(users::get_user))
        .route("/api/auth/delete-user", post(users::delete_user))
        .route("/api/auth/update-picture", post(users::update_picture))
        .route("/auth/oauth/:provider", get(users::oauth_redirect))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            internal_auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_http_server(addr: &str, state: HttpServerState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
