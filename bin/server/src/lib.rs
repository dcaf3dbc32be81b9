//! gatehouse web server.
//!
//! A minimal web front-end that delegates authentication to an AWS Cognito
//! user pool over OIDC. The binary serves a handful of routes: a home page
//! reflecting the login state, the login/callback/logout lifecycle, and a
//! health check.

pub mod auth;
pub mod config;
pub mod pages;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::auth::AppState;

/// Builds the application router over the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(auth::index))
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", get(auth::logout))
        .route("/healthz", get(auth::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
