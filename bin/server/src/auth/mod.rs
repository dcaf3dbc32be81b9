//! Authentication module for the gatehouse server.
//!
//! This module provides:
//! - OIDC authentication against the configured Cognito user pool
//! - The process-wide readiness state for the discovered client
//! - Route handlers for the login/callback/logout lifecycle
//! - An extractor exposing the current user's claims to views
//!
//! The session itself (phases, storage) lives in the `gatehouse-session`
//! crate; handlers here only drive its transitions.

pub mod extract;
pub mod oidc;
pub mod routes;

pub use extract::CurrentUser;
pub use oidc::OidcClient;
pub use routes::{callback, healthz, index, login, logout};

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use gatehouse_session::SessionStore;

use crate::config::ServerConfig;

/// Session cookie name.
pub(crate) const SESSION_COOKIE: &str = "session";

/// Outcome of provider discovery, fixed for the life of the process.
///
/// Discovery runs once at startup. When it fails the process keeps serving
/// (views, health checks) but every authentication-dependent route consults
/// this state and fails closed.
pub enum AuthReadiness {
    /// Discovery succeeded; authentication is available.
    Ready(OidcClient),
    /// Discovery failed; authentication routes return 503.
    Failed(String),
}

impl AuthReadiness {
    /// Returns the OIDC client if discovery succeeded.
    pub fn client(&self) -> Option<&OidcClient> {
        match self {
            Self::Ready(client) => Some(client),
            Self::Failed(_) => None,
        }
    }

    /// Returns true if authentication is available.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Returns the discovery failure reason, if discovery failed.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Failed(reason) => Some(reason),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Discovery outcome and OIDC client.
    pub auth: Arc<AuthReadiness>,
    /// Session storage backend.
    pub sessions: Arc<dyn SessionStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Key for signing session cookies, derived from the configured secret.
    pub(crate) cookie_key: Key,
}

impl AppState {
    /// Creates a new application state.
    ///
    /// The configuration must already be validated: key derivation requires
    /// a secret of at least 32 bytes.
    pub fn new(
        auth: AuthReadiness,
        sessions: Arc<dyn SessionStore>,
        config: ServerConfig,
    ) -> Self {
        let cookie_key = Key::derive_from(config.session.cookie_secret.as_bytes());
        Self {
            auth: Arc::new(auth),
            sessions,
            config: Arc::new(config),
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
