//! Route handlers for the login, callback, and logout transitions.
//!
//! Each handler drives the session through the lifecycle described in
//! `gatehouse-session`: anonymous → pending → authenticated → destroyed.
//! Failures are converted to HTTP at exactly one place, the [`AuthError`]
//! `IntoResponse` impl, which logs diagnostics and leaks nothing to the
//! client.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::SignedCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Duration as ChronoDuration;
use gatehouse_session::{AuthSession, SessionError, SessionId};
use serde::Deserialize;
use time::Duration as TimeDuration;

use super::oidc::OidcError;
use super::{AppState, CurrentUser, SESSION_COOKIE};
use crate::config::ServerConfig;
use crate::pages;

/// Query parameters for the OIDC callback.
///
/// Everything is optional: the provider may return an error instead of a
/// code, and a forged request may carry anything at all.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Query parameters for the home page.
#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    error: Option<String>,
}

/// Renders the home page, reflecting the authentication predicate.
pub async fn index(
    CurrentUser(claims): CurrentUser,
    Query(query): Query<IndexQuery>,
) -> Html<String> {
    Html(pages::home(claims.as_ref(), query.error.as_deref()))
}

/// Reports whether the process is up and whether authentication is
/// available (i.e. provider discovery succeeded). When discovery failed,
/// the body carries the reason for the operator.
pub async fn healthz(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut body = serde_json::json!({
        "status": "ok",
        "auth_ready": state.auth.is_ready(),
    });
    if let Some(reason) = state.auth.failure_reason() {
        body["auth_error"] = serde_json::Value::String(reason.to_string());
    }
    Json(body)
}

/// Initiates the OIDC login flow by redirecting to the identity provider.
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Redirect), AuthError> {
    let client = state.auth.client().ok_or(AuthError::NotReady)?;
    let (auth_url, attempt) = client.authorization_url();

    // Fresh session ID per login attempt; a cookie planted before login
    // must not be promotable to an authenticated session.
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let old_id = SessionId::from(cookie.value());
        if let Err(e) = state.sessions.destroy(&old_id).await {
            tracing::warn!(error = %e, "failed to drop previous session on login");
        }
    }

    let mut session = AuthSession::new(SessionId::generate(), session_ttl(&state));
    session.begin_login(attempt);
    state
        .sessions
        .save(&session)
        .await
        .map_err(AuthError::Session)?;

    let jar = jar.add(session_cookie(&state, session.id()));
    Ok((jar, Redirect::to(&auth_url)))
}

/// Handles the OIDC callback after the user authenticates with the
/// identity provider.
pub async fn callback(
    State(app_state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Redirect), AuthError> {
    let client = app_state.auth.client().ok_or(AuthError::NotReady)?;

    // A callback with no session, or a session with no pending attempt, is
    // rejected exactly like a state mismatch.
    let cookie = jar.get(SESSION_COOKIE).ok_or(AuthError::NoPendingLogin)?;
    let session_id = SessionId::from(cookie.value());
    let mut session = app_state
        .sessions
        .load(&session_id)
        .await
        .map_err(AuthError::Session)?
        .ok_or(AuthError::NoPendingLogin)?;
    let attempt = session
        .take_login_attempt()
        .ok_or(AuthError::NoPendingLogin)?;

    // The attempt is consumed whatever happens next: state and nonce are
    // bound to exactly one authorization attempt.
    session.touch(session_ttl(&app_state));
    app_state
        .sessions
        .save(&session)
        .await
        .map_err(AuthError::Session)?;

    if let Some(error) = query.error {
        let description = query.error_description.as_deref().unwrap_or("unknown");
        tracing::warn!(error = %error, description = %description, "provider returned an error on callback");
        return Err(AuthError::ProviderRejection);
    }

    let returned_state = query.state.ok_or(AuthError::StateMismatch)?;
    if returned_state != attempt.state {
        return Err(AuthError::StateMismatch);
    }

    let code = query.code.ok_or(AuthError::ProviderRejection)?;

    let tokens = client
        .exchange_code(&code, &attempt)
        .await
        .map_err(AuthError::Exchange)?;
    let claims = client
        .fetch_user_info(&tokens.access_token, &tokens.subject)
        .await
        .map_err(AuthError::Exchange)?;

    session.complete_login(claims);
    session.touch(session_ttl(&app_state));
    app_state
        .sessions
        .save(&session)
        .await
        .map_err(AuthError::Session)?;

    let jar = jar.add(session_cookie(&app_state, session.id()));
    Ok((jar, Redirect::to("/")))
}

/// Logs the user out and sends them to the provider's logout endpoint.
///
/// Idempotent, and always appears to succeed: a session-store failure is
/// logged, never surfaced.
pub async fn logout(State(state): State<AppState>, jar: SignedCookieJar) -> (SignedCookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let session_id = SessionId::from(cookie.value());
        // Destroy completes before the redirect is produced; a replayed
        // cookie must not find the old record.
        if let Err(e) = state.sessions.destroy(&session_id).await {
            tracing::warn!(error = %e, "failed to destroy session on logout");
        }
    }

    let jar = jar.add(expired_cookie());
    (jar, Redirect::to(&provider_logout_url(&state.config)))
}

fn session_ttl(state: &AppState) -> ChronoDuration {
    ChronoDuration::minutes(state.config.session.ttl_minutes)
}

fn session_cookie(state: &AppState, id: &SessionId) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.as_str().to_string()))
        .path("/")
        .http_only(true)
        .secure(state.config.session.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(state.config.session.ttl_minutes))
        .build()
}

fn expired_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO)
        .build()
}

/// Builds the hosted-UI logout URL with `client_id` and `logout_uri`.
fn provider_logout_url(config: &ServerConfig) -> String {
    match url::Url::parse(&config.cognito.logout_endpoint()) {
        Ok(mut url) => {
            url.query_pairs_mut()
                .append_pair("client_id", &config.cognito.client_id)
                .append_pair("logout_uri", &config.cognito.post_logout_redirect_uri);
            url.to_string()
        }
        Err(e) => {
            tracing::error!(error = %e, "invalid logout endpoint; redirecting to home instead");
            "/".to_string()
        }
    }
}

/// Authentication errors at the route boundary.
#[derive(Debug)]
pub enum AuthError {
    /// Provider discovery failed at startup; authentication is disabled.
    NotReady,
    /// Callback arrived without a pending login attempt to match against.
    NoPendingLogin,
    /// The `state` parameter did not match the session's stored value.
    StateMismatch,
    /// The provider signalled an error, or the callback was malformed.
    ProviderRejection,
    /// Code exchange, token validation, or userinfo fetch failed.
    Exchange(OidcError),
    /// The session store failed a read or write the flow needs.
    Session(SessionError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::NotReady => {
                tracing::warn!("authentication route hit while provider is unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Authentication is currently unavailable",
                )
                    .into_response()
            }
            Self::Session(e) => {
                tracing::error!(error = %e, "session store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            Self::NoPendingLogin => {
                tracing::warn!("callback without a pending login attempt");
                failed_login_redirect()
            }
            Self::StateMismatch => {
                tracing::warn!("state parameter mismatch on callback");
                failed_login_redirect()
            }
            Self::ProviderRejection => {
                tracing::warn!("callback rejected by provider or malformed");
                failed_login_redirect()
            }
            Self::Exchange(e) => {
                tracing::error!(error = %e, "authorization code exchange failed");
                failed_login_redirect()
            }
        }
    }
}

/// Any callback failure degrades to the same generic indicator.
fn failed_login_redirect() -> Response {
    Redirect::to("/?error=auth_failed").into_response()
}
