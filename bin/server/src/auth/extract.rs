//! Authentication extractors for Axum.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::SignedCookieJar;
use gatehouse_session::{SessionId, UserClaims};

use super::{AppState, SESSION_COOKIE};

/// Extractor exposing the current user's claims, if any.
///
/// Claims presence is the sole authentication predicate: a request with no
/// cookie, an unreadable cookie, or a session in any phase other than
/// authenticated all yield `None`. Store errors are logged and read as
/// anonymous rather than failing the page.
pub struct CurrentUser(pub Option<UserClaims>);

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = SignedCookieJar::from_headers(&parts.headers, app_state.cookie_key.clone());

        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(CurrentUser(None));
        };

        let session_id = SessionId::from(cookie.value());
        let session = match app_state.sessions.load(&session_id).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, "failed to load session; treating as anonymous");
                None
            }
        };

        Ok(CurrentUser(
            session.and_then(|s| s.claims().cloned()),
        ))
    }
}
