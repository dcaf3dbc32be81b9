//! The per-browser authentication session and its lifecycle.
//!
//! Sessions are keyed by an opaque identifier delivered in a signed cookie.
//! During a login they carry the single-use CSRF/replay values; after a
//! successful callback they carry the user's claims instead. The two never
//! coexist.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::claims::UserClaims;

/// Unique identifier for a session.
///
/// Session IDs are opaque and generated with cryptographically secure
/// randomness; they carry no meaning beyond being a storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session ID from an existing string (e.g. a cookie value).
    #[must_use]
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Generates a fresh random session ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Returns the session ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The transient values bound to exactly one authorization attempt.
///
/// Generated at login initiation, consumed (successfully or not) by the
/// first callback that references the session. Never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempt {
    /// CSRF token echoed back by the provider in the `state` parameter.
    pub state: String,
    /// Replay-protection nonce embedded in the ID token by the provider.
    pub nonce: String,
    /// PKCE code verifier matching the challenge sent with the redirect.
    pub pkce_verifier: String,
}

impl LoginAttempt {
    /// Creates a new login attempt from freshly generated values.
    #[must_use]
    pub fn new(state: String, nonce: String, pkce_verifier: String) -> Self {
        Self {
            state,
            nonce,
            pkce_verifier,
        }
    }
}

/// Where a session is in the authentication lifecycle.
///
/// Modeled as an enum so that "pending" and "authenticated" cannot both
/// hold: completing a login necessarily discards the attempt values, and
/// starting a new login necessarily discards any previous identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthPhase {
    /// No login in progress, no identity.
    Anonymous,
    /// A login redirect was issued; waiting for the callback.
    Pending(LoginAttempt),
    /// The callback completed and these claims were captured.
    Authenticated(UserClaims),
}

/// A server-side session record for one browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    id: SessionId,
    phase: AuthPhase,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Creates a new anonymous session valid for the given duration.
    #[must_use]
    pub fn new(id: SessionId, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id,
            phase: AuthPhase::Anonymous,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Returns the session ID.
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> &AuthPhase {
        &self.phase
    }

    /// Returns when the session was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the session expires.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns true if the session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Returns true if the session holds authenticated claims.
    ///
    /// Claims presence is the sole authentication predicate; nothing else
    /// (cookie presence included) counts.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.phase, AuthPhase::Authenticated(_))
    }

    /// Returns the authenticated user's claims, if any.
    #[must_use]
    pub fn claims(&self) -> Option<&UserClaims> {
        match &self.phase {
            AuthPhase::Authenticated(claims) => Some(claims),
            _ => None,
        }
    }

    /// Records a freshly initiated login.
    ///
    /// Any previous identity or attempt is discarded: the attempt values
    /// are scoped to this new authorization attempt only.
    pub fn begin_login(&mut self, attempt: LoginAttempt) {
        self.phase = AuthPhase::Pending(attempt);
    }

    /// Consumes the pending login attempt, if one exists.
    ///
    /// The session drops back to `Anonymous` regardless of what the caller
    /// does with the attempt: the values are single-use, so a second
    /// callback (or a failed one) finds nothing to match against.
    pub fn take_login_attempt(&mut self) -> Option<LoginAttempt> {
        match std::mem::replace(&mut self.phase, AuthPhase::Anonymous) {
            AuthPhase::Pending(attempt) => Some(attempt),
            other => {
                self.phase = other;
                None
            }
        }
    }

    /// Records a completed login.
    pub fn complete_login(&mut self, claims: UserClaims) {
        self.phase = AuthPhase::Authenticated(claims);
    }

    /// Extends the session's expiry to `ttl` from now.
    ///
    /// Called before every save, giving the cookie its sliding lifetime.
    pub fn touch(&mut self, ttl: Duration) {
        self.expires_at = Utc::now() + ttl;
    }
}
