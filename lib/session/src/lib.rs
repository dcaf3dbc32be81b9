//! Authentication session lifecycle and storage for gatehouse.
//!
//! This crate provides:
//! - The per-browser session record (`AuthSession`) and its lifecycle
//!   (`AuthPhase`)
//! - Identity claims captured at login time (`UserClaims`)
//! - A storage capability trait (`SessionStore`) with an in-process
//!   implementation (`MemorySessionStore`)
//!
//! # Session Lifecycle
//!
//! A session moves through three phases:
//! - `Anonymous`: no login in progress, no identity.
//! - `Pending`: a login was initiated; the session holds the single-use
//!   `state`/`nonce`/PKCE values bound to exactly one authorization attempt.
//! - `Authenticated`: the callback completed; the session holds the user's
//!   claims and none of the transient login values.
//!
//! At most one of pending/authenticated holds at any time, by construction.
//! The presence of claims is the sole authentication predicate; a cookie
//! alone proves nothing.
//!
//! # Example
//!
//! ```
//! use gatehouse_session::{AuthSession, LoginAttempt, SessionId, UserClaims};
//! use chrono::Duration;
//!
//! let mut session = AuthSession::new(SessionId::generate(), Duration::hours(24));
//! assert!(!session.is_authenticated());
//!
//! session.begin_login(LoginAttempt::new(
//!     "state-abc".to_string(),
//!     "nonce-xyz".to_string(),
//!     "pkce-verifier".to_string(),
//! ));
//!
//! let attempt = session.take_login_attempt().expect("pending attempt");
//! assert_eq!(attempt.state, "state-abc");
//!
//! session.complete_login(UserClaims::new("cognito|1234".to_string()));
//! assert!(session.is_authenticated());
//! ```

pub mod claims;
pub mod error;
pub mod session;
pub mod store;

// Re-export main types at crate root
pub use claims::UserClaims;
pub use error::SessionError;
pub use session::{AuthPhase, AuthSession, LoginAttempt, SessionId};
pub use store::{MemorySessionStore, SessionStore};
