//! Error types for session storage.

use thiserror::Error;

/// Errors raised by a [`SessionStore`](crate::store::SessionStore) backend.
///
/// The in-memory store is infallible in practice, but the trait surfaces
/// errors so that shared-cache or database backends can report theirs.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backing store failed to read or write a record.
    #[error("session store backend error: {0}")]
    Backend(String),
}
