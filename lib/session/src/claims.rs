//! Identity claims asserted by the provider at login time.

use serde::{Deserialize, Serialize};

/// A snapshot of provider-asserted identity attributes.
///
/// Claims are captured once, at token-exchange time, and are not refreshed
/// automatically. Beyond `subject` and `email` they are treated as opaque
/// display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    /// The subject claim - unique user identifier from the provider.
    pub subject: String,
    /// Email address, if the provider released one.
    pub email: Option<String>,
    /// Display name (from the name or preferred_username claim).
    pub display_name: Option<String>,
}

impl UserClaims {
    /// Creates a new set of claims with only the subject populated.
    #[must_use]
    pub fn new(subject: String) -> Self {
        Self {
            subject,
            email: None,
            display_name: None,
        }
    }

    /// Sets the email claim.
    #[must_use]
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name;
        self
    }
}
