//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables (nested keys
//! use `__`, e.g. `COGNITO__REGION`, `SESSION__COOKIE_SECRET`).

use serde::Deserialize;

/// Minimum length of the cookie signing secret, in bytes.
///
/// There is deliberately no default secret: an unsigned or guessably
/// signed session cookie defeats the server-side session binding.
const MIN_COOKIE_SECRET_BYTES: usize = 32;

/// Server configuration composed from section configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Port the HTTP listener binds to.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Session configuration. Required because the cookie secret has no
    /// default.
    pub session: SessionConfig,

    /// Cognito identity provider configuration.
    pub cognito: CognitoConfig,
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in minutes, refreshed on every write.
    #[serde(default = "default_session_ttl_minutes")]
    pub ttl_minutes: i64,

    /// Interval between expired-session sweeps, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP
    /// development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,

    /// Secret used to sign the session cookie. Required, at least 32 bytes.
    pub cookie_secret: String,
}

/// Configuration for the Cognito user pool this application is registered
/// with.
#[derive(Debug, Clone, Deserialize)]
pub struct CognitoConfig {
    /// AWS region hosting the user pool (e.g. "us-east-1").
    pub region: String,
    /// User pool identifier (e.g. "us-east-1_AbCdEfGhI").
    pub user_pool_id: String,
    /// OAuth2 client ID registered with the pool.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// Redirect URI registered for the authorization code callback.
    pub redirect_uri: String,
    /// Hosted-UI domain (e.g. "auth.example.com" or
    /// "myapp.auth.us-east-1.amazoncognito.com"). Used for logout.
    pub domain: String,
    /// Where the hosted UI sends the browser after logout. Must be listed
    /// as a sign-out URL on the app client.
    pub post_logout_redirect_uri: String,
    /// OAuth2 scopes to request as a comma-separated string.
    #[serde(default = "default_scopes")]
    pub scopes: String,
}

fn default_listen_port() -> u16 {
    3000
}

fn default_session_ttl_minutes() -> i64 {
    // 24 hours
    1440
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

fn default_secure_cookies() -> bool {
    true
}

fn default_scopes() -> String {
    "openid,email,profile".to_string()
}

impl CognitoConfig {
    /// Returns the pool's OIDC issuer URL, the base for discovery.
    #[must_use]
    pub fn issuer_url(&self) -> String {
        format!(
            "https://cognito-idp.{}.amazonaws.com/{}",
            self.region, self.user_pool_id
        )
    }

    /// Returns the hosted-UI logout endpoint.
    ///
    /// Cognito's end-session endpoint lives on the hosted-UI domain, not
    /// the issuer, and takes `client_id` and `logout_uri` query parameters.
    #[must_use]
    pub fn logout_endpoint(&self) -> String {
        format!("https://{}/logout", self.domain)
    }

    /// Returns the OAuth2 scopes to request, parsed from the
    /// comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes.split(',').map(str::trim).collect()
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid,
    /// including a cookie secret shorter than 32 bytes. Startup should not
    /// proceed in that case.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.session.cookie_secret.len() < MIN_COOKIE_SECRET_BYTES {
            return Err(config::ConfigError::Message(format!(
                "SESSION__COOKIE_SECRET must be at least {} bytes",
                MIN_COOKIE_SECRET_BYTES
            )));
        }
        if self.session.ttl_minutes <= 0 {
            return Err(config::ConfigError::Message(
                "SESSION__TTL_MINUTES must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
