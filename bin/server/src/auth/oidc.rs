//! OIDC client implementation using the openidconnect crate.
//!
//! All protocol cryptography (ID token signature, issuer, audience, expiry
//! and nonce checks, JWKS handling) is delegated to `openidconnect`; this
//! module only wires the discovered provider metadata and our registered
//! client credentials to the three operations the handlers need.

use std::time::Duration;

use gatehouse_session::{LoginAttempt, UserClaims};
use openidconnect::core::{
    CoreAuthenticationFlow, CoreClient, CoreProviderMetadata, CoreUserInfoClaims,
};
use openidconnect::{
    AccessToken, AuthorizationCode, ClientId, ClientSecret, CsrfToken, IssuerUrl, Nonce,
    OAuth2TokenResponse, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope,
    SubjectIdentifier, TokenResponse,
};
use thiserror::Error;

use crate::config::CognitoConfig;

/// Timeout applied to every call against the provider.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// OIDC client for authenticating users against the configured user pool.
///
/// Immutable after construction. Provider endpoints come from discovery;
/// credentials and scopes come from configuration.
pub struct OidcClient {
    provider_metadata: CoreProviderMetadata,
    client_id: ClientId,
    client_secret: ClientSecret,
    redirect_url: RedirectUrl,
    scopes: Vec<String>,
    http_client: reqwest::Client,
}

/// Result of a successful token exchange.
///
/// The subject comes from the validated ID token; the access token is what
/// the userinfo endpoint accepts.
pub struct TokenExchange {
    pub subject: String,
    pub access_token: String,
}

impl OidcClient {
    /// Creates a new OIDC client by discovering the provider metadata.
    ///
    /// Runs once at startup. On failure the caller keeps the process alive
    /// but marks authentication unavailable.
    pub async fn discover(config: &CognitoConfig) -> Result<Self, OidcError> {
        let issuer_url = IssuerUrl::new(config.issuer_url())
            .map_err(|e| OidcError::Configuration(format!("invalid issuer URL: {}", e)))?;

        let http_client = build_http_client()?;

        let provider_metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| OidcError::Discovery(format!("failed to discover provider: {}", e)))?;

        Self::from_metadata(provider_metadata, config)
    }

    /// Creates a client from already-resolved provider metadata.
    pub fn from_metadata(
        provider_metadata: CoreProviderMetadata,
        config: &CognitoConfig,
    ) -> Result<Self, OidcError> {
        let redirect_url = RedirectUrl::new(config.redirect_uri.clone())
            .map_err(|e| OidcError::Configuration(format!("invalid redirect URI: {}", e)))?;

        Ok(Self {
            provider_metadata,
            client_id: ClientId::new(config.client_id.clone()),
            client_secret: ClientSecret::new(config.client_secret.clone()),
            redirect_url,
            scopes: config.scopes().iter().map(|s| s.to_string()).collect(),
            http_client: build_http_client()?,
        })
    }

    /// Generates the authorization URL for redirecting the user.
    ///
    /// Pure construction, no network call. The returned [`LoginAttempt`]
    /// holds the single-use values the callback must match against.
    pub fn authorization_url(&self) -> (String, LoginAttempt) {
        let client = self.core_client();

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                CsrfToken::new_random,
                Nonce::new_random,
            )
            .set_pkce_challenge(pkce_challenge);

        for scope in &self.scopes {
            auth_request = auth_request.add_scope(Scope::new(scope.clone()));
        }

        let (auth_url, csrf_token, nonce) = auth_request.url();

        let attempt = LoginAttempt::new(
            csrf_token.secret().clone(),
            nonce.secret().clone(),
            pkce_verifier.secret().clone(),
        );

        (auth_url.to_string(), attempt)
    }

    /// Exchanges the authorization code for tokens and validates the ID
    /// token.
    ///
    /// The `state` parameter must already have been matched against the
    /// attempt by the caller; the nonce is checked here, against the ID
    /// token, alongside signature, issuer, audience and expiry.
    pub async fn exchange_code(
        &self,
        code: &str,
        attempt: &LoginAttempt,
    ) -> Result<TokenExchange, OidcError> {
        let client = self.core_client();

        let token_request = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| OidcError::TokenExchange(format!("token endpoint error: {}", e)))?;

        let token_response = token_request
            .set_pkce_verifier(PkceCodeVerifier::new(attempt.pkce_verifier.clone()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| OidcError::TokenExchange(format!("token exchange failed: {}", e)))?;

        let id_token = token_response
            .id_token()
            .ok_or_else(|| OidcError::TokenExchange("no ID token in response".to_string()))?;

        let nonce = Nonce::new(attempt.nonce.clone());
        let claims = id_token
            .claims(&client.id_token_verifier(), &nonce)
            .map_err(|e| {
                OidcError::TokenValidation(format!("ID token validation failed: {}", e))
            })?;

        Ok(TokenExchange {
            subject: claims.subject().to_string(),
            access_token: token_response.access_token().secret().clone(),
        })
    }

    /// Fetches the user's profile claims from the userinfo endpoint.
    ///
    /// The returned subject must match the ID token's subject; the
    /// verifier rejects the response otherwise.
    pub async fn fetch_user_info(
        &self,
        access_token: &str,
        expected_subject: &str,
    ) -> Result<UserClaims, OidcError> {
        let client = self.core_client();

        let request = client
            .user_info(
                AccessToken::new(access_token.to_string()),
                Some(SubjectIdentifier::new(expected_subject.to_string())),
            )
            .map_err(|e| {
                OidcError::Configuration(format!("provider has no userinfo endpoint: {}", e))
            })?;

        let claims: CoreUserInfoClaims = request
            .request_async(&self.http_client)
            .await
            .map_err(|e| OidcError::UserInfo(format!("userinfo request failed: {}", e)))?;

        let email = claims.email().map(|e| e.as_str().to_string());
        let display_name = claims
            .name()
            .and_then(|n| n.get(None))
            .map(|n| n.as_str().to_string())
            .or_else(|| claims.preferred_username().map(|u| u.as_str().to_string()));

        Ok(UserClaims::new(claims.subject().to_string())
            .with_email(email)
            .with_display_name(display_name))
    }

    fn core_client(
        &self,
    ) -> CoreClient<
        openidconnect::EndpointSet,
        openidconnect::EndpointNotSet,
        openidconnect::EndpointNotSet,
        openidconnect::EndpointNotSet,
        openidconnect::EndpointMaybeSet,
        openidconnect::EndpointMaybeSet,
    > {
        CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        )
        .set_redirect_uri(self.redirect_url.clone())
    }
}

fn build_http_client() -> Result<reqwest::Client, OidcError> {
    // Never follow redirects when talking to the provider.
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(PROVIDER_TIMEOUT)
        .build()
        .map_err(|e| OidcError::Configuration(format!("failed to create HTTP client: {}", e)))
}

/// OIDC-related errors.
#[derive(Debug, Error)]
pub enum OidcError {
    /// Configuration error (invalid URLs, missing endpoints).
    #[error("OIDC configuration error: {0}")]
    Configuration(String),
    /// Failed to discover provider metadata.
    #[error("OIDC discovery error: {0}")]
    Discovery(String),
    /// Token exchange failed.
    #[error("OIDC token exchange error: {0}")]
    TokenExchange(String),
    /// Token validation failed.
    #[error("OIDC token validation error: {0}")]
    TokenValidation(String),
    /// Userinfo fetch failed.
    #[error("OIDC userinfo error: {0}")]
    UserInfo(String),
}
