//! Credentials
//!
//! The aggregation core only ever sees an opaque [`Credential`] passed in by
//! the caller. For callers that do not bring their own token, an
//! Application Default Credentials source is provided that mints one.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gcp_auth::TokenProvider;
use thiserror::Error;
use tokio::sync::RwLock;

/// Scope requested for Admin API list calls.
pub const ANALYTICS_READONLY_SCOPE: &[&str] =
    &["https://www.googleapis.com/auth/analytics.readonly"];

/// Refresh tokens this much before they actually expire, so a token never
/// goes stale mid-request.
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Conservative token TTL when the provider does not report expiry.
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// An opaque bearer token scoping which accounts, properties, and streams
/// are visible to an aggregation run.
///
/// The core never interprets the token beyond passing it through; `Debug`
/// redacts it so it cannot leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw bearer token, for the `Authorization` header.
    pub fn bearer(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Failure to mint a credential from Application Default Credentials.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to initialize Application Default Credentials (run 'gcloud auth application-default login'): {0}")]
    Provider(#[source] gcp_auth::Error),
    #[error("failed to obtain access token: {0}")]
    Token(#[source] gcp_auth::Error),
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires, with the refresh buffer already applied.
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Token source backed by Application Default Credentials, with expiry
/// buffered caching.
#[derive(Clone)]
pub struct AdcCredentials {
    provider: Arc<dyn TokenProvider>,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

impl AdcCredentials {
    pub async fn new() -> Result<Self, TokenError> {
        let provider = gcp_auth::provider().await.map_err(TokenError::Provider)?;

        Ok(Self {
            provider,
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Get a credential for Admin API calls, reusing the cached token while
    /// it is still valid.
    pub async fn credential(&self) -> Result<Credential, TokenError> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(Credential::new(cached.token.clone()));
                }
                tracing::debug!("cached token expired, fetching new token");
            }
        }

        let token = self
            .provider
            .token(ANALYTICS_READONLY_SCOPE)
            .await
            .map_err(TokenError::Token)?;

        let token_str = token.as_str().to_string();
        let expires_at = Instant::now() + DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER;

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token_str.clone(),
                expires_at,
            });
        }

        Ok(Credential::new(token_str))
    }

    /// Drop the cached token and mint a fresh one.
    pub async fn refresh(&self) -> Result<Credential, TokenError> {
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }

        self.credential().await
    }
}
