//! HTTP utilities for Admin API calls
//!
//! One job: perform an authenticated GET and map transport conditions onto
//! the [`ClientError`] taxonomy. 401/403 means the credential was rejected;
//! timeouts, 429 and 5xx are transient and left to the caller's retry
//! policy; anything else unexpected is fatal.

use reqwest::Client;
use url::Url;

use super::auth::Credential;
use crate::error::ClientError;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging: truncate long responses and strip
/// non-printable characters. Truncation backs up to a char boundary so a
/// multi-byte character straddling the cutoff cannot panic the slice.
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... [truncated, {} bytes total]",
            &body[..end],
            body.len()
        )
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for Admin API calls.
#[derive(Clone)]
pub struct AdminHttpClient {
    client: Client,
}

impl AdminHttpClient {
    pub fn new() -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(concat!("ga-inventory/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Setup(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Perform a bearer-authenticated GET and return the raw response body.
    pub async fn get(&self, url: Url, credential: &Credential) -> Result<String, ClientError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(credential.bearer())
            .send()
            .await
            .map_err(|e| ClientError::Transient {
                reason: format!("request failed: {e}"),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transient {
                reason: format!("failed to read response body: {e}"),
            })?;

        if status.is_success() {
            return Ok(body);
        }

        // Only log sanitized/truncated error bodies to avoid leaking
        // sensitive data.
        tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));

        match status.as_u16() {
            401 | 403 => Err(ClientError::Auth {
                reason: format!("HTTP {status}"),
            }),
            408 | 429 => Err(ClientError::Transient {
                reason: format!("HTTP {status}"),
            }),
            code if (500..600).contains(&code) => Err(ClientError::Transient {
                reason: format!("HTTP {status}"),
            }),
            code => Err(ClientError::Unexpected {
                status: code,
                body: sanitize_for_log(&body),
            }),
        }
    }
}
