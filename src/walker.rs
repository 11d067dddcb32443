//! Level walker
//!
//! Exhausts pagination for a single parent: repeatedly fetch pages,
//! following `nextPageToken` until the remote stops returning one, and
//! concatenate items in the order pages arrive. Each page fetch goes
//! through the retry policy; only transient failures are retried.

use std::future::Future;
use std::time::Duration;

use crate::error::{AggregateError, ClientError, Level};
use crate::model::Page;

/// Retry policy for a single page fetch.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per page fetch, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Collect the complete child set of one parent, across all pages.
///
/// `fetch_page` issues a single list call for the given page token. Errors
/// surviving the retry policy are tagged with the failing level and parent;
/// authentication rejections keep their own identity.
pub(crate) async fn collect_all<T, F, Fut>(
    level: Level,
    parent: Option<&str>,
    retry: &RetryPolicy,
    mut fetch_page: F,
) -> Result<Vec<T>, AggregateError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, ClientError>>,
{
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let token = page_token.clone();
        let page = fetch_with_retry(retry, || fetch_page(token.clone()))
            .await
            .map_err(|source| tag(level, parent, source))?;

        pages += 1;
        items.extend(page.items);

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    tracing::debug!(
        %level,
        parent = parent.unwrap_or("<root>"),
        pages,
        items = items.len(),
        "walk complete"
    );

    Ok(items)
}

async fn fetch_with_retry<T, F, Fut>(retry: &RetryPolicy, mut call: F) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut attempt: u32 = 1;

    loop {
        match call().await {
            Err(error) if error.is_retryable() && attempt < retry.max_attempts => {
                let delay = retry.delay_for(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts = retry.max_attempts,
                    %error,
                    "transient failure, retrying in {:?}",
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

fn tag(level: Level, parent: Option<&str>, source: ClientError) -> AggregateError {
    match source {
        error @ ClientError::Auth { .. } => AggregateError::Auth(error),
        source => AggregateError::Fetch {
            level,
            parent: parent.map(str::to_string),
            source,
        },
    }
}
