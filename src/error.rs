//! Error taxonomy for the hierarchy walk
//!
//! Two layers: [`ClientError`] covers a single list call against the
//! Analytics Admin API, [`AggregateError`] is what an aggregation run
//! surfaces to its caller after retry and level tagging.

use std::fmt;

use thiserror::Error;

/// One level of the account / property / data-stream hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Accounts,
    Properties,
    Streams,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Accounts => write!(f, "accounts"),
            Level::Properties => write!(f, "properties"),
            Level::Streams => write!(f, "data streams"),
        }
    }
}

/// Failure of a single list call.
///
/// `Transient` is the only variant eligible for retry; everything else
/// aborts the walk on first occurrence.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The remote service rejected the credential (401/403).
    #[error("authentication rejected: {reason}")]
    Auth { reason: String },

    /// Network failure or a retryable remote condition (timeout, 429, 5xx).
    #[error("transient failure: {reason}")]
    Transient { reason: String },

    /// A response status the Admin API is not expected to return for a
    /// well-formed list call.
    #[error("unexpected HTTP status {status}: {body}")]
    Unexpected { status: u16, body: String },

    /// A response or record missing required identifying fields.
    #[error("malformed resource: {detail}")]
    Malformed { detail: String },

    /// The HTTP client or endpoint configuration could not be constructed.
    #[error("client setup failed: {0}")]
    Setup(String),
}

impl ClientError {
    /// Whether the retry policy may re-issue the failing call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Transient { .. })
    }
}

/// Failure of a whole aggregation run.
///
/// The run is all-or-nothing: whichever branch fails first aborts the
/// aggregation and no partial output is returned.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Credential rejected at any level. Maps to 401 at the transport
    /// boundary; never retried.
    #[error("credential rejected by the Analytics Admin API")]
    Auth(#[source] ClientError),

    /// A walk failed after the retry policy was exhausted (or on a fatal,
    /// non-retryable condition), tagged with the failing level and parent.
    #[error("listing {level} under {} failed", .parent.as_deref().unwrap_or("<root>"))]
    Fetch {
        level: Level,
        /// Resource name of the parent whose children were being listed;
        /// `None` for the root accounts walk.
        parent: Option<String>,
        #[source]
        source: ClientError,
    },
}

impl AggregateError {
    /// The hierarchy level at which the run failed, if it got as far as
    /// issuing a tagged walk.
    pub fn level(&self) -> Option<Level> {
        match self {
            AggregateError::Auth(_) => None,
            AggregateError::Fetch { level, .. } => Some(*level),
        }
    }

    /// Parent resource name of the failing walk, when one exists.
    pub fn parent(&self) -> Option<&str> {
        match self {
            AggregateError::Auth(_) => None,
            AggregateError::Fetch { parent, .. } => parent.as_deref(),
        }
    }
}
