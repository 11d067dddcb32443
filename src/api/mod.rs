//! Analytics Admin API interaction
//!
//! Everything needed to issue credential-scoped list calls against the
//! Google Analytics Admin API.
//!
//! # Module Structure
//!
//! - [`auth`] - bearer credentials, plus an Application Default Credentials
//!   token source for callers that do not bring their own token
//! - [`http`] - thin HTTP wrapper mapping transport conditions onto the
//!   error taxonomy
//! - [`client`] - the typed per-level list operations and the
//!   [`client::AnalyticsAdminApi`] seam the aggregator is written against

pub mod auth;
pub mod client;
pub mod http;
