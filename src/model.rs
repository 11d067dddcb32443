//! Typed views over Analytics Admin API resources
//!
//! Every type here is a read-only snapshot of remote state, built fresh per
//! aggregation run. Optional remote fields stay `Option` so the flattener
//! never has to guess field presence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stream kind retained by the aggregation; all other kinds are discarded
/// during the streams walk.
pub const WEB_DATA_STREAM: &str = "WEB_DATA_STREAM";

/// One page of a list call.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Token for the next page; `None` on the final page.
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: None,
        }
    }
}

/// An Analytics account, e.g. `accounts/54321`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Resource name, `accounts/{id}`.
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

/// A property under an account, e.g. `properties/1001`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Resource name, `properties/{id}`.
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    /// Resource name of the owning account, `accounts/{id}`.
    pub parent: String,
}

/// A data stream under a property, e.g. `properties/1001/dataStreams/2002`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStream {
    /// Resource name, `properties/{id}/dataStreams/{id}`.
    pub name: String,
    /// Stream kind, e.g. `WEB_DATA_STREAM`, `IOS_APP_DATA_STREAM`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub display_name: String,
    pub create_time: DateTime<Utc>,
    /// Present only for web streams.
    #[serde(default)]
    pub web_stream_data: Option<WebStreamData>,
}

impl DataStream {
    pub fn is_web(&self) -> bool {
        self.kind == WEB_DATA_STREAM
    }
}

/// Web-stream specific fields. Both are optional on the remote side.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebStreamData {
    #[serde(default)]
    pub measurement_id: Option<String>,
    #[serde(default)]
    pub default_uri: Option<String>,
}

/// One row of the flattened output: a web data stream together with its
/// denormalized account and property ancestry.
///
/// Serializes with a fixed shape: absent optional fields become `null`,
/// never omitted keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedRecord {
    pub account_id: String,
    pub account_name: String,
    pub property_id: String,
    pub property_name: String,
    pub stream_id: String,
    pub stream_name: String,
    pub measurement_id: Option<String>,
    pub default_uri: Option<String>,
    pub create_time: DateTime<Utc>,
}
