//! Admin API client
//!
//! Typed list operations over the three levels of the Analytics resource
//! hierarchy. Each call fetches exactly one page; pagination is the
//! walker's job. Responses are validated here so downstream code can rely
//! on well-shaped resource names.

use std::future::Future;

use url::Url;

use super::auth::Credential;
use super::http::AdminHttpClient;
use crate::error::ClientError;
use crate::model::{Account, DataStream, Page, Property};

use serde::Deserialize;

/// Production Admin API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://analyticsadmin.googleapis.com";

/// Default page size requested per list call (the Admin API maximum is 200
/// for these collections).
const DEFAULT_PAGE_SIZE: u32 = 200;

/// The three credential-scoped list operations the aggregator is written
/// against. Implemented over HTTP by [`AdminApiClient`]; tests substitute
/// in-memory fakes.
pub trait AnalyticsAdminApi {
    /// List one page of accounts visible to the credential.
    fn list_accounts(
        &self,
        credential: &Credential,
        page_token: Option<&str>,
    ) -> impl Future<Output = Result<Page<Account>, ClientError>> + Send;

    /// List one page of properties under `account_name` (`accounts/{id}`).
    fn list_properties(
        &self,
        credential: &Credential,
        account_name: &str,
        page_token: Option<&str>,
    ) -> impl Future<Output = Result<Page<Property>, ClientError>> + Send;

    /// List one page of data streams under `property_name`
    /// (`properties/{id}`). All stream kinds are returned; filtering to web
    /// streams happens in the aggregator.
    fn list_data_streams(
        &self,
        credential: &Credential,
        property_name: &str,
        page_token: Option<&str>,
    ) -> impl Future<Output = Result<Page<DataStream>, ClientError>> + Send;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAccountsResponse {
    #[serde(default)]
    accounts: Vec<Account>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPropertiesResponse {
    #[serde(default)]
    properties: Vec<Property>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDataStreamsResponse {
    #[serde(default)]
    data_streams: Vec<DataStream>,
    next_page_token: Option<String>,
}

/// HTTP implementation of [`AnalyticsAdminApi`].
///
/// Holds no per-call state; the credential arrives with every call.
#[derive(Clone)]
pub struct AdminApiClient {
    http: AdminHttpClient,
    endpoint: Url,
    page_size: u32,
}

impl AdminApiClient {
    /// Client against the production endpoint.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Client against an alternate endpoint (mock server, regional proxy).
    pub fn with_endpoint(endpoint: &str) -> Result<Self, ClientError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ClientError::Setup(format!("invalid endpoint {endpoint:?}: {e}")))?;

        Ok(Self {
            http: AdminHttpClient::new()?,
            endpoint,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Override the per-call page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    fn list_url(
        &self,
        path: &str,
        filter: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<Url, ClientError> {
        let mut url = self
            .endpoint
            .join(path)
            .map_err(|e| ClientError::Setup(format!("invalid request path {path:?}: {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("pageSize", &self.page_size.to_string());
            if let Some(filter) = filter {
                query.append_pair("filter", filter);
            }
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        Ok(url)
    }
}

impl AnalyticsAdminApi for AdminApiClient {
    async fn list_accounts(
        &self,
        credential: &Credential,
        page_token: Option<&str>,
    ) -> Result<Page<Account>, ClientError> {
        let url = self.list_url("v1beta/accounts", None, page_token)?;
        let body = self.http.get(url, credential).await?;
        let response: ListAccountsResponse = parse_body(&body)?;

        for account in &response.accounts {
            validate_collection_name(&account.name, "accounts")?;
        }

        Ok(Page {
            items: response.accounts,
            next_page_token: non_empty(response.next_page_token),
        })
    }

    async fn list_properties(
        &self,
        credential: &Credential,
        account_name: &str,
        page_token: Option<&str>,
    ) -> Result<Page<Property>, ClientError> {
        let filter = format!("parent:{account_name}");
        let url = self.list_url("v1beta/properties", Some(&filter), page_token)?;
        let body = self.http.get(url, credential).await?;
        let response: ListPropertiesResponse = parse_body(&body)?;

        for property in &response.properties {
            validate_collection_name(&property.name, "properties")?;
            validate_collection_name(&property.parent, "accounts")?;
        }

        Ok(Page {
            items: response.properties,
            next_page_token: non_empty(response.next_page_token),
        })
    }

    async fn list_data_streams(
        &self,
        credential: &Credential,
        property_name: &str,
        page_token: Option<&str>,
    ) -> Result<Page<DataStream>, ClientError> {
        let path = format!("v1beta/{property_name}/dataStreams");
        let url = self.list_url(&path, None, page_token)?;
        let body = self.http.get(url, credential).await?;
        let response: ListDataStreamsResponse = parse_body(&body)?;

        for stream in &response.data_streams {
            validate_stream_name(&stream.name)?;
        }

        Ok(Page {
            items: response.data_streams,
            next_page_token: non_empty(response.next_page_token),
        })
    }
}

fn parse_body<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Malformed {
        detail: format!("invalid list response: {e}"),
    })
}

/// The Admin API sometimes reports the final page with an empty token
/// instead of omitting the field.
fn non_empty(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

/// Require `{collection}/{id}` with a single non-empty id segment.
fn validate_collection_name(name: &str, collection: &str) -> Result<(), ClientError> {
    match name
        .strip_prefix(collection)
        .and_then(|rest| rest.strip_prefix('/'))
    {
        Some(id) if !id.is_empty() && !id.contains('/') => Ok(()),
        _ => Err(ClientError::Malformed {
            detail: format!("resource name {name:?} does not match {collection}/{{id}}"),
        }),
    }
}

/// Require `properties/{id}/dataStreams/{id}`.
fn validate_stream_name(name: &str) -> Result<(), ClientError> {
    let segments: Vec<&str> = name.split('/').collect();
    let well_formed = segments.len() == 4
        && segments[0] == "properties"
        && segments[2] == "dataStreams"
        && !segments[1].is_empty()
        && !segments[3].is_empty();

    if well_formed {
        Ok(())
    } else {
        Err(ClientError::Malformed {
            detail: format!("resource name {name:?} does not match properties/{{id}}/dataStreams/{{id}}"),
        })
    }
}
