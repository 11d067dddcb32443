//! Hierarchy aggregator
//!
//! Orchestrates the three nested walks (accounts, then properties per
//! account, then data streams per property) and flattens every web stream
//! into one output record carrying its full ancestry.
//!
//! Sibling walks at the same level are fanned out on a bounded number of
//! in-flight calls, but results are reassembled into discovery order before
//! anything is handed back: completion order never leaks into output order.
//! The run is all-or-nothing; the first failing branch aborts it, and
//! dropping the returned future abandons in-flight calls without producing
//! partial output.

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::api::auth::Credential;
use crate::api::client::AnalyticsAdminApi;
use crate::error::{AggregateError, ClientError, Level};
use crate::model::{Account, DataStream, FlattenedRecord, Property};
use crate::normalize::normalize;
use crate::walker::{collect_all, RetryPolicy};

/// Tuning knobs for one aggregation run.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Upper bound on in-flight sibling walks at one level.
    pub concurrency: usize,
    /// Per-page retry policy for transient failures.
    pub retry: RetryPolicy,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            retry: RetryPolicy::default(),
        }
    }
}

/// The aggregation entry point: walks the resource hierarchy visible to one
/// credential and returns a flat record per reachable web data stream.
pub struct Aggregator<A> {
    api: A,
    config: AggregatorConfig,
}

impl<A: AnalyticsAdminApi> Aggregator<A> {
    pub fn new(api: A) -> Self {
        Self::with_config(api, AggregatorConfig::default())
    }

    pub fn with_config(api: A, config: AggregatorConfig) -> Self {
        Self { api, config }
    }

    /// Walk accounts, properties, and data streams reachable from
    /// `credential` and flatten every web stream with its ancestry.
    ///
    /// Output is grouped by account, then property, then stream, each in
    /// discovery order, and is reproducible given identical remote
    /// responses.
    pub async fn aggregate(
        &self,
        credential: &Credential,
    ) -> Result<Vec<FlattenedRecord>, AggregateError> {
        if credential.is_empty() {
            return Err(AggregateError::Auth(ClientError::Auth {
                reason: "empty credential".into(),
            }));
        }

        let concurrency = self.config.concurrency.max(1);

        let accounts = self.walk_accounts(credential).await?;

        // `buffered` (not `buffer_unordered`) keeps results in input order
        // regardless of which sibling walk finishes first.
        let properties_per_account: Vec<Vec<Property>> = stream::iter(accounts.iter())
            .map(|account| self.walk_properties(credential, account))
            .buffered(concurrency)
            .try_collect()
            .await?;

        let pairs: Vec<(&Account, &Property)> = accounts
            .iter()
            .zip(properties_per_account.iter())
            .flat_map(|(account, properties)| {
                properties.iter().map(move |property| (account, property))
            })
            .collect();

        let streams_per_property: Vec<Vec<DataStream>> = stream::iter(pairs.iter())
            .map(|&(_, property)| self.walk_streams(credential, property))
            .buffered(concurrency)
            .try_collect()
            .await?;

        let mut records = Vec::new();
        for (&(account, property), streams) in pairs.iter().zip(streams_per_property.iter()) {
            for stream in streams {
                records.push(normalize(account, property, stream));
            }
        }

        tracing::info!(
            accounts = accounts.len(),
            properties = pairs.len(),
            records = records.len(),
            "hierarchy aggregation complete"
        );

        Ok(records)
    }

    async fn walk_accounts(&self, credential: &Credential) -> Result<Vec<Account>, AggregateError> {
        collect_all(Level::Accounts, None, &self.config.retry, |token| async move {
            self.api.list_accounts(credential, token.as_deref()).await
        })
        .await
    }

    async fn walk_properties(
        &self,
        credential: &Credential,
        account: &Account,
    ) -> Result<Vec<Property>, AggregateError> {
        collect_all(
            Level::Properties,
            Some(account.name.as_str()),
            &self.config.retry,
            |token| async move {
                self.api
                    .list_properties(credential, &account.name, token.as_deref())
                    .await
            },
        )
        .await
    }

    /// Walk one property's data streams, keeping only web streams.
    async fn walk_streams(
        &self,
        credential: &Credential,
        property: &Property,
    ) -> Result<Vec<DataStream>, AggregateError> {
        let mut streams = collect_all(
            Level::Streams,
            Some(property.name.as_str()),
            &self.config.retry,
            |token| async move {
                self.api
                    .list_data_streams(credential, &property.name, token.as_deref())
                    .await
            },
        )
        .await?;

        let total = streams.len();
        streams.retain(DataStream::is_web);
        if streams.len() < total {
            tracing::debug!(
                property = %property.name,
                discarded = total - streams.len(),
                "discarded non-web data streams"
            );
        }

        Ok(streams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Page, WebStreamData};
    use std::collections::HashMap;

    /// In-memory Admin API with a single page per parent.
    #[derive(Default)]
    struct FakeApi {
        accounts: Vec<Account>,
        properties: HashMap<String, Vec<Property>>,
        streams: HashMap<String, Vec<DataStream>>,
        /// Property whose stream listing always fails transiently.
        fail_streams_for: Option<String>,
    }

    impl AnalyticsAdminApi for FakeApi {
        async fn list_accounts(
            &self,
            _credential: &Credential,
            _page_token: Option<&str>,
        ) -> Result<Page<Account>, ClientError> {
            Ok(Page::last(self.accounts.clone()))
        }

        async fn list_properties(
            &self,
            _credential: &Credential,
            account_name: &str,
            _page_token: Option<&str>,
        ) -> Result<Page<Property>, ClientError> {
            Ok(Page::last(
                self.properties.get(account_name).cloned().unwrap_or_default(),
            ))
        }

        async fn list_data_streams(
            &self,
            _credential: &Credential,
            property_name: &str,
            _page_token: Option<&str>,
        ) -> Result<Page<DataStream>, ClientError> {
            if self.fail_streams_for.as_deref() == Some(property_name) {
                return Err(ClientError::Transient {
                    reason: "HTTP 500".into(),
                });
            }
            Ok(Page::last(
                self.streams.get(property_name).cloned().unwrap_or_default(),
            ))
        }
    }

    fn account(name: &str, display_name: &str) -> Account {
        Account {
            name: name.into(),
            display_name: display_name.into(),
        }
    }

    fn property(name: &str, display_name: &str, parent: &str) -> Property {
        Property {
            name: name.into(),
            display_name: display_name.into(),
            parent: parent.into(),
        }
    }

    fn web_stream(name: &str, display_name: &str, measurement_id: Option<&str>) -> DataStream {
        DataStream {
            name: name.into(),
            kind: "WEB_DATA_STREAM".into(),
            display_name: display_name.into(),
            create_time: "2023-01-15T10:30:00Z".parse().unwrap(),
            web_stream_data: Some(WebStreamData {
                measurement_id: measurement_id.map(str::to_string),
                default_uri: None,
            }),
        }
    }

    fn app_stream(name: &str) -> DataStream {
        DataStream {
            name: name.into(),
            kind: "IOS_APP_DATA_STREAM".into(),
            display_name: "App".into(),
            create_time: "2023-01-15T10:30:00Z".parse().unwrap(),
            web_stream_data: None,
        }
    }

    fn fast_config() -> AggregatorConfig {
        AggregatorConfig {
            concurrency: 4,
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay: std::time::Duration::from_millis(1),
            },
        }
    }

    #[tokio::test]
    async fn empty_credential_is_rejected_before_any_call() {
        let aggregator = Aggregator::new(FakeApi::default());
        let result = aggregator.aggregate(&Credential::new("")).await;
        assert!(matches!(result.unwrap_err(), AggregateError::Auth(_)));
    }

    #[tokio::test]
    async fn zero_accounts_yield_empty_output() {
        let aggregator = Aggregator::new(FakeApi::default());
        let records = aggregator
            .aggregate(&Credential::new("token"))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn account_without_properties_contributes_nothing() {
        let mut api = FakeApi::default();
        api.accounts = vec![account("accounts/1", "Acme"), account("accounts/2", "Empty")];
        api.properties.insert(
            "accounts/1".into(),
            vec![property("properties/10", "Site A", "accounts/1")],
        );
        api.streams.insert(
            "properties/10".into(),
            vec![web_stream("properties/10/dataStreams/100", "Main", Some("G-AAA"))],
        );

        let aggregator = Aggregator::with_config(api, fast_config());
        let records = aggregator
            .aggregate(&Credential::new("token"))
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].account_id, "1");
    }

    #[tokio::test]
    async fn non_web_streams_are_discarded() {
        let mut api = FakeApi::default();
        api.accounts = vec![account("accounts/1", "Acme")];
        api.properties.insert(
            "accounts/1".into(),
            vec![property("properties/10", "Site A", "accounts/1")],
        );
        api.streams.insert(
            "properties/10".into(),
            vec![
                app_stream("properties/10/dataStreams/101"),
                web_stream("properties/10/dataStreams/100", "Main", Some("G-AAA")),
            ],
        );

        let aggregator = Aggregator::with_config(api, fast_config());
        let records = aggregator
            .aggregate(&Credential::new("token"))
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].stream_id, "100");
    }

    #[tokio::test]
    async fn failing_branch_aborts_whole_run_with_ancestry() {
        let mut api = FakeApi::default();
        api.accounts = vec![account("accounts/1", "Acme")];
        api.properties.insert(
            "accounts/1".into(),
            vec![
                property("properties/10", "Site A", "accounts/1"),
                property("properties/20", "Site B", "accounts/1"),
                property("properties/30", "Site C", "accounts/1"),
            ],
        );
        for name in ["properties/10", "properties/30"] {
            api.streams.insert(
                name.into(),
                vec![web_stream(&format!("{name}/dataStreams/1"), "S", None)],
            );
        }
        api.fail_streams_for = Some("properties/20".into());

        let aggregator = Aggregator::with_config(api, fast_config());
        let err = aggregator
            .aggregate(&Credential::new("token"))
            .await
            .unwrap_err();

        assert_eq!(err.level(), Some(Level::Streams));
        assert_eq!(err.parent(), Some("properties/20"));
    }

    #[tokio::test]
    async fn output_is_grouped_in_discovery_order() {
        let mut api = FakeApi::default();
        api.accounts = vec![account("accounts/1", "One"), account("accounts/2", "Two")];
        api.properties.insert(
            "accounts/1".into(),
            vec![
                property("properties/11", "P11", "accounts/1"),
                property("properties/12", "P12", "accounts/1"),
            ],
        );
        api.properties.insert(
            "accounts/2".into(),
            vec![property("properties/21", "P21", "accounts/2")],
        );
        for name in ["properties/11", "properties/12", "properties/21"] {
            api.streams.insert(
                name.into(),
                vec![
                    web_stream(&format!("{name}/dataStreams/1"), "a", None),
                    web_stream(&format!("{name}/dataStreams/2"), "b", None),
                ],
            );
        }

        let aggregator = Aggregator::with_config(api, fast_config());
        let records = aggregator
            .aggregate(&Credential::new("token"))
            .await
            .unwrap();

        let keys: Vec<(String, String, String)> = records
            .iter()
            .map(|r| {
                (
                    r.account_id.clone(),
                    r.property_id.clone(),
                    r.stream_id.clone(),
                )
            })
            .collect();
        let expected = vec![
            ("1".into(), "11".into(), "1".into()),
            ("1".into(), "11".into(), "2".into()),
            ("1".into(), "12".into(), "1".into()),
            ("1".into(), "12".into(), "2".into()),
            ("2".into(), "21".into(), "1".into()),
            ("2".into(), "21".into(), "2".into()),
        ];
        assert_eq!(keys, expected);
    }
}
