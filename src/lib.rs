//! ga-inventory
//!
//! Discovery and flattening of the Google Analytics resource hierarchy.
//! Given one bearer credential, walk every account the credential can see,
//! every property under those accounts, and every data stream under those
//! properties, then flatten each web stream into a single record carrying
//! its denormalized ancestry.
//!
//! The whole walk is a pure function of the supplied credential: nothing is
//! cached across invocations and no state is persisted.
//!
//! # Example
//!
//! ```ignore
//! use ga_inventory::{AdminApiClient, Aggregator, Credential};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let aggregator = Aggregator::new(AdminApiClient::new()?);
//!     let records = aggregator.aggregate(&Credential::new("ya29...")).await?;
//!     for record in records {
//!         println!("{} / {} / {}", record.account_name, record.property_name, record.stream_name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod api;
pub mod error;
pub mod model;
pub mod normalize;
pub mod walker;

pub use aggregate::{Aggregator, AggregatorConfig};
pub use api::auth::{AdcCredentials, Credential, TokenError};
pub use api::client::{AdminApiClient, AnalyticsAdminApi, DEFAULT_ENDPOINT};
pub use error::{AggregateError, ClientError, Level};
pub use model::{Account, DataStream, FlattenedRecord, Page, Property, WebStreamData};
pub use normalize::{leaf_id, normalize};
pub use walker::RetryPolicy;
