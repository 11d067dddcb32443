//! Flattener
//!
//! Maps one `(account, property, stream)` triple into a self-contained
//! output record. Pure: all validation happened at the client boundary, so
//! nothing here can fail.

use crate::model::{Account, DataStream, FlattenedRecord, Property};

/// Extract the leaf identifier from a structured resource name,
/// e.g. `properties/1001/dataStreams/2002` -> `2002`.
pub fn leaf_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Build the flattened record for one web data stream, denormalizing its
/// account and property ancestry.
pub fn normalize(account: &Account, property: &Property, stream: &DataStream) -> FlattenedRecord {
    let web = stream.web_stream_data.as_ref();

    FlattenedRecord {
        account_id: leaf_id(&account.name).to_string(),
        account_name: account.display_name.clone(),
        property_id: leaf_id(&property.name).to_string(),
        property_name: property.display_name.clone(),
        stream_id: leaf_id(&stream.name).to_string(),
        stream_name: stream.display_name.clone(),
        measurement_id: web.and_then(|w| w.measurement_id.clone()),
        default_uri: web.and_then(|w| w.default_uri.clone()),
        create_time: stream.create_time,
    }
}
