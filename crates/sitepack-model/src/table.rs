//! Ordered `(id, value)` tables with lenient parsing.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Ordered list of `(id, value)` pairs.
pub type Table<T> = Vec<(String, T)>;

/// Deserialize a table, skipping entries whose value does not parse.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Table<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<(String, serde_json::Value)>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value(value) {
            Ok(parsed) => Some((id, parsed)),
            Err(e) => {
                tracing::debug!(id = %id, error = %e, "Skipping unparsable table entry");
                None
            }
        })
        .collect())
}

/// Deserialize a list, skipping records that do not parse.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!(index, error = %e, "Skipping unparsable list entry");
                None
            }
        })
        .collect())
}

/// Deserialize a keyed map, skipping values that do not parse.
pub(crate) fn lenient_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value(value) {
            Ok(parsed) => Some((id, parsed)),
            Err(e) => {
                tracing::debug!(id = %id, error = %e, "Skipping unparsable map entry");
                None
            }
        })
        .collect())
}
