//! Data source references inside expressions.
//!
//! Expressions refer to data sources as `$ws$dataSource$<id>`, with `-` in
//! ids encoded as `__DASH__`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static DATA_SOURCE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$ws\$dataSource\$([A-Za-z0-9_]+)").unwrap());

#[must_use]
pub fn decode_data_source_id(encoded: &str) -> String {
    encoded.replace("__DASH__", "-")
}

/// Replace data source references using `resolve`.
///
/// References `resolve` cannot name become `undefined`. An empty expression
/// is `undefined`.
pub fn rewrite_expression(expression: &str, mut resolve: impl FnMut(&str) -> Option<String>) -> String {
    if expression.trim().is_empty() {
        return "undefined".to_owned();
    }
    DATA_SOURCE_REF
        .replace_all(expression, |caps: &Captures<'_>| {
            resolve(&decode_data_source_id(&caps[1])).unwrap_or_else(|| "undefined".to_owned())
        })
        .into_owned()
}

/// Decoded ids of every data source referenced in `expression`.
pub(crate) fn referenced_ids(expression: &str) -> impl Iterator<Item = String> + '_ {
    DATA_SOURCE_REF
        .captures_iter(expression)
        .map(|caps| decode_data_source_id(&caps[1]))
}
