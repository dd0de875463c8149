//! HTTP request handlers.

pub(crate) mod export;
