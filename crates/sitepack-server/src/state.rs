//! Application state.

use std::sync::Arc;

use sitepack_export::StaticSiteBuilder;

use crate::store::BuildStore;

/// State shared across all handlers.
pub(crate) struct AppState {
    /// Source of published builds.
    pub(crate) store: Arc<dyn BuildStore>,
    /// Generator invoked per request.
    pub(crate) builder: StaticSiteBuilder,
}
