//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sitepack_export::BuildError;

use crate::store::StoreError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The export name is missing from the request path.
    #[error("Name is required")]
    MissingName,

    /// No static build is published under the name.
    #[error("Build not found")]
    BuildNotFound(String),

    /// Cookie-carrying request from another site.
    #[error("Cross-site requests with cookies are not allowed")]
    CrossSiteCookie,

    /// Build store error.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Site generation error.
    #[error("{0}")]
    Build(#[from] BuildError),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingName => StatusCode::BAD_REQUEST,
            Self::BuildNotFound(_) | Self::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::CrossSiteCookie => StatusCode::FORBIDDEN,
            Self::Store(_) | Self::Build(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Static export failed");
        }
        (status, self.to_string()).into_response()
    }
}
