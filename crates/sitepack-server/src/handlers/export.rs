//! Static export endpoint.
//!
//! Resolves an export name to a published build, generates the site and
//! returns it as a ZIP download.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /cgi/static/ssg/ (no name).
pub(crate) async fn missing_name() -> ServerError {
    ServerError::MissingName
}

/// Handle GET /cgi/static/ssg/{name}.
pub(crate) async fn export_site(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    if name.is_empty() {
        return Err(ServerError::MissingName);
    }
    let zip_name = zip_name(&name);

    let build_id = state
        .store
        .find_build_id_by_name(&zip_name)?
        .ok_or_else(|| ServerError::BuildNotFound(zip_name.clone()))?;
    let data = state.store.load_build_data(&build_id)?;
    tracing::info!(build_id = %build_id, name = %zip_name, "Exporting static site");

    let export = state.builder.build(&data).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{zip_name}\""),
            ),
            (header::CONTENT_LENGTH, export.archive.len().to_string()),
        ],
        export.archive,
    )
        .into_response())
}

/// Export name with a `.zip` suffix.
fn zip_name(name: &str) -> String {
    if name.ends_with(".zip") {
        name.to_owned()
    } else {
        format!("{name}.zip")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_name() {
        assert_eq!(zip_name("acme"), "acme.zip");
        assert_eq!(zip_name("acme.zip"), "acme.zip");
    }
}
