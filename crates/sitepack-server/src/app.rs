//! Router construction.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/cgi/static/ssg/", get(handlers::export::missing_name))
        .route("/cgi/static/ssg/{name}", get(handlers::export::export_site))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::content_type_options_layer())
                .layer(axum::middleware::from_fn(security::reject_cross_site_cookies)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use pretty_assertions::assert_eq;
    use sitepack_export::StaticSiteBuilder;
    use tower::ServiceExt;

    use super::*;
    use crate::store::MemoryBuildStore;
    use crate::testing::sample_build;

    fn router() -> Router {
        let store = MemoryBuildStore::new().with_build("build-a", sample_build());
        create_router(Arc::new(AppState {
            store: Arc::new(store),
            builder: StaticSiteBuilder::default(),
        }))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_export_returns_zip() {
        let response = router()
            .oneshot(get_request("/cgi/static/ssg/acme"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers().clone();
        assert_eq!(headers[header::CONTENT_TYPE], "application/zip");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"acme.zip\""
        );
        assert_eq!(headers["x-content-type-options"], "nosniff");

        let body = body_bytes(response).await;
        assert_eq!(headers[header::CONTENT_LENGTH], body.len().to_string().as_str());
        let archive = zip::ZipArchive::new(Cursor::new(body)).unwrap();
        assert!(archive.file_names().any(|name| name == "app/__generated__/_index.tsx"));
    }

    #[tokio::test]
    async fn test_unknown_name_is_not_found() {
        let response = router()
            .oneshot(get_request("/cgi/static/ssg/other.zip"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_bytes(response).await, b"Build not found");
    }

    #[tokio::test]
    async fn test_missing_name_is_bad_request() {
        let response = router()
            .oneshot(get_request("/cgi/static/ssg/"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_bytes(response).await, b"Name is required");
    }

    #[tokio::test]
    async fn test_cross_site_cookie_is_forbidden() {
        let request = Request::builder()
            .uri("/cgi/static/ssg/acme")
            .header("sec-fetch-site", "cross-site")
            .header(header::COOKIE, "session=1")
            .body(Body::empty())
            .unwrap();

        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    }
}
