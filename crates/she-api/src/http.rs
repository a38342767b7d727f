use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    routing::get,
};
use prometheus::{Encoder, Registry, TextEncoder};
use tracing::debug;

use crate::error::ApiError;

const LANDING_PAGE: &str = "<html>
<head><title>Swift Health Exporter</title></head>
<body>
<h1>Swift Health Exporter</h1>
<p><a href=\"/metrics\">Metrics</a></p>
</body>
</html>
";

/// HTTP router serving a Prometheus registry.
pub struct MetricsApi {
    registry: Arc<Registry>,
}

impl MetricsApi {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Routes:
    /// - GET /metrics - registry in the Prometheus text format
    /// - GET / - landing page
    pub fn router(self) -> Router {
        Router::new()
            .route("/metrics", get(metrics))
            .route("/", get(landing))
            .with_state(self.registry)
    }
}

/// GET /metrics
async fn metrics(State(registry): State<Arc<Registry>>) -> Result<impl IntoResponse, ApiError> {
    let families = registry.gather();
    let encoder = TextEncoder::new();
    let mut body = Vec::new();
    encoder.encode(&families, &mut body)?;
    debug!(families = families.len(), bytes = body.len(), "metrics served");

    Ok(([(header::CONTENT_TYPE, encoder.format_type().to_string())], body))
}

/// GET /
async fn landing() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{self, Body},
        http::{Request, StatusCode},
    };
    use prometheus::IntGauge;
    use tower::ServiceExt;

    use super::*;

    async fn get_path(router: Router, path: &str) -> (StatusCode, String, String) {
        let resp = router
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn metrics_renders_registry_as_text() {
        let registry = Arc::new(Registry::new());
        let up = IntGauge::new("test_up", "Whether the test is up.").unwrap();
        up.set(1);
        registry.register(Box::new(up)).unwrap();

        let (status, content_type, body) =
            get_path(MetricsApi::new(registry).router(), "/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "text/plain; version=0.0.4");
        assert_eq!(
            body,
            "# HELP test_up Whether the test is up.\n# TYPE test_up gauge\ntest_up 1\n"
        );
    }

    #[tokio::test]
    async fn empty_registry_is_an_empty_body() {
        let (status, _, body) =
            get_path(MetricsApi::new(Arc::new(Registry::new())).router(), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn landing_page_links_metrics() {
        let (status, content_type, body) =
            get_path(MetricsApi::new(Arc::new(Registry::new())).router(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/html"));
        assert!(body.contains("href=\"/metrics\""));
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let (status, _, _) =
            get_path(MetricsApi::new(Arc::new(Registry::new())).router(), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
