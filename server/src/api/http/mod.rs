//! HTTP API handlers

mod health;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::api::mcp;
use crate::AppState;

/// Create the HTTP router: health check plus the MCP endpoint
pub fn create_router(state: AppState) -> Router {
    let mcp_path = state.config.mcp_path.clone();
    let mcp_service = mcp::create_mcp_service(state.clone());

    Router::new()
        .route("/health", get(health::health_check))
        .nest_service(&mcp_path, mcp_service)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::service::executor::MockExecutor;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router() -> Router {
        let config = Config {
            server_version: "1.2.3".to_string(),
            ..Default::default()
        };
        create_router(AppState {
            config: Arc::new(config),
            executor: Arc::new(MockExecutor::new()),
        })
    }

    async fn get(uri: &str) -> axum::response::Response {
        router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], "1.2.3");
    }

    #[tokio::test]
    async fn test_mcp_endpoint_is_mounted() {
        let response = get("/mcp").await;
        assert_ne!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let response = get("/metrics").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
