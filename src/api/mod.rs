//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`; `/health` and the
//! `/ws` upgrade sit at the root.

pub mod auth;
pub mod dto;
pub mod handlers;
pub mod openapi;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST, WebSocket, docs and middleware.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    let router = Router::new()
        .merge(build_router())
        .route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::FixedOffset;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::{EventBus, GeoPoint};
    use crate::error::MeshimapError;
    use crate::geocode::Geocoder;
    use crate::store::MemoryStore;

    #[derive(Debug)]
    struct NoGeocoder;

    #[async_trait]
    impl Geocoder for NoGeocoder {
        async fn locate(&self, _address: &str) -> Result<Option<GeoPoint>, MeshimapError> {
            Ok(None)
        }
    }

    fn app() -> Router {
        let Some(calendar) = FixedOffset::east_opt(9 * 3600) else {
            panic!("valid offset");
        };
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            Arc::new(NoGeocoder),
            EventBus::new(8),
            10,
            calendar,
        );
        build_app(state, Duration::from_secs(5))
    }

    async fn call(request: Request<Body>) -> (StatusCode, Value) {
        let response = match app().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
            panic!("valid request");
        };
        request
    }

    #[tokio::test]
    async fn health_is_mounted_at_root() {
        let (status, body) = call(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn unknown_shop_is_404_with_code() {
        let (status, body) = call(get("/api/v1/shops/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 2001);
    }

    #[tokio::test]
    async fn unknown_mark_kind_is_400() {
        let (status, _) = call(get("/api/v1/me/likes/s1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_month_ranks_nobody() {
        let (status, body) = call(get("/api/v1/ranking/monthly")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entries"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn editing_a_missing_profile_is_404() {
        let Ok(request) = Request::builder()
            .method("PATCH")
            .uri("/api/v1/me/profile")
            .header("x-user-id", "never-registered")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"displayName":"Zed","email":"zed@example.com"}"#))
        else {
            panic!("valid request");
        };
        let (status, body) = call(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 2002);
    }

    #[tokio::test]
    async fn toggle_without_user_is_401() {
        let Ok(request) = Request::builder()
            .method("POST")
            .uri("/api/v1/me/visited/s1/toggle")
            .body(Body::empty())
        else {
            panic!("valid request");
        };
        let (status, body) = call(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], 1003);
    }
}
