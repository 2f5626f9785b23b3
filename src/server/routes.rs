// src/server/routes.rs
//! Axum router configuration for the recipe server

use crate::server::ServerState;
use crate::server::handlers::recipes;
use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main application router
pub fn create_router(state: Arc<ServerState>) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .route("/", get(hello))
        .route("/health", get(health_check))
        .route("/recipes/all", get(recipes::list_recipes))
        .route("/recipes/add", post(recipes::add_recipe))
        .route("/recipes/edit", put(recipes::edit_recipe))
        .route("/recipes/delete", delete(recipes::delete_recipe))
        .route("/recipes/:id", get(recipes::get_recipe))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn hello() -> &'static str {
    "hello, world!"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ServerConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> (tempfile::TempDir, Router) {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            db_path: temp_dir.path().join("recipes.db"),
            ..ServerConfig::default()
        };
        let state = ServerState::new(config).unwrap();
        (temp_dir, create_router(Arc::new(state)))
    }

    #[tokio::test]
    async fn test_health_check() {
        let (_dir, app) = test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_hello() {
        let (_dir, app) = test_app();

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"hello, world!");
    }

    #[tokio::test]
    async fn test_cors_restricted_origin() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            db_path: temp_dir.path().join("recipes.db"),
            cors_allowed_origins: vec!["https://recipes.example".to_string()],
            ..ServerConfig::default()
        };
        let app = create_router(Arc::new(ServerState::new(config).unwrap()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("Origin", "https://recipes.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "https://recipes.example"
        );
    }
}
