// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use recipe_book::Recipe;
use recipe_book::server::{ServerConfig, ServerState, create_router};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Create a router backed by a fresh database.
///
/// Returns (TempDir, Router) - keep the TempDir alive to prevent cleanup.
pub fn setup_app() -> (TempDir, Router) {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        db_path: temp_dir.path().join("recipes.db"),
        ..ServerConfig::default()
    };
    let state = ServerState::new(config).unwrap();
    (temp_dir, create_router(Arc::new(state)))
}

/// A recipe with one step and one ingredient.
pub fn potato_recipe() -> Recipe {
    Recipe::new("Test Recipe")
        .with_desc("Test Description")
        .with_step("Step 1")
        .with_ingredient("Potato", 1.0, "whole")
}

/// Send a request and return the status and raw body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

/// Build a request carrying a JSON body.
pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Build a request with an empty body.
pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
