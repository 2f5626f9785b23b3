// src/server/handlers/mod.rs
//! HTTP request handlers for the recipe server

pub mod recipes;

use crate::error::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Error returned by handlers, rendered as `{"error": ..., "message": ...}`
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self.0 {
            Error::MissingId => (StatusCode::BAD_REQUEST, "missing_id"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Internal details stay in the log
        let message = match self.0 {
            Error::MissingId => "Missing recipe ID".to_string(),
            Error::NotFound(id) => format!("Recipe {id} not found"),
            ref other => {
                tracing::error!("Request failed: {}", other);
                "Database error".to_string()
            }
        };

        let body = serde_json::json!({
            "error": code,
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}
