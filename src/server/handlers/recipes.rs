// src/server/handlers/recipes.rs
//! Recipe CRUD handlers

use crate::db::Repo;
use crate::error::{Error, Result};
use crate::model::Recipe;
use crate::server::ServerState;
use crate::server::handlers::ApiError;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Run a blocking repository call on the blocking thread pool
async fn with_repo<T, F>(state: &ServerState, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn Repo) -> Result<T> + Send + 'static,
{
    let repo = Arc::clone(&state.repo);
    tokio::task::spawn_blocking(move || f(repo.as_ref())).await?
}

/// GET /recipes/all
pub async fn list_recipes(
    State(state): State<Arc<ServerState>>,
) -> std::result::Result<Json<Vec<Recipe>>, ApiError> {
    let recipes = with_repo(&state, |repo| repo.load_recipes()).await?;
    Ok(Json(recipes))
}

/// GET /recipes/:id
pub async fn get_recipe(
    State(state): State<Arc<ServerState>>,
    Path(recipe_id): Path<u32>,
) -> std::result::Result<Json<Recipe>, ApiError> {
    let recipe = with_repo(&state, move |repo| repo.get_recipe(recipe_id)).await?;
    recipe.map(Json).ok_or(ApiError(Error::NotFound(recipe_id)))
}

/// POST /recipes/add
///
/// Responds with the stored recipe, including its new id.
pub async fn add_recipe(
    State(state): State<Arc<ServerState>>,
    Json(recipe): Json<Recipe>,
) -> std::result::Result<Json<Recipe>, ApiError> {
    info!("Adding recipe '{}'", recipe.name);

    let stored = with_repo(&state, move |repo| {
        let id = repo.add_recipe(&recipe)?;
        Ok(Recipe {
            id: Some(id),
            ..recipe
        })
    })
    .await?;

    Ok(Json(stored))
}

/// PUT /recipes/edit
pub async fn edit_recipe(
    State(state): State<Arc<ServerState>>,
    Json(recipe): Json<Recipe>,
) -> std::result::Result<Json<Recipe>, ApiError> {
    let recipe_id = recipe.id.ok_or(ApiError(Error::MissingId))?;
    info!("Editing recipe {}", recipe_id);

    let updated = with_repo(&state, move |repo| {
        repo.update_recipe(&recipe)?;
        Ok(recipe)
    })
    .await?;

    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub recipe_id: u32,
}

/// DELETE /recipes/delete?recipe_id=N
pub async fn delete_recipe(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<DeleteParams>,
) -> std::result::Result<StatusCode, ApiError> {
    info!("Deleting recipe {}", params.recipe_id);

    with_repo(&state, move |repo| repo.delete_recipe(params.recipe_id)).await?;
    Ok(StatusCode::OK)
}
