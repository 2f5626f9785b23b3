// src/lib.rs

//! Recipe Book
//!
//! A small recipe server and the CI pipeline that builds, tests and lints it.
//!
//! # Architecture
//!
//! - `model`: recipe, ingredient and quantity types shared by storage and HTTP
//! - `db`: the `Repo` trait and its SQLite implementation with versioned schema
//! - `server`: axum routes for adding, editing, listing and deleting recipes
//! - `ci`: the setup/build/test/qa pipeline, planned as steps and run in order
//! - `config`: TOML configuration covering all of the above

pub mod ci;
pub mod config;
pub mod db;
mod error;
pub mod model;
pub mod server;

pub use ci::{CiEnvironment, Pipeline, PipelineConfig, Step, Task};
pub use config::RecipeBookConfig;
pub use db::{Backend, Repo, SqliteRepo};
pub use error::{Error, Result};
pub use model::{IngredientQuantity, Quantity, Recipe};
pub use server::{ServerConfig, ServerState};
