// src/db/paths.rs
//! Path defaults for the recipe database

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Default database location, relative to the working directory
pub const DEFAULT_DB_PATH: &str = "data/recipes.db";

/// Get the directory containing the database
pub fn db_dir(db_path: &Path) -> PathBuf {
    db_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

/// Environment variable overriding the configured database path
pub const DB_PATH_ENV: &str = "RECIPE_BOOK_DB";

/// Database path: an explicit path wins, then `RECIPE_BOOK_DB`, then `fallback`
pub fn resolve_db_path(explicit: Option<&Path>, fallback: &Path) -> PathBuf {
    resolve_db_path_with(explicit, std::env::var_os(DB_PATH_ENV), fallback)
}

/// Same as [`resolve_db_path`] with the environment value passed in; empty counts as unset
pub fn resolve_db_path_with(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
    fallback: &Path,
) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| fallback.to_path_buf())
}
