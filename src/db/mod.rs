// src/db/mod.rs

//! Recipe storage
//!
//! The `Repo` trait is what the server talks to. SQLite is the only backend;
//! each repository call opens its own connection, so a repo can be shared
//! across request handlers without locking.

use crate::error::Result;
use crate::model::Recipe;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub mod paths;
pub mod schema;
mod sqlite;

pub use sqlite::SqliteRepo;

/// Storage operations on recipes
pub trait Repo: Send + Sync {
    /// Store a new recipe and return its id. Any id on the input is ignored.
    fn add_recipe(&self, recipe: &Recipe) -> Result<u32>;

    /// Delete a recipe along with its steps and ingredient quantities
    fn delete_recipe(&self, recipe_id: u32) -> Result<()>;

    /// Replace an existing recipe's contents
    fn update_recipe(&self, updated_recipe: &Recipe) -> Result<()>;

    /// Fetch a single recipe
    fn get_recipe(&self, recipe_id: u32) -> Result<Option<Recipe>>;

    /// Fetch every recipe, ordered by id
    fn load_recipes(&self) -> Result<Vec<Recipe>>;
}

/// Available storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Sqlite,
}

/// Create a repository for the given backend, initializing storage if needed
pub fn create_repo(backend: Backend, db_path: &Path) -> Result<Arc<dyn Repo>> {
    match backend {
        Backend::Sqlite => Ok(Arc::new(SqliteRepo::create(db_path)?)),
    }
}

/// Create the database file (and its directory) and bring the schema up to date
pub fn init(db_path: &Path) -> Result<()> {
    info!("Initializing recipe database at {}", db_path.display());

    let dir = paths::db_dir(db_path);
    if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&dir)?;
    }

    let conn = open(db_path)?;
    schema::migrate(&conn)?;
    Ok(())
}

/// Open a connection with foreign key enforcement enabled
pub fn open(db_path: &Path) -> Result<Connection> {
    debug!("Opening database {}", db_path.display());
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON")?;
    Ok(conn)
}

/// Run `f` inside a transaction, committing on success and rolling back on error
pub fn transaction<T, F>(conn: &mut Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction) -> Result<T>,
{
    let tx = conn.transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_parent_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("nested/dir/recipes.db");

        init(&db_path).unwrap();
        assert!(db_path.exists());

        let conn = open(&db_path).unwrap();
        assert_eq!(schema::get_schema_version(&conn).unwrap(), schema::SCHEMA_VERSION);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("recipes.db");
        init(&db_path).unwrap();
        let mut conn = open(&db_path).unwrap();

        let result: Result<()> = transaction(&mut conn, |tx| {
            tx.execute("INSERT INTO recipes (name) VALUES ('Doomed')", [])?;
            Err(crate::Error::MissingId)
        });
        assert!(result.is_err());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
