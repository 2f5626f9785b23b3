// src/db/sqlite.rs

//! SQLite-backed recipe repository

use crate::db::{self, Repo};
use crate::error::{Error, Result};
use crate::model::{IngredientQuantity, Quantity, Recipe};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Repository storing recipes in a single SQLite file
#[derive(Debug, Clone)]
pub struct SqliteRepo {
    db_path: PathBuf,
}

impl SqliteRepo {
    /// Create the database if needed, migrate it, and return a repository for it
    pub fn create(db_path: &Path) -> Result<Self> {
        db::init(db_path)?;
        Ok(Self {
            db_path: db_path.to_path_buf(),
        })
    }

    /// Path of the backing database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<Connection> {
        db::open(&self.db_path)
    }
}

impl Repo for SqliteRepo {
    fn add_recipe(&self, recipe: &Recipe) -> Result<u32> {
        let mut conn = self.conn()?;
        db::transaction(&mut conn, |tx| {
            tx.execute(
                "INSERT INTO recipes (name, description) VALUES (?1, ?2)",
                params![recipe.name, recipe.desc],
            )?;
            let recipe_id = u32::try_from(tx.last_insert_rowid())
                .map_err(|_| Error::Schema("recipe id out of range".to_string()))?;

            insert_contents(tx, recipe_id, recipe)?;
            debug!("Added recipe {} ({})", recipe_id, recipe.name);
            Ok(recipe_id)
        })
    }

    fn update_recipe(&self, updated_recipe: &Recipe) -> Result<()> {
        let recipe_id = updated_recipe.id.ok_or(Error::MissingId)?;

        let mut conn = self.conn()?;
        db::transaction(&mut conn, |tx| {
            let changed = tx.execute(
                "UPDATE recipes SET name = ?1, description = ?2 WHERE id = ?3",
                params![updated_recipe.name, updated_recipe.desc, recipe_id],
            )?;
            if changed == 0 {
                return Err(Error::NotFound(recipe_id));
            }

            tx.execute("DELETE FROM steps WHERE recipe_id = ?1", [recipe_id])?;
            tx.execute(
                "DELETE FROM recipe_ingredients WHERE recipe_id = ?1",
                [recipe_id],
            )?;
            insert_contents(tx, recipe_id, updated_recipe)?;

            debug!("Updated recipe {}", recipe_id);
            Ok(())
        })
    }

    fn delete_recipe(&self, recipe_id: u32) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM recipes WHERE id = ?1", [recipe_id])?;
        debug!("Deleted {} recipe(s) with id {}", deleted, recipe_id);
        Ok(())
    }

    fn get_recipe(&self, recipe_id: u32) -> Result<Option<Recipe>> {
        let conn = self.conn()?;
        let header = conn
            .query_row(
                "SELECT id, name, description FROM recipes WHERE id = ?1",
                [recipe_id],
                RecipeHeader::from_row,
            )
            .optional()?;

        header.map(|h| h.load(&conn)).transpose()
    }

    fn load_recipes(&self) -> Result<Vec<Recipe>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, description FROM recipes ORDER BY id")?;
        let headers = stmt
            .query_map([], RecipeHeader::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        headers.into_iter().map(|h| h.load(&conn)).collect()
    }
}

/// Row of the `recipes` table before steps and ingredients are attached
struct RecipeHeader {
    id: u32,
    name: String,
    desc: Option<String>,
}

impl RecipeHeader {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            desc: row.get(2)?,
        })
    }

    fn load(self, conn: &Connection) -> Result<Recipe> {
        Ok(Recipe {
            steps: load_steps(conn, self.id)?,
            ingredients: load_ingredients(conn, self.id)?,
            id: Some(self.id),
            name: self.name,
            desc: self.desc,
        })
    }
}

/// Insert steps and ingredient quantities for a recipe row that already exists
fn insert_contents(conn: &Connection, recipe_id: u32, recipe: &Recipe) -> Result<()> {
    let mut step_stmt =
        conn.prepare("INSERT INTO steps (recipe_id, position, text) VALUES (?1, ?2, ?3)")?;
    for (position, step) in recipe.steps.iter().enumerate() {
        step_stmt.execute(params![recipe_id, position as i64, step])?;
    }

    let mut ingredient_stmt = conn.prepare("INSERT OR IGNORE INTO ingredients (name) VALUES (?1)")?;
    let mut quantity_stmt = conn.prepare(
        "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity, unit)
         VALUES (?1, (SELECT id FROM ingredients WHERE name = ?2), ?3, ?4)",
    )?;
    for item in &recipe.ingredients {
        ingredient_stmt.execute([&item.ingredient])?;
        quantity_stmt.execute(params![
            recipe_id,
            item.ingredient,
            item.quantity.value,
            item.quantity.unit
        ])?;
    }

    Ok(())
}

fn load_steps(conn: &Connection, recipe_id: u32) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT text FROM steps WHERE recipe_id = ?1 ORDER BY position")?;
    let steps = stmt
        .query_map([recipe_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(steps)
}

fn load_ingredients(conn: &Connection, recipe_id: u32) -> Result<Vec<IngredientQuantity>> {
    let mut stmt = conn.prepare(
        "SELECT i.name, ri.quantity, ri.unit
         FROM recipe_ingredients ri
         JOIN ingredients i ON ri.ingredient_id = i.id
         WHERE ri.recipe_id = ?1
         ORDER BY ri.rowid",
    )?;
    let ingredients = stmt
        .query_map([recipe_id], |row| {
            Ok(IngredientQuantity {
                ingredient: row.get(0)?,
                quantity: Quantity {
                    value: row.get(1)?,
                    unit: row.get(2)?,
                },
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ingredients)
}
