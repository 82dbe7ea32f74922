//! Data models
//!
//! Rust structs representing database entities.

mod ingredient;
mod recipe;
mod recipe_ingredient;
mod unit;

pub use ingredient::{Ingredient, IngredientCreate, IngredientUpdate};
pub use recipe::{Recipe, RecipeCreate, RecipeUpdate};
pub use recipe_ingredient::{remove_ingredient_from_all_recipes, RecipeIngredientLine};

/// Generate a new entity id
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Substring pattern for `LIKE ... ESCAPE '\'`; `%` and `_` in the query match literally
pub(crate) fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
pub(crate) fn test_conn() -> rusqlite::Connection {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    crate::db::migrations::run_migrations(&conn).unwrap();
    conn
}
