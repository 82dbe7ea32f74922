//! Costing Tools
//!
//! Cost breakdowns for stored recipes and ad-hoc quotes.

use std::collections::HashMap;

use rusqlite::Connection;

use crate::costing::{cost_recipe as cost_lines, RecipeCosting};
use crate::db::{Database, DbResult};
use crate::models::{Ingredient, Recipe, RecipeIngredientLine};

/// Load the ingredients referenced by `lines`; dangling ids are simply absent
pub fn load_catalog(conn: &Connection, lines: &[RecipeIngredientLine]) -> DbResult<HashMap<String, Ingredient>> {
    let mut catalog = HashMap::new();
    for line in lines {
        if catalog.contains_key(&line.ingredient_id) {
            continue;
        }
        if let Some(ingredient) = Ingredient::get_by_id(conn, &line.ingredient_id)? {
            catalog.insert(ingredient.id.clone(), ingredient);
        }
    }
    Ok(catalog)
}

/// Cost a stored recipe against the current catalog
pub fn recipe_costing(conn: &Connection, recipe: &Recipe) -> DbResult<RecipeCosting> {
    let catalog = load_catalog(conn, &recipe.ingredients)?;
    Ok(cost_lines(
        &recipe.ingredients,
        recipe.servings,
        recipe.target_margin,
        |id| catalog.get(id),
    ))
}

/// Cost breakdown for a stored recipe
pub fn cost_recipe(db: &Database, recipe_id: &str) -> Result<Option<RecipeCosting>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = Recipe::get_by_id(&conn, recipe_id)
        .map_err(|e| format!("Failed to get recipe: {}", e))?;

    match recipe {
        Some(recipe) => {
            let costing = recipe_costing(&conn, &recipe)
                .map_err(|e| format!("Failed to cost recipe: {}", e))?;
            Ok(Some(costing))
        }
        None => Ok(None),
    }
}

/// Cost arbitrary lines without storing anything
pub fn quote_recipe(
    db: &Database,
    lines: &[RecipeIngredientLine],
    servings: f64,
    target_margin: f64,
) -> Result<RecipeCosting, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let catalog = load_catalog(&conn, lines)
        .map_err(|e| format!("Failed to load ingredients: {}", e))?;

    Ok(cost_lines(lines, servings, target_margin, |id| catalog.get(id)))
}
