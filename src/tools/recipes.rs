//! Recipe MCP Tools
//!
//! Tools for managing recipes and their ingredient lines.

use serde::Serialize;

use crate::costing::RecipeCosting;
use crate::db::Database;
use crate::models::{
    remove_ingredient_from_all_recipes as remove_lines, Ingredient, Recipe, RecipeCreate,
    RecipeUpdate,
};

use super::costing::recipe_costing;

/// Response for create_recipe
#[derive(Debug, Serialize)]
pub struct CreateRecipeResponse {
    pub id: String,
    pub name: String,
    pub ingredient_count: usize,
    /// Line ingredient ids not found in the catalog (stored anyway, cost 0)
    pub unknown_ingredient_ids: Vec<String>,
}

/// Full recipe detail with costing
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub id: String,
    pub name: String,
    pub target_margin: f64,
    pub servings: f64,
    pub costing: RecipeCosting,
}

/// Recipe summary for listing
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: String,
    pub name: String,
    pub servings: f64,
    pub target_margin: f64,
    pub ingredient_count: usize,
    pub total_cost: f64,
    pub cost_per_serving: f64,
    pub suggested_price: f64,
}

/// Response for list_recipes
#[derive(Debug, Serialize)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for update_recipe
#[derive(Debug, Serialize)]
pub struct UpdateRecipeResponse {
    pub success: bool,
    pub recipe: Recipe,
}

/// Response for delete_recipe
#[derive(Debug, Serialize)]
pub struct DeleteRecipeResponse {
    pub success: bool,
    pub deleted_id: String,
}

/// Response for remove_ingredient_from_all_recipes
#[derive(Debug, Serialize)]
pub struct RemoveIngredientResponse {
    pub ingredient_id: String,
    pub lines_removed: usize,
}

// ============================================================================
// Recipe Tools
// ============================================================================

/// Create a new recipe with its ingredient lines
pub fn create_recipe(db: &Database, data: RecipeCreate) -> Result<CreateRecipeResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let mut unknown_ingredient_ids = Vec::new();
    for line in &data.ingredients {
        let exists = Ingredient::get_by_id(&conn, &line.ingredient_id)
            .map_err(|e| format!("Database error checking ingredient: {}", e))?
            .is_some();
        if !exists && !unknown_ingredient_ids.contains(&line.ingredient_id) {
            unknown_ingredient_ids.push(line.ingredient_id.clone());
        }
    }

    let recipe = Recipe::create(&conn, &data)
        .map_err(|e| format!("Failed to create recipe: {}", e))?;

    if !unknown_ingredient_ids.is_empty() {
        tracing::warn!(
            "Recipe '{}' references unknown ingredient(s): {}",
            recipe.name,
            unknown_ingredient_ids.join(", ")
        );
    }

    Ok(CreateRecipeResponse {
        ingredient_count: recipe.ingredients.len(),
        id: recipe.id,
        name: recipe.name,
        unknown_ingredient_ids,
    })
}

/// Get a recipe with its cost breakdown
pub fn get_recipe(db: &Database, id: &str) -> Result<Option<RecipeDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = Recipe::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get recipe: {}", e))?;

    match recipe {
        Some(recipe) => {
            let costing = recipe_costing(&conn, &recipe)
                .map_err(|e| format!("Failed to cost recipe: {}", e))?;

            Ok(Some(RecipeDetail {
                id: recipe.id,
                name: recipe.name,
                target_margin: recipe.target_margin,
                servings: recipe.servings,
                costing,
            }))
        }
        None => Ok(None),
    }
}

/// List recipes with costs
pub fn list_recipes(
    db: &Database,
    query: Option<&str>,
    sort_by: &str,
    sort_order: &str,
    limit: i64,
    offset: i64,
) -> Result<ListRecipesResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipes = Recipe::list(&conn, query, sort_by, sort_order, limit, offset)
        .map_err(|e| format!("Failed to list recipes: {}", e))?;

    let total = Recipe::count_matching(&conn, query)
        .map_err(|e| format!("Failed to count recipes: {}", e))?;

    let mut summaries = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        let costing = recipe_costing(&conn, &recipe)
            .map_err(|e| format!("Failed to cost recipe {}: {}", recipe.id, e))?;

        summaries.push(RecipeSummary {
            ingredient_count: recipe.ingredients.len(),
            id: recipe.id,
            name: recipe.name,
            servings: recipe.servings,
            target_margin: recipe.target_margin,
            total_cost: costing.total_cost,
            cost_per_serving: costing.cost_per_serving,
            suggested_price: costing.suggested_price,
        });
    }

    Ok(ListRecipesResponse {
        recipes: summaries,
        total,
        limit,
        offset,
    })
}

/// Update a recipe; a supplied ingredient list replaces the old one
pub fn update_recipe(db: &Database, id: &str, data: RecipeUpdate) -> Result<UpdateRecipeResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = Recipe::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update recipe: {}", e))?;

    match updated {
        Some(recipe) => Ok(UpdateRecipeResponse {
            success: true,
            recipe,
        }),
        None => Err(format!("Recipe not found with id: {}", id)),
    }
}

/// Delete a recipe and its lines
pub fn delete_recipe(db: &Database, id: &str) -> Result<DeleteRecipeResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Recipe::delete(&conn, id)
        .map_err(|e| format!("Failed to delete recipe: {}", e))?;

    if !deleted {
        return Err(format!("Recipe not found with id: {}", id));
    }

    Ok(DeleteRecipeResponse {
        success: true,
        deleted_id: id.to_string(),
    })
}

/// Drop every recipe line that references an ingredient
pub fn remove_ingredient_from_all_recipes(
    db: &Database,
    ingredient_id: &str,
) -> Result<RemoveIngredientResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let lines_removed = remove_lines(&conn, ingredient_id)
        .map_err(|e| format!("Failed to remove ingredient from recipes: {}", e))?;

    Ok(RemoveIngredientResponse {
        ingredient_id: ingredient_id.to_string(),
        lines_removed,
    })
}
