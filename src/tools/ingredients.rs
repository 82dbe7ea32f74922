//! Ingredient MCP Tools
//!
//! Tools for managing the ingredient catalog.

use serde::Serialize;

use crate::costing::UnitOfMeasure;
use crate::db::Database;
use crate::models::{
    remove_ingredient_from_all_recipes, Ingredient, IngredientCreate, IngredientUpdate,
};

/// Response for add_ingredient
#[derive(Debug, Serialize)]
pub struct AddIngredientResponse {
    pub id: String,
    pub name: String,
    pub unit: UnitOfMeasure,
    pub unit_price: f64,
}

/// Summary of an ingredient for list/search results
#[derive(Debug, Serialize)]
pub struct IngredientSummary {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: UnitOfMeasure,
    pub unit_price: f64,
}

impl From<&Ingredient> for IngredientSummary {
    fn from(item: &Ingredient) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            quantity: item.quantity,
            unit: item.unit,
            unit_price: item.unit_price(),
        }
    }
}

/// Full ingredient detail response
#[derive(Debug, Serialize)]
pub struct IngredientDetail {
    #[serde(flatten)]
    pub summary: IngredientSummary,
    pub used_in_recipes: Vec<String>,
}

/// Response for search_ingredients
#[derive(Debug, Serialize)]
pub struct SearchIngredientsResponse {
    pub items: Vec<IngredientSummary>,
    pub total: usize,
}

/// Response for list_ingredients
#[derive(Debug, Serialize)]
pub struct ListIngredientsResponse {
    pub items: Vec<IngredientSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for update_ingredient
#[derive(Debug, Serialize)]
pub struct UpdateIngredientResponse {
    pub success: bool,
    pub ingredient: IngredientSummary,
    /// Recipes whose cost changes with this update
    pub affected_recipes: Vec<String>,
}

/// Response for delete_ingredient
#[derive(Debug, Serialize)]
pub struct DeleteIngredientResponse {
    pub success: bool,
    pub deleted_id: String,
    /// Recipes that referenced the ingredient at deletion time
    pub used_in_recipes: Vec<String>,
    /// Lines removed from recipes (0 unless remove_from_recipes was requested)
    pub lines_removed: usize,
}

/// Add a new ingredient
pub fn add_ingredient(db: &Database, data: IngredientCreate) -> Result<AddIngredientResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = Ingredient::create(&conn, &data)
        .map_err(|e| format!("Failed to create ingredient: {}", e))?;

    Ok(AddIngredientResponse {
        unit_price: item.unit_price(),
        id: item.id,
        name: item.name,
        unit: item.unit,
    })
}

/// Get an ingredient by ID with recipe usage
pub fn get_ingredient(db: &Database, id: &str) -> Result<Option<IngredientDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = Ingredient::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get ingredient: {}", e))?;

    match item {
        Some(item) => {
            let used_in_recipes = Ingredient::get_used_in_recipes(&conn, id)
                .map_err(|e| format!("Failed to get recipe usage: {}", e))?;

            Ok(Some(IngredientDetail {
                summary: IngredientSummary::from(&item),
                used_in_recipes,
            }))
        }
        None => Ok(None),
    }
}

/// Search ingredients by name
pub fn search_ingredients(db: &Database, query: &str, limit: i64) -> Result<SearchIngredientsResponse, String> {
    let limit = limit.clamp(1, 100);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items = Ingredient::search(&conn, query, limit)
        .map_err(|e| format!("Search failed: {}", e))?;

    let summaries: Vec<IngredientSummary> = items.iter().map(IngredientSummary::from).collect();
    let total = summaries.len();

    Ok(SearchIngredientsResponse {
        items: summaries,
        total,
    })
}

/// List ingredients with sorting and pagination
pub fn list_ingredients(
    db: &Database,
    sort_by: &str,
    sort_order: &str,
    limit: i64,
    offset: i64,
) -> Result<ListIngredientsResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items = Ingredient::list(&conn, sort_by, sort_order, limit, offset)
        .map_err(|e| format!("Failed to list ingredients: {}", e))?;

    let total = Ingredient::count(&conn)
        .map_err(|e| format!("Failed to count ingredients: {}", e))?;

    Ok(ListIngredientsResponse {
        items: items.iter().map(IngredientSummary::from).collect(),
        total,
        limit,
        offset,
    })
}

/// Update an ingredient
pub fn update_ingredient(
    db: &Database,
    id: &str,
    data: IngredientUpdate,
) -> Result<UpdateIngredientResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = Ingredient::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update ingredient: {}", e))?;

    match updated {
        Some(item) => {
            let affected_recipes = Ingredient::get_used_in_recipes(&conn, id)
                .map_err(|e| format!("Failed to get recipe usage: {}", e))?;

            Ok(UpdateIngredientResponse {
                success: true,
                ingredient: IngredientSummary::from(&item),
                affected_recipes,
            })
        }
        None => Err(format!("Ingredient not found with id: {}", id)),
    }
}

/// Delete an ingredient
///
/// Recipe lines pointing at it stay behind (and cost nothing) unless
/// `remove_from_recipes` is set.
pub fn delete_ingredient(
    db: &Database,
    id: &str,
    remove_from_recipes: bool,
) -> Result<DeleteIngredientResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if Ingredient::get_by_id(&conn, id)
        .map_err(|e| format!("Database error: {}", e))?
        .is_none()
    {
        return Err(format!("Ingredient not found with id: {}", id));
    }

    let used_in_recipes = Ingredient::get_used_in_recipes(&conn, id)
        .map_err(|e| format!("Failed to get recipe usage: {}", e))?;

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| format!("Database error: {}", e))?;

    let lines_removed = if remove_from_recipes {
        remove_ingredient_from_all_recipes(&tx, id)
            .map_err(|e| format!("Failed to remove ingredient from recipes: {}", e))?
    } else {
        0
    };

    Ingredient::delete(&tx, id)
        .map_err(|e| format!("Failed to delete ingredient: {}", e))?;

    tx.commit().map_err(|e| format!("Database error: {}", e))?;

    Ok(DeleteIngredientResponse {
        success: true,
        deleted_id: id.to_string(),
        used_in_recipes,
        lines_removed,
    })
}
