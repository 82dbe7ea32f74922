//! FCM MCP Server Implementation
//!
//! Implements the MCP server with all FCM tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::costing::UnitOfMeasure;
use crate::db::Database;
use crate::models::{IngredientCreate, IngredientUpdate, RecipeCreate, RecipeIngredientLine, RecipeUpdate};
use crate::tools::costing;
use crate::tools::ingredients;
use crate::tools::recipes;
use crate::tools::snapshot;
use crate::tools::status::StatusTracker;

/// FCM MCP Service
#[derive(Clone)]
pub struct FcmService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<FcmService>,
}

impl FcmService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

/// Parse a unit string, rejecting anything outside the supported set
fn parse_unit(unit: &str) -> Result<UnitOfMeasure, McpError> {
    UnitOfMeasure::from_str(unit).ok_or_else(|| {
        let known: Vec<&str> = UnitOfMeasure::ALL.iter().map(|u| u.as_str()).collect();
        McpError::invalid_params(
            format!("Unknown unit '{}'. Expected one of: {}", unit, known.join(", ")),
            None,
        )
    })
}

/// Convert tool line parameters into recipe lines; an omitted unit means `unit`
fn to_lines(lines: Vec<RecipeLineParams>) -> Result<Vec<RecipeIngredientLine>, McpError> {
    lines
        .into_iter()
        .map(|l| {
            let unit = match l.unit.as_deref() {
                Some(u) => parse_unit(u)?,
                None => UnitOfMeasure::default(),
            };
            Ok(RecipeIngredientLine {
                ingredient_id: l.ingredient_id,
                quantity: l.quantity,
                unit,
            })
        })
        .collect()
}

// ============================================================================
// Ingredient Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddIngredientParams {
    /// Ingredient name
    pub name: String,
    /// Purchase price paid
    pub price: f64,
    /// Purchase quantity received for that price
    pub quantity: f64,
    /// Purchase unit: kg, g, L, mL, unit, lb, oz or fl oz
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetIngredientParams {
    /// Ingredient ID
    pub id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchIngredientsParams {
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListIngredientsParams {
    /// Sort by: name, price, created_at (default name)
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_sort_by() -> String { "name".to_string() }
fn default_sort_order() -> String { "asc".to_string() }
fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateIngredientParams {
    pub id: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteIngredientParams {
    /// Ingredient ID to delete
    pub id: String,
    /// Also drop recipe lines that use this ingredient (default false)
    #[serde(default)]
    pub remove_from_recipes: bool,
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecipeLineParams {
    /// Ingredient ID
    pub ingredient_id: String,
    /// Amount used in the recipe
    pub quantity: f64,
    /// Unit of the amount (default "unit")
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateRecipeParams {
    /// Name of the recipe
    pub name: String,
    /// Ingredient lines, in order
    #[serde(default)]
    pub ingredients: Vec<RecipeLineParams>,
    /// Target margin percent (default 0)
    #[serde(default)]
    pub target_margin: f64,
    /// Number of servings this recipe produces (default 1.0)
    #[serde(default = "default_servings")]
    pub servings: f64,
}

fn default_servings() -> f64 { 1.0 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetRecipeParams {
    /// Recipe ID
    pub id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecipesParams {
    /// Search query for recipe name (optional)
    pub query: Option<String>,
    /// Sort by: name, servings, target_margin, created_at (default name)
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRecipeParams {
    pub id: String,
    pub name: Option<String>,
    /// Replaces the whole ingredient list when given
    pub ingredients: Option<Vec<RecipeLineParams>>,
    pub target_margin: Option<f64>,
    pub servings: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteRecipeParams {
    /// Recipe ID to delete
    pub id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveIngredientFromAllRecipesParams {
    /// Ingredient ID whose lines should be removed
    pub ingredient_id: String,
}

// ============================================================================
// Costing Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CostRecipeParams {
    /// Recipe ID
    pub id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QuoteRecipeParams {
    /// Ingredient lines to cost
    pub ingredients: Vec<RecipeLineParams>,
    #[serde(default = "default_servings")]
    pub servings: f64,
    #[serde(default)]
    pub target_margin: f64,
}

// ============================================================================
// Snapshot Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SnapshotParams {
    /// Snapshot file path (default food-cost-data.json)
    pub path: Option<String>,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl FcmService {
    // --- Status ---

    #[tool(description = "Get the current status of the FCM service including build info, database status, and process information")]
    async fn fcm_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get step-by-step instructions for costing recipes and pricing menu items. Call this when starting a costing session or when unsure how units and margins work.")]
    fn costing_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::COSTING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(COSTING_INSTRUCTIONS)]))
    }

    // --- Ingredients ---

    #[tool(description = "Add a purchasable ingredient with its purchase price, quantity and unit")]
    fn add_ingredient(&self, Parameters(p): Parameters<AddIngredientParams>) -> Result<CallToolResult, McpError> {
        let data = IngredientCreate {
            name: p.name,
            price: p.price,
            quantity: p.quantity,
            unit: parse_unit(&p.unit)?,
        };
        let result = ingredients::add_ingredient(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get an ingredient with its unit price and the recipes that use it")]
    fn get_ingredient(&self, Parameters(p): Parameters<GetIngredientParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::get_ingredient(&self.database, &p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(item) => serde_json::to_string_pretty(&item),
            None => serde_json::to_string_pretty(&serde_json::json!({"error": "Ingredient not found", "id": p.id})),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Search ingredients by name")]
    fn search_ingredients(&self, Parameters(p): Parameters<SearchIngredientsParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::search_ingredients(&self.database, &p.query, p.limit).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List ingredients with sorting and pagination")]
    fn list_ingredients(&self, Parameters(p): Parameters<ListIngredientsParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::list_ingredients(&self.database, &p.sort_by, &p.sort_order, p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update an ingredient. Costs of recipes using it change immediately; the affected recipes are listed.")]
    fn update_ingredient(&self, Parameters(p): Parameters<UpdateIngredientParams>) -> Result<CallToolResult, McpError> {
        let data = IngredientUpdate {
            name: p.name,
            price: p.price,
            quantity: p.quantity,
            unit: p.unit.as_deref().map(parse_unit).transpose()?,
        };
        let result = ingredients::update_ingredient(&self.database, &p.id, data).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete an ingredient. Recipe lines using it are kept and cost 0 unless remove_from_recipes is true.")]
    fn delete_ingredient(&self, Parameters(p): Parameters<DeleteIngredientParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::delete_ingredient(&self.database, &p.id, p.remove_from_recipes)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Recipes ---

    #[tool(description = "Create a recipe with ordered ingredient lines, servings and target margin percent")]
    fn create_recipe(&self, Parameters(p): Parameters<CreateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeCreate {
            name: p.name,
            ingredients: to_lines(p.ingredients)?,
            target_margin: p.target_margin,
            servings: p.servings,
        };
        let result = recipes::create_recipe(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get full recipe details with a line-by-line cost breakdown and suggested price")]
    fn get_recipe(&self, Parameters(p): Parameters<GetRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::get_recipe(&self.database, &p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(recipe) => serde_json::to_string_pretty(&recipe),
            None => serde_json::to_string_pretty(&serde_json::json!({"error": "Recipe not found", "id": p.id})),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List recipes with cost per serving and suggested price, with optional search, sorting, and pagination")]
    fn list_recipes(&self, Parameters(p): Parameters<ListRecipesParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::list_recipes(&self.database, p.query.as_deref(), &p.sort_by, &p.sort_order, p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update a recipe. Passing ingredients replaces the whole line list.")]
    fn update_recipe(&self, Parameters(p): Parameters<UpdateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeUpdate {
            name: p.name,
            ingredients: p.ingredients.map(to_lines).transpose()?,
            target_margin: p.target_margin,
            servings: p.servings,
        };
        let result = recipes::update_recipe(&self.database, &p.id, data).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a recipe and its ingredient lines")]
    fn delete_recipe(&self, Parameters(p): Parameters<DeleteRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::delete_recipe(&self.database, &p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Remove every recipe line that uses the given ingredient")]
    fn remove_ingredient_from_all_recipes(&self, Parameters(p): Parameters<RemoveIngredientFromAllRecipesParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::remove_ingredient_from_all_recipes(&self.database, &p.ingredient_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Costing ---

    #[tool(description = "Cost a stored recipe: per-line costs, total cost, cost per serving and suggested price at its target margin")]
    fn cost_recipe(&self, Parameters(p): Parameters<CostRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = costing::cost_recipe(&self.database, &p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(costing) => serde_json::to_string_pretty(&costing),
            None => serde_json::to_string_pretty(&serde_json::json!({"error": "Recipe not found", "id": p.id})),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Cost ad-hoc ingredient lines for a what-if price check. Nothing is saved.")]
    fn quote_recipe(&self, Parameters(p): Parameters<QuoteRecipeParams>) -> Result<CallToolResult, McpError> {
        let lines = to_lines(p.ingredients)?;
        let result = costing::quote_recipe(&self.database, &lines, p.servings, p.target_margin)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Snapshots ---

    #[tool(description = "Export all ingredients and recipes to a JSON snapshot file")]
    fn export_snapshot(&self, Parameters(p): Parameters<SnapshotParams>) -> Result<CallToolResult, McpError> {
        let result = snapshot::export_snapshot(&self.database, p.path.as_deref()).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Import a JSON snapshot file. REPLACES all current ingredients and recipes.")]
    fn import_snapshot(&self, Parameters(p): Parameters<SnapshotParams>) -> Result<CallToolResult, McpError> {
        let result = snapshot::import_snapshot(&self.database, p.path.as_deref()).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for FcmService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "foodcost".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Food Cost Manager".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Food Cost Manager (FCM) - Recipe costing and menu pricing. \
                 IMPORTANT: Call costing_instructions before a costing session. \
                 Ingredients: add/get/list/search/update/delete_ingredient. \
                 Recipes: create/get/list/update/delete_recipe, remove_ingredient_from_all_recipes. \
                 Costing: cost_recipe (stored recipe), quote_recipe (ad-hoc lines, nothing saved). \
                 Backup: export_snapshot, import_snapshot (import replaces everything). \
                 Units: kg, g, L, mL, unit; only kg<->g and L<->mL are converted."
                    .into(),
            ),
        }
    }
}
