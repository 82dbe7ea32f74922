//! Recipe model
//!
//! A recipe aggregates ingredient lines with a target margin and a servings
//! count. Cost and price are derived through the calculator, never stored.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::RecipeIngredientLine;

/// A recipe with its ingredient lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub ingredients: Vec<RecipeIngredientLine>,
    /// Percent of the selling price that should be profit
    pub target_margin: f64,
    pub servings: f64,
}

/// Data for creating a new recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeCreate {
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredientLine>,
    #[serde(default)]
    pub target_margin: f64,
    #[serde(default = "default_servings")]
    pub servings: f64,
}

fn default_servings() -> f64 {
    1.0
}

/// Data for updating a recipe
///
/// When `ingredients` is set the whole line list is replaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub ingredients: Option<Vec<RecipeIngredientLine>>,
    pub target_margin: Option<f64>,
    pub servings: Option<f64>,
}

impl Recipe {
    /// Create a Recipe from a database row, without lines
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            ingredients: Vec::new(),
            target_margin: row.get("target_margin")?,
            servings: row.get("servings")?,
        })
    }

    fn with_lines(mut self, conn: &Connection) -> DbResult<Self> {
        self.ingredients = RecipeIngredientLine::get_for_recipe(conn, &self.id)?;
        Ok(self)
    }

    /// Insert a new recipe and its lines with a freshly generated id
    pub fn create(conn: &Connection, data: &RecipeCreate) -> DbResult<Self> {
        let recipe = Self {
            id: super::new_id(),
            name: data.name.clone(),
            ingredients: data.ingredients.clone(),
            target_margin: data.target_margin,
            servings: data.servings,
        };

        let tx = conn.unchecked_transaction()?;
        Self::insert(&tx, &recipe)?;
        tx.commit()?;

        tracing::debug!(
            "Created recipe {} ({}) with {} line(s)",
            recipe.name,
            recipe.id,
            recipe.ingredients.len()
        );

        Self::get_by_id(conn, &recipe.id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Insert a recipe and its lines keeping its id
    ///
    /// Runs inside the caller's transaction, if any.
    pub fn insert(conn: &Connection, recipe: &Recipe) -> DbResult<()> {
        conn.execute(
            r#"
            INSERT INTO recipes (id, name, target_margin, servings)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![recipe.id, recipe.name, recipe.target_margin, recipe.servings],
        )?;

        RecipeIngredientLine::replace_for_recipe(conn, &recipe.id, &recipe.ingredients)
    }

    /// Get a recipe by ID, with its lines
    pub fn get_by_id(conn: &Connection, id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(recipe) => Ok(Some(recipe.with_lines(conn)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All recipes with lines, in insertion order
    pub fn all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes ORDER BY rowid")?;
        let recipes = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        recipes.into_iter().map(|r| r.with_lines(conn)).collect()
    }

    /// List recipes with optional name search, sorting and pagination
    pub fn list(
        conn: &Connection,
        query: Option<&str>,
        sort_by: &str,
        sort_order: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let order = if sort_order.to_lowercase() == "desc" { "DESC" } else { "ASC" };
        let sort_col = match sort_by.to_lowercase().as_str() {
            "created_at" => "rowid",
            "servings" => "servings",
            "target_margin" => "target_margin",
            _ => "name",
        };

        let recipes = match query {
            Some(q) => {
                let sql = format!(
                    "SELECT * FROM recipes WHERE name LIKE ?1 ESCAPE '\\' ORDER BY {} {} LIMIT ?2 OFFSET ?3",
                    sort_col, order
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![super::like_pattern(q), limit, offset], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let sql = format!(
                    "SELECT * FROM recipes ORDER BY {} {} LIMIT ?1 OFFSET ?2",
                    sort_col, order
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![limit, offset], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        recipes.into_iter().map(|r| r.with_lines(conn)).collect()
    }

    /// Update a recipe
    pub fn update(conn: &Connection, id: &str, data: &RecipeUpdate) -> DbResult<Option<Self>> {
        if Self::get_by_id(conn, id)?.is_none() {
            return Ok(None);
        }

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            updates.push(format!("name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(name.clone()));
        }
        if let Some(margin) = data.target_margin {
            updates.push(format!("target_margin = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(margin));
        }
        if let Some(servings) = data.servings {
            updates.push(format!("servings = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(servings));
        }

        if updates.is_empty() && data.ingredients.is_none() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE recipes SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id.to_string()));

        let tx = conn.unchecked_transaction()?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        tx.execute(&sql, params_refs.as_slice())?;
        if let Some(ref lines) = data.ingredients {
            RecipeIngredientLine::replace_for_recipe(&tx, id, lines)?;
        }
        tx.commit()?;

        Self::get_by_id(conn, id)
    }

    /// Count recipes
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Count recipes matching the same optional name query as `list`
    pub fn count_matching(conn: &Connection, query: Option<&str>) -> DbResult<i64> {
        let count: i64 = match query {
            Some(q) => conn.query_row(
                "SELECT COUNT(*) FROM recipes WHERE name LIKE ?1 ESCAPE '\\'",
                [super::like_pattern(q)],
                |row| row.get(0),
            )?,
            None => Self::count(conn)?,
        };
        Ok(count)
    }

    /// Delete a recipe, cascading to its lines
    /// Returns Ok(false) if not found
    pub fn delete(conn: &Connection, id: &str) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM recipes WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Delete every recipe (used by snapshot import)
    pub fn delete_all(conn: &Connection) -> DbResult<usize> {
        Ok(conn.execute("DELETE FROM recipes", [])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::UnitOfMeasure;
    use crate::models::test_conn;

    fn bread(lines: Vec<RecipeIngredientLine>) -> RecipeCreate {
        RecipeCreate {
            name: "Bread".to_string(),
            ingredients: lines,
            target_margin: 30.0,
            servings: 4.0,
        }
    }

    fn line(ingredient_id: &str, quantity: f64) -> RecipeIngredientLine {
        RecipeIngredientLine {
            ingredient_id: ingredient_id.to_string(),
            quantity,
            unit: UnitOfMeasure::Kilogram,
        }
    }

    #[test]
    fn test_create_and_get() {
        let conn = test_conn();
        let created = Recipe::create(&conn, &bread(vec![line("1", 0.5)])).unwrap();

        assert_eq!(created.name, "Bread");
        assert_eq!(created.target_margin, 30.0);
        assert_eq!(created.servings, 4.0);
        assert_eq!(created.ingredients.len(), 1);

        let fetched = Recipe::get_by_id(&conn, &created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let conn = test_conn();
        assert!(Recipe::get_by_id(&conn, "non-existent").unwrap().is_none());
    }

    #[test]
    fn test_update_keeps_untouched_fields() {
        let conn = test_conn();
        let created = Recipe::create(&conn, &bread(vec![line("1", 0.5)])).unwrap();

        let update = RecipeUpdate {
            name: Some("Sourdough Bread".to_string()),
            target_margin: Some(40.0),
            ..Default::default()
        };
        let updated = Recipe::update(&conn, &created.id, &update).unwrap().unwrap();

        assert_eq!(updated.name, "Sourdough Bread");
        assert_eq!(updated.target_margin, 40.0);
        assert_eq!(updated.servings, 4.0);
        assert_eq!(updated.ingredients, created.ingredients);
    }

    #[test]
    fn test_update_replaces_lines() {
        let conn = test_conn();
        let created = Recipe::create(&conn, &bread(vec![line("1", 0.5), line("2", 1.0)])).unwrap();

        let update = RecipeUpdate {
            ingredients: Some(vec![line("3", 2.0)]),
            ..Default::default()
        };
        let updated = Recipe::update(&conn, &created.id, &update).unwrap().unwrap();

        assert_eq!(updated.ingredients, vec![line("3", 2.0)]);
        assert_eq!(updated.name, "Bread");
    }

    #[test]
    fn test_update_missing_returns_none() {
        let conn = test_conn();
        let update = RecipeUpdate {
            servings: Some(2.0),
            ..Default::default()
        };
        assert!(Recipe::update(&conn, "nope", &update).unwrap().is_none());
    }

    #[test]
    fn test_delete_cascades_to_lines() {
        let conn = test_conn();
        let created = Recipe::create(&conn, &bread(vec![line("1", 0.5)])).unwrap();

        assert!(Recipe::delete(&conn, &created.id).unwrap());
        assert_eq!(Recipe::count(&conn).unwrap(), 0);
        assert_eq!(RecipeIngredientLine::count_for_recipe(&conn, &created.id).unwrap(), 0);
        assert!(!Recipe::delete(&conn, &created.id).unwrap());
    }

    #[test]
    fn test_list_with_query() {
        let conn = test_conn();
        Recipe::create(&conn, &bread(Vec::new())).unwrap();
        Recipe::create(
            &conn,
            &RecipeCreate {
                name: "Carrot Cake".to_string(),
                ingredients: Vec::new(),
                target_margin: 50.0,
                servings: 8.0,
            },
        )
        .unwrap();

        let cakes = Recipe::list(&conn, Some("cake"), "name", "asc", 10, 0).unwrap();
        assert_eq!(cakes.len(), 1);
        assert_eq!(cakes[0].name, "Carrot Cake");

        assert_eq!(Recipe::count_matching(&conn, Some("cake")).unwrap(), 1);
        assert_eq!(Recipe::count_matching(&conn, Some("%")).unwrap(), 0);
        assert_eq!(Recipe::count_matching(&conn, None).unwrap(), 2);

        let all = Recipe::list(&conn, None, "servings", "desc", 10, 0).unwrap();
        assert_eq!(all[0].name, "Carrot Cake");
        assert_eq!(Recipe::all(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_serializes_camel_case() {
        let recipe = Recipe {
            id: "r1".to_string(),
            name: "Bread".to_string(),
            ingredients: vec![line("1", 0.5)],
            target_margin: 30.0,
            servings: 4.0,
        };
        let json = serde_json::to_value(&recipe).unwrap();
        assert_eq!(json["targetMargin"], 30.0);
        assert_eq!(json["ingredients"][0]["ingredientId"], "1");
        assert_eq!(json["ingredients"][0]["unit"], "kg");
    }
}
