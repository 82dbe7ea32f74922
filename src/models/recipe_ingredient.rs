//! Recipe ingredient lines
//!
//! A line says "this recipe uses `quantity` `unit` of ingredient
//! `ingredient_id`". The ingredient id is a weak reference into the catalog:
//! it may point at an ingredient that no longer exists.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::costing::UnitOfMeasure;
use crate::db::DbResult;

/// One ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredientLine {
    pub ingredient_id: String,
    pub quantity: f64,
    /// Lines from older snapshots carry no unit and default to `unit`
    #[serde(default)]
    pub unit: UnitOfMeasure,
}

impl RecipeIngredientLine {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            ingredient_id: row.get("ingredient_id")?,
            quantity: row.get("quantity")?,
            unit: row.get("unit")?,
        })
    }

    /// Get all lines for a recipe, in recipe order
    pub fn get_for_recipe(conn: &Connection, recipe_id: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM recipe_ingredients WHERE recipe_id = ?1 ORDER BY position",
        )?;

        let lines = stmt
            .query_map([recipe_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(lines)
    }

    /// Replace all lines of a recipe
    ///
    /// Not transactional on its own; callers wrap it together with the recipe write.
    pub fn replace_for_recipe(conn: &Connection, recipe_id: &str, lines: &[Self]) -> DbResult<()> {
        conn.execute("DELETE FROM recipe_ingredients WHERE recipe_id = ?1", [recipe_id])?;

        let mut stmt = conn.prepare(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, position, ingredient_id, quantity, unit)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )?;

        for (position, line) in lines.iter().enumerate() {
            stmt.execute(params![
                recipe_id,
                position as i64,
                line.ingredient_id,
                line.quantity,
                line.unit,
            ])?;
        }

        Ok(())
    }

    /// Number of lines in a recipe
    pub fn count_for_recipe(conn: &Connection, recipe_id: &str) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM recipe_ingredients WHERE recipe_id = ?1",
            [recipe_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Remove every line referencing an ingredient, across all recipes
///
/// Remaining lines keep their relative order. Returns the number of lines removed.
pub fn remove_ingredient_from_all_recipes(conn: &Connection, ingredient_id: &str) -> DbResult<usize> {
    conn.execute(
        r#"
        UPDATE recipes SET updated_at = datetime('now')
        WHERE id IN (SELECT recipe_id FROM recipe_ingredients WHERE ingredient_id = ?1)
        "#,
        [ingredient_id],
    )?;

    let removed = conn.execute(
        "DELETE FROM recipe_ingredients WHERE ingredient_id = ?1",
        [ingredient_id],
    )?;

    if removed > 0 {
        tracing::info!("Removed {} recipe line(s) referencing ingredient {}", removed, ingredient_id);
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{test_conn, Recipe, RecipeCreate};

    fn line(ingredient_id: &str, quantity: f64) -> RecipeIngredientLine {
        RecipeIngredientLine {
            ingredient_id: ingredient_id.to_string(),
            quantity,
            unit: UnitOfMeasure::Kilogram,
        }
    }

    fn recipe(conn: &Connection, name: &str, lines: Vec<RecipeIngredientLine>) -> Recipe {
        Recipe::create(
            conn,
            &RecipeCreate {
                name: name.to_string(),
                ingredients: lines,
                target_margin: 30.0,
                servings: 4.0,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let conn = test_conn();
        let bread = recipe(&conn, "Bread", vec![line("c", 1.0), line("a", 2.0), line("b", 3.0)]);

        let lines = RecipeIngredientLine::get_for_recipe(&conn, &bread.id).unwrap();
        let ids: Vec<&str> = lines.iter().map(|l| l.ingredient_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_remove_ingredient_from_all_recipes() {
        let conn = test_conn();
        let bread = recipe(&conn, "Bread", vec![line("ing-1", 0.5)]);
        let cake = recipe(&conn, "Cake", vec![line("ing-1", 0.3), line("ing-2", 0.2)]);

        let removed = remove_ingredient_from_all_recipes(&conn, "ing-1").unwrap();
        assert_eq!(removed, 2);

        assert!(RecipeIngredientLine::get_for_recipe(&conn, &bread.id).unwrap().is_empty());
        let cake_lines = RecipeIngredientLine::get_for_recipe(&conn, &cake.id).unwrap();
        assert_eq!(cake_lines.len(), 1);
        assert_eq!(cake_lines[0].ingredient_id, "ing-2");
    }

    #[test]
    fn test_remove_unknown_ingredient_is_noop() {
        let conn = test_conn();
        let bread = recipe(&conn, "Bread", vec![line("ing-1", 0.5)]);
        assert_eq!(remove_ingredient_from_all_recipes(&conn, "ghost").unwrap(), 0);
        assert_eq!(RecipeIngredientLine::count_for_recipe(&conn, &bread.id).unwrap(), 1);
    }

    #[test]
    fn test_line_without_unit_deserializes_as_count() {
        let line: RecipeIngredientLine =
            serde_json::from_str(r#"{"ingredientId": "1", "quantity": 0.5}"#).unwrap();
        assert_eq!(line.unit, UnitOfMeasure::Unit);
        assert_eq!(line.ingredient_id, "1");
    }
}
