//! Ingredient model
//!
//! Represents a purchased package of an ingredient: `price` paid for
//! `quantity` of `unit`.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::costing::UnitOfMeasure;
use crate::db::DbResult;

/// An ingredient in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: UnitOfMeasure,
}

/// Data for creating a new ingredient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientCreate {
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: UnitOfMeasure,
}

/// Data for updating an ingredient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<f64>,
    pub unit: Option<UnitOfMeasure>,
}

impl Ingredient {
    /// Price of one native unit of this ingredient
    ///
    /// Not guarded: a non-positive package quantity yields an infinite or NaN price.
    pub fn unit_price(&self) -> f64 {
        self.price / self.quantity
    }

    /// Create an Ingredient from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            price: row.get("price")?,
            quantity: row.get("quantity")?,
            unit: row.get("unit")?,
        })
    }

    /// Insert a new ingredient with a freshly generated id
    pub fn create(conn: &Connection, data: &IngredientCreate) -> DbResult<Self> {
        let ingredient = Self {
            id: super::new_id(),
            name: data.name.clone(),
            price: data.price,
            quantity: data.quantity,
            unit: data.unit,
        };
        Self::insert(conn, &ingredient)?;
        tracing::debug!("Created ingredient {} ({})", ingredient.name, ingredient.id);
        Ok(ingredient)
    }

    /// Insert an ingredient keeping its id (used by snapshot import)
    pub fn insert(conn: &Connection, ingredient: &Ingredient) -> DbResult<()> {
        conn.execute(
            r#"
            INSERT INTO ingredients (id, name, price, quantity, unit)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                ingredient.id,
                ingredient.name,
                ingredient.price,
                ingredient.quantity,
                ingredient.unit,
            ],
        )?;
        Ok(())
    }

    /// Get an ingredient by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredients WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All ingredients in insertion order
    pub fn all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredients ORDER BY rowid")?;
        let items = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Search ingredients by name
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let search_pattern = super::like_pattern(query);
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM ingredients
            WHERE name LIKE ?1 ESCAPE '\'
            ORDER BY name ASC
            LIMIT ?2
            "#,
        )?;

        let items = stmt
            .query_map(params![search_pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// List ingredients with sorting and pagination
    pub fn list(
        conn: &Connection,
        sort_by: &str,
        sort_order: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let order = if sort_order.to_lowercase() == "desc" { "DESC" } else { "ASC" };
        let sort_col = match sort_by.to_lowercase().as_str() {
            "created_at" => "rowid",
            "price" => "price",
            _ => "name",
        };

        let sql = format!(
            "SELECT * FROM ingredients ORDER BY {} {} LIMIT ?1 OFFSET ?2",
            sort_col, order
        );

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![limit, offset], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Update an ingredient
    pub fn update(conn: &Connection, id: &str, data: &IngredientUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! add_update {
            ($field:ident, $col:expr) => {
                if let Some(ref val) = data.$field {
                    updates.push(format!("{} = ?{}", $col, params_vec.len() + 1));
                    params_vec.push(Box::new(val.clone()));
                }
            };
        }

        add_update!(name, "name");
        add_update!(price, "price");
        add_update!(quantity, "quantity");
        add_update!(unit, "unit");

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE ingredients SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id.to_string()));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Names of recipes that reference this ingredient
    pub fn get_used_in_recipes(conn: &Connection, id: &str) -> DbResult<Vec<String>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT r.name FROM recipes r
            INNER JOIN recipe_ingredients ri ON r.id = ri.recipe_id
            WHERE ri.ingredient_id = ?1
            ORDER BY r.name
            "#,
        )?;

        let names = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(names)
    }

    /// Count ingredients
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM ingredients", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete an ingredient
    ///
    /// Recipe lines referencing it are left in place and cost 0 from now on.
    /// Returns Ok(false) if not found.
    pub fn delete(conn: &Connection, id: &str) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM ingredients WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Delete every ingredient (used by snapshot import)
    pub fn delete_all(conn: &Connection) -> DbResult<usize> {
        Ok(conn.execute("DELETE FROM ingredients", [])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_conn;

    fn flour() -> IngredientCreate {
        IngredientCreate {
            name: "Flour".to_string(),
            price: 2.5,
            quantity: 1.0,
            unit: UnitOfMeasure::Kilogram,
        }
    }

    #[test]
    fn test_create_and_get() {
        let conn = test_conn();
        let created = Ingredient::create(&conn, &flour()).unwrap();
        assert!(!created.id.is_empty());

        let fetched = Ingredient::get_by_id(&conn, &created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.unit, UnitOfMeasure::Kilogram);
        assert_eq!(fetched.price, 2.5);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let conn = test_conn();
        let a = Ingredient::create(&conn, &flour()).unwrap();
        let b = Ingredient::create(&conn, &flour()).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(Ingredient::count(&conn).unwrap(), 2);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let conn = test_conn();
        assert!(Ingredient::get_by_id(&conn, "non-existent").unwrap().is_none());
    }

    #[test]
    fn test_update_partial() {
        let conn = test_conn();
        let created = Ingredient::create(&conn, &flour()).unwrap();

        let update = IngredientUpdate {
            price: Some(3.0),
            unit: Some(UnitOfMeasure::Gram),
            ..Default::default()
        };
        let updated = Ingredient::update(&conn, &created.id, &update).unwrap().unwrap();

        assert_eq!(updated.name, "Flour");
        assert_eq!(updated.price, 3.0);
        assert_eq!(updated.quantity, 1.0);
        assert_eq!(updated.unit, UnitOfMeasure::Gram);
    }

    #[test]
    fn test_update_missing_returns_none() {
        let conn = test_conn();
        let update = IngredientUpdate {
            price: Some(3.0),
            ..Default::default()
        };
        assert!(Ingredient::update(&conn, "nope", &update).unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let conn = test_conn();
        let created = Ingredient::create(&conn, &flour()).unwrap();
        assert!(Ingredient::delete(&conn, &created.id).unwrap());
        assert!(!Ingredient::delete(&conn, &created.id).unwrap());
        assert_eq!(Ingredient::count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_search_and_list() {
        let conn = test_conn();
        Ingredient::create(&conn, &flour()).unwrap();
        Ingredient::create(
            &conn,
            &IngredientCreate {
                name: "Whole Milk".to_string(),
                price: 1.5,
                quantity: 1.0,
                unit: UnitOfMeasure::Liter,
            },
        )
        .unwrap();

        let found = Ingredient::search(&conn, "milk", 10).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Whole Milk");

        let by_price = Ingredient::list(&conn, "price", "desc", 10, 0).unwrap();
        assert_eq!(by_price[0].name, "Flour");

        let all = Ingredient::all(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Flour");
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let conn = test_conn();
        for name in ["100% Cocoa", "Cocoa Nibs", "Sea_Salt", "Sea Salt"] {
            Ingredient::create(
                &conn,
                &IngredientCreate {
                    name: name.to_string(),
                    price: 1.0,
                    quantity: 1.0,
                    unit: UnitOfMeasure::Gram,
                },
            )
            .unwrap();
        }

        let percent = Ingredient::search(&conn, "%", 10).unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].name, "100% Cocoa");

        let underscore = Ingredient::search(&conn, "a_S", 10).unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].name, "Sea_Salt");
    }

    #[test]
    fn test_unit_price() {
        let eggs = Ingredient {
            id: "3".to_string(),
            name: "Eggs".to_string(),
            price: 3.0,
            quantity: 12.0,
            unit: UnitOfMeasure::Unit,
        };
        assert!((eggs.unit_price() - 0.25).abs() < 1e-12);
    }
}
