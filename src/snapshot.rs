//! JSON snapshot export and import
//!
//! A snapshot holds the whole catalog and recipe store:
//! `{"version": 1, "ingredients": [...], "recipes": [...]}`.
//! Importing replaces both collections in one transaction.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{Database, DbError, DbResult};
use crate::models::{Ingredient, Recipe};

/// Snapshot format version written by this build
pub const SNAPSHOT_VERSION: u64 = 1;

/// File name used when no path is given
pub const DEFAULT_FILE_NAME: &str = "food-cost-data.json";

/// Snapshot error types
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read file: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    Write(#[source] std::io::Error),

    #[error("Invalid JSON file: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u64),

    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// The whole data set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u64,
    pub ingredients: Vec<Ingredient>,
    pub recipes: Vec<Recipe>,
}

/// Result of writing a snapshot
#[derive(Debug, Serialize)]
pub struct ExportSummary {
    pub path: String,
    pub exported_at: String,
    pub ingredients: usize,
    pub recipes: usize,
}

/// Result of restoring a snapshot
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub ingredients_imported: usize,
    pub recipes_imported: usize,
    /// Recipe lines pointing at ingredients absent from the snapshot
    pub dangling_lines: usize,
}

impl Snapshot {
    /// Read the current catalog and recipes
    pub fn capture(conn: &Connection) -> DbResult<Self> {
        Ok(Self {
            version: SNAPSHOT_VERSION,
            ingredients: Ingredient::all(conn)?,
            recipes: Recipe::all(conn)?,
        })
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(SnapshotError::Serialize)
    }

    /// Parse snapshot JSON
    ///
    /// A missing `version` is read as version 1.
    pub fn parse(text: &str) -> Result<Self, SnapshotError> {
        let mut value: serde_json::Value =
            serde_json::from_str(text).map_err(SnapshotError::InvalidJson)?;

        let Some(object) = value.as_object_mut() else {
            return Err(SnapshotError::InvalidFormat("expected a JSON object".to_string()));
        };

        for key in ["ingredients", "recipes"] {
            if object.get(key).map_or(true, |v| v.is_null()) {
                return Err(SnapshotError::InvalidFormat(format!("missing '{}'", key)));
            }
        }

        // 1 and 1.0 are the same version; a missing one is read as 1
        let version = match object.get("version") {
            None | Some(serde_json::Value::Null) => Some(SNAPSHOT_VERSION),
            Some(v) => v
                .as_u64()
                .or_else(|| v.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
        };
        match version {
            Some(SNAPSHOT_VERSION) => {
                object.insert("version".to_string(), SNAPSHOT_VERSION.into());
            }
            Some(other) => return Err(SnapshotError::UnsupportedVersion(other)),
            None => {
                return Err(SnapshotError::InvalidFormat(
                    "'version' must be a whole number".to_string(),
                ))
            }
        }

        let snapshot: Snapshot =
            serde_json::from_value(value).map_err(|e| SnapshotError::InvalidFormat(e.to_string()))?;
        snapshot.check_unique_ids()?;
        Ok(snapshot)
    }

    /// Ids are primary keys once restored, so each may appear only once
    fn check_unique_ids(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::new();
        for ingredient in &self.ingredients {
            if !seen.insert(ingredient.id.as_str()) {
                return Err(SnapshotError::InvalidFormat(format!(
                    "duplicate ingredient id '{}'",
                    ingredient.id
                )));
            }
        }

        seen.clear();
        for recipe in &self.recipes {
            if !seen.insert(recipe.id.as_str()) {
                return Err(SnapshotError::InvalidFormat(format!(
                    "duplicate recipe id '{}'",
                    recipe.id
                )));
            }
        }
        Ok(())
    }

    /// Replace the catalog and recipe store with this snapshot
    pub fn restore(&self, conn: &mut Connection) -> DbResult<ImportSummary> {
        let tx = conn.transaction()?;

        Recipe::delete_all(&tx)?;
        Ingredient::delete_all(&tx)?;

        for ingredient in &self.ingredients {
            Ingredient::insert(&tx, ingredient)?;
        }
        for recipe in &self.recipes {
            Recipe::insert(&tx, recipe)?;
        }

        tx.commit()?;

        let known: HashSet<&str> = self.ingredients.iter().map(|i| i.id.as_str()).collect();
        let dangling_lines = self
            .recipes
            .iter()
            .flat_map(|r| r.ingredients.iter())
            .filter(|line| !known.contains(line.ingredient_id.as_str()))
            .count();

        tracing::info!(
            "Restored snapshot: {} ingredient(s), {} recipe(s), {} dangling line(s)",
            self.ingredients.len(),
            self.recipes.len(),
            dangling_lines
        );

        Ok(ImportSummary {
            ingredients_imported: self.ingredients.len(),
            recipes_imported: self.recipes.len(),
            dangling_lines,
        })
    }
}

/// Write the current data set to `path`
pub fn export_to_file<P: AsRef<Path>>(db: &Database, path: P) -> Result<ExportSummary, SnapshotError> {
    let snapshot = db.with_conn(Snapshot::capture)?;
    let json = snapshot.to_json()?;

    std::fs::write(path.as_ref(), json).map_err(SnapshotError::Write)?;

    Ok(ExportSummary {
        path: path.as_ref().display().to_string(),
        exported_at: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        ingredients: snapshot.ingredients.len(),
        recipes: snapshot.recipes.len(),
    })
}

/// Replace the current data set with the snapshot stored at `path`
pub fn import_from_file<P: AsRef<Path>>(db: &Database, path: P) -> Result<ImportSummary, SnapshotError> {
    let text = std::fs::read_to_string(path.as_ref()).map_err(SnapshotError::Read)?;
    let snapshot = Snapshot::parse(&text)?;
    Ok(db.with_conn_mut(|conn| snapshot.restore(conn))?)
}

/// Resolve an optional user-supplied path to the snapshot file
pub fn resolve_path(path: Option<&str>) -> PathBuf {
    match path {
        Some(p) if !p.trim().is_empty() => PathBuf::from(p.trim()),
        _ => PathBuf::from(DEFAULT_FILE_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::UnitOfMeasure;
    use crate::models::{RecipeCreate, RecipeIngredientLine};

    fn seeded_db() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            crate::db::migrations::run_migrations(conn)?;
            let flour = Ingredient {
                id: "1".to_string(),
                name: "Flour".to_string(),
                price: 2.0,
                quantity: 1.0,
                unit: UnitOfMeasure::Kilogram,
            };
            Ingredient::insert(conn, &flour)?;
            Recipe::create(
                conn,
                &RecipeCreate {
                    name: "Bread".to_string(),
                    ingredients: vec![RecipeIngredientLine {
                        ingredient_id: "1".to_string(),
                        quantity: 500.0,
                        unit: UnitOfMeasure::Gram,
                    }],
                    target_margin: 30.0,
                    servings: 4.0,
                },
            )?;
            Ok(())
        })
        .unwrap();
        db
    }

    #[test]
    fn test_export_then_import_restores_data() {
        let db = seeded_db();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_FILE_NAME);

        let before = db.with_conn(Snapshot::capture).unwrap();
        let exported = export_to_file(&db, &path).unwrap();
        assert_eq!(exported.ingredients, 1);
        assert_eq!(exported.recipes, 1);

        db.with_conn(|conn| {
            Recipe::delete_all(conn)?;
            Ingredient::delete_all(conn)?;
            Ok(())
        })
        .unwrap();

        let summary = import_from_file(&db, &path).unwrap();
        assert_eq!(summary.ingredients_imported, 1);
        assert_eq!(summary.recipes_imported, 1);
        assert_eq!(summary.dangling_lines, 0);

        let after = db.with_conn(Snapshot::capture).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_import_replaces_existing_data() {
        let db = seeded_db();
        let snapshot = Snapshot::parse(
            r#"{
                "version": 1,
                "ingredients": [
                    {"id": "9", "name": "Sugar", "price": 1.2, "quantity": 1, "unit": "kg"}
                ],
                "recipes": []
            }"#,
        )
        .unwrap();

        db.with_conn_mut(|conn| snapshot.restore(conn)).unwrap();

        let current = db.with_conn(Snapshot::capture).unwrap();
        assert_eq!(current.ingredients.len(), 1);
        assert_eq!(current.ingredients[0].name, "Sugar");
        assert!(current.recipes.is_empty());
    }

    #[test]
    fn test_exported_json_shape() {
        let db = seeded_db();
        let snapshot = db.with_conn(Snapshot::capture).unwrap();
        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

        assert_eq!(value["version"], 1);
        assert_eq!(value["ingredients"][0]["unit"], "kg");
        assert_eq!(value["recipes"][0]["targetMargin"], 30.0);
        assert_eq!(value["recipes"][0]["ingredients"][0]["ingredientId"], "1");
        assert_eq!(value["recipes"][0]["ingredients"][0]["unit"], "g");
    }

    #[test]
    fn test_parse_rejects_missing_collections() {
        let err = Snapshot::parse(r#"{"version": 1, "ingredients": []}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidFormat(_)));

        let err = Snapshot::parse(r#"{"recipes": []}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidFormat(_)));

        let err = Snapshot::parse("[]").unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidFormat(_)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = Snapshot::parse("not json at all").unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidJson(_)));
    }

    #[test]
    fn test_parse_rejects_other_versions() {
        let err = Snapshot::parse(r#"{"version": 2, "ingredients": [], "recipes": []}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_parse_accepts_float_version() {
        let snapshot = Snapshot::parse(r#"{"version": 1.0, "ingredients": [], "recipes": []}"#).unwrap();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);

        let err = Snapshot::parse(r#"{"version": 2.0, "ingredients": [], "recipes": []}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::UnsupportedVersion(2)));

        let err = Snapshot::parse(r#"{"version": 1.5, "ingredients": [], "recipes": []}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidFormat(_)));
    }

    #[test]
    fn test_parse_rejects_duplicate_ids() {
        let err = Snapshot::parse(
            r#"{
                "version": 1,
                "ingredients": [
                    {"id": "1", "name": "Flour", "price": 2, "quantity": 1, "unit": "kg"},
                    {"id": "1", "name": "Rye Flour", "price": 3, "quantity": 1, "unit": "kg"}
                ],
                "recipes": []
            }"#,
        )
        .unwrap_err();
        match err {
            SnapshotError::InvalidFormat(message) => assert!(message.contains("duplicate ingredient id '1'")),
            other => panic!("unexpected error: {}", other),
        }

        let err = Snapshot::parse(
            r#"{
                "ingredients": [],
                "recipes": [
                    {"id": "r", "name": "Bread", "ingredients": [], "targetMargin": 0, "servings": 1},
                    {"id": "r", "name": "Buns", "ingredients": [], "targetMargin": 0, "servings": 1}
                ]
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidFormat(_)));
    }

    #[test]
    fn test_import_duplicate_ids_keeps_existing_data() {
        let db = seeded_db();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dupes.json");
        std::fs::write(
            &path,
            r#"{"version": 1, "ingredients": [
                {"id": "x", "name": "A", "price": 1, "quantity": 1, "unit": "g"},
                {"id": "x", "name": "B", "price": 1, "quantity": 1, "unit": "g"}
            ], "recipes": []}"#,
        )
        .unwrap();

        let err = import_from_file(&db, &path).unwrap_err();
        assert!(err.to_string().starts_with("Invalid file format"));

        let current = db.with_conn(Snapshot::capture).unwrap();
        assert_eq!(current.ingredients[0].name, "Flour");
    }

    #[test]
    fn test_parse_accepts_legacy_lines_without_unit() {
        let snapshot = Snapshot::parse(
            r#"{
                "ingredients": [],
                "recipes": [
                    {"id": "r", "name": "Bread", "ingredients": [{"ingredientId": "1", "quantity": 0.5}],
                     "targetMargin": 30, "servings": 4}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.recipes[0].ingredients[0].unit, UnitOfMeasure::Unit);
    }

    #[test]
    fn test_restore_counts_dangling_lines() {
        let db = Database::in_memory().unwrap();
        db.with_conn(crate::db::migrations::run_migrations).unwrap();

        let snapshot = Snapshot::parse(
            r#"{
                "version": 1,
                "ingredients": [],
                "recipes": [
                    {"id": "r", "name": "Bread", "ingredients": [{"ingredientId": "gone", "quantity": 1, "unit": "kg"}],
                     "targetMargin": 30, "servings": 4}
                ]
            }"#,
        )
        .unwrap();

        let summary = db.with_conn_mut(|conn| snapshot.restore(conn)).unwrap();
        assert_eq!(summary.dangling_lines, 1);
    }

    #[test]
    fn test_import_missing_file() {
        let db = Database::in_memory().unwrap();
        let err = import_from_file(&db, "/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SnapshotError::Read(_)));
    }

    #[test]
    fn test_resolve_path_defaults() {
        assert_eq!(resolve_path(None), PathBuf::from(DEFAULT_FILE_NAME));
        assert_eq!(resolve_path(Some("  ")), PathBuf::from(DEFAULT_FILE_NAME));
        assert_eq!(resolve_path(Some("/tmp/x.json")), PathBuf::from("/tmp/x.json"));
    }
}
