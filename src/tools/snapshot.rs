//! Snapshot Tools
//!
//! Export and import of the whole data set as a JSON file.

use crate::db::Database;
use crate::snapshot::{self, ExportSummary, ImportSummary};

/// Write every ingredient and recipe to `path` (default file name when absent)
pub fn export_snapshot(db: &Database, path: Option<&str>) -> Result<ExportSummary, String> {
    let path = snapshot::resolve_path(path);

    let summary = snapshot::export_to_file(db, &path).map_err(|e| e.to_string())?;

    tracing::info!(
        "Exported {} ingredients and {} recipes to {}",
        summary.ingredients,
        summary.recipes,
        summary.path
    );
    Ok(summary)
}

/// Replace all ingredients and recipes with the contents of `path`
pub fn import_snapshot(db: &Database, path: Option<&str>) -> Result<ImportSummary, String> {
    let path = snapshot::resolve_path(path);

    let summary = snapshot::import_from_file(db, &path).map_err(|e| e.to_string())?;

    tracing::info!(
        "Imported {} ingredients and {} recipes from {}",
        summary.ingredients_imported,
        summary.recipes_imported,
        path.display()
    );
    if summary.dangling_lines > 0 {
        tracing::warn!(
            "{} imported recipe line(s) reference unknown ingredients",
            summary.dangling_lines
        );
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::UnitOfMeasure;
    use crate::models::{Ingredient, IngredientCreate};

    fn test_db() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(crate::db::migrations::run_migrations).unwrap();
        db
    }

    #[test]
    fn test_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        let path = path.to_str().unwrap();

        let source = test_db();
        source
            .with_conn(|conn| {
                Ingredient::create(
                    conn,
                    &IngredientCreate {
                        name: "Butter".to_string(),
                        price: 4.0,
                        quantity: 250.0,
                        unit: UnitOfMeasure::Gram,
                    },
                )
            })
            .unwrap();

        let exported = export_snapshot(&source, Some(path)).unwrap();
        assert_eq!(exported.ingredients, 1);

        let target = test_db();
        let imported = import_snapshot(&target, Some(path)).unwrap();
        assert_eq!(imported.ingredients_imported, 1);
        assert_eq!(imported.recipes_imported, 0);
    }

    #[test]
    fn test_import_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let err = import_snapshot(&test_db(), path.to_str()).unwrap_err();
        assert!(err.starts_with("Failed to read file"));
    }
}
