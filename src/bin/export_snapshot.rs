//! Utility to write the database to a JSON snapshot file
//!
//! Usage: export_snapshot [PATH]

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = foodcost::db::database_path();
    println!("Database path: {}", db_path.display());

    if !db_path.exists() {
        return Err(format!("Database not found at {}", db_path.display()).into());
    }

    let database = foodcost::db::Database::new(&db_path)?;

    // Run migrations
    database.with_conn(|conn| {
        foodcost::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let arg = std::env::args().nth(1);
    let path = foodcost::snapshot::resolve_path(arg.as_deref());

    let summary = foodcost::snapshot::export_to_file(&database, &path)?;
    println!("Snapshot written:");
    println!("  File: {}", summary.path);
    println!("  Exported: {}", summary.exported_at);
    println!("  Ingredients: {}", summary.ingredients);
    println!("  Recipes: {}", summary.recipes);

    Ok(())
}
