//! FCM Status Tool
//!
//! Provides runtime status information about the FCM service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::Database;
use crate::models::{Ingredient, Recipe};

/// Costing instructions for AI assistants
pub const COSTING_INSTRUCTIONS: &str = r#"
# FCM Recipe Costing Instructions

This guide explains how to cost recipes and suggest menu prices with the
Food Cost Manager (FCM) tools.

## Overview

Costing a dish needs:
1. **Ingredients** - purchasable items with a purchase price, a purchase quantity and a unit
2. **Recipes** - a list of ingredient lines (ingredient id, quantity, unit), a number of servings and a target margin
3. **Costing** - `cost_recipe` for a stored recipe, or `quote_recipe` for a what-if calculation

---

## Step 1: Record Ingredients

**Tool:** `add_ingredient`

Record what you PAID and how much you GOT:
- `price`: purchase price (e.g., 2.00)
- `quantity`: purchase quantity (e.g., 1)
- `unit`: purchase unit

The per-unit price is `price / quantity`. A 12-egg carton at 3.00 is
`price: 3.0, quantity: 12, unit: "unit"` and costs 0.25 per egg.

Search before adding to avoid duplicates: `search_ingredients`.

### Supported units

| Unit | Meaning |
|------|---------|
| `kg` | kilogram |
| `g` | gram |
| `L` | liter |
| `mL` | milliliter |
| `unit` | count (eggs, lemons, cans) |
| `lb`, `oz`, `fl oz` | accepted and stored, but NOT converted |

### Unit conversion

Only these conversions are applied:
- kg <-> g (1 kg = 1000 g)
- L <-> mL (1 L = 1000 mL)

Any other combination (e.g., a recipe line in `g` for an ingredient bought
per `unit`, or anything imperial) is costed WITHOUT conversion: the line
quantity is multiplied directly by the per-unit price. Such lines are flagged
`unconverted` in the cost breakdown. Record ingredients in the same unit
family the recipes will use.

---

## Step 2: Build Recipes

**Tool:** `create_recipe`

```json
{
  "name": "Pancakes",
  "ingredients": [
    {"ingredient_id": "<flour id>", "quantity": 500, "unit": "g"},
    {"ingredient_id": "<egg id>", "quantity": 6, "unit": "unit"}
  ],
  "servings": 5,
  "target_margin": 50
}
```

- Line order is preserved.
- `servings` defaults to 1; `target_margin` defaults to 0.
- Unknown ingredient ids are accepted but reported back; they cost 0 until
  an ingredient with that id exists.

`update_recipe` with `ingredients` REPLACES the whole line list.

---

## Step 3: Cost and Price

**Tool:** `cost_recipe` (stored recipe) or `quote_recipe` (ad-hoc lines, nothing saved)

Formulas:
- line cost = (price / quantity) x converted line quantity
- total cost = sum of line costs (missing ingredients contribute 0)
- cost per serving = total cost / servings (0 when servings <= 0)
- suggested price = cost per serving / (1 - margin / 100) (0 when margin >= 100)

Example: cost per serving 5.00 at a 50% margin gives a suggested price of 10.00.

Check `missing_ingredients` and `unconverted_lines` in the result before
trusting the numbers.

---

## Deleting Ingredients

`delete_ingredient` leaves recipe lines pointing at the deleted id; they
cost 0 from then on. Pass `remove_from_recipes: true` (or call
`remove_ingredient_from_all_recipes`) to drop those lines as well.

---

## Backups

- `export_snapshot` writes every ingredient and recipe to a JSON file
  (default `food-cost-data.json`).
- `import_snapshot` REPLACES all ingredients and recipes with the file's
  contents. Export first if unsure.
"#;

/// Runtime status of the FCM service
#[derive(Debug, Clone, Serialize)]
pub struct FcmStatus {
    /// Build information
    pub build: BuildInfo,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub ingredient_count: Option<i64>,
    pub recipe_count: Option<i64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, database: &Database) -> FcmStatus {
        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        // Counts are informational; a failing query just leaves them empty
        let counts = database
            .with_conn(|conn| Ok((Ingredient::count(conn)?, Recipe::count(conn)?)))
            .ok();

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        FcmStatus {
            build: BuildInfo::current(),
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            ingredient_count: counts.map(|(ingredients, _)| ingredients),
            recipe_count: counts.map(|(_, recipes)| recipes),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
