//! Cost calculation
//!
//! Pure functions turning ingredient purchase prices and recipe lines into
//! line cost, total cost, cost per serving, and a margin-based suggested price.
//! None of these fail: missing ingredients, non-positive servings, and
//! margins of 100% or more all substitute 0.

use std::borrow::Borrow;

use serde::Serialize;

use super::units::{conversion_factor, convert, UnitFamily, UnitOfMeasure};
use crate::models::{Ingredient, RecipeIngredientLine};

/// Cost of one recipe line, in the ingredient's currency
///
/// The line quantity is converted into the ingredient's unit first. When no
/// conversion is registered for the pair the raw quantity is used.
pub fn line_cost(line: &RecipeIngredientLine, ingredient: &Ingredient) -> f64 {
    let converted = convert(line.quantity, line.unit, ingredient.unit);
    ingredient.unit_price() * converted
}

/// Sum of line costs; lines whose ingredient cannot be resolved contribute 0
pub fn total_cost<F, I>(lines: &[RecipeIngredientLine], mut resolve: F) -> f64
where
    F: FnMut(&str) -> Option<I>,
    I: Borrow<Ingredient>,
{
    lines.iter().fold(0.0, |total, line| match resolve(&line.ingredient_id) {
        Some(ingredient) => total + line_cost(line, ingredient.borrow()),
        None => total,
    })
}

/// Cost per serving, or 0 when servings is not positive
pub fn cost_per_serving(total_cost: f64, servings: f64) -> f64 {
    if servings <= 0.0 {
        return 0.0;
    }
    total_cost / servings
}

/// Selling price at which `target_margin_percent` of the price is profit
///
/// Returns 0 for margins of 100% or more.
pub fn suggested_price(cost_per_serving: f64, target_margin_percent: f64) -> f64 {
    if target_margin_percent >= 100.0 {
        return 0.0;
    }
    cost_per_serving / (1.0 - target_margin_percent / 100.0)
}

/// Why no factor exists between two different units
fn fallback_reason(from: UnitOfMeasure, to: UnitOfMeasure) -> &'static str {
    if from.family() == UnitFamily::Imperial || to.family() == UnitFamily::Imperial {
        "imperial units are not converted"
    } else {
        "cross-family units"
    }
}

// ============================================================================
// Recipe Breakdown
// ============================================================================

/// Cost of a single line with diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct LineCosting {
    pub ingredient_id: String,
    pub ingredient_name: Option<String>,
    pub quantity: f64,
    pub unit: UnitOfMeasure,
    /// Quantity expressed in the ingredient's unit (None when missing)
    pub converted_quantity: Option<f64>,
    pub ingredient_unit: Option<UnitOfMeasure>,
    pub cost: f64,
    /// Ingredient could not be resolved
    pub missing: bool,
    /// Units differ and no factor is registered, raw quantity was used
    pub unconverted: bool,
}

/// Full costing of a recipe
#[derive(Debug, Clone, Serialize)]
pub struct RecipeCosting {
    pub lines: Vec<LineCosting>,
    pub total_cost: f64,
    pub servings: f64,
    pub cost_per_serving: f64,
    pub target_margin: f64,
    pub suggested_price: f64,
    pub missing_ingredients: usize,
    pub unconverted_lines: usize,
}

/// Cost a recipe line by line
///
/// Totals are identical to chaining [`total_cost`], [`cost_per_serving`] and
/// [`suggested_price`]; the breakdown only adds diagnostics.
pub fn cost_recipe<F, I>(
    lines: &[RecipeIngredientLine],
    servings: f64,
    target_margin: f64,
    mut resolve: F,
) -> RecipeCosting
where
    F: FnMut(&str) -> Option<I>,
    I: Borrow<Ingredient>,
{
    let mut breakdown = Vec::with_capacity(lines.len());
    let mut total = 0.0;
    let mut missing_ingredients = 0;
    let mut unconverted_lines = 0;

    for line in lines {
        let Some(resolved) = resolve(&line.ingredient_id) else {
            missing_ingredients += 1;
            breakdown.push(LineCosting {
                ingredient_id: line.ingredient_id.clone(),
                ingredient_name: None,
                quantity: line.quantity,
                unit: line.unit,
                converted_quantity: None,
                ingredient_unit: None,
                cost: 0.0,
                missing: true,
                unconverted: false,
            });
            continue;
        };
        let ingredient = resolved.borrow();

        let unconverted = conversion_factor(line.unit, ingredient.unit).is_none();
        if unconverted {
            unconverted_lines += 1;
            tracing::warn!(
                "Unit conversion fallback ({}): {} {} of '{}' (priced per {}). Using raw quantity.",
                fallback_reason(line.unit, ingredient.unit),
                line.quantity,
                line.unit,
                ingredient.name,
                ingredient.unit
            );
        }

        let cost = line_cost(line, ingredient);
        total += cost;

        breakdown.push(LineCosting {
            ingredient_id: line.ingredient_id.clone(),
            ingredient_name: Some(ingredient.name.clone()),
            quantity: line.quantity,
            unit: line.unit,
            converted_quantity: Some(convert(line.quantity, line.unit, ingredient.unit)),
            ingredient_unit: Some(ingredient.unit),
            cost,
            missing: false,
            unconverted,
        });
    }

    let per_serving = cost_per_serving(total, servings);

    RecipeCosting {
        lines: breakdown,
        total_cost: total,
        servings,
        cost_per_serving: per_serving,
        target_margin,
        suggested_price: suggested_price(per_serving, target_margin),
        missing_ingredients,
        unconverted_lines,
    }
}
