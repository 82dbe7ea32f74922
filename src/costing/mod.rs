//! Cost calculation module
//!
//! Handles unit conversions and recipe cost/price calculations.

pub mod calculator;
pub mod units;

pub use calculator::{
    cost_per_serving, cost_recipe, line_cost, suggested_price, total_cost, LineCosting,
    RecipeCosting,
};
pub use units::{conversion_factor, convert, UnitOfMeasure};
