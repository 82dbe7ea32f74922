//! FCM Tools module
//!
//! MCP tool implementations for the Food Cost Manager.

pub mod costing;
pub mod ingredients;
pub mod recipes;
pub mod snapshot;
pub mod status;
