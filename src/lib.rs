//! Food Cost Manager (FCM) Library
//!
//! Recipe costing, menu pricing and ingredient catalog management.

pub mod build_info;
pub mod costing;
pub mod db;
pub mod mcp;
pub mod models;
pub mod snapshot;
pub mod tools;
