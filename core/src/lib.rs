//! churnwatch-core — churn risk scoring for subscription customers.
//!
//! LAYERS (strict, top depends on bottom only):
//!   1. extract  — heterogeneous source records → canonical metrics
//!   2. scorer   — canonical metrics → churn probability + risk level
//!   3. monitor  — batch runs; hands results to collaborators
//!      predict  — single-record request/response for the line API
//!
//! Collaborators (`collab`, `alert`, `report`) own all I/O.

pub mod alert;
pub mod collab;
pub mod config;
pub mod error;
pub mod event;
pub mod extract;
pub mod metrics;
pub mod monitor;
pub mod predict;
pub mod report;
pub mod scorer;
pub mod types;

pub use extract::extract_metrics;
pub use scorer::score;
