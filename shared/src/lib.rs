//! Shared types and models for the Block Inventory Platform
//!
//! This crate contains the wire models, request schemas, validation helpers
//! and the aggregation functions shared between the backend and the browser
//! (via WASM).

pub mod aggregation;
pub mod models;
pub mod types;
pub mod validation;

pub use aggregation::*;
pub use models::*;
pub use types::*;
pub use validation::*;
