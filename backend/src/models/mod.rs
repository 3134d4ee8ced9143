//! Domain models for the Block Inventory Platform
//!
//! Re-exports the wire models, validation helpers and aggregation functions
//! from the shared crate

pub use shared::aggregation::*;
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;
