//! Supplier models

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// The vendor a block was sourced from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub supplier_id: i32,
    pub supplier_name: String,
}

/// Request body for creating or replacing a supplier
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SupplierInput {
    #[validate(length(min = 1, max = 100, message = "Supplier name must be 1-100 characters"))]
    pub supplier_name: String,
}

/// A supplier together with the blocks currently in storage from it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSummary {
    pub supplier_id: i32,
    pub supplier_name: String,
    pub total_blocks: i64,
    /// Unprocessed blocks per block type name, in first-seen order
    pub blocks_by_block_type: IndexMap<String, i64>,
    pub can_delete: bool,
}
