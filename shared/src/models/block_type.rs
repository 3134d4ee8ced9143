//! Block type models

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A named material category with a density
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockType {
    pub block_type_id: i32,
    pub block_name: String,
    /// Density in kg/m³
    pub density: f64,
}

/// Request body for creating or replacing a block type
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BlockTypeInput {
    #[validate(length(min = 1, max = 100, message = "Block name must be 1-100 characters"))]
    pub block_name: String,
    pub density: f64,
}

/// A block type together with the blocks currently in storage for it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockTypeSummary {
    pub block_type_id: i32,
    pub block_name: String,
    pub density: f64,
    /// Unprocessed blocks of this type
    pub total_blocks: i64,
    /// Unprocessed blocks per supplier name, in first-seen order
    pub blocks_by_supplier: IndexMap<String, i64>,
    /// True when no block at all references this type
    pub can_delete: bool,
}
