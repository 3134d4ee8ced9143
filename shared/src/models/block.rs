//! Block (inventory unit) models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{BlockType, Supplier};
use crate::types::BlockId;

/// Largest number of rows a single `NewBlock` entry may expand into
pub const MAX_BLOCK_QUANTITY: u32 = 1000;

/// One physical inventory unit. Dimensions are in millimetres.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub block_id: BlockId,
    pub block_type_id: i32,
    pub supplier_id: i32,
    pub height: f64,
    pub width: f64,
    pub length: f64,
    pub arrival_date: DateTime<Utc>,
    pub removal_date: Option<DateTime<Utc>>,
    pub processed: bool,
}

impl Block {
    /// Volume in cubic millimetres
    pub fn volume(&self) -> f64 {
        block_volume(self.height, self.width, self.length)
    }
}

/// Volume of a block from its dimensions
pub fn block_volume(height: f64, width: f64, length: f64) -> f64 {
    height * width * length
}

impl AsRef<Block> for Block {
    fn as_ref(&self) -> &Block {
        self
    }
}

/// A block with its type joined
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockWithType {
    #[serde(flatten)]
    pub block: Block,
    pub block_type: BlockType,
}

impl AsRef<Block> for BlockWithType {
    fn as_ref(&self) -> &Block {
        &self.block
    }
}

/// A block with its type and supplier joined
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockDetails {
    #[serde(flatten)]
    pub block: Block,
    pub block_type: BlockType,
    #[serde(rename = "suppliers")]
    pub supplier: Supplier,
}

impl AsRef<Block> for BlockDetails {
    fn as_ref(&self) -> &Block {
        &self.block
    }
}

fn default_quantity() -> u32 {
    1
}

/// One entry of a bulk-create request.
///
/// `quantity` copies are created, all sharing dimensions, type and supplier.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBlock {
    #[validate(range(min = 1, message = "A valid block type is required"))]
    pub block_type_id: i32,
    #[validate(range(min = 1, message = "A valid supplier is required"))]
    pub supplier_id: i32,
    pub height: f64,
    pub width: f64,
    pub length: f64,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 1000, message = "Quantity must be between 1 and 1000"))]
    pub quantity: u32,
}

/// A validated row ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewBlockRow {
    pub block_type_id: i32,
    pub supplier_id: i32,
    pub height: f64,
    pub width: f64,
    pub length: f64,
    pub arrival_date: DateTime<Utc>,
}

/// Request body for marking blocks processed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessBlocksInput {
    pub block_ids: Vec<BlockId>,
    pub removal_date: Option<DateTime<Utc>>,
}

/// Request body for deleting blocks
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBlocksInput {
    pub block_ids: Vec<BlockId>,
}
