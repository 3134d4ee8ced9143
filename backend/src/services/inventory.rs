//! Inventory service for block listing and bulk mutations

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::models::{
    validate_block_ids, validate_new_block, BlockDetails, FieldError, MessageResponse, NewBlock,
    NewBlockRow, ProcessBlocksInput, RemoveBlocksInput, Supplier,
};
use crate::store::{BlockFilter, InventoryStore};

/// Inventory service for managing blocks
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Blocks whose type name contains `search`, with type and supplier
    pub async fn list_blocks(&self, search: &str) -> AppResult<Vec<BlockDetails>> {
        tracing::debug!(search, "Listing blocks");

        let blocks = self
            .store
            .list_blocks(&BlockFilter::by_block_type_name(search))
            .await?;

        if blocks.is_empty() {
            return Err(AppError::NotFound("Blocks".to_string()));
        }
        Ok(blocks)
    }

    /// Supplier id/name pairs for the block creation form
    pub async fn supplier_options(&self) -> AppResult<Vec<Supplier>> {
        Ok(self.store.list_suppliers("").await?)
    }

    /// Validate every entry, expand quantities and insert the whole batch.
    /// Nothing is inserted unless every entry is valid.
    pub async fn create_blocks(&self, entries: Vec<NewBlock>) -> AppResult<MessageResponse> {
        if entries.is_empty() {
            return Err(FieldError::new("blocks", "At least one block is required").into());
        }

        let batch = entries.len() > 1;
        for (index, entry) in entries.iter().enumerate() {
            validate_new_block(entry).map_err(|err| at_index(err, index, batch))?;
        }

        self.check_references(&entries).await?;

        let arrival_date = Utc::now();
        let rows: Vec<NewBlockRow> = entries
            .iter()
            .flat_map(|entry| {
                let row = NewBlockRow {
                    block_type_id: entry.block_type_id,
                    supplier_id: entry.supplier_id,
                    height: entry.height,
                    width: entry.width,
                    length: entry.length,
                    arrival_date,
                };
                std::iter::repeat(row).take(entry.quantity as usize)
            })
            .collect();

        let count = self.store.insert_blocks(&rows).await?;
        tracing::info!(count, entries = entries.len(), "Blocks created");

        Ok(MessageResponse::with_count("Blocks created successfully", count))
    }

    async fn check_references(&self, entries: &[NewBlock]) -> AppResult<()> {
        let block_type_ids: BTreeSet<i32> = entries.iter().map(|e| e.block_type_id).collect();
        for id in block_type_ids {
            if self.store.find_block_type(id).await?.is_none() {
                return Err(FieldError::new(
                    "blockTypeId",
                    format!("Block type {} does not exist", id),
                )
                .into());
            }
        }

        let supplier_ids: BTreeSet<i32> = entries.iter().map(|e| e.supplier_id).collect();
        for id in supplier_ids {
            if self.store.find_supplier(id).await?.is_none() {
                return Err(FieldError::new(
                    "supplierId",
                    format!("Supplier {} does not exist", id),
                )
                .into());
            }
        }

        Ok(())
    }

    /// Mark blocks processed, stamping the removal date (now when omitted)
    pub async fn process_blocks(&self, input: ProcessBlocksInput) -> AppResult<MessageResponse> {
        validate_block_ids(&input.block_ids)?;

        let ids: Vec<i64> = input.block_ids.iter().map(|id| id.value()).collect();
        let removal_date = input.removal_date.unwrap_or_else(Utc::now);

        let count = self.store.mark_blocks_processed(&ids, removal_date).await?;
        if count == 0 {
            return Err(AppError::NotFound("Blocks".to_string()));
        }

        tracing::info!(count, %removal_date, "Blocks processed");
        Ok(MessageResponse::with_count("Blocks processed successfully", count))
    }

    /// Hard-delete blocks; ids that do not exist are ignored and an empty
    /// list removes nothing
    pub async fn remove_blocks(&self, input: RemoveBlocksInput) -> AppResult<MessageResponse> {
        if input.block_ids.is_empty() {
            return Ok(MessageResponse::with_count("Blocks removed successfully", 0));
        }

        let ids: Vec<i64> = input.block_ids.iter().map(|id| id.value()).collect();
        let count = self.store.delete_blocks(&ids).await?;

        tracing::info!(count, requested = ids.len(), "Blocks removed");
        Ok(MessageResponse::with_count("Blocks removed successfully", count))
    }
}

/// Prefix the failing field with the entry position for array bodies
fn at_index(err: FieldError, index: usize, batch: bool) -> FieldError {
    if batch {
        FieldError::new(format!("[{}].{}", index, err.field), err.message)
    } else {
        err
    }
}
