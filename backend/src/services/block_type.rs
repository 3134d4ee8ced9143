//! Block type reference data

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{
    summarize_block_types, validate_block_type_input, BlockType, BlockTypeInput,
    BlockTypeSummary, MessageResponse,
};
use crate::store::{BlockFilter, BlockReference, InventoryStore};

/// Block type service for CRUD and per-type block counts
#[derive(Clone)]
pub struct BlockTypeService {
    store: Arc<dyn InventoryStore>,
}

impl BlockTypeService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Block types matching `search`, each with its unprocessed block
    /// counts grouped by supplier
    pub async fn list_with_counts(&self, search: &str) -> AppResult<Vec<BlockTypeSummary>> {
        tracing::debug!(search, "Listing block types");

        let block_types = self.store.list_block_types(search).await?;
        let blocks = self
            .store
            .list_blocks(&BlockFilter::by_block_type_name(search))
            .await?;

        Ok(summarize_block_types(block_types, &blocks))
    }

    /// Create a block type with a unique name
    pub async fn create(&self, input: BlockTypeInput) -> AppResult<BlockType> {
        let input = validate_block_type_input(input)?;

        if self
            .store
            .find_block_type_by_name(&input.block_name)
            .await?
            .is_some()
        {
            return Err(duplicate_name(&input.block_name));
        }

        let block_type = self.store.insert_block_type(&input).await?;
        tracing::info!(
            block_type_id = block_type.block_type_id,
            block_name = %block_type.block_name,
            "Block type created"
        );

        Ok(block_type)
    }

    /// Replace the name and density of an existing block type
    pub async fn update(&self, id: i32, input: BlockTypeInput) -> AppResult<BlockType> {
        let input = validate_block_type_input(input)?;

        if self.store.find_block_type(id).await?.is_none() {
            return Err(AppError::NotFound("Block type".to_string()));
        }

        if let Some(existing) = self.store.find_block_type_by_name(&input.block_name).await? {
            if existing.block_type_id != id {
                return Err(duplicate_name(&input.block_name));
            }
        }

        let block_type = self
            .store
            .update_block_type(id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound("Block type".to_string()))?;

        tracing::info!(block_type_id = id, "Block type updated");
        Ok(block_type)
    }

    /// Delete a block type that no block references
    pub async fn delete(&self, id: i32) -> AppResult<MessageResponse> {
        if self.store.find_block_type(id).await?.is_none() {
            return Err(AppError::NotFound("Block type".to_string()));
        }

        let references = self
            .store
            .count_blocks(BlockReference::BlockType(id))
            .await?;
        if references > 0 {
            return Err(AppError::conflict(
                "blockType",
                format!(
                    "Cannot delete block type: {} block(s) still reference it",
                    references
                ),
            ));
        }

        if !self.store.delete_block_type(id).await? {
            return Err(AppError::NotFound("Block type".to_string()));
        }

        tracing::info!(block_type_id = id, "Block type deleted");
        Ok(MessageResponse::new("Block type deleted successfully"))
    }
}

fn duplicate_name(name: &str) -> AppError {
    AppError::conflict(
        "blockName",
        format!("A block type named \"{}\" already exists", name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{granite, seeded_store};
    use crate::store::MemoryStore;

    fn service(store: Arc<MemoryStore>) -> BlockTypeService {
        BlockTypeService::new(store)
    }

    #[tokio::test]
    async fn test_create_twice_conflicts() {
        let service = service(Arc::new(MemoryStore::new()));

        let created = service.create(granite()).await.unwrap();
        assert_eq!(created.block_name, "Granite");
        assert_eq!(created.density, 2700.0);

        let err = service.create(granite()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_create_trims_and_validates() {
        let service = service(Arc::new(MemoryStore::new()));

        let created = service
            .create(BlockTypeInput {
                block_name: "  Marble  ".to_string(),
                density: 2560.0,
            })
            .await
            .unwrap();
        assert_eq!(created.block_name, "Marble");

        let err = service
            .create(BlockTypeInput {
                block_name: "Basalt".to_string(),
                density: 0.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "density"));
    }

    #[tokio::test]
    async fn test_list_counts_only_unprocessed_blocks() {
        let seeded = seeded_store().await;
        let service = service(seeded.store.clone());

        let summaries = service.list_with_counts("").await.unwrap();
        let granite = summaries
            .iter()
            .find(|s| s.block_name == "Granite")
            .unwrap();

        // Two in storage from Nordic Stone, one from Alpine Quarry, one processed
        assert_eq!(granite.total_blocks, 3);
        assert_eq!(
            granite.blocks_by_supplier.keys().collect::<Vec<_>>(),
            vec!["Nordic Stone", "Alpine Quarry"]
        );
        assert_eq!(granite.blocks_by_supplier["Nordic Stone"], 2);
        assert!(!granite.can_delete);

        let marble = summaries.iter().find(|s| s.block_name == "Marble").unwrap();
        assert_eq!(marble.total_blocks, 0);
        assert!(marble.can_delete);
    }

    #[tokio::test]
    async fn test_list_filters_by_search() {
        let seeded = seeded_store().await;
        let service = service(seeded.store.clone());

        let summaries = service.list_with_counts("MAR").await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].block_name, "Marble");
    }

    #[tokio::test]
    async fn test_delete_referenced_type_conflicts() {
        let seeded = seeded_store().await;
        let service = service(seeded.store.clone());

        let err = service.delete(seeded.granite_id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));

        let deleted = service.delete(seeded.marble_id).await.unwrap();
        assert_eq!(deleted.message, "Block type deleted successfully");

        let err = service.delete(seeded.marble_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let seeded = seeded_store().await;
        let service = service(seeded.store.clone());

        let updated = service
            .update(
                seeded.marble_id,
                BlockTypeInput {
                    block_name: "Carrara Marble".to_string(),
                    density: 2710.0,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.block_name, "Carrara Marble");
        assert_eq!(updated.density, 2710.0);

        // Unknown id wins over a name clash
        let err = service.update(999, granite()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service
            .update(
                999,
                BlockTypeInput {
                    block_name: "Slate".to_string(),
                    density: 2800.0,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rename_onto_existing_name_conflicts() {
        let seeded = seeded_store().await;
        let service = service(seeded.store.clone());

        let err = service.update(seeded.marble_id, granite()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));

        // Keeping its own name is fine
        assert!(service.update(seeded.granite_id, granite()).await.is_ok());
    }
}
