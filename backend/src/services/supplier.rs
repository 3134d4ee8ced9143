//! Supplier reference data

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{
    summarize_suppliers, validate_supplier_input, BlockDetails, MessageResponse, Supplier,
    SupplierInput, SupplierSummary,
};
use crate::store::{BlockFilter, BlockReference, InventoryStore};

/// Supplier service for CRUD and per-supplier block listings
#[derive(Clone)]
pub struct SupplierService {
    store: Arc<dyn InventoryStore>,
}

impl SupplierService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Suppliers matching `search`, each with its unprocessed block counts
    /// grouped by block type
    pub async fn list_with_counts(&self, search: &str) -> AppResult<Vec<SupplierSummary>> {
        tracing::debug!(search, "Listing suppliers");

        let suppliers = self.store.list_suppliers(search).await?;
        let blocks = self
            .store
            .list_blocks(&BlockFilter::by_supplier_name(search))
            .await?;

        Ok(summarize_suppliers(suppliers, &blocks))
    }

    /// Blocks from one supplier whose block type name matches `search`
    pub async fn blocks_for_supplier(
        &self,
        supplier_id: i32,
        search: &str,
    ) -> AppResult<Vec<BlockDetails>> {
        let blocks = self
            .store
            .list_blocks(&BlockFilter::for_supplier(supplier_id, search))
            .await?;

        if blocks.is_empty() {
            return Err(AppError::NotFound("Blocks for supplier".to_string()));
        }
        Ok(blocks)
    }

    pub async fn create(&self, input: SupplierInput) -> AppResult<Supplier> {
        let input = validate_supplier_input(input)?;

        if self
            .store
            .find_supplier_by_name(&input.supplier_name)
            .await?
            .is_some()
        {
            return Err(duplicate_name(&input.supplier_name));
        }

        let supplier = self.store.insert_supplier(&input).await?;
        tracing::info!(
            supplier_id = supplier.supplier_id,
            supplier_name = %supplier.supplier_name,
            "Supplier created"
        );

        Ok(supplier)
    }

    pub async fn update(&self, id: i32, input: SupplierInput) -> AppResult<Supplier> {
        let input = validate_supplier_input(input)?;

        if self.store.find_supplier(id).await?.is_none() {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        if let Some(existing) = self.store.find_supplier_by_name(&input.supplier_name).await? {
            if existing.supplier_id != id {
                return Err(duplicate_name(&input.supplier_name));
            }
        }

        let supplier = self
            .store
            .update_supplier(id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        tracing::info!(supplier_id = id, "Supplier updated");
        Ok(supplier)
    }

    pub async fn delete(&self, id: i32) -> AppResult<MessageResponse> {
        if self.store.find_supplier(id).await?.is_none() {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        let references = self.store.count_blocks(BlockReference::Supplier(id)).await?;
        if references > 0 {
            return Err(AppError::conflict(
                "supplier",
                format!(
                    "Cannot delete supplier: {} block(s) still reference it",
                    references
                ),
            ));
        }

        if !self.store.delete_supplier(id).await? {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        tracing::info!(supplier_id = id, "Supplier deleted");
        Ok(MessageResponse::new("Supplier deleted successfully"))
    }
}

fn duplicate_name(name: &str) -> AppError {
    AppError::conflict(
        "supplierName",
        format!("A supplier named \"{}\" already exists", name),
    )
}
