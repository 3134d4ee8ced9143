//! Store abstraction for block inventory data.
//!
//! Services receive an `Arc<dyn InventoryStore>` instead of reaching for a
//! global connection, so the PostgreSQL store and the in-memory store are
//! interchangeable.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    BlockDetails, BlockType, BlockTypeInput, BlockWithType, ExpenseByCategory, ExpenseSummary,
    NewBlockRow, Product, PurchaseSummary, SalesSummary, Supplier, SupplierInput, User,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    /// A UNIQUE constraint rejected the write
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A FOREIGN KEY constraint rejected the write
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            match db_err.code().as_deref() {
                Some("23505") => return StoreError::UniqueViolation(constraint),
                Some("23503") => return StoreError::ForeignKeyViolation(constraint),
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Which blocks a listing should return
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockFilter {
    /// Case-insensitive substring of the block type name
    pub block_type_search: Option<String>,
    /// Case-insensitive substring of the supplier name
    pub supplier_search: Option<String>,
    pub supplier_id: Option<i32>,
}

impl BlockFilter {
    pub fn by_block_type_name(search: &str) -> Self {
        Self {
            block_type_search: non_empty(search),
            ..Self::default()
        }
    }

    pub fn by_supplier_name(search: &str) -> Self {
        Self {
            supplier_search: non_empty(search),
            ..Self::default()
        }
    }

    pub fn for_supplier(supplier_id: i32, block_type_search: &str) -> Self {
        Self {
            block_type_search: non_empty(block_type_search),
            supplier_id: Some(supplier_id),
            ..Self::default()
        }
    }
}

fn non_empty(search: &str) -> Option<String> {
    let search = search.trim();
    (!search.is_empty()).then(|| search.to_string())
}

/// Entity a block can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReference {
    BlockType(i32),
    Supplier(i32),
}

/// Storage backend trait for inventory data.
///
/// Listing methods return rows in store order (ascending id); callers do
/// not sort.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Check connectivity
    async fn ping(&self) -> StoreResult<()>;

    // Block types

    /// Block types whose name contains `search` (case-insensitive)
    async fn list_block_types(&self, search: &str) -> StoreResult<Vec<BlockType>>;

    async fn find_block_type(&self, id: i32) -> StoreResult<Option<BlockType>>;

    async fn find_block_type_by_name(&self, name: &str) -> StoreResult<Option<BlockType>>;

    async fn insert_block_type(&self, input: &BlockTypeInput) -> StoreResult<BlockType>;

    /// Replace all fields; `None` when the id does not exist
    async fn update_block_type(
        &self,
        id: i32,
        input: &BlockTypeInput,
    ) -> StoreResult<Option<BlockType>>;

    /// Returns false when the id does not exist
    async fn delete_block_type(&self, id: i32) -> StoreResult<bool>;

    // Suppliers

    /// Suppliers whose name contains `search` (case-insensitive)
    async fn list_suppliers(&self, search: &str) -> StoreResult<Vec<Supplier>>;

    async fn find_supplier(&self, id: i32) -> StoreResult<Option<Supplier>>;

    async fn find_supplier_by_name(&self, name: &str) -> StoreResult<Option<Supplier>>;

    async fn insert_supplier(&self, input: &SupplierInput) -> StoreResult<Supplier>;

    async fn update_supplier(&self, id: i32, input: &SupplierInput)
        -> StoreResult<Option<Supplier>>;

    async fn delete_supplier(&self, id: i32) -> StoreResult<bool>;

    // Blocks

    /// Blocks with type and supplier joined
    async fn list_blocks(&self, filter: &BlockFilter) -> StoreResult<Vec<BlockDetails>>;

    /// Number of blocks (processed or not) referencing the entity
    async fn count_blocks(&self, reference: BlockReference) -> StoreResult<i64>;

    /// Insert all rows in one statement, returning the number inserted
    async fn insert_blocks(&self, rows: &[NewBlockRow]) -> StoreResult<u64>;

    /// Set processed and the removal date on matching ids, returning the
    /// number of rows matched
    async fn mark_blocks_processed(
        &self,
        ids: &[i64],
        removal_date: DateTime<Utc>,
    ) -> StoreResult<u64>;

    /// Delete matching ids, returning the number deleted
    async fn delete_blocks(&self, ids: &[i64]) -> StoreResult<u64>;

    /// Most recently arrived blocks, newest first
    async fn latest_blocks(&self, limit: i64) -> StoreResult<Vec<BlockWithType>>;

    /// Unprocessed blocks that were removed since `since` or arrived by `now`
    async fn blocks_in_storage_window(
        &self,
        now: DateTime<Utc>,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<BlockWithType>>;

    // Legacy dashboard tables

    /// Products ordered by stock quantity, highest first
    async fn popular_products(&self, limit: i64) -> StoreResult<Vec<Product>>;

    /// Most recent entries first for the summary tables below
    async fn sales_summaries(&self, limit: i64) -> StoreResult<Vec<SalesSummary>>;

    async fn purchase_summaries(&self, limit: i64) -> StoreResult<Vec<PurchaseSummary>>;

    async fn expense_summaries(&self, limit: i64) -> StoreResult<Vec<ExpenseSummary>>;

    async fn expenses_by_category(&self, limit: i64) -> StoreResult<Vec<ExpenseByCategory>>;

    // Users

    async fn list_users(&self) -> StoreResult<Vec<User>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_ignores_blank_search() {
        assert_eq!(BlockFilter::by_block_type_name("   "), BlockFilter::default());
        assert_eq!(
            BlockFilter::by_supplier_name(" nordic ").supplier_search.as_deref(),
            Some("nordic")
        );
    }

    #[test]
    fn test_filter_for_supplier() {
        let filter = BlockFilter::for_supplier(4, "gran");
        assert_eq!(filter.supplier_id, Some(4));
        assert_eq!(filter.block_type_search.as_deref(), Some("gran"));
    }
}
