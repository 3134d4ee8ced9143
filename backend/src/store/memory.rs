//! In-memory store.
//!
//! Enforces the same UNIQUE and FOREIGN KEY rules as the PostgreSQL schema so
//! services behave identically against either backend. Used by the test
//! suite and by `storage.backend = "memory"`.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{BlockFilter, BlockReference, InventoryStore, StoreError, StoreResult};
use crate::models::{
    Block, BlockDetails, BlockId, BlockType, BlockTypeInput, BlockWithType, ExpenseByCategory,
    ExpenseSummary, NewBlockRow, Product, PurchaseSummary, SalesSummary, Supplier, SupplierInput,
    User,
};

#[derive(Default)]
struct MemoryState {
    block_types: Vec<BlockType>,
    suppliers: Vec<Supplier>,
    blocks: Vec<Block>,
    products: Vec<Product>,
    sales: Vec<SalesSummary>,
    purchases: Vec<PurchaseSummary>,
    expenses: Vec<ExpenseSummary>,
    expenses_by_category: Vec<ExpenseByCategory>,
    users: Vec<User>,
    next_block_type_id: i32,
    next_supplier_id: i32,
    next_block_id: i64,
    /// Queries that report an error instead of answering
    failing: HashSet<&'static str>,
}

impl MemoryState {
    fn check(&self, query: &'static str) -> StoreResult<()> {
        if self.failing.contains(query) {
            return Err(StoreError::Unavailable(format!("{} failed", query)));
        }
        Ok(())
    }

    fn block_type(&self, id: i32) -> Option<&BlockType> {
        self.block_types.iter().find(|t| t.block_type_id == id)
    }

    fn supplier(&self, id: i32) -> Option<&Supplier> {
        self.suppliers.iter().find(|s| s.supplier_id == id)
    }

    fn with_type(&self, block: &Block) -> Option<BlockWithType> {
        Some(BlockWithType {
            block: block.clone(),
            block_type: self.block_type(block.block_type_id)?.clone(),
        })
    }

    fn details(&self, block: &Block) -> Option<BlockDetails> {
        Some(BlockDetails {
            block: block.clone(),
            block_type: self.block_type(block.block_type_id)?.clone(),
            supplier: self.supplier(block.supplier_id)?.clone(),
        })
    }

    fn references(&self, reference: BlockReference) -> i64 {
        self.blocks
            .iter()
            .filter(|b| match reference {
                BlockReference::BlockType(id) => b.block_type_id == id,
                BlockReference::Supplier(id) => b.supplier_id == id,
            })
            .count() as i64
    }
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

fn search_term(search: &str) -> Option<&str> {
    let search = search.trim();
    (!search.is_empty()).then_some(search)
}

fn newest_first<T>(mut rows: Vec<T>, date: impl Fn(&T) -> DateTime<Utc>, limit: i64) -> Vec<T> {
    rows.sort_by_key(|row| std::cmp::Reverse(date(row)));
    rows.truncate(limit.max(0) as usize);
    rows
}

/// In-memory implementation of [`InventoryStore`]
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the named trait method fail from now on
    #[cfg(test)]
    pub async fn fail_query(&self, query: &'static str) {
        self.state.write().await.failing.insert(query);
    }

    #[cfg(test)]
    pub async fn seed_products(&self, products: Vec<Product>) {
        self.state.write().await.products.extend(products);
    }

    #[cfg(test)]
    pub async fn seed_sales(&self, sales: Vec<SalesSummary>) {
        self.state.write().await.sales.extend(sales);
    }

    #[cfg(test)]
    pub async fn seed_users(&self, users: Vec<User>) {
        self.state.write().await.users.extend(users);
    }

    /// Direct access to a stored block
    #[cfg(test)]
    pub async fn block(&self, id: i64) -> Option<Block> {
        let state = self.state.read().await;
        state.blocks.iter().find(|b| b.block_id.value() == id).cloned()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.state.read().await.check("ping")
    }

    async fn list_block_types(&self, search: &str) -> StoreResult<Vec<BlockType>> {
        let state = self.state.read().await;
        state.check("list_block_types")?;
        let search = search_term(search);
        Ok(state
            .block_types
            .iter()
            .filter(|t| contains_ignore_case(&t.block_name, search))
            .cloned()
            .collect())
    }

    async fn find_block_type(&self, id: i32) -> StoreResult<Option<BlockType>> {
        let state = self.state.read().await;
        state.check("find_block_type")?;
        Ok(state.block_type(id).cloned())
    }

    async fn find_block_type_by_name(&self, name: &str) -> StoreResult<Option<BlockType>> {
        let state = self.state.read().await;
        state.check("find_block_type_by_name")?;
        Ok(state
            .block_types
            .iter()
            .find(|t| t.block_name == name)
            .cloned())
    }

    async fn insert_block_type(&self, input: &BlockTypeInput) -> StoreResult<BlockType> {
        let mut state = self.state.write().await;
        state.check("insert_block_type")?;
        if state
            .block_types
            .iter()
            .any(|t| t.block_name == input.block_name)
        {
            return Err(StoreError::UniqueViolation(
                "block_types_block_name_key".to_string(),
            ));
        }

        state.next_block_type_id += 1;
        let block_type = BlockType {
            block_type_id: state.next_block_type_id,
            block_name: input.block_name.clone(),
            density: input.density,
        };
        state.block_types.push(block_type.clone());
        Ok(block_type)
    }

    async fn update_block_type(
        &self,
        id: i32,
        input: &BlockTypeInput,
    ) -> StoreResult<Option<BlockType>> {
        let mut state = self.state.write().await;
        state.check("update_block_type")?;
        if state
            .block_types
            .iter()
            .any(|t| t.block_name == input.block_name && t.block_type_id != id)
        {
            return Err(StoreError::UniqueViolation(
                "block_types_block_name_key".to_string(),
            ));
        }

        Ok(state
            .block_types
            .iter_mut()
            .find(|t| t.block_type_id == id)
            .map(|t| {
                t.block_name = input.block_name.clone();
                t.density = input.density;
                t.clone()
            }))
    }

    async fn delete_block_type(&self, id: i32) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        state.check("delete_block_type")?;
        if state.references(BlockReference::BlockType(id)) > 0 {
            return Err(StoreError::ForeignKeyViolation(
                "blocks_block_type_id_fkey".to_string(),
            ));
        }

        let before = state.block_types.len();
        state.block_types.retain(|t| t.block_type_id != id);
        Ok(state.block_types.len() < before)
    }

    async fn list_suppliers(&self, search: &str) -> StoreResult<Vec<Supplier>> {
        let state = self.state.read().await;
        state.check("list_suppliers")?;
        let search = search_term(search);
        Ok(state
            .suppliers
            .iter()
            .filter(|s| contains_ignore_case(&s.supplier_name, search))
            .cloned()
            .collect())
    }

    async fn find_supplier(&self, id: i32) -> StoreResult<Option<Supplier>> {
        let state = self.state.read().await;
        state.check("find_supplier")?;
        Ok(state.supplier(id).cloned())
    }

    async fn find_supplier_by_name(&self, name: &str) -> StoreResult<Option<Supplier>> {
        let state = self.state.read().await;
        state.check("find_supplier_by_name")?;
        Ok(state
            .suppliers
            .iter()
            .find(|s| s.supplier_name == name)
            .cloned())
    }

    async fn insert_supplier(&self, input: &SupplierInput) -> StoreResult<Supplier> {
        let mut state = self.state.write().await;
        state.check("insert_supplier")?;
        if state
            .suppliers
            .iter()
            .any(|s| s.supplier_name == input.supplier_name)
        {
            return Err(StoreError::UniqueViolation(
                "suppliers_supplier_name_key".to_string(),
            ));
        }

        state.next_supplier_id += 1;
        let supplier = Supplier {
            supplier_id: state.next_supplier_id,
            supplier_name: input.supplier_name.clone(),
        };
        state.suppliers.push(supplier.clone());
        Ok(supplier)
    }

    async fn update_supplier(
        &self,
        id: i32,
        input: &SupplierInput,
    ) -> StoreResult<Option<Supplier>> {
        let mut state = self.state.write().await;
        state.check("update_supplier")?;
        if state
            .suppliers
            .iter()
            .any(|s| s.supplier_name == input.supplier_name && s.supplier_id != id)
        {
            return Err(StoreError::UniqueViolation(
                "suppliers_supplier_name_key".to_string(),
            ));
        }

        Ok(state
            .suppliers
            .iter_mut()
            .find(|s| s.supplier_id == id)
            .map(|s| {
                s.supplier_name = input.supplier_name.clone();
                s.clone()
            }))
    }

    async fn delete_supplier(&self, id: i32) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        state.check("delete_supplier")?;
        if state.references(BlockReference::Supplier(id)) > 0 {
            return Err(StoreError::ForeignKeyViolation(
                "blocks_supplier_id_fkey".to_string(),
            ));
        }

        let before = state.suppliers.len();
        state.suppliers.retain(|s| s.supplier_id != id);
        Ok(state.suppliers.len() < before)
    }

    async fn list_blocks(&self, filter: &BlockFilter) -> StoreResult<Vec<BlockDetails>> {
        let state = self.state.read().await;
        state.check("list_blocks")?;
        Ok(state
            .blocks
            .iter()
            .filter(|b| filter.supplier_id.map_or(true, |id| b.supplier_id == id))
            .filter_map(|b| state.details(b))
            .filter(|d| {
                contains_ignore_case(
                    &d.block_type.block_name,
                    filter.block_type_search.as_deref(),
                ) && contains_ignore_case(
                    &d.supplier.supplier_name,
                    filter.supplier_search.as_deref(),
                )
            })
            .collect())
    }

    async fn count_blocks(&self, reference: BlockReference) -> StoreResult<i64> {
        let state = self.state.read().await;
        state.check("count_blocks")?;
        Ok(state.references(reference))
    }

    async fn insert_blocks(&self, rows: &[NewBlockRow]) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        state.check("insert_blocks")?;

        // Statement semantics: one bad reference rejects the whole batch
        for row in rows {
            if state.block_type(row.block_type_id).is_none() {
                return Err(StoreError::ForeignKeyViolation(
                    "blocks_block_type_id_fkey".to_string(),
                ));
            }
            if state.supplier(row.supplier_id).is_none() {
                return Err(StoreError::ForeignKeyViolation(
                    "blocks_supplier_id_fkey".to_string(),
                ));
            }
        }

        for row in rows {
            state.next_block_id += 1;
            let block = Block {
                block_id: BlockId(state.next_block_id),
                block_type_id: row.block_type_id,
                supplier_id: row.supplier_id,
                height: row.height,
                width: row.width,
                length: row.length,
                arrival_date: row.arrival_date,
                removal_date: None,
                processed: false,
            };
            state.blocks.push(block);
        }

        Ok(rows.len() as u64)
    }

    async fn mark_blocks_processed(
        &self,
        ids: &[i64],
        removal_date: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        state.check("mark_blocks_processed")?;

        let mut matched = 0;
        for block in state
            .blocks
            .iter_mut()
            .filter(|b| ids.contains(&b.block_id.value()))
        {
            block.processed = true;
            block.removal_date = Some(removal_date);
            matched += 1;
        }
        Ok(matched)
    }

    async fn delete_blocks(&self, ids: &[i64]) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        state.check("delete_blocks")?;

        let before = state.blocks.len();
        state.blocks.retain(|b| !ids.contains(&b.block_id.value()));
        Ok((before - state.blocks.len()) as u64)
    }

    async fn latest_blocks(&self, limit: i64) -> StoreResult<Vec<BlockWithType>> {
        let state = self.state.read().await;
        state.check("latest_blocks")?;

        let mut blocks: Vec<BlockWithType> = state
            .blocks
            .iter()
            .filter_map(|b| state.with_type(b))
            .collect();
        blocks.sort_by(|a, b| {
            b.block
                .arrival_date
                .cmp(&a.block.arrival_date)
                .then(b.block.block_id.cmp(&a.block.block_id))
        });
        blocks.truncate(limit.max(0) as usize);
        Ok(blocks)
    }

    async fn blocks_in_storage_window(
        &self,
        now: DateTime<Utc>,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<BlockWithType>> {
        let state = self.state.read().await;
        state.check("blocks_in_storage_window")?;
        Ok(state
            .blocks
            .iter()
            .filter(|b| !b.processed)
            .filter(|b| b.removal_date.map_or(false, |r| r >= since) || b.arrival_date <= now)
            .filter_map(|b| state.with_type(b))
            .collect())
    }

    async fn popular_products(&self, limit: i64) -> StoreResult<Vec<Product>> {
        let state = self.state.read().await;
        state.check("popular_products")?;

        let mut products = state.products.clone();
        products.sort_by_key(|p| std::cmp::Reverse(p.stock_quantity));
        products.truncate(limit.max(0) as usize);
        Ok(products)
    }

    async fn sales_summaries(&self, limit: i64) -> StoreResult<Vec<SalesSummary>> {
        let state = self.state.read().await;
        state.check("sales_summaries")?;
        Ok(newest_first(state.sales.clone(), |s| s.date, limit))
    }

    async fn purchase_summaries(&self, limit: i64) -> StoreResult<Vec<PurchaseSummary>> {
        let state = self.state.read().await;
        state.check("purchase_summaries")?;
        Ok(newest_first(state.purchases.clone(), |p| p.date, limit))
    }

    async fn expense_summaries(&self, limit: i64) -> StoreResult<Vec<ExpenseSummary>> {
        let state = self.state.read().await;
        state.check("expense_summaries")?;
        Ok(newest_first(state.expenses.clone(), |e| e.date, limit))
    }

    async fn expenses_by_category(&self, limit: i64) -> StoreResult<Vec<ExpenseByCategory>> {
        let state = self.state.read().await;
        state.check("expenses_by_category")?;
        Ok(newest_first(
            state.expenses_by_category.clone(),
            |e| e.date,
            limit,
        ))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let state = self.state.read().await;
        state.check("list_users")?;

        let mut users = state.users.clone();
        users.sort_by_key(|u| u.user_id);
        Ok(users)
    }
}
