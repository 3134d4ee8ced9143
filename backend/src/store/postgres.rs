//! PostgreSQL store backed by a sqlx connection pool

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};

use super::{BlockFilter, BlockReference, InventoryStore, StoreResult};
use crate::config::DatabaseConfig;
use crate::models::{
    Block, BlockDetails, BlockId, BlockType, BlockTypeInput, BlockWithType, ExpenseByCategory,
    ExpenseSummary, NewBlockRow, Product, PurchaseSummary, SalesSummary, Supplier, SupplierInput,
    User,
};

/// Columns selected for every joined block query
const BLOCK_COLUMNS: &str = r#"
    b.block_id, b.block_type_id, b.supplier_id, b.height, b.width, b.length,
    b.arrival_date, b.removal_date, b.processed,
    bt.block_name, bt.density, s.supplier_name
"#;

const BLOCK_JOINS: &str = r#"
    FROM blocks b
    JOIN block_types bt ON bt.block_type_id = b.block_type_id
    JOIN suppliers s ON s.supplier_id = b.supplier_id
"#;

/// PostgreSQL implementation of [`InventoryStore`]
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

/// Row for joined block queries
#[derive(Debug, FromRow)]
struct BlockRow {
    block_id: i64,
    block_type_id: i32,
    supplier_id: i32,
    height: f64,
    width: f64,
    length: f64,
    arrival_date: DateTime<Utc>,
    removal_date: Option<DateTime<Utc>>,
    processed: bool,
    block_name: String,
    density: f64,
    supplier_name: String,
}

impl BlockRow {
    fn block(&self) -> Block {
        Block {
            block_id: BlockId(self.block_id),
            block_type_id: self.block_type_id,
            supplier_id: self.supplier_id,
            height: self.height,
            width: self.width,
            length: self.length,
            arrival_date: self.arrival_date,
            removal_date: self.removal_date,
            processed: self.processed,
        }
    }

    fn block_type(&self) -> BlockType {
        BlockType {
            block_type_id: self.block_type_id,
            block_name: self.block_name.clone(),
            density: self.density,
        }
    }
}

impl From<BlockRow> for BlockDetails {
    fn from(row: BlockRow) -> Self {
        BlockDetails {
            block: row.block(),
            block_type: row.block_type(),
            supplier: Supplier {
                supplier_id: row.supplier_id,
                supplier_name: row.supplier_name,
            },
        }
    }
}

impl From<BlockRow> for BlockWithType {
    fn from(row: BlockRow) -> Self {
        BlockWithType {
            block: row.block(),
            block_type: row.block_type(),
        }
    }
}

#[derive(Debug, FromRow)]
struct BlockTypeRow {
    block_type_id: i32,
    block_name: String,
    density: f64,
}

impl From<BlockTypeRow> for BlockType {
    fn from(row: BlockTypeRow) -> Self {
        BlockType {
            block_type_id: row.block_type_id,
            block_name: row.block_name,
            density: row.density,
        }
    }
}

#[derive(Debug, FromRow)]
struct SupplierRow {
    supplier_id: i32,
    supplier_name: String,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            supplier_id: row.supplier_id,
            supplier_name: row.supplier_name,
        }
    }
}

/// `%search%` ILIKE pattern with wildcards in the search escaped.
/// Blank searches match everything.
fn like_pattern(search: &str) -> Option<String> {
    let search = search.trim();
    if search.is_empty() {
        return None;
    }
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped))
}

impl PgStore {
    /// Create a store over an existing pool
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Open a connection pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;
        Ok(Self::new(db))
    }

    /// Apply the embedded migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        Ok(())
    }

    async fn fetch_blocks(
        &self,
        where_clause: &str,
        order_clause: &str,
        filter: &BlockFilter,
    ) -> StoreResult<Vec<BlockRow>> {
        let query = format!(
            "SELECT {} {} {} {}",
            BLOCK_COLUMNS, BLOCK_JOINS, where_clause, order_clause
        );

        let rows = sqlx::query_as::<_, BlockRow>(&query)
            .bind(filter.block_type_search.as_deref().and_then(like_pattern))
            .bind(filter.supplier_search.as_deref().and_then(like_pattern))
            .bind(filter.supplier_id)
            .fetch_all(&self.db)
            .await?;

        Ok(rows)
    }
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn list_block_types(&self, search: &str) -> StoreResult<Vec<BlockType>> {
        let rows = sqlx::query_as::<_, BlockTypeRow>(
            r#"
            SELECT block_type_id, block_name, density
            FROM block_types
            WHERE ($1::text IS NULL OR block_name ILIKE $1)
            ORDER BY block_type_id
            "#,
        )
        .bind(like_pattern(search))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(BlockType::from).collect())
    }

    async fn find_block_type(&self, id: i32) -> StoreResult<Option<BlockType>> {
        let row = sqlx::query_as::<_, BlockTypeRow>(
            "SELECT block_type_id, block_name, density FROM block_types WHERE block_type_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(BlockType::from))
    }

    async fn find_block_type_by_name(&self, name: &str) -> StoreResult<Option<BlockType>> {
        let row = sqlx::query_as::<_, BlockTypeRow>(
            "SELECT block_type_id, block_name, density FROM block_types WHERE block_name = $1",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(BlockType::from))
    }

    async fn insert_block_type(&self, input: &BlockTypeInput) -> StoreResult<BlockType> {
        let row = sqlx::query_as::<_, BlockTypeRow>(
            r#"
            INSERT INTO block_types (block_name, density)
            VALUES ($1, $2)
            RETURNING block_type_id, block_name, density
            "#,
        )
        .bind(&input.block_name)
        .bind(input.density)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn update_block_type(
        &self,
        id: i32,
        input: &BlockTypeInput,
    ) -> StoreResult<Option<BlockType>> {
        let row = sqlx::query_as::<_, BlockTypeRow>(
            r#"
            UPDATE block_types
            SET block_name = $2, density = $3
            WHERE block_type_id = $1
            RETURNING block_type_id, block_name, density
            "#,
        )
        .bind(id)
        .bind(&input.block_name)
        .bind(input.density)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(BlockType::from))
    }

    async fn delete_block_type(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM block_types WHERE block_type_id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_suppliers(&self, search: &str) -> StoreResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(
            r#"
            SELECT supplier_id, supplier_name
            FROM suppliers
            WHERE ($1::text IS NULL OR supplier_name ILIKE $1)
            ORDER BY supplier_id
            "#,
        )
        .bind(like_pattern(search))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    async fn find_supplier(&self, id: i32) -> StoreResult<Option<Supplier>> {
        let row = sqlx::query_as::<_, SupplierRow>(
            "SELECT supplier_id, supplier_name FROM suppliers WHERE supplier_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Supplier::from))
    }

    async fn find_supplier_by_name(&self, name: &str) -> StoreResult<Option<Supplier>> {
        let row = sqlx::query_as::<_, SupplierRow>(
            "SELECT supplier_id, supplier_name FROM suppliers WHERE supplier_name = $1",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Supplier::from))
    }

    async fn insert_supplier(&self, input: &SupplierInput) -> StoreResult<Supplier> {
        let row = sqlx::query_as::<_, SupplierRow>(
            r#"
            INSERT INTO suppliers (supplier_name)
            VALUES ($1)
            RETURNING supplier_id, supplier_name
            "#,
        )
        .bind(&input.supplier_name)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn update_supplier(
        &self,
        id: i32,
        input: &SupplierInput,
    ) -> StoreResult<Option<Supplier>> {
        let row = sqlx::query_as::<_, SupplierRow>(
            r#"
            UPDATE suppliers
            SET supplier_name = $2
            WHERE supplier_id = $1
            RETURNING supplier_id, supplier_name
            "#,
        )
        .bind(id)
        .bind(&input.supplier_name)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Supplier::from))
    }

    async fn delete_supplier(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM suppliers WHERE supplier_id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_blocks(&self, filter: &BlockFilter) -> StoreResult<Vec<BlockDetails>> {
        let rows = self
            .fetch_blocks(
                r#"
                WHERE ($1::text IS NULL OR bt.block_name ILIKE $1)
                  AND ($2::text IS NULL OR s.supplier_name ILIKE $2)
                  AND ($3::int4 IS NULL OR b.supplier_id = $3)
                "#,
                "ORDER BY b.block_id",
                filter,
            )
            .await?;

        Ok(rows.into_iter().map(BlockDetails::from).collect())
    }

    async fn count_blocks(&self, reference: BlockReference) -> StoreResult<i64> {
        let (query, id) = match reference {
            BlockReference::BlockType(id) => {
                ("SELECT COUNT(*) FROM blocks WHERE block_type_id = $1", id)
            }
            BlockReference::Supplier(id) => {
                ("SELECT COUNT(*) FROM blocks WHERE supplier_id = $1", id)
            }
        };

        let count = sqlx::query_scalar::<_, i64>(query)
            .bind(id)
            .fetch_one(&self.db)
            .await?;

        Ok(count)
    }

    async fn insert_blocks(&self, rows: &[NewBlockRow]) -> StoreResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let block_type_ids: Vec<i32> = rows.iter().map(|r| r.block_type_id).collect();
        let supplier_ids: Vec<i32> = rows.iter().map(|r| r.supplier_id).collect();
        let heights: Vec<f64> = rows.iter().map(|r| r.height).collect();
        let widths: Vec<f64> = rows.iter().map(|r| r.width).collect();
        let lengths: Vec<f64> = rows.iter().map(|r| r.length).collect();
        let arrival_dates: Vec<DateTime<Utc>> = rows.iter().map(|r| r.arrival_date).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO blocks (block_type_id, supplier_id, height, width, length, arrival_date)
            SELECT * FROM UNNEST($1::int4[], $2::int4[], $3::float8[], $4::float8[], $5::float8[], $6::timestamptz[])
            "#,
        )
        .bind(block_type_ids)
        .bind(supplier_ids)
        .bind(heights)
        .bind(widths)
        .bind(lengths)
        .bind(arrival_dates)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }

    async fn mark_blocks_processed(
        &self,
        ids: &[i64],
        removal_date: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE blocks
            SET processed = TRUE, removal_date = $2
            WHERE block_id = ANY($1)
            "#,
        )
        .bind(ids)
        .bind(removal_date)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_blocks(&self, ids: &[i64]) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM blocks WHERE block_id = ANY($1)")
            .bind(ids)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    async fn latest_blocks(&self, limit: i64) -> StoreResult<Vec<BlockWithType>> {
        let query = format!(
            "SELECT {} {} ORDER BY b.arrival_date DESC, b.block_id DESC LIMIT $1",
            BLOCK_COLUMNS, BLOCK_JOINS
        );

        let rows = sqlx::query_as::<_, BlockRow>(&query)
            .bind(limit)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(BlockWithType::from).collect())
    }

    async fn blocks_in_storage_window(
        &self,
        now: DateTime<Utc>,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<BlockWithType>> {
        let query = format!(
            r#"
            SELECT {} {}
            WHERE b.processed = FALSE
              AND (b.removal_date >= $2 OR b.arrival_date <= $1)
            ORDER BY b.block_id
            "#,
            BLOCK_COLUMNS, BLOCK_JOINS
        );

        let rows = sqlx::query_as::<_, BlockRow>(&query)
            .bind(now)
            .bind(since)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(BlockWithType::from).collect())
    }

    async fn popular_products(&self, limit: i64) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, (String, String, Decimal, Option<f64>, i32)>(
            r#"
            SELECT product_id, name, price, rating, stock_quantity
            FROM products
            ORDER BY stock_quantity DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(product_id, name, price, rating, stock_quantity)| Product {
                product_id,
                name,
                price,
                rating,
                stock_quantity,
            })
            .collect())
    }

    async fn sales_summaries(&self, limit: i64) -> StoreResult<Vec<SalesSummary>> {
        let rows = sqlx::query_as::<_, (String, Decimal, Option<f64>, DateTime<Utc>)>(
            r#"
            SELECT sales_summary_id, total_value, change_percentage, date
            FROM sales_summary
            ORDER BY date DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(sales_summary_id, total_value, change_percentage, date)| SalesSummary {
                sales_summary_id,
                total_value,
                change_percentage,
                date,
            })
            .collect())
    }

    async fn purchase_summaries(&self, limit: i64) -> StoreResult<Vec<PurchaseSummary>> {
        let rows = sqlx::query_as::<_, (String, Decimal, Option<f64>, DateTime<Utc>)>(
            r#"
            SELECT purchase_summary_id, total_purchased, change_percentage, date
            FROM purchase_summary
            ORDER BY date DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(purchase_summary_id, total_purchased, change_percentage, date)| PurchaseSummary {
                    purchase_summary_id,
                    total_purchased,
                    change_percentage,
                    date,
                },
            )
            .collect())
    }

    async fn expense_summaries(&self, limit: i64) -> StoreResult<Vec<ExpenseSummary>> {
        let rows = sqlx::query_as::<_, (String, Decimal, DateTime<Utc>)>(
            r#"
            SELECT expense_summary_id, total_expenses, date
            FROM expense_summary
            ORDER BY date DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(expense_summary_id, total_expenses, date)| ExpenseSummary {
                expense_summary_id,
                total_expenses,
                date,
            })
            .collect())
    }

    async fn expenses_by_category(&self, limit: i64) -> StoreResult<Vec<ExpenseByCategory>> {
        let rows = sqlx::query_as::<_, (String, String, String, Decimal, DateTime<Utc>)>(
            r#"
            SELECT expense_by_category_id, expense_summary_id, category, amount, date
            FROM expense_by_category
            ORDER BY date DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(expense_by_category_id, expense_summary_id, category, amount, date)| {
                    ExpenseByCategory {
                        expense_by_category_id,
                        expense_summary_id,
                        category,
                        amount,
                        date,
                    }
                },
            )
            .collect())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, (i32, String, String)>(
            "SELECT user_id, name, email FROM users ORDER BY user_id",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, name, email)| User {
                user_id,
                name,
                email,
            })
            .collect())
    }
}
