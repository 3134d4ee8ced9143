//! Dashboard metrics aggregation

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::error::AppResult;
use crate::models::{storage_overview, DashboardMetrics, STORAGE_WINDOW_DAYS};
use crate::store::{InventoryStore, StoreResult};

const LATEST_BLOCKS_LIMIT: i64 = 10;
const POPULAR_PRODUCTS_LIMIT: i64 = 15;
const SUMMARY_LIMIT: i64 = 5;

/// Dashboard service combining block and legacy summary queries
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn InventoryStore>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Collect all dashboard sections concurrently.
    ///
    /// A failing section is logged and returned empty; the others are
    /// unaffected.
    pub async fn metrics(&self) -> AppResult<DashboardMetrics> {
        let now = Utc::now();
        let since = now - Duration::days(STORAGE_WINDOW_DAYS);
        let store = &self.store;

        let (latest, in_storage, products, sales, purchases, expenses, by_category) = tokio::join!(
            store.latest_blocks(LATEST_BLOCKS_LIMIT),
            store.blocks_in_storage_window(now, since),
            store.popular_products(POPULAR_PRODUCTS_LIMIT),
            store.sales_summaries(SUMMARY_LIMIT),
            store.purchase_summaries(SUMMARY_LIMIT),
            store.expense_summaries(SUMMARY_LIMIT),
            store.expenses_by_category(SUMMARY_LIMIT),
        );

        let blocks_added_ever = or_empty("blocksAddedEver", in_storage);
        let storage_overview = storage_overview(&blocks_added_ever, now);

        Ok(DashboardMetrics {
            latest_blocks_added: or_empty("latestBlocksAdded", latest),
            blocks_added_ever,
            popular_products: or_empty("popularProducts", products),
            sales_summary: or_empty("salesSummary", sales),
            purchase_summary: or_empty("purchaseSummary", purchases),
            expense_summary: or_empty("expenseSummary", expenses),
            expense_by_category_summary: or_empty("expenseByCategorySummary", by_category),
            storage_overview,
        })
    }
}

fn or_empty<T>(section: &'static str, result: StoreResult<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|err| {
        tracing::error!(section, error = %err, "Dashboard query failed");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Product, SalesSummary};
    use crate::services::test_support::seeded_store;
    use rust_decimal::Decimal;

    fn product(id: &str, stock_quantity: i32) -> Product {
        Product {
            product_id: id.to_string(),
            name: format!("Product {}", id),
            price: Decimal::new(1999, 2),
            rating: Some(4.5),
            stock_quantity,
        }
    }

    #[tokio::test]
    async fn test_metrics_collects_all_sections() {
        let seeded = seeded_store().await;
        seeded
            .store
            .seed_products(vec![product("a", 3), product("b", 40), product("c", 12)])
            .await;
        seeded
            .store
            .seed_sales(vec![SalesSummary {
                sales_summary_id: "s1".to_string(),
                total_value: Decimal::new(125000, 2),
                change_percentage: Some(4.2),
                date: Utc::now(),
            }])
            .await;

        let metrics = DashboardService::new(seeded.store.clone())
            .metrics()
            .await
            .unwrap();

        assert_eq!(metrics.latest_blocks_added.len(), 4);
        // The processed block is excluded
        assert_eq!(metrics.blocks_added_ever.len(), 3);
        assert_eq!(
            metrics
                .popular_products
                .iter()
                .map(|p| p.stock_quantity)
                .collect::<Vec<_>>(),
            vec![40, 12, 3]
        );
        assert_eq!(metrics.sales_summary.len(), 1);
        assert_eq!(metrics.storage_overview.total_volume, 3.0 * 6_000_000.0);
        assert_eq!(metrics.storage_overview.volume_by_day.len(), 7);
    }

    #[tokio::test]
    async fn test_failed_section_degrades_to_empty() {
        let seeded = seeded_store().await;
        seeded.store.seed_products(vec![product("a", 3)]).await;
        seeded.store.fail_query("popular_products").await;

        let metrics = DashboardService::new(seeded.store.clone())
            .metrics()
            .await
            .unwrap();

        assert!(metrics.popular_products.is_empty());
        assert_eq!(metrics.latest_blocks_added.len(), 4);
        assert_eq!(metrics.blocks_added_ever.len(), 3);
    }

    #[tokio::test]
    async fn test_latest_blocks_limited_to_ten() {
        let seeded = seeded_store().await;
        let rows: Vec<_> = (0..12)
            .map(|_| crate::models::NewBlockRow {
                block_type_id: seeded.marble_id,
                supplier_id: seeded.alpine_id,
                height: 10.0,
                width: 10.0,
                length: 10.0,
                arrival_date: Utc::now(),
            })
            .collect();
        seeded.store.insert_blocks(&rows).await.unwrap();

        let metrics = DashboardService::new(seeded.store.clone())
            .metrics()
            .await
            .unwrap();

        assert_eq!(metrics.latest_blocks_added.len(), 10);
        assert!(metrics
            .latest_blocks_added
            .iter()
            .all(|b| b.block_type.block_name == "Marble"));
    }
}
