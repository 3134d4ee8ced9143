//! Dashboard models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    BlockWithType, ExpenseByCategory, ExpenseSummary, Product, PurchaseSummary, SalesSummary,
};

/// Everything the dashboard screen renders in one response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub latest_blocks_added: Vec<BlockWithType>,
    pub blocks_added_ever: Vec<BlockWithType>,
    pub popular_products: Vec<Product>,
    pub sales_summary: Vec<SalesSummary>,
    pub purchase_summary: Vec<PurchaseSummary>,
    pub expense_summary: Vec<ExpenseSummary>,
    pub expense_by_category_summary: Vec<ExpenseByCategory>,
    pub storage_overview: StorageOverview,
}

/// Volume in storage on one calendar day (UTC)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyVolume {
    pub date: NaiveDate,
    /// Cubic millimetres
    pub volume: f64,
}

/// Storage volume card: today's total, the 7-day series and the change
/// against the oldest day of the series
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageOverview {
    pub total_volume: f64,
    pub volume_by_day: Vec<DailyVolume>,
    pub change_percentage: f64,
}
