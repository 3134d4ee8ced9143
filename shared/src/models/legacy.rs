//! Sales, purchase and expense summaries carried over from the earlier
//! product dashboard

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub rating: Option<f64>,
    pub stock_quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub sales_summary_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_value: Decimal,
    pub change_percentage: Option<f64>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSummary {
    pub purchase_summary_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_purchased: Decimal,
    pub change_percentage: Option<f64>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub expense_summary_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expenses: Decimal,
    pub date: DateTime<Utc>,
}

/// Expense by category. `amount` travels as a string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseByCategory {
    pub expense_by_category_id: String,
    pub expense_summary_id: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub date: DateTime<Utc>,
}
