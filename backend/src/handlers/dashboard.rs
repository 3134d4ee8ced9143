//! Dashboard HTTP handler

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::models::DashboardMetrics;
use crate::services::DashboardService;
use crate::AppState;

/// Aggregated dashboard metrics
pub async fn get_dashboard_metrics(
    State(state): State<AppState>,
) -> AppResult<Json<DashboardMetrics>> {
    let service = DashboardService::new(state.store);
    let metrics = service.metrics().await?;
    Ok(Json(metrics))
}
