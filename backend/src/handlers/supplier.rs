//! Supplier HTTP handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use super::SearchQuery;
use crate::error::AppResult;
use crate::models::{BlockDetails, MessageResponse, Supplier, SupplierInput, SupplierSummary};
use crate::services::SupplierService;
use crate::AppState;

/// List suppliers with their block counts
pub async fn list_suppliers(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<Vec<SupplierSummary>>> {
    let Query(query) = query?;
    let service = SupplierService::new(state.store);
    let suppliers = service.list_with_counts(query.term()).await?;
    Ok(Json(suppliers))
}

/// Blocks delivered by one supplier
pub async fn list_supplier_blocks(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<Vec<BlockDetails>>> {
    let Path(id) = id?;
    let Query(query) = query?;
    let service = SupplierService::new(state.store);
    let blocks = service.blocks_for_supplier(id, query.term()).await?;
    Ok(Json(blocks))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    payload: Result<Json<SupplierInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    let Json(input) = payload?;
    let service = SupplierService::new(state.store);
    let supplier = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<SupplierInput>, JsonRejection>,
) -> AppResult<Json<Supplier>> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let service = SupplierService::new(state.store);
    let supplier = service.update(id, input).await?;
    Ok(Json(supplier))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Path(id) = id?;
    let service = SupplierService::new(state.store);
    let response = service.delete(id).await?;
    Ok(Json(response))
}
