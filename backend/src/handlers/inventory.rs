//! HTTP handlers for inventory management endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};

use super::SearchQuery;
use crate::error::AppResult;
use crate::models::{
    BlockDetails, MessageResponse, NewBlock, OneOrMany, ProcessBlocksInput, RemoveBlocksInput,
    Supplier,
};
use crate::services::InventoryService;
use crate::AppState;

/// List blocks whose type name matches the search
pub async fn list_blocks(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<Vec<BlockDetails>>> {
    let Query(query) = query?;
    let service = InventoryService::new(state.store);
    let blocks = service.list_blocks(query.term()).await?;
    Ok(Json(blocks))
}

/// Suppliers available in the block creation form
pub async fn list_supplier_options(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Supplier>>> {
    let service = InventoryService::new(state.store);
    let suppliers = service.supplier_options().await?;
    Ok(Json(suppliers))
}

/// Create blocks from a single entry or an array of entries
pub async fn create_blocks(
    State(state): State<AppState>,
    payload: Result<Json<OneOrMany<NewBlock>>, JsonRejection>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let Json(entries) = payload?;
    let service = InventoryService::new(state.store);
    let response = service.create_blocks(entries.into_vec()).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Mark blocks as processed
pub async fn process_blocks(
    State(state): State<AppState>,
    payload: Result<Json<ProcessBlocksInput>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(input) = payload?;
    let service = InventoryService::new(state.store);
    let response = service.process_blocks(input).await?;
    Ok(Json(response))
}

/// Delete blocks
pub async fn remove_blocks(
    State(state): State<AppState>,
    payload: Result<Json<RemoveBlocksInput>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(input) = payload?;
    let service = InventoryService::new(state.store);
    let response = service.remove_blocks(input).await?;
    Ok(Json(response))
}
