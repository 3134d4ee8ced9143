//! Block type HTTP handlers

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
use crate::models::{BlockType, BlockTypeInput, BlockTypeSummary, MessageResponse};
use crate::services::BlockTypeService;
use crate::AppState;

/// List block types with their block counts
pub async fn list_block_types(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<Vec<BlockTypeSummary>>> {
    let Query(query) = query?;
    let service = BlockTypeService::new(state.store);
    let block_types = service.list_with_counts(query.term()).await?;
    Ok(Json(block_types))
}

/// Create a block type
pub async fn create_block_type(
    State(state): State<AppState>,
    payload: Result<Json<BlockTypeInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<BlockType>)> {
    let Json(input) = payload?;
    let service = BlockTypeService::new(state.store);
    let block_type = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(block_type)))
}

/// Replace a block type's name and density
pub async fn update_block_type(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<BlockTypeInput>, JsonRejection>,
) -> AppResult<Json<BlockType>> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let service = BlockTypeService::new(state.store);
    let block_type = service.update(id, input).await?;
    Ok(Json(block_type))
}

/// Delete an unreferenced block type
pub async fn delete_block_type(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Path(id) = id?;
    let service = BlockTypeService::new(state.store);
    let response = service.delete(id).await?;
    Ok(Json(response))
}
