//! User HTTP handlers

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::models::User;
use crate::services::UserService;
use crate::AppState;

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let service = UserService::new(state.store);
    let users = service.list_users().await?;
    Ok(Json(users))
}
