//! User directory

use std::sync::Arc;

use crate::error::AppResult;
use crate::models::User;
use crate::store::InventoryStore;

/// Read-only user listing
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn InventoryStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// All users ordered by id
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.store.list_users().await?)
    }
}
