//! HTTP handlers for the Block Inventory Platform

pub mod block_type;
pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod supplier;
pub mod user;

pub use block_type::*;
pub use dashboard::*;
pub use health::*;
pub use inventory::*;
pub use supplier::*;
pub use user::*;

use serde::Deserialize;

/// `?search=` query shared by the listing endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

impl SearchQuery {
    pub fn term(&self) -> &str {
        self.search.as_deref().unwrap_or("")
    }
}
