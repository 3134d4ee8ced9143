//! User models

use serde::{Deserialize, Serialize};

/// A user account. Credentials are never part of the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: i32,
    pub name: String,
    pub email: String,
}
