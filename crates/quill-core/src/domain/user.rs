use serde::{Deserialize, Serialize};

use super::UserId;

/// User entity - an author record, read-only from the store's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}
