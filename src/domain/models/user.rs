use serde::{Deserialize, Serialize};

/// A directory record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

impl User {
    /// Build the canonical record for `id`: `User{id}`.
    pub fn numbered(id: u64) -> Self {
        Self {
            id,
            name: format!("User{id}"),
        }
    }
}
