//! Newsroom domain model.
//!
//! # Invariants
//! - `address` is unique across newsrooms; the store never changes its case.
//! - Articles are not a field: they are resolved by matching
//!   `Article::newsroom_address` against `address`.

use serde::{Deserialize, Serialize};

/// Store-assigned surrogate key. `0` is reserved for "not persisted".
pub type NewsroomId = i64;

/// Flags controlling downstream indexing and claim behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsroomMeta {
    pub index: bool,
    pub claim: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Newsroom {
    pub id: NewsroomId,
    /// Display name, not unique.
    pub name: String,
    /// Unique identifier such as a ledger contract address.
    pub address: String,
    pub meta: Option<NewsroomMeta>,
}

impl Newsroom {
    /// Creates an unpersisted newsroom without meta flags.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            address: address.into(),
            meta: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }
}
