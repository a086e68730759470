//! Service Category Model

use serde::{Deserialize, Serialize};

/// Service category (队列分类)
///
/// Each walk-in customer draws a ticket against one category; the
/// category's prefix becomes part of the ticket display number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Short code used in display numbers, e.g. "A" in "A-007" (≤ 5 chars).
    /// Not unique across categories; colliding prefixes make display
    /// numbers ambiguous but are accepted as a data-entry risk.
    pub prefix: String,
    pub description: Option<String>,
    pub is_active: bool,
    /// Display order, ties broken by name
    pub sort_order: i32,
    pub created_at: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub prefix: String,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

/// Update category payload (partial, merge semantics)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub prefix: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Result of a guarded category deletion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDeleteResult {
    pub deleted: bool,
    /// Number of tickets removed by the cascade
    pub tickets_removed: u64,
}
