//! Read-side query primitives shared by the persistence gateway.

use serde::{Deserialize, Serialize};

/// Pagination parameters for ordered scans.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    /// Offset into the ordered result set (0-based).
    pub offset: u32,
    /// Maximum number of rows to return.
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 100,
        }
    }
}

impl Pagination {
    pub fn new(offset: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            offset: offset.unwrap_or(0),
            // Cap at 1000 for safety
            limit: limit.unwrap_or(100).min(1000),
        }
    }
}

/// Scan direction over creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}
