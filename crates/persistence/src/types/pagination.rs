//! Offset pagination for list operations.

use serde::{Deserialize, Serialize};

/// Default number of records returned by a list operation.
pub const DEFAULT_LIMIT: usize = 10;

/// An offset/limit window over an insertion-ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Number of records to skip.
    pub offset: usize,
    /// Maximum number of records to return.
    pub limit: usize,
}

impl Pagination {
    /// Creates a window starting at `offset` holding at most `limit` records.
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Returns the window that follows this one.
    pub fn next_page(&self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            limit: self.limit,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}
