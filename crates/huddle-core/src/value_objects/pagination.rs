//! Pagination window for list queries

use serde::{Deserialize, Serialize};

/// Page size used when the caller does not ask for one
pub const DEFAULT_LIMIT: u32 = 50;

/// Largest page size a caller can get
pub const MAX_LIMIT: u32 = 100;

/// Limit/offset window, always within bounds once constructed via `clamped`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Pagination {
    /// Build a window from raw caller input.
    ///
    /// Unset or non-positive limits fall back to [`DEFAULT_LIMIT`], limits
    /// above [`MAX_LIMIT`] are capped, and negative offsets become zero.
    pub fn clamped(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if l > i64::from(MAX_LIMIT) => MAX_LIMIT,
            Some(l) if l > 0 => l as u32,
            _ => DEFAULT_LIMIT,
        };
        let offset = offset.unwrap_or(0).clamp(0, i64::from(u32::MAX)) as u32;

        Self { limit, offset }
    }

    /// Apply the window to an already ordered sequence
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}
