//! Offset/limit pagination shared by the store and the query layer.

/// Limit applied when a caller omits one or passes a non-positive value.
pub const DEFAULT_LIMIT: usize = 10;

/// A normalized page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    /// Creates a page with explicit, already-validated bounds.
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Builds a page from raw client input.
    ///
    /// A missing or non-positive `limit` becomes [`DEFAULT_LIMIT`]; a missing
    /// or negative `offset` becomes 0.
    pub fn from_params(limit: Option<i32>, offset: Option<i32>) -> Self {
        let limit = match limit {
            Some(l) if l > 0 => l as usize,
            _ => DEFAULT_LIMIT,
        };
        let offset = match offset {
            Some(o) if o >= 0 => o as usize,
            _ => 0,
        };
        Self { limit, offset }
    }

    /// Cuts the window out of `items`.
    ///
    /// An offset past the end yields an empty vector; a window running past
    /// the end is truncated to the available tail.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        if self.offset > items.len() {
            return Vec::new();
        }
        items
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}
