//! Options bag for paginated and sorted queries

use std::str::FromStr;

/// Default page size of trait scans
pub const DEFAULT_SCAN_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortDirection {
    type Err = std::convert::Infallible;

    /// Only `desc` (any case) sorts descending; anything else is ascending
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Descending)
        } else {
            Ok(SortDirection::Ascending)
        }
    }
}

/// Limit, offset, sort and count-only settings of one query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort: SortDirection,
    /// Select a row count instead of rows; disables ORDER/LIMIT/OFFSET
    pub count: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_sort(mut self, sort: SortDirection) -> Self {
        self.sort = sort;
        self
    }

    pub fn count_only(mut self) -> Self {
        self.count = true;
        self
    }

    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_SCAN_LIMIT)
    }

    /// `LIMIT`/`OFFSET` suffix, empty in count mode
    pub fn pagination_clause(&self) -> String {
        if self.count {
            return String::new();
        }
        match self.offset {
            Some(offset) => format!("LIMIT {} OFFSET {}", self.effective_limit(), offset),
            None => format!("LIMIT {}", self.effective_limit()),
        }
    }
}
