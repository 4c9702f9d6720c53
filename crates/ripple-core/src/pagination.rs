//! Page/limit handling shared by every listing operation.
//!
//! Query parameters arrive as raw strings; anything that is not a positive
//! integer falls back to the defaults instead of failing the request.

/// A validated page request. `page` and `limit` are always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub const DEFAULT_PAGE: u64 = 1;
    pub const DEFAULT_LIMIT: u64 = 20;

    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Parse raw query values leniently. Absent, non-numeric, negative, or
    /// zero values fall back to the defaults - a junk `?page=abc` must not
    /// fail the request.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_positive(page, Self::DEFAULT_PAGE),
            limit: parse_positive(limit, Self::DEFAULT_LIMIT),
        }
    }

    /// Number of rows to skip before this page starts.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

fn parse_positive(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}
