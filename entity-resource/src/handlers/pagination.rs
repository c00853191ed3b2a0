//! Pagination policy
//!
//! Resolves the raw `start` and `count` query values into an offset and an
//! optional limit. Malformed values never fail a request: a bad `start`
//! becomes 0 and a bad `count` is treated as absent, both with a warning.
//!
//! ```rust
//! use entity_resource::handlers::PageRequest;
//!
//! let page = PageRequest::resolve(Some("20"), Some("1000"), Some(500));
//! assert_eq!(page.start, 20);
//! assert_eq!(page.count, Some(500));
//!
//! let page = PageRequest::resolve(Some("-4"), None, None);
//! assert_eq!(page.start, 0);
//! assert_eq!(page.count, None);
//! ```

use crate::config::PaginationConfig;
use crate::repository::Pagination;

use super::query::QueryParams;

/// Resolved first index and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageRequest {
    pub start: u64,
    /// `None` means unlimited
    pub count: Option<u64>,
}

impl PageRequest {
    /// Resolve raw query values against an optional page-size cap
    pub fn resolve(start: Option<&str>, count: Option<&str>, max_per_page: Option<u64>) -> Self {
        Self {
            start: resolve_start(start),
            count: resolve_count(count, max_per_page),
        }
    }

    /// Read the configured start/count parameters from a request
    pub fn from_params(params: &QueryParams, config: &PaginationConfig) -> Self {
        Self::resolve(
            params.first(&config.start_parameter),
            params.first(&config.count_parameter),
            config.max_per_page,
        )
    }

    pub fn to_pagination(self) -> Pagination {
        Pagination::new(self.start, self.count)
    }
}

fn parse(name: &str, raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(parameter = name, value = raw, error = %e, "Ignoring unparsable pagination parameter");
            None
        }
    }
}

/// Parsed start, or 0 when absent, unparsable or negative
pub fn resolve_start(raw: Option<&str>) -> u64 {
    raw.and_then(|raw| parse("start", raw))
        .map_or(0, |start| u64::try_from(start).unwrap_or(0))
}

/// Parsed count clamped to `[0, max]`, or `max` when absent or unparsable
pub fn resolve_count(raw: Option<&str>, max_per_page: Option<u64>) -> Option<u64> {
    let Some(requested) = raw.and_then(|raw| parse("count", raw)) else {
        return max_per_page;
    };

    let requested = u64::try_from(requested).unwrap_or(0);
    Some(match max_per_page {
        Some(max) => requested.min(max),
        None => requested,
    })
}
