//! Request context handed to resource operations and hooks
//!
//! [`QueryParams`] keeps every query pair in request order, so repeated
//! parameters such as `sort` survive. [`RequestContext`] adds the request
//! headers, which hooks typically use to decide login status or to scope
//! predicates to the caller.
//!
//! ```rust
//! use entity_resource::handlers::RequestContext;
//!
//! let ctx = RequestContext::new()
//!     .with_param("sort", "A|name")
//!     .with_param("sort", "D|owner.town")
//!     .with_param("count", "40")
//!     .with_header("x-user", "alice");
//!
//! assert_eq!(ctx.params.all("sort").collect::<Vec<_>>(), vec!["A|name", "D|owner.town"]);
//! assert_eq!(ctx.params.first("count"), Some("40"));
//! assert_eq!(ctx.header("x-user"), Some("alice"));
//! ```

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Ordered multimap of query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First value of `name`
    pub fn first<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        self.all(name).next()
    }

    /// Every value of `name`, in request order
    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Per-request inputs visible to resource operations and hooks
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub params: QueryParams,
    pub headers: HeaderMap,
}

impl RequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(params: QueryParams, headers: HeaderMap) -> Self {
        Self { params, headers }
    }

    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(name, value);
        self
    }

    /// Add a header; invalid names or values are ignored
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::warn!(header = name, "Ignoring invalid header"),
        }
        self
    }

    /// First value of a header, if it is valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}
