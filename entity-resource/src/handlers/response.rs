//! Response types for resource operations
//!
//! Bodies are bare JSON: a list operation returns an array and a single
//! fetch returns the object itself. Pagination state travels in headers
//! whose names come from [`PaginationConfig`].

use axum::{
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::PaginationConfig;

use super::pagination::PageRequest;

/// Single entity response
///
/// # Example
///
/// ```rust
/// use entity_resource::handlers::ItemResponse;
///
/// let response = ItemResponse::new("data");
/// assert_eq!(response.data, "data");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ItemResponse<T> {
    pub data: T,
}

impl<T> ItemResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ItemResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.data)).into_response()
    }
}

/// One page of entities plus the pagination headers
///
/// # Example
///
/// ```rust
/// use entity_resource::config::PaginationConfig;
/// use entity_resource::handlers::{ListResponse, PageRequest};
///
/// let page = PageRequest { start: 20, count: Some(40) };
/// let response = ListResponse::new(vec![1, 2, 3], page, 100, &PaginationConfig::default());
/// assert_eq!(response.len(), 3);
/// assert_eq!(response.count, 40);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    /// Index of the first item
    pub start: u64,
    /// Requested page size, or the number of items when unlimited
    pub count: u64,
    /// Number of rows matching the request predicates
    pub total: u64,
    start_header: String,
    count_header: String,
    total_count_header: String,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>, page: PageRequest, total: u64, config: &PaginationConfig) -> Self {
        let count = page.count.unwrap_or(items.len() as u64);
        Self {
            items,
            start: page.start,
            count,
            total,
            start_header: config.start_header.clone(),
            count_header: config.count_header.clone(),
            total_count_header: config.total_count_header.clone(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (&self.start_header, self.start),
            (&self.count_header, self.count),
            (&self.total_count_header, self.total),
        ] {
            match HeaderName::try_from(name.as_str()) {
                Ok(name) => {
                    headers.insert(name, HeaderValue::from(value));
                }
                Err(e) => tracing::warn!(header = %name, error = %e, "Skipping invalid pagination header"),
            }
        }
        headers
    }
}

impl<T: Serialize> IntoResponse for ListResponse<T> {
    fn into_response(self) -> Response {
        let headers = self.headers();
        (StatusCode::OK, headers, Json(self.items)).into_response()
    }
}

/// Empty 204 response for deletes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}
