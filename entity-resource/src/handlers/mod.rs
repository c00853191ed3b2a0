//! Request handling for entity resources
//!
//! This module turns the persistence layer into a REST resource:
//!
//! - **Resource operations**: [`EntityResource`] implements list, get, batch
//!   save, delete and delete-all over any [`EntityStore`](crate::repository::EntityStore)
//! - **Policy**: [`ResourceHooks`] decides login status, visibility, and
//!   who may write or delete; [`AllowAll`] permits everything
//! - **Query parsing**: [`PageRequest`] and [`parse_sorts`] resolve the
//!   `start`, `count` and `sort` parameters
//! - **Errors**: [`ApiError`] lists every offending item and renders with the
//!   right status code
//! - **Routing**: [`entity_router`] exposes a resource over axum
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use axum::Router;
//! use entity_resource::handlers::{entity_router, AllowAll, EntityResource};
//! use entity_resource::repository::MemoryStore;
//!
//! let people = EntityResource::new(MemoryStore::<Person>::new(), AllowAll)
//!     .with_config(config.resource.clone());
//!
//! let app = Router::new().nest("/people", entity_router(Arc::new(people)));
//! ```

mod error;
mod hooks;
mod merge;
mod pagination;
mod query;
mod resource;
mod response;
mod routes;
mod sort;

pub use error::{ApiError, ApiErrorKind, ApiOperation, ErrorDetail, ErrorResponse, NUMBER_OF_ERRORS_HEADER};
pub use hooks::{AllowAll, ResourceHooks};
pub use pagination::{resolve_count, resolve_start, PageRequest};
pub use query::{QueryParams, RequestContext};
pub use resource::EntityResource;
pub use response::{ItemResponse, ListResponse, NoContent};
pub use routes::entity_router;
pub use sort::parse_sorts;
