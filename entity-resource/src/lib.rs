//! # entity-resource
//!
//! Generic CRUD REST resources for axum services. One [`EntityResource`]
//! per entity type provides paginated and sorted listing, single fetch,
//! all-or-nothing batch save with optimistic concurrency, and single or
//! bulk delete, with every policy decision delegated to [`ResourceHooks`].
//!
//! ## Features
//!
//! - **Pagination**: `start`/`count` parameters with a configurable page-size
//!   cap, reported back in `X-Start`, `X-Count` and `X-Total-Count`
//! - **Sorting**: repeated `sort=A|owner.town` parameters over nested paths,
//!   with left-join semantics for missing parents
//! - **Batch merge**: every payload is validated and authorized before any
//!   write, and the batch commits in one transaction
//! - **Optimistic concurrency**: stale versions are rejected up front and
//!   re-checked at commit
//! - **Structured errors**: every offending item is listed in one response
//! - **Graceful shutdown**: SIGTERM and SIGINT drain in-flight requests
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use entity_resource::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let people = EntityResource::new(MemoryStore::<Person>::new(), AllowAll)
//!         .with_config(config.resource.clone());
//!
//!     let app = Router::new().nest("/people", entity_router(Arc::new(people)));
//!
//!     Server::new(config).serve(app).await
//! }
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod repository;
pub mod server;

#[cfg(test)]
mod testing;

pub use handlers::{EntityResource, ResourceHooks};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, ResourceConfig};
    pub use crate::entity::{Entity, EntityId, PersistStamp};
    pub use crate::error::{Error, Result};
    pub use crate::handlers::{
        entity_router, AllowAll, ApiError, EntityResource, ErrorDetail, RequestContext,
        ResourceHooks,
    };
    pub use crate::observability::init_tracing;
    pub use crate::repository::{
        within_transaction, EntityStore, FilterCondition, MemoryStore, QueryBuilder,
        StoreTransaction, UnitOfWork,
    };
    pub use crate::server::Server;

    pub use axum::Router;
}
