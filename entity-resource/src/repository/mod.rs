//! Persistence abstraction for entity resources
//!
//! The resource engine is written against two traits:
//!
//! - [`EntityStore`]: runs [`QueryPlan`]s and [`CountPlan`]s, loads prior
//!   state by id and opens transactions
//! - [`StoreTransaction`]: merges and removes entities, then commits or rolls
//!   back as one unit
//!
//! [`QueryBuilder`] turns predicates, [`SortSpec`]s and [`Pagination`] into
//! plans, [`within_transaction`] scopes a [`UnitOfWork`] to one transaction,
//! and [`MemoryStore`] is a complete in-process implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use entity_resource::repository::{
//!     EntityStore, FilterCondition, QueryBuilder, SortSpec,
//! };
//!
//! let builder = QueryBuilder::new()
//!     .filter(FilterCondition::eq("hometown", "Austin"))
//!     .sort(vec![SortSpec::desc("updated")]);
//! let page = store.fetch(&builder.build()).await?;
//! let total = store.count(&builder.count_plan()).await?;
//! ```

mod error;
mod memory;
mod plan;
mod query;
mod traits;
mod transaction;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use memory::{MemoryStore, MemoryTransaction};
pub use plan::{CountPlan, Join, JoinKind, OrderBy, QueryBuilder, QueryPlan, ROOT_ALIAS};
pub use query::{FilterCondition, FilterOperator, FilterValue, OrderDirection, Pagination, SortSpec};
pub use traits::{EntityStore, RepositoryResult, StoreTransaction};
pub use transaction::{within_transaction, UnitOfWork};
