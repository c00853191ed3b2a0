//! Store trait definitions
//!
//! The resource engine never talks to a database directly. It runs
//! [`QueryPlan`]s and [`CountPlan`]s through an [`EntityStore`] and performs
//! all writes through a [`StoreTransaction`] obtained from
//! [`EntityStore::begin`]. Async methods use RPITIT, so no `async_trait` is
//! needed.
//!
//! A transaction that is dropped without [`StoreTransaction::commit`] must
//! discard its changes.

use std::collections::HashMap;
use std::future::Future;

use super::error::RepositoryError;
use super::plan::{CountPlan, QueryPlan};
use crate::entity::Entity;

/// Result type for store operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Read access and transaction factory for one entity type
pub trait EntityStore<E: Entity>: Send + Sync + 'static {
    /// Transaction type produced by [`begin`](Self::begin)
    type Tx: StoreTransaction<E>;

    /// Run a data plan
    ///
    /// Returns root entities in plan order, de-duplicated when the plan is
    /// `distinct`.
    fn fetch(&self, plan: &QueryPlan) -> impl Future<Output = RepositoryResult<Vec<E>>> + Send;

    /// Run a count plan
    fn count(&self, plan: &CountPlan) -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Load committed state for the given ids, ignoring any request predicates
    ///
    /// Ids with no stored row are absent from the map.
    fn find_by_ids(
        &self,
        ids: &[E::Id],
    ) -> impl Future<Output = RepositoryResult<HashMap<E::Id, E>>> + Send;

    /// Open a transaction
    fn begin(&self) -> impl Future<Output = RepositoryResult<Self::Tx>> + Send;
}

/// Write scope for one unit of work
pub trait StoreTransaction<E: Entity>: Send {
    /// Insert or update an entity
    ///
    /// Inserts when the entity has no id or its id has no stored row, and
    /// updates otherwise. The returned value carries the store-assigned id,
    /// version and timestamps. Versioned updates whose version differs from
    /// the stored one fail with a version conflict.
    fn merge(&mut self, entity: E) -> impl Future<Output = RepositoryResult<E>> + Send;

    /// Remove an entity by id; `Ok(false)` when no such row exists
    fn remove(&mut self, id: &E::Id) -> impl Future<Output = RepositoryResult<bool>> + Send;

    /// Make every change visible atomically
    ///
    /// Re-validates the versions read by this transaction; a concurrent commit
    /// in between fails the whole transaction.
    fn commit(self) -> impl Future<Output = RepositoryResult<()>> + Send;

    /// Discard every change
    fn rollback(self) -> impl Future<Output = RepositoryResult<()>> + Send;
}
