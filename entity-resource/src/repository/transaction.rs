//! Scoped transactions
//!
//! [`within_transaction`] opens a transaction, hands it to a [`UnitOfWork`],
//! and then either commits (work succeeded) or rolls back (work failed). The
//! work's error is always returned to the caller, even when the rollback
//! itself fails. If the surrounding future is dropped midway, the transaction
//! is dropped uncommitted and the store discards its changes.

use std::future::Future;

use super::error::RepositoryError;
use super::traits::{EntityStore, StoreTransaction};
use crate::entity::Entity;

/// Work performed against an open transaction
///
/// ```rust
/// use entity_resource::entity::Entity;
/// use entity_resource::repository::{RepositoryError, StoreTransaction, UnitOfWork};
///
/// struct RemoveOne<E: Entity>(E::Id);
///
/// impl<E, Tx> UnitOfWork<E, Tx> for RemoveOne<E>
/// where
///     E: Entity,
///     Tx: StoreTransaction<E>,
/// {
///     type Output = bool;
///     type Error = RepositoryError;
///
///     async fn run(self, tx: &mut Tx) -> Result<bool, RepositoryError> {
///         tx.remove(&self.0).await
///     }
/// }
/// ```
pub trait UnitOfWork<E: Entity, Tx: StoreTransaction<E>>: Send {
    /// Value produced when the work succeeds
    type Output: Send;
    /// Error type of the work; store failures convert into it
    type Error: From<RepositoryError> + Send;

    fn run(self, tx: &mut Tx) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}

/// Run `work` inside a fresh transaction of `store`
///
/// Exactly one of commit or rollback is attempted. A commit failure is
/// returned as the work's error type.
pub async fn within_transaction<E, S, W>(store: &S, work: W) -> Result<W::Output, W::Error>
where
    E: Entity,
    S: EntityStore<E>,
    W: UnitOfWork<E, S::Tx>,
{
    let mut tx = store.begin().await?;

    match work.run(&mut tx).await {
        Ok(output) => {
            tx.commit().await?;
            tracing::debug!(entity = E::NAME, "Transaction committed");
            Ok(output)
        }
        Err(error) => {
            match tx.rollback().await {
                Ok(()) => tracing::debug!(entity = E::NAME, "Transaction rolled back"),
                Err(rollback_error) => tracing::error!(
                    entity = E::NAME,
                    error = %rollback_error,
                    "Transaction rollback failed"
                ),
            }
            Err(error)
        }
    }
}
