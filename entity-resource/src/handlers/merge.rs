//! Batch merge engine
//!
//! A batch save is validated in full before any write: duplicate ids,
//! authorization of every payload, then optimistic-concurrency checks. Each
//! check reports every offending payload, not just the first. The writes then
//! run as one [`UnitOfWork`] so a failing hook or store call rolls back the
//! whole batch.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::config::{render, ErrorMessages};
use crate::entity::Entity;
use crate::repository::{RepositoryError, StoreTransaction, UnitOfWork};

use super::error::{ApiError, ErrorDetail};
use super::hooks::ResourceHooks;
use super::query::RequestContext;

/// Ids present more than once, in order of first repetition
pub(crate) fn duplicate_ids<E: Entity>(payloads: &[E]) -> Vec<E::Id> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();

    for id in payloads.iter().filter_map(Entity::id) {
        if !seen.insert(id) && reported.insert(id) {
            duplicates.push(id.clone());
        }
    }
    duplicates
}

/// One detail per payload the caller may not write
pub(crate) fn authorization_failures<E, H>(
    hooks: &H,
    ctx: &RequestContext,
    payloads: &[E],
    prior: &HashMap<E::Id, E>,
    messages: &ErrorMessages,
) -> Vec<ErrorDetail>
where
    E: Entity,
    H: ResourceHooks<E>,
{
    payloads
        .iter()
        .enumerate()
        .filter_map(|(index, payload)| {
            let old = payload.id().and_then(|id| prior.get(id));
            if hooks.can_merge(ctx, old, payload) {
                return None;
            }
            let detail = match payload.id() {
                Some(id) => ErrorDetail::new(render(
                    &messages.unauthorized_save,
                    &[("entity", E::NAME), ("id", &id.to_string())],
                ))
                .with_id(id),
                None => ErrorDetail::new(render(
                    &messages.unauthorized_create,
                    &[("entity", E::NAME), ("index", &index.to_string())],
                ))
                .with_id(index),
            };
            Some(detail.with_attribute(E::ID_FIELD))
        })
        .collect()
}

/// One detail per payload whose version differs from the stored one
///
/// Payloads without an id or without stored state are inserts and always
/// pass. A missing version counts as 0. Unversioned entity types never fail.
pub(crate) fn version_failures<E: Entity>(
    payloads: &[E],
    prior: &HashMap<E::Id, E>,
    messages: &ErrorMessages,
) -> Vec<ErrorDetail> {
    if !E::VERSIONED {
        return Vec::new();
    }

    payloads
        .iter()
        .filter_map(|payload| {
            let id = payload.id()?;
            let stored = prior.get(id)?;
            if payload.version().unwrap_or(0) == stored.version().unwrap_or(0) {
                return None;
            }
            tracing::debug!(
                entity = E::NAME,
                id = %id,
                supplied = ?payload.version(),
                stored = ?stored.version(),
                "Version check failed"
            );
            Some(
                ErrorDetail::new(render(
                    &messages.version_conflict,
                    &[("entity", E::NAME), ("id", &id.to_string())],
                ))
                .with_id(id)
                .with_attribute("version"),
            )
        })
        .collect()
}

/// Failure inside a transactional pass
#[derive(Debug, Error)]
pub(crate) enum MergeFailure {
    /// A lifecycle hook rejected a payload
    #[error("{0}")]
    Hook(ApiError),
    /// The store rejected a write or the commit
    #[error("{0}")]
    Store(#[from] RepositoryError),
}

/// Merge every payload in order: `before_merge`, store merge, `after_merge`
pub(crate) struct MergePass<'a, E: Entity, H> {
    pub hooks: &'a H,
    pub ctx: &'a RequestContext,
    pub payloads: Vec<E>,
    pub prior: &'a HashMap<E::Id, E>,
}

impl<E, H, Tx> UnitOfWork<E, Tx> for MergePass<'_, E, H>
where
    E: Entity,
    H: ResourceHooks<E>,
    Tx: StoreTransaction<E>,
{
    type Output = Vec<E>;
    type Error = MergeFailure;

    async fn run(self, tx: &mut Tx) -> Result<Vec<E>, MergeFailure> {
        let mut merged = Vec::with_capacity(self.payloads.len());

        for mut payload in self.payloads {
            let old = payload.id().and_then(|id| self.prior.get(id));
            self.hooks
                .before_merge(self.ctx, old, &mut payload)
                .map_err(MergeFailure::Hook)?;

            let saved = tx.merge(payload).await?;

            self.hooks
                .after_merge(self.ctx, &saved)
                .map_err(MergeFailure::Hook)?;
            merged.push(saved);
        }

        Ok(merged)
    }
}

/// Remove every listed id; returns how many rows existed
pub(crate) struct RemoveAll<E: Entity> {
    pub ids: Vec<E::Id>,
}

impl<E, Tx> UnitOfWork<E, Tx> for RemoveAll<E>
where
    E: Entity,
    Tx: StoreTransaction<E>,
{
    type Output = usize;
    type Error = RepositoryError;

    async fn run(self, tx: &mut Tx) -> Result<usize, RepositoryError> {
        let mut removed = 0;
        for id in &self.ids {
            if tx.remove(id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{within_transaction, EntityStore, MemoryStore};
    use crate::testing::{seed, Person, Tag};
    use uuid::Uuid;

    struct DenyNew;

    impl ResourceHooks<Person> for DenyNew {
        fn can_merge(&self, _: &RequestContext, old: Option<&Person>, _: &Person) -> bool {
            old.is_some()
        }

        fn can_delete(&self, _: &RequestContext, _: &Person) -> bool {
            true
        }
    }

    struct RejectAustin;

    impl ResourceHooks<Person> for RejectAustin {
        fn can_merge(&self, _: &RequestContext, _: Option<&Person>, _: &Person) -> bool {
            true
        }

        fn can_delete(&self, _: &RequestContext, _: &Person) -> bool {
            true
        }

        fn before_merge(
            &self,
            _: &RequestContext,
            _: Option<&Person>,
            new: &mut Person,
        ) -> Result<(), ApiError> {
            new.hometown = new.hometown.as_deref().map(str::trim).map(str::to_string);
            if new.hometown.as_deref() == Some("Austin") {
                return Err(ApiError::bad_request("Austin is not accepted"));
            }
            Ok(())
        }
    }

    fn with_id(id: Uuid, town: &str) -> Person {
        Person {
            id: Some(id),
            ..Person::in_town(town)
        }
    }

    #[test]
    fn test_duplicate_ids_reported_once_each() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let payloads = vec![
            with_id(a, "1"),
            Person::in_town("new"),
            with_id(b, "2"),
            with_id(a, "3"),
            Person::in_town("new"),
            with_id(a, "4"),
            with_id(b, "5"),
        ];
        assert_eq!(duplicate_ids(&payloads), vec![a, b]);
        assert!(duplicate_ids(&[Person::in_town("x"), Person::in_town("y")]).is_empty());
    }

    #[test]
    fn test_authorization_failures_name_ids_and_indexes() {
        let existing = Uuid::new_v4();
        let unknown = Uuid::new_v4();
        let mut prior = HashMap::new();
        prior.insert(existing, with_id(existing, "Chicago"));

        let payloads = vec![
            with_id(existing, "Austin"),
            Person::in_town("Denver"),
            with_id(unknown, "Boston"),
        ];
        let failures = authorization_failures(
            &DenyNew,
            &RequestContext::new(),
            &payloads,
            &prior,
            &ErrorMessages::default(),
        );

        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].id, Some(serde_json::json!(1)));
        assert_eq!(failures[0].attribute.as_deref(), Some("id"));
        assert_eq!(failures[0].message, "Not authorized to create Person #1.");
        assert_eq!(failures[1].id, Some(serde_json::json!(unknown.to_string())));
        assert_eq!(
            failures[1].message,
            format!("Not authorized to save Person with ID {unknown}.")
        );
    }

    #[test]
    fn test_version_failures() {
        let id = Uuid::new_v4();
        let mut stored = with_id(id, "Chicago");
        stored.version = Some(1);
        let mut prior = HashMap::new();
        prior.insert(id, stored);

        let mut stale = with_id(id, "Austin");
        stale.version = Some(0);
        let mut missing = with_id(id, "Austin");
        missing.version = None;
        let mut current = with_id(id, "Austin");
        current.version = Some(1);
        let fresh = with_id(Uuid::new_v4(), "Denver");

        let messages = ErrorMessages::default();
        let failures = version_failures(&[stale, missing, current, fresh], &prior, &messages);
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].attribute.as_deref(), Some("version"));
        assert_eq!(
            failures[0].message,
            format!("Person with ID {id} has since been edited.")
        );
    }

    #[test]
    fn test_missing_version_matches_fresh_row() {
        let id = Uuid::new_v4();
        let mut stored = with_id(id, "Chicago");
        stored.version = Some(0);
        let mut prior = HashMap::new();
        prior.insert(id, stored);

        let payload = with_id(id, "Austin");
        assert_eq!(payload.version, None);
        assert!(version_failures(&[payload], &prior, &ErrorMessages::default()).is_empty());
    }

    #[test]
    fn test_unversioned_types_skip_version_checks() {
        let mut prior = HashMap::new();
        prior.insert(
            1,
            Tag {
                id: Some(1),
                label: "a".to_string(),
            },
        );
        let payloads = vec![Tag {
            id: Some(1),
            label: "b".to_string(),
        }];
        assert!(version_failures(&payloads, &prior, &ErrorMessages::default()).is_empty());
    }

    #[tokio::test]
    async fn test_merge_pass_applies_hooks() {
        let store = MemoryStore::<Person>::new();
        let prior = HashMap::new();
        let ctx = RequestContext::new();

        let merged = within_transaction::<Person, _, _>(
            &store,
            MergePass {
                hooks: &RejectAustin,
                ctx: &ctx,
                payloads: vec![Person::in_town("  Chicago ")],
                prior: &prior,
            },
        )
        .await
        .unwrap();

        assert_eq!(merged[0].hometown.as_deref(), Some("Chicago"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_hook_error_rolls_back_batch() {
        let store = MemoryStore::<Person>::new();
        let prior = HashMap::new();
        let ctx = RequestContext::new();

        let failure = within_transaction::<Person, _, _>(
            &store,
            MergePass {
                hooks: &RejectAustin,
                ctx: &ctx,
                payloads: vec![Person::in_town("Chicago"), Person::in_town("Austin")],
                prior: &prior,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(failure, MergeFailure::Hook(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_all_counts_existing_rows() {
        let store = MemoryStore::<Person>::new();
        let stored = seed(&store, vec![Person::in_town("a"), Person::in_town("b")]).await;
        let mut ids: Vec<Uuid> = stored.iter().filter_map(|p| p.id).collect();
        ids.push(Uuid::new_v4());

        let removed = within_transaction::<Person, _, _>(&store, RemoveAll::<Person> { ids })
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert!(store
            .fetch(&crate::repository::QueryBuilder::new().build())
            .await
            .unwrap()
            .is_empty());
    }
}
