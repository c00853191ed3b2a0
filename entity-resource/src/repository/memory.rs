//! In-memory entity store
//!
//! [`MemoryStore`] implements [`EntityStore`] over a shared table guarded by
//! a `tokio` read/write lock. Plans are evaluated against each entity's
//! `serde_json` representation, so filters and sorts can address any
//! serialized attribute, including nested ones through dotted paths. A missing
//! intermediate value, or a non-object one, resolves to null, which mirrors
//! LEFT join semantics in a relational store.
//!
//! Writes are staged in a [`MemoryTransaction`]. The transaction remembers the
//! committed version of every row it touches and re-checks those versions at
//! commit time, so of two transactions editing the same row only the first
//! commit succeeds. Dropping a transaction discards its staged changes.
//!
//! Comparison follows SQL: a null value satisfies only `IS NULL`, and
//! comparing values of different types never matches. In ordering, nulls come
//! first for ascending and last for descending sorts.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use super::error::{RepositoryError, RepositoryOperation};
use super::plan::{CountPlan, OrderBy, QueryPlan};
use super::query::{FilterCondition, FilterOperator, FilterValue, OrderDirection};
use super::traits::{EntityStore, RepositoryResult, StoreTransaction};
use crate::entity::{Entity, EntityId, PersistStamp};

static NULL: Value = Value::Null;

struct Row<E> {
    entity: E,
    /// Insertion order, used as the natural order of unsorted plans
    position: u64,
}

struct Table<E: Entity> {
    rows: HashMap<E::Id, Row<E>>,
    next_position: u64,
}

impl<E: Entity> Table<E> {
    fn committed_version(&self, id: &E::Id) -> Option<u64> {
        self.rows.get(id).map(|row| stored_version(&row.entity))
    }
}

fn stored_version<E: Entity>(entity: &E) -> u64 {
    entity.version().unwrap_or(0)
}

/// Thread-safe in-memory store for one entity type
pub struct MemoryStore<E: Entity> {
    table: Arc<RwLock<Table<E>>>,
    sequence: Arc<AtomicU64>,
}

impl<E: Entity> Clone for MemoryStore<E> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            sequence: Arc::clone(&self.sequence),
        }
    }
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> MemoryStore<E> {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table {
                rows: HashMap::new(),
                next_position: 0,
            })),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of committed rows
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.read().await.rows.is_empty()
    }

    /// Committed rows in insertion order with their JSON form
    async fn snapshot(&self, operation: RepositoryOperation) -> RepositoryResult<Vec<(Value, E)>> {
        let table = self.table.read().await;
        let mut rows: Vec<&Row<E>> = table.rows.values().collect();
        rows.sort_by_key(|row| row.position);
        rows.into_iter()
            .map(|row| {
                let json = serde_json::to_value(&row.entity).map_err(|e| {
                    RepositoryError::serialization_error(operation, e.to_string())
                })?;
                Ok((json, row.entity.clone()))
            })
            .collect()
    }
}

impl<E: Entity> EntityStore<E> for MemoryStore<E> {
    type Tx = MemoryTransaction<E>;

    async fn fetch(&self, plan: &QueryPlan) -> RepositoryResult<Vec<E>> {
        if plan.is_empty_page() {
            return Ok(Vec::new());
        }

        let mut rows: Vec<(Value, E)> = self
            .snapshot(RepositoryOperation::FindAll)
            .await?
            .into_iter()
            .filter(|(json, _)| matches_all(json, &plan.filters))
            .collect();

        // Stable, so rows equal on every key keep insertion order.
        rows.sort_by(|(a, _), (b, _)| compare_rows(a, b, &plan.order_by));

        let offset = usize::try_from(plan.pagination.offset).unwrap_or(usize::MAX);
        let limit = plan
            .pagination
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, entity)| entity)
            .collect())
    }

    async fn count(&self, plan: &CountPlan) -> RepositoryResult<u64> {
        let rows = self.snapshot(RepositoryOperation::Count).await?;
        let matching = rows
            .iter()
            .filter(|(json, _)| matches_all(json, &plan.filters))
            .count();
        Ok(matching as u64)
    }

    async fn find_by_ids(&self, ids: &[E::Id]) -> RepositoryResult<HashMap<E::Id, E>> {
        let table = self.table.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| {
                table
                    .rows
                    .get(id)
                    .map(|row| (id.clone(), row.entity.clone()))
            })
            .collect())
    }

    async fn begin(&self) -> RepositoryResult<MemoryTransaction<E>> {
        Ok(MemoryTransaction {
            table: Arc::clone(&self.table),
            sequence: Arc::clone(&self.sequence),
            staged: HashMap::new(),
            order: Vec::new(),
            expected: HashMap::new(),
        })
    }
}

/// Staged writes against a [`MemoryStore`]
pub struct MemoryTransaction<E: Entity> {
    table: Arc<RwLock<Table<E>>>,
    sequence: Arc<AtomicU64>,
    /// `Some` for an upsert, `None` for a removal
    staged: HashMap<E::Id, Option<E>>,
    /// Ids in the order they were first written
    order: Vec<E::Id>,
    /// Committed version of each touched id when first read, `None` if absent
    expected: HashMap<E::Id, Option<u64>>,
}

impl<E: Entity> MemoryTransaction<E> {
    /// Current value of `id` as seen by this transaction
    async fn current(&mut self, id: &E::Id) -> Option<E> {
        if let Some(staged) = self.staged.get(id) {
            return staged.clone();
        }
        let table = self.table.read().await;
        let row = table.rows.get(id).map(|row| row.entity.clone());
        self.expected
            .entry(id.clone())
            .or_insert_with(|| table.committed_version(id));
        row
    }

    fn stage(&mut self, id: E::Id, value: Option<E>) {
        if !self.staged.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.staged.insert(id, value);
    }

    /// Draw sequence values until one is free both here and in the table
    async fn fresh_id(&mut self) -> E::Id {
        let table = self.table.read().await;
        loop {
            let sequence = self.sequence.fetch_add(1, AtomicOrdering::Relaxed) + 1;
            let candidate = E::Id::generate(sequence);
            if !table.rows.contains_key(&candidate) && !self.staged.contains_key(&candidate) {
                self.expected.insert(candidate.clone(), None);
                return candidate;
            }
        }
    }
}

impl<E: Entity> StoreTransaction<E> for MemoryTransaction<E> {
    async fn merge(&mut self, mut entity: E) -> RepositoryResult<E> {
        let now = Utc::now();

        let stamp = match entity.id().cloned() {
            Some(id) => match self.current(&id).await {
                Some(existing) => {
                    let current = stored_version(&existing);
                    if E::VERSIONED && entity.version().unwrap_or(0) != current {
                        return Err(RepositoryError::version_conflict(
                            E::NAME,
                            id.to_string(),
                            entity.version(),
                            current,
                        ));
                    }
                    PersistStamp {
                        id,
                        version: current + 1,
                        created: existing.created().unwrap_or(now),
                        updated: now,
                    }
                }
                None => PersistStamp {
                    id,
                    version: 0,
                    created: now,
                    updated: now,
                },
            },
            None => PersistStamp {
                id: self.fresh_id().await,
                version: 0,
                created: now,
                updated: now,
            },
        };

        let id = stamp.id.clone();
        entity.apply_stamp(stamp);
        self.stage(id, Some(entity.clone()));
        Ok(entity)
    }

    async fn remove(&mut self, id: &E::Id) -> RepositoryResult<bool> {
        if self.current(id).await.is_none() {
            return Ok(false);
        }
        self.stage(id.clone(), None);
        Ok(true)
    }

    async fn commit(mut self) -> RepositoryResult<()> {
        let mut table = self.table.write().await;

        for (id, expected) in &self.expected {
            let actual = table.committed_version(id);
            if actual == *expected {
                continue;
            }
            let error = match (expected, actual) {
                (Some(expected), Some(actual)) => {
                    RepositoryError::version_conflict(E::NAME, id.to_string(), Some(*expected), actual)
                }
                (None, Some(_)) => RepositoryError::already_exists(E::NAME, id.to_string()),
                _ => RepositoryError::not_found(E::NAME, id.to_string()),
            };
            return Err(error.with_operation(RepositoryOperation::Commit));
        }

        let mut written = 0_usize;
        let mut removed = 0_usize;
        for id in std::mem::take(&mut self.order) {
            match self.staged.remove(&id) {
                Some(Some(entity)) => {
                    written += 1;
                    if let Some(row) = table.rows.get_mut(&id) {
                        row.entity = entity;
                    } else {
                        let position = table.next_position;
                        table.next_position += 1;
                        table.rows.insert(id, Row { entity, position });
                    }
                }
                Some(None) => {
                    removed += 1;
                    table.rows.remove(&id);
                }
                None => {}
            }
        }

        tracing::debug!(entity = E::NAME, written, removed, "Memory transaction committed");
        Ok(())
    }

    async fn rollback(self) -> RepositoryResult<()> {
        tracing::debug!(
            entity = E::NAME,
            discarded = self.order.len(),
            "Memory transaction rolled back"
        );
        Ok(())
    }
}

fn resolve<'a, 'p>(json: &'a Value, path: impl IntoIterator<Item = &'p str>) -> &'a Value {
    path.into_iter().fold(json, |value, segment| match value {
        Value::Object(map) => map.get(segment).unwrap_or(&NULL),
        _ => &NULL,
    })
}

fn matches_all(json: &Value, filters: &[FilterCondition]) -> bool {
    filters.iter().all(|filter| matches(json, filter))
}

fn matches(json: &Value, filter: &FilterCondition) -> bool {
    let value = resolve(json, filter.path());

    match filter.operator {
        FilterOperator::IsNull => return value.is_null(),
        FilterOperator::IsNotNull => return !value.is_null(),
        _ if value.is_null() => return false,
        _ => {}
    }

    match filter.operator {
        FilterOperator::Equal => compare_to_filter(value, &filter.value) == Some(Ordering::Equal),
        FilterOperator::NotEqual => matches!(
            compare_to_filter(value, &filter.value),
            Some(Ordering::Less | Ordering::Greater)
        ),
        FilterOperator::GreaterThan => {
            compare_to_filter(value, &filter.value) == Some(Ordering::Greater)
        }
        FilterOperator::GreaterThanOrEqual => matches!(
            compare_to_filter(value, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOperator::LessThan => compare_to_filter(value, &filter.value) == Some(Ordering::Less),
        FilterOperator::LessThanOrEqual => matches!(
            compare_to_filter(value, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOperator::Like => match (value, &filter.value) {
            (Value::String(text), FilterValue::String(pattern)) => like(text, pattern),
            _ => false,
        },
        FilterOperator::In => match (value, &filter.value) {
            (Value::String(text), FilterValue::StringList(list)) => list.contains(text),
            (Value::Number(number), FilterValue::IntegerList(list)) => {
                number.as_i64().is_some_and(|n| list.contains(&n))
            }
            _ => false,
        },
        FilterOperator::IsNull | FilterOperator::IsNotNull => false,
    }
}

fn compare_to_filter(value: &Value, filter: &FilterValue) -> Option<Ordering> {
    match (value, filter) {
        (Value::String(a), FilterValue::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Bool(a), FilterValue::Boolean(b)) => Some(a.cmp(b)),
        (Value::Number(a), FilterValue::Integer(b)) => match a.as_i64() {
            Some(a) => Some(a.cmp(b)),
            None => a.as_f64()?.partial_cmp(&(*b as f64)),
        },
        (Value::Number(a), FilterValue::Float(b)) => a.as_f64()?.partial_cmp(b),
        _ => None,
    }
}

/// SQL LIKE with `%` (any run) and `_` (any single character)
fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('%') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some('_') => {
                t += 1;
                p += 1;
            }
            Some(c) if *c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}

fn compare_rows(a: &Value, b: &Value, order_by: &[OrderBy]) -> Ordering {
    for term in order_by {
        let path = term.path.iter().map(String::as_str);
        let left = resolve(a, path.clone());
        let right = resolve(b, path);
        let ordering = compare_values(left, right);
        let ordering = match term.direction {
            OrderDirection::Ascending => ordering,
            OrderDirection::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => a
                .as_f64()
                .zip(b.as_f64())
                .and_then(|(a, b)| a.partial_cmp(&b))
                .unwrap_or(Ordering::Equal),
        },
        (Value::String(a), Value::String(b)) => {
            // RFC 3339 timestamps order by instant, not by text
            match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{Pagination, QueryBuilder, RepositoryErrorKind, SortSpec};
    use crate::testing::{seed, Person, Tag};

    fn towns(people: &[Person]) -> Vec<Option<&str>> {
        people.iter().map(|p| p.hometown.as_deref()).collect()
    }

    #[tokio::test]
    async fn test_merge_assigns_identity_and_version() {
        let store = MemoryStore::<Person>::new();
        let mut tx = store.begin().await.unwrap();

        let merged = tx.merge(Person::in_town("Chicago")).await.unwrap();
        assert!(merged.id.is_some());
        assert_eq!(merged.version, Some(0));
        assert!(merged.created.is_some());
        assert_eq!(merged.created, merged.updated);

        // Not visible until commit.
        assert!(store.is_empty().await);
        tx.commit().await.unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_bumps_version_and_keeps_created() {
        let store = MemoryStore::<Person>::new();
        let original = seed(&store, vec![Person::in_town("Chicago")]).await.remove(0);

        let mut edit = original.clone();
        edit.hometown = Some("Austin".to_string());
        edit.created = None;
        let updated = seed(&store, vec![edit]).await.remove(0);

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.version, Some(1));
        assert_eq!(updated.created, original.created);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_stale_version_rejected_on_merge() {
        let store = MemoryStore::<Person>::new();
        let original = seed(&store, vec![Person::in_town("Chicago")]).await.remove(0);

        let mut first = original.clone();
        first.hometown = Some("Austin".to_string());
        seed(&store, vec![first]).await;

        let mut tx = store.begin().await.unwrap();
        let error = tx.merge(original).await.unwrap_err();
        assert_eq!(error.kind, RepositoryErrorKind::VersionConflict);
        assert_eq!(
            error.message,
            "Version check failed: expected 0, found 1"
        );
    }

    #[tokio::test]
    async fn test_missing_version_counts_as_zero() {
        let store = MemoryStore::<Person>::new();
        let mut person = seed(&store, vec![Person::in_town("Chicago")]).await.remove(0);
        person.version = None;
        person.hometown = Some("Austin".to_string());

        let updated = seed(&store, vec![person]).await.remove(0);
        assert_eq!(updated.version, Some(1));
        assert_eq!(updated.hometown.as_deref(), Some("Austin"));
    }

    #[tokio::test]
    async fn test_client_assigned_id_inserts_at_version_zero() {
        let store = MemoryStore::<Person>::new();
        let id = uuid::Uuid::new_v4();
        let person = Person {
            id: Some(id),
            ..Person::in_town("Denver")
        };

        let stored = seed(&store, vec![person]).await.remove(0);
        assert_eq!(stored.id, Some(id));
        assert_eq!(stored.version, Some(0));
    }

    #[tokio::test]
    async fn test_concurrent_inserts_of_same_id_conflict() {
        let store = MemoryStore::<Tag>::new();
        let tag = Tag {
            id: Some(5),
            label: "a".to_string(),
        };

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        first.merge(tag.clone()).await.unwrap();
        second.merge(tag).await.unwrap();

        first.commit().await.unwrap();
        let error = second.commit().await.unwrap_err();
        assert_eq!(error.kind, RepositoryErrorKind::AlreadyExists);
        assert_eq!(error.operation, RepositoryOperation::Commit);
    }

    #[tokio::test]
    async fn test_unversioned_entities_skip_version_checks() {
        let store = MemoryStore::<Tag>::new();
        let tags = seed(
            &store,
            vec![
                Tag {
                    id: None,
                    label: "a".to_string(),
                },
                Tag {
                    id: None,
                    label: "b".to_string(),
                },
            ],
        )
        .await;
        assert_eq!(tags[0].id, Some(1));
        assert_eq!(tags[1].id, Some(2));

        let renamed = seed(
            &store,
            vec![Tag {
                id: Some(1),
                label: "z".to_string(),
            }],
        )
        .await;
        assert_eq!(renamed[0].label, "z");
    }

    #[tokio::test]
    async fn test_generated_ids_skip_taken_keys() {
        let store = MemoryStore::<Tag>::new();
        seed(
            &store,
            vec![Tag {
                id: Some(1),
                label: "manual".to_string(),
            }],
        )
        .await;

        let generated = seed(
            &store,
            vec![Tag {
                id: None,
                label: "auto".to_string(),
            }],
        )
        .await;
        assert_eq!(generated[0].id, Some(2));
    }

    #[tokio::test]
    async fn test_remove_and_drop_discards() {
        let store = MemoryStore::<Person>::new();
        let person = seed(&store, vec![Person::in_town("Chicago")]).await.remove(0);
        let id = person.id.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            assert!(tx.remove(&id).await.unwrap());
            assert!(!tx.remove(&id).await.unwrap());
        }
        assert_eq!(store.len().await, 1);

        let mut tx = store.begin().await.unwrap();
        assert!(tx.remove(&id).await.unwrap());
        tx.commit().await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_rollback_discards() {
        let store = MemoryStore::<Person>::new();
        let mut tx = store.begin().await.unwrap();
        tx.merge(Person::in_town("Chicago")).await.unwrap();
        tx.rollback().await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_fetch_filters_sorts_and_pages() {
        let store = MemoryStore::<Person>::new();
        seed(
            &store,
            vec![
                Person::in_town("Chicago"),
                Person::in_town("Austin"),
                Person::in_town("Boston"),
                Person::in_town("Albany"),
            ],
        )
        .await;

        let plan = QueryBuilder::new()
            .filter(FilterCondition::like("hometown", "A%"))
            .sort(vec![SortSpec::asc("hometown")])
            .build();
        assert_eq!(
            towns(&store.fetch(&plan).await.unwrap()),
            vec![Some("Albany"), Some("Austin")]
        );

        let plan = QueryBuilder::new()
            .sort(vec![SortSpec::desc("hometown")])
            .paginate(Pagination::new(1, Some(2)))
            .build();
        assert_eq!(
            towns(&store.fetch(&plan).await.unwrap()),
            vec![Some("Boston"), Some("Austin")]
        );

        let plan = QueryBuilder::new()
            .paginate(Pagination::new(0, Some(0)))
            .build();
        assert!(store.fetch(&plan).await.unwrap().is_empty());

        let count = QueryBuilder::new()
            .filter(FilterCondition::ne("hometown", "Chicago"))
            .count_plan();
        assert_eq!(store.count(&count).await.unwrap(), 3);
    }

    #[test]
    fn test_timestamps_compare_as_instants() {
        let whole = serde_json::json!("2024-05-01T10:00:05Z");
        let half = serde_json::json!("2024-05-01T10:00:05.5Z");
        let micros = serde_json::json!("2024-05-01T10:00:05.250000Z");
        let offset = serde_json::json!("2024-05-01T12:00:04+02:00");

        assert_eq!(compare_values(&whole, &half), Ordering::Less);
        assert_eq!(compare_values(&micros, &half), Ordering::Less);
        assert_eq!(compare_values(&offset, &whole), Ordering::Less);
        assert_eq!(
            compare_values(&serde_json::json!("b"), &serde_json::json!("a")),
            Ordering::Greater
        );
    }

    #[tokio::test]
    async fn test_unsorted_fetch_uses_insertion_order() {
        let store = MemoryStore::<Person>::new();
        seed(
            &store,
            vec![Person::in_town("C"), Person::in_town("A"), Person::in_town("B")],
        )
        .await;

        let all = store.fetch(&QueryBuilder::new().build()).await.unwrap();
        assert_eq!(towns(&all), vec![Some("C"), Some("A"), Some("B")]);
    }

    #[tokio::test]
    async fn test_nested_sort_keeps_rows_without_owner() {
        let store = MemoryStore::<Person>::new();
        seed(
            &store,
            vec![
                Person::in_town("one").owned_by(Some("Zurich")),
                Person::in_town("two"),
                Person::in_town("three").owned_by(Some("Amsterdam")),
                Person::in_town("four").owned_by(None),
            ],
        )
        .await;

        let plan = QueryBuilder::new()
            .sort(vec![SortSpec::new(OrderDirection::Ascending, ["owner", "town"])])
            .build();
        let sorted = store.fetch(&plan).await.unwrap();
        assert_eq!(
            towns(&sorted),
            vec![Some("two"), Some("four"), Some("three"), Some("one")]
        );

        let plan = QueryBuilder::new()
            .filter(FilterCondition::eq("owner.town", "Zurich"))
            .build();
        assert_eq!(towns(&store.fetch(&plan).await.unwrap()), vec![Some("one")]);

        let plan = QueryBuilder::new()
            .filter(FilterCondition::is_null("owner.town"))
            .build();
        assert_eq!(store.fetch(&plan).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_ids_ignores_missing() {
        let store = MemoryStore::<Person>::new();
        let stored = seed(&store, vec![Person::in_town("Chicago")]).await;
        let known = stored[0].id.unwrap();
        let unknown = uuid::Uuid::new_v4();

        let found = store.find_by_ids(&[known, unknown]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains_key(&known));
    }

    #[test]
    fn test_like_patterns() {
        assert!(like("Chicago", "Chi%"));
        assert!(like("Chicago", "%cag%"));
        assert!(like("Chicago", "C_icago"));
        assert!(like("Chicago", "%"));
        assert!(like("", "%"));
        assert!(!like("Chicago", "chi%"));
        assert!(!like("Chicago", "Chicago_"));
        assert!(like("a%b", "a%b"));
    }

    #[test]
    fn test_null_comparisons() {
        let json = serde_json::json!({ "hometown": null, "owner": { "town": "Oslo" } });
        assert!(!matches(&json, &FilterCondition::eq("hometown", "x")));
        assert!(!matches(&json, &FilterCondition::ne("hometown", "x")));
        assert!(matches(&json, &FilterCondition::is_null("hometown")));
        assert!(matches(&json, &FilterCondition::is_null("missing.deeper")));
        assert!(matches(&json, &FilterCondition::in_strings(
            "owner.town",
            vec!["Oslo".to_string()]
        )));
    }
}
