//! Query plan construction
//!
//! [`QueryBuilder`] composes caller predicates, sort specifications and
//! pagination into a [`QueryPlan`] (the data query) and a parallel
//! [`CountPlan`] (same predicates, projected to a row count).
//!
//! Sorting on a nested path such as `owner.address.town` needs the store to
//! walk `owner` and `owner.address` before ordering on `town`. The builder
//! records one LEFT [`Join`] per intermediate segment, shares joins between
//! sorts with a common prefix, and marks the plan `distinct` whenever a join
//! could duplicate root rows.

use super::query::{FilterCondition, OrderDirection, Pagination, SortSpec};

/// Alias of the root entity in a plan
pub const ROOT_ALIAS: &str = "root";

/// Join flavour; sort joins never drop root rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Left,
}

/// A join through one attribute of a parent source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    /// Path prefix this join reaches, joined with `.` (e.g. `owner.address`)
    pub alias: String,
    /// Alias of the joined-from source, [`ROOT_ALIAS`] for the entity itself
    pub parent: String,
    /// Attribute of the parent being traversed
    pub attribute: String,
    pub kind: JoinKind,
}

/// One ordering term of a data plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Alias holding the attribute, [`ROOT_ALIAS`] or a join alias
    pub source: String,
    /// Leaf attribute ordered on
    pub attribute: String,
    pub direction: OrderDirection,
    /// Full path from the root entity
    pub path: Vec<String>,
}

/// Data query: predicates, joins, ordering and pagination
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryPlan {
    pub filters: Vec<FilterCondition>,
    pub joins: Vec<Join>,
    pub order_by: Vec<OrderBy>,
    /// Set when joins may produce duplicate root rows
    pub distinct: bool,
    pub pagination: Pagination,
}

impl QueryPlan {
    /// Whether the plan asks for zero rows (count-only probe)
    pub fn is_empty_page(&self) -> bool {
        self.pagination.limit == Some(0)
    }
}

/// Count query: the data plan's predicates without ordering or paging
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CountPlan {
    pub filters: Vec<FilterCondition>,
}

/// Builder for [`QueryPlan`] and [`CountPlan`]
///
/// ```rust
/// use entity_resource::repository::{
///     FilterCondition, OrderDirection, Pagination, QueryBuilder, SortSpec,
/// };
///
/// let builder = QueryBuilder::new()
///     .filter(FilterCondition::eq("hometown", "Austin"))
///     .sort(vec![SortSpec::new(OrderDirection::Descending, ["owner", "town"])])
///     .paginate(Pagination::new(20, Some(40)));
///
/// let plan = builder.build();
/// assert_eq!(plan.joins.len(), 1);
/// assert!(plan.distinct);
/// assert_eq!(builder.count_plan().filters.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    filters: Vec<FilterCondition>,
    sorts: Vec<SortSpec>,
    pagination: Pagination,
}

impl QueryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one predicate
    #[must_use]
    pub fn filter(mut self, condition: FilterCondition) -> Self {
        self.filters.push(condition);
        self
    }

    /// Add several predicates
    #[must_use]
    pub fn filters(mut self, conditions: impl IntoIterator<Item = FilterCondition>) -> Self {
        self.filters.extend(conditions);
        self
    }

    /// Set the ordering, highest precedence first
    #[must_use]
    pub fn sort(mut self, sorts: Vec<SortSpec>) -> Self {
        self.sorts = sorts;
        self
    }

    #[must_use]
    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Build the data plan
    pub fn build(&self) -> QueryPlan {
        let mut joins: Vec<Join> = Vec::new();
        let mut order_by = Vec::with_capacity(self.sorts.len());

        for sort in &self.sorts {
            let Some((leaf, parents)) = sort.path.split_last() else {
                continue;
            };

            let mut source = ROOT_ALIAS.to_string();
            for depth in 0..parents.len() {
                let alias = parents[..=depth].join(".");
                if !joins.iter().any(|join| join.alias == alias) {
                    joins.push(Join {
                        alias: alias.clone(),
                        parent: source.clone(),
                        attribute: parents[depth].clone(),
                        kind: JoinKind::Left,
                    });
                }
                source = alias;
            }

            order_by.push(OrderBy {
                source,
                attribute: leaf.clone(),
                direction: sort.direction,
                path: sort.path.clone(),
            });
        }

        let plan = QueryPlan {
            filters: self.filters.clone(),
            distinct: !joins.is_empty(),
            joins,
            order_by,
            pagination: self.pagination,
        };
        tracing::debug!(
            filters = plan.filters.len(),
            joins = plan.joins.len(),
            order_by = plan.order_by.len(),
            distinct = plan.distinct,
            offset = plan.pagination.offset,
            limit = ?plan.pagination.limit,
            "Built query plan"
        );
        plan
    }

    /// Build the count plan
    pub fn count_plan(&self) -> CountPlan {
        CountPlan {
            filters: self.filters.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_sorts_need_no_joins() {
        let plan = QueryBuilder::new()
            .sort(vec![SortSpec::asc("name"), SortSpec::desc("version")])
            .build();

        assert!(plan.joins.is_empty());
        assert!(!plan.distinct);
        assert_eq!(plan.order_by.len(), 2);
        assert_eq!(plan.order_by[0].source, ROOT_ALIAS);
        assert_eq!(plan.order_by[1].direction, OrderDirection::Descending);
    }

    #[test]
    fn test_nested_sort_joins_every_intermediate_segment() {
        let plan = QueryBuilder::new()
            .sort(vec![SortSpec::new(
                OrderDirection::Ascending,
                ["owner", "address", "town"],
            )])
            .build();

        assert_eq!(
            plan.joins,
            vec![
                Join {
                    alias: "owner".to_string(),
                    parent: ROOT_ALIAS.to_string(),
                    attribute: "owner".to_string(),
                    kind: JoinKind::Left,
                },
                Join {
                    alias: "owner.address".to_string(),
                    parent: "owner".to_string(),
                    attribute: "address".to_string(),
                    kind: JoinKind::Left,
                },
            ]
        );
        assert_eq!(plan.order_by[0].source, "owner.address");
        assert_eq!(plan.order_by[0].attribute, "town");
        assert!(plan.distinct);
    }

    #[test]
    fn test_shared_prefixes_join_once() {
        let plan = QueryBuilder::new()
            .sort(vec![
                SortSpec::new(OrderDirection::Ascending, ["owner", "town"]),
                SortSpec::new(OrderDirection::Descending, ["owner", "name"]),
            ])
            .build();

        assert_eq!(plan.joins.len(), 1);
        assert_eq!(plan.order_by[0].source, "owner");
        assert_eq!(plan.order_by[1].source, "owner");
    }

    #[test]
    fn test_count_plan_keeps_only_filters() {
        let builder = QueryBuilder::new()
            .filters(vec![
                FilterCondition::eq("hometown", "Austin"),
                FilterCondition::is_not_null("owner"),
            ])
            .sort(vec![SortSpec::asc("name")])
            .paginate(Pagination::new(10, Some(5)));

        let count = builder.count_plan();
        assert_eq!(count.filters.len(), 2);

        let plan = builder.build();
        assert_eq!(plan.pagination, Pagination::new(10, Some(5)));
        assert_eq!(plan.filters, count.filters);
    }

    #[test]
    fn test_zero_limit_is_empty_page() {
        let plan = QueryBuilder::new()
            .paginate(Pagination::new(0, Some(0)))
            .build();
        assert!(plan.is_empty_page());
        assert!(!QueryBuilder::new().build().is_empty_page());
    }
}
