//! Ordering, pagination and filter vocabulary shared by query plans and stores
//!
//! Field names in [`FilterCondition`] and paths in [`SortSpec`] address entity
//! attributes. Nested attributes are written as dotted paths (`owner.town`);
//! stores resolve them with left-join semantics, so a missing intermediate
//! value compares as null.
//!
//! ```rust
//! use entity_resource::repository::{FilterCondition, OrderDirection, SortSpec};
//!
//! let filters = vec![
//!     FilterCondition::eq("hometown", "Chicago"),
//!     FilterCondition::is_not_null("owner.town"),
//! ];
//! let sort = SortSpec::new(OrderDirection::Descending, ["owner", "town"]);
//! assert_eq!(sort.joined_path(), "owner.town");
//! assert_eq!(filters.len(), 2);
//! ```

use std::fmt;

use uuid::Uuid;

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Sort in ascending order (A-Z, 0-9)
    #[default]
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    Descending,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// Offset and optional limit applied to a data plan
///
/// A `limit` of `None` means unlimited; `Some(0)` is a valid request for zero
/// rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    /// Number of results to skip
    pub offset: u64,
    /// Maximum number of results to return
    pub limit: Option<u64>,
}

impl Pagination {
    #[must_use]
    pub const fn new(offset: u64, limit: Option<u64>) -> Self {
        Self { offset, limit }
    }

    /// No offset, no limit
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            offset: 0,
            limit: None,
        }
    }
}

/// One entry of a sort specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub direction: OrderDirection,
    /// Attribute path, never empty, root attribute first
    pub path: Vec<String>,
}

impl SortSpec {
    pub fn new<I, S>(direction: OrderDirection, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            direction,
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Shorthand for a single-segment ascending sort
    pub fn asc(attribute: impl Into<String>) -> Self {
        Self::new(OrderDirection::Ascending, [attribute.into()])
    }

    /// Shorthand for a single-segment descending sort
    pub fn desc(attribute: impl Into<String>) -> Self {
        Self::new(OrderDirection::Descending, [attribute.into()])
    }

    /// Path segments joined with `.`; the identity used for de-duplication
    pub fn joined_path(&self) -> String {
        self.path.join(".")
    }
}

/// Comparison operators for filter conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to (=)
    Equal,
    /// Not equal to (!=)
    NotEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal to (>=)
    GreaterThanOrEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal to (<=)
    LessThanOrEqual,
    /// Pattern matching with `%` and `_` wildcards (LIKE)
    Like,
    /// Value is in a list (IN)
    In,
    /// Value is null (IS NULL)
    IsNull,
    /// Value is not null (IS NOT NULL)
    IsNotNull,
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::Like => "LIKE",
            Self::In => "IN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        };
        f.write_str(symbol)
    }
}

/// A value that can be used in filter conditions
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// List of string values (for IN operator)
    StringList(Vec<String>),
    /// List of integer values (for IN operator)
    IntegerList(Vec<i64>),
    /// Null value (for IS NULL / IS NOT NULL)
    Null,
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Uuid> for FilterValue {
    fn from(id: Uuid) -> Self {
        Self::String(id.to_string())
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(list: Vec<String>) -> Self {
        Self::StringList(list)
    }
}

impl From<Vec<i64>> for FilterValue {
    fn from(list: Vec<i64>) -> Self {
        Self::IntegerList(list)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A single predicate; a plan's predicates are combined with logical AND
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    /// Attribute name or dotted path
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Equal, value.into())
    }

    /// `field != value`
    pub fn ne(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::NotEqual, value.into())
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::GreaterThan, value.into())
    }

    /// `field >= value`
    pub fn gte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::GreaterThanOrEqual, value.into())
    }

    /// `field < value`
    pub fn lt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::LessThan, value.into())
    }

    /// `field <= value`
    pub fn lte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::LessThanOrEqual, value.into())
    }

    /// `field LIKE pattern`
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Like, FilterValue::String(pattern.into()))
    }

    pub fn in_strings(field: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(field, FilterOperator::In, FilterValue::StringList(values))
    }

    pub fn in_integers(field: impl Into<String>, values: Vec<i64>) -> Self {
        Self::new(field, FilterOperator::In, FilterValue::IntegerList(values))
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNull, FilterValue::Null)
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNotNull, FilterValue::Null)
    }

    /// Field split into path segments
    pub fn path(&self) -> impl Iterator<Item = &str> {
        self.field.split('.').filter(|segment| !segment.is_empty())
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            FilterOperator::IsNull | FilterOperator::IsNotNull => {
                write!(f, "{} {}", self.field, self.operator)
            }
            _ => write!(f, "{} {} {:?}", self.field, self.operator, self.value),
        }
    }
}
