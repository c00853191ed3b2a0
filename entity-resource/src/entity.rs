//! Entity model shared by the resource engine and the stores
//!
//! An [`Entity`] is any serializable record with an opaque identifier, an
//! optional version stamp for optimistic concurrency and persistence-managed
//! timestamps. Stores assign identity, version and timestamps through
//! [`Entity::apply_stamp`]; request handling code only ever reads them.
//!
//! # Example
//!
//! ```rust
//! use chrono::{DateTime, Utc};
//! use entity_resource::entity::{Entity, PersistStamp};
//! use serde::{Deserialize, Serialize};
//! use uuid::Uuid;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Team {
//!     #[serde(default)]
//!     id: Option<Uuid>,
//!     #[serde(default)]
//!     version: Option<u64>,
//!     name: String,
//!     #[serde(default, skip_deserializing)]
//!     created: Option<DateTime<Utc>>,
//!     #[serde(default, skip_deserializing)]
//!     updated: Option<DateTime<Utc>>,
//! }
//!
//! impl Entity for Team {
//!     type Id = Uuid;
//!     const NAME: &'static str = "Team";
//!     const VERSIONED: bool = true;
//!
//!     fn id(&self) -> Option<&Uuid> {
//!         self.id.as_ref()
//!     }
//!
//!     fn version(&self) -> Option<u64> {
//!         self.version
//!     }
//!
//!     fn created(&self) -> Option<DateTime<Utc>> {
//!         self.created
//!     }
//!
//!     fn apply_stamp(&mut self, stamp: PersistStamp<Uuid>) {
//!         self.id = Some(stamp.id);
//!         self.version = Some(stamp.version);
//!         self.created = Some(stamp.created);
//!         self.updated = Some(stamp.updated);
//!     }
//! }
//! ```

use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::repository::FilterValue;

/// Identifier type usable as an entity primary key
pub trait EntityId:
    Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Produce a fresh identifier for a server-side insert.
    ///
    /// `sequence` is a store-local, monotonically increasing counter starting
    /// at 1. Surrogate integer keys use it directly; random keys ignore it.
    fn generate(sequence: u64) -> Self;

    /// Value used when the id takes part in a filter condition
    fn to_filter_value(&self) -> FilterValue;
}

impl EntityId for Uuid {
    fn generate(_sequence: u64) -> Self {
        Uuid::new_v4()
    }

    fn to_filter_value(&self) -> FilterValue {
        FilterValue::String(self.to_string())
    }
}

impl EntityId for i64 {
    fn generate(sequence: u64) -> Self {
        i64::try_from(sequence).unwrap_or(i64::MAX)
    }

    fn to_filter_value(&self) -> FilterValue {
        FilterValue::Integer(*self)
    }
}

impl EntityId for u64 {
    fn generate(sequence: u64) -> Self {
        sequence
    }

    fn to_filter_value(&self) -> FilterValue {
        match i64::try_from(*self) {
            Ok(n) => FilterValue::Integer(n),
            Err(_) => FilterValue::String(self.to_string()),
        }
    }
}

impl EntityId for String {
    fn generate(_sequence: u64) -> Self {
        Uuid::new_v4().to_string()
    }

    fn to_filter_value(&self) -> FilterValue {
        FilterValue::String(self.clone())
    }
}

/// Persistence-assigned metadata written into an entity on merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistStamp<Id> {
    /// Identifier of the stored row
    pub id: Id,
    /// Version after the write (0 on insert, previous + 1 on update)
    pub version: u64,
    /// Insert timestamp, carried over unchanged on update
    pub created: DateTime<Utc>,
    /// Timestamp of this write
    pub updated: DateTime<Utc>,
}

/// A persisted record type with identity and (optionally) a version
pub trait Entity: Clone + fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Primary key type
    type Id: EntityId;

    /// Human-readable type name used in error messages
    const NAME: &'static str;

    /// Name of the identifier attribute as seen by filters and stores
    const ID_FIELD: &'static str = "id";

    /// Whether the batch save performs optimistic-concurrency checks
    const VERSIONED: bool = false;

    /// Identifier, `None` for entities that have never been persisted
    /// and did not receive a client-assigned id
    fn id(&self) -> Option<&Self::Id>;

    /// Version stamp carried by this value
    fn version(&self) -> Option<u64> {
        None
    }

    /// Insert timestamp, if this value was loaded from a store
    fn created(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Write persistence metadata. Only stores call this.
    fn apply_stamp(&mut self, stamp: PersistStamp<Self::Id>);
}
