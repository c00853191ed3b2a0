//! Fixtures shared by the unit tests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{Entity, PersistStamp};
use crate::repository::{EntityStore, MemoryStore, StoreTransaction};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub town: Option<String>,
}

/// Versioned entity with a UUID key and a nested attribute
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub hometown: Option<String>,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default, skip_deserializing)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_deserializing)]
    pub updated: Option<DateTime<Utc>>,
}

impl Person {
    pub fn in_town(hometown: &str) -> Self {
        Self {
            hometown: Some(hometown.to_string()),
            ..Self::default()
        }
    }

    pub fn owned_by(mut self, town: Option<&str>) -> Self {
        self.owner = Some(Owner {
            town: town.map(str::to_string),
        });
        self
    }
}

impl Entity for Person {
    type Id = Uuid;
    const NAME: &'static str = "Person";
    const VERSIONED: bool = true;

    fn id(&self) -> Option<&Uuid> {
        self.id.as_ref()
    }

    fn version(&self) -> Option<u64> {
        self.version
    }

    fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    fn apply_stamp(&mut self, stamp: PersistStamp<Uuid>) {
        self.id = Some(stamp.id);
        self.version = Some(stamp.version);
        self.created = Some(stamp.created);
        self.updated = Some(stamp.updated);
    }
}

/// Unversioned entity with a surrogate integer key
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: Option<i64>,
    pub label: String,
}

impl Entity for Tag {
    type Id = i64;
    const NAME: &'static str = "Tag";

    fn id(&self) -> Option<&i64> {
        self.id.as_ref()
    }

    fn apply_stamp(&mut self, stamp: PersistStamp<i64>) {
        self.id = Some(stamp.id);
    }
}

/// Commit the given entities in one transaction and return them as stored
pub async fn seed<E: Entity>(store: &MemoryStore<E>, entities: Vec<E>) -> Vec<E> {
    let mut tx = store.begin().await.expect("begin");
    let mut stored = Vec::with_capacity(entities.len());
    for entity in entities {
        stored.push(tx.merge(entity).await.expect("merge"));
    }
    tx.commit().await.expect("commit");
    stored
}
