//! Per-resource behaviour hooks
//!
//! An [`EntityResource`](super::EntityResource) delegates every policy
//! decision to a [`ResourceHooks`] implementation: who is logged in, which
//! rows a caller may see, who may write or delete what, and how payloads are
//! adjusted around a merge or before they are sent. Only the two
//! authorization hooks are required; the rest default to no-ops.
//!
//! ```rust
//! use entity_resource::handlers::{RequestContext, ResourceHooks};
//! use entity_resource::repository::FilterCondition;
//! # use entity_resource::entity::{Entity, PersistStamp};
//! # use serde::{Deserialize, Serialize};
//! # #[derive(Debug, Clone, Serialize, Deserialize)]
//! # struct Note { id: Option<i64>, author: String }
//! # impl Entity for Note {
//! #     type Id = i64;
//! #     const NAME: &'static str = "Note";
//! #     fn id(&self) -> Option<&i64> { self.id.as_ref() }
//! #     fn apply_stamp(&mut self, stamp: PersistStamp<i64>) { self.id = Some(stamp.id); }
//! # }
//!
//! struct OwnNotesOnly;
//!
//! impl ResourceHooks<Note> for OwnNotesOnly {
//!     fn is_logged_in(&self, ctx: &RequestContext) -> bool {
//!         ctx.header("x-user").is_some()
//!     }
//!
//!     fn predicates(&self, ctx: &RequestContext) -> Vec<FilterCondition> {
//!         vec![FilterCondition::eq("author", ctx.header("x-user").unwrap_or_default())]
//!     }
//!
//!     fn can_merge(&self, ctx: &RequestContext, _old: Option<&Note>, new: &Note) -> bool {
//!         ctx.header("x-user") == Some(new.author.as_str())
//!     }
//!
//!     fn can_delete(&self, ctx: &RequestContext, note: &Note) -> bool {
//!         ctx.header("x-user") == Some(note.author.as_str())
//!     }
//! }
//! ```

use crate::entity::Entity;
use crate::repository::FilterCondition;

use super::error::ApiError;
use super::query::RequestContext;

/// Policy and lifecycle hooks for one entity type
pub trait ResourceHooks<E: Entity>: Send + Sync + 'static {
    /// Login status of the caller
    fn is_logged_in(&self, _ctx: &RequestContext) -> bool {
        false
    }

    /// Extra predicates restricting every read, ANDed together
    fn predicates(&self, _ctx: &RequestContext) -> Vec<FilterCondition> {
        Vec::new()
    }

    /// Whether the caller may write `new`; `old` is the stored state, if any
    fn can_merge(&self, ctx: &RequestContext, old: Option<&E>, new: &E) -> bool;

    /// Whether the caller may delete `entity`
    fn can_delete(&self, ctx: &RequestContext, entity: &E) -> bool;

    /// Adjust a payload inside the save transaction, before it is merged
    ///
    /// Returning an error aborts and rolls back the whole batch.
    fn before_merge(
        &self,
        _ctx: &RequestContext,
        _old: Option<&E>,
        _new: &mut E,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    /// Inspect a merged entity inside the save transaction
    ///
    /// Returning an error aborts and rolls back the whole batch.
    fn after_merge(&self, _ctx: &RequestContext, _merged: &E) -> Result<(), ApiError> {
        Ok(())
    }

    /// Adjust entities right before they are returned to the caller
    fn before_send(&self, _ctx: &RequestContext, _entities: &mut [E]) {}
}

/// Hooks that permit every operation and treat every caller as logged in
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl<E: Entity> ResourceHooks<E> for AllowAll {
    fn is_logged_in(&self, _ctx: &RequestContext) -> bool {
        true
    }

    fn can_merge(&self, _ctx: &RequestContext, _old: Option<&E>, _new: &E) -> bool {
        true
    }

    fn can_delete(&self, _ctx: &RequestContext, _entity: &E) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Person;

    struct Minimal;

    impl ResourceHooks<Person> for Minimal {
        fn can_merge(&self, _: &RequestContext, _: Option<&Person>, _: &Person) -> bool {
            false
        }

        fn can_delete(&self, _: &RequestContext, _: &Person) -> bool {
            false
        }
    }

    #[test]
    fn test_defaults() {
        let ctx = RequestContext::new();
        let mut person = Person::in_town("Chicago");

        assert!(!Minimal.is_logged_in(&ctx));
        assert!(Minimal.predicates(&ctx).is_empty());
        assert!(Minimal.before_merge(&ctx, None, &mut person).is_ok());
        assert!(Minimal.after_merge(&ctx, &person).is_ok());

        let mut batch = vec![person.clone()];
        Minimal.before_send(&ctx, &mut batch);
        assert_eq!(batch, vec![person]);
    }

    #[test]
    fn test_allow_all() {
        let ctx = RequestContext::new();
        let person = Person::in_town("Chicago");
        assert!(ResourceHooks::<Person>::is_logged_in(&AllowAll, &ctx));
        assert!(AllowAll.can_merge(&ctx, None, &person));
        assert!(AllowAll.can_delete(&ctx, &person));
    }
}
