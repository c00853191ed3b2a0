//! Generic CRUD resource over one entity type
//!
//! [`EntityResource`] ties an [`EntityStore`], a [`ResourceHooks`]
//! implementation and a [`ResourceConfig`] together and exposes the five
//! resource operations. Each returns an [`ApiError`] on failure, ready to be
//! rendered by the router.
//!
//! ```rust,ignore
//! use entity_resource::handlers::{AllowAll, EntityResource, RequestContext};
//! use entity_resource::repository::MemoryStore;
//!
//! let resource = EntityResource::new(MemoryStore::<Person>::new(), AllowAll);
//! let ctx = RequestContext::new();
//!
//! let saved = resource.save(&ctx, vec![person]).await?;
//! let page = resource
//!     .list(&ctx.clone().with_param("sort", "D|owner.town"))
//!     .await?;
//! ```

use std::marker::PhantomData;

use crate::config::{render, ResourceConfig};
use crate::entity::{Entity, EntityId};
use crate::repository::{
    within_transaction, EntityStore, FilterCondition, Pagination, QueryBuilder,
};

use super::error::{ApiError, ApiErrorKind, ApiOperation, ErrorDetail};
use super::hooks::ResourceHooks;
use super::merge::{
    authorization_failures, duplicate_ids, version_failures, MergeFailure, MergePass, RemoveAll,
};
use super::pagination::PageRequest;
use super::query::RequestContext;
use super::response::{ListResponse, NoContent};
use super::sort::parse_sorts;

/// CRUD resource for entity type `E` backed by store `S`
pub struct EntityResource<E, S, H> {
    store: S,
    hooks: H,
    config: ResourceConfig,
    _entity: PhantomData<fn() -> E>,
}

impl<E, S, H> EntityResource<E, S, H>
where
    E: Entity,
    S: EntityStore<E>,
    H: ResourceHooks<E>,
{
    /// Create a resource with the default configuration
    pub fn new(store: S, hooks: H) -> Self {
        Self {
            store,
            hooks,
            config: ResourceConfig::default(),
            _entity: PhantomData,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ResourceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Reject callers that are not logged in when login is required
    pub fn check_access(&self, ctx: &RequestContext, operation: ApiOperation) -> Result<(), ApiError> {
        if self.config.requires_login && !self.hooks.is_logged_in(ctx) {
            tracing::debug!(entity = E::NAME, %operation, "Rejecting anonymous caller");
            return Err(ApiError::message(
                operation,
                ApiErrorKind::Unauthorized,
                render(&self.config.messages.login_required, &[("entity", E::NAME)]),
            ));
        }
        Ok(())
    }

    /// One page of the entities visible to the caller
    pub async fn list(&self, ctx: &RequestContext) -> Result<ListResponse<E>, ApiError> {
        self.check_access(ctx, ApiOperation::List)?;

        let page = PageRequest::from_params(&ctx.params, &self.config.pagination);
        let sorts = parse_sorts(ctx.params.all(&self.config.sort.query_parameter), &self.config.sort);
        let builder = QueryBuilder::new()
            .filters(self.hooks.predicates(ctx))
            .sort(sorts)
            .paginate(page.to_pagination());

        let mut items = if page.count == Some(0) {
            Vec::new()
        } else {
            self.store
                .fetch(&builder.build())
                .await
                .map_err(|e| ApiError::from(e).with_operation(ApiOperation::List))?
        };
        let total = self
            .store
            .count(&builder.count_plan())
            .await
            .map_err(|e| ApiError::from(e).with_operation(ApiOperation::List))?;

        tracing::debug!(
            entity = E::NAME,
            start = page.start,
            count = ?page.count,
            returned = items.len(),
            total,
            "Listed entities"
        );

        self.hooks.before_send(ctx, &mut items);
        Ok(ListResponse::new(items, page, total, &self.config.pagination))
    }

    /// A single entity, if visible to the caller
    pub async fn get(&self, ctx: &RequestContext, id: &E::Id) -> Result<E, ApiError> {
        self.check_access(ctx, ApiOperation::Get)?;

        let entity = self.find_visible(ctx, id, ApiOperation::Get).await?;
        let mut batch = [entity];
        self.hooks.before_send(ctx, &mut batch);
        let [entity] = batch;
        Ok(entity)
    }

    /// Create or update a batch of entities in one transaction
    ///
    /// Validation runs over the whole batch before any write. The returned
    /// entities carry their stored id and version.
    pub async fn save(&self, ctx: &RequestContext, payloads: Vec<E>) -> Result<Vec<E>, ApiError> {
        self.check_access(ctx, ApiOperation::Save)?;
        let messages = &self.config.messages;

        if payloads.is_empty() {
            return Err(ApiError::bad_request(render(
                &messages.empty_body,
                &[("entity", E::NAME)],
            )));
        }

        let duplicates = duplicate_ids(&payloads);
        if !duplicates.is_empty() {
            let ids = duplicates
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ApiError::bad_request(render(
                &messages.duplicate_ids,
                &[("entity", E::NAME), ("ids", &ids)],
            )));
        }

        let ids: Vec<E::Id> = payloads.iter().filter_map(Entity::id).cloned().collect();
        let prior = self
            .store
            .find_by_ids(&ids)
            .await
            .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Save))?;

        let failures = authorization_failures(&self.hooks, ctx, &payloads, &prior, messages);
        if !failures.is_empty() {
            tracing::info!(entity = E::NAME, failures = failures.len(), "Save not authorized");
            return Err(ApiError::forbidden(failures));
        }

        let failures = version_failures(&payloads, &prior, messages);
        if !failures.is_empty() {
            tracing::info!(entity = E::NAME, failures = failures.len(), "Save rejected on stale versions");
            return Err(ApiError::conflict(failures));
        }

        let batch = payloads.len();
        let pass = MergePass {
            hooks: &self.hooks,
            ctx,
            payloads,
            prior: &prior,
        };
        let mut saved = within_transaction::<E, _, _>(&self.store, pass)
            .await
            .map_err(|failure| match failure {
                MergeFailure::Hook(error) => error.with_operation(ApiOperation::Save),
                MergeFailure::Store(error) => ApiError::persistence_failure(
                    &error,
                    &render(&messages.failed_save, &[("entity", E::NAME)]),
                )
                .with_operation(ApiOperation::Save),
            })?;

        tracing::info!(entity = E::NAME, batch, "Saved entities");

        self.hooks.before_send(ctx, &mut saved);
        Ok(saved)
    }

    /// Delete one entity visible to the caller
    pub async fn delete(&self, ctx: &RequestContext, id: &E::Id) -> Result<NoContent, ApiError> {
        self.check_access(ctx, ApiOperation::Delete)?;

        let entity = self.find_visible(ctx, id, ApiOperation::Delete).await?;
        if !self.hooks.can_delete(ctx, &entity) {
            return Err(ApiError::forbidden(vec![self.unauthorized_delete(id)])
                .with_operation(ApiOperation::Delete));
        }

        self.remove(vec![id.clone()], ApiOperation::Delete).await?;
        tracing::info!(entity = E::NAME, %id, "Deleted entity");
        Ok(NoContent)
    }

    /// Delete every entity visible to the caller, or none
    pub async fn delete_all(&self, ctx: &RequestContext) -> Result<NoContent, ApiError> {
        self.check_access(ctx, ApiOperation::DeleteAll)?;

        let plan = QueryBuilder::new()
            .filters(self.hooks.predicates(ctx))
            .paginate(Pagination::unbounded())
            .build();
        let entities = self
            .store
            .fetch(&plan)
            .await
            .map_err(|e| ApiError::from(e).with_operation(ApiOperation::DeleteAll))?;

        let failures: Vec<ErrorDetail> = entities
            .iter()
            .filter(|entity| !self.hooks.can_delete(ctx, entity))
            .filter_map(Entity::id)
            .map(|id| self.unauthorized_delete(id))
            .collect();
        if !failures.is_empty() {
            return Err(ApiError::forbidden(failures).with_operation(ApiOperation::DeleteAll));
        }

        let ids: Vec<E::Id> = entities.iter().filter_map(Entity::id).cloned().collect();
        let removed = self.remove(ids, ApiOperation::DeleteAll).await?;
        tracing::info!(entity = E::NAME, removed, "Deleted all visible entities");
        Ok(NoContent)
    }

    async fn find_visible(
        &self,
        ctx: &RequestContext,
        id: &E::Id,
        operation: ApiOperation,
    ) -> Result<E, ApiError> {
        let plan = QueryBuilder::new()
            .filters(self.hooks.predicates(ctx))
            .filter(FilterCondition::eq(E::ID_FIELD, id.to_filter_value()))
            .paginate(Pagination::new(0, Some(1)))
            .build();

        let found = self
            .store
            .fetch(&plan)
            .await
            .map_err(|e| ApiError::from(e).with_operation(operation))?;

        found.into_iter().next().ok_or_else(|| {
            let message = render(
                &self.config.messages.not_found,
                &[("entity", E::NAME), ("id", &id.to_string())],
            );
            ApiError::not_found(ErrorDetail::new(message).with_id(id)).with_operation(operation)
        })
    }

    async fn remove(&self, ids: Vec<E::Id>, operation: ApiOperation) -> Result<usize, ApiError> {
        within_transaction::<E, _, _>(&self.store, RemoveAll::<E> { ids })
            .await
            .map_err(|error| {
                ApiError::persistence_failure(
                    &error,
                    &render(&self.config.messages.failed_delete, &[("entity", E::NAME)]),
                )
                .with_operation(operation)
            })
    }

    fn unauthorized_delete(&self, id: &E::Id) -> ErrorDetail {
        ErrorDetail::new(render(
            &self.config.messages.unauthorized_delete,
            &[("entity", E::NAME), ("id", &id.to_string())],
        ))
        .with_id(id)
    }
}
