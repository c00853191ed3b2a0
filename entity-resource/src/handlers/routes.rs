//! Axum router exposing an [`EntityResource`]
//!
//! | Method | Path    | Operation                  |
//! |--------|---------|----------------------------|
//! | GET    | `/`     | list one page              |
//! | POST   | `/`     | batch create or update     |
//! | DELETE | `/`     | delete everything visible  |
//! | GET    | `/{id}` | fetch one entity           |
//! | DELETE | `/{id}` | delete one entity          |
//!
//! Malformed bodies, unparsable ids and unknown routes answer with the same
//! error shape as the resource operations. Login is checked before the body
//! or id is parsed. Mount the router with
//! [`Router::nest`] to give each entity type its own prefix.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, Uri},
    routing::get,
    Json, Router,
};

use crate::entity::Entity;
use crate::repository::EntityStore;

use super::error::{ApiError, ApiErrorKind, ApiOperation};
use super::hooks::ResourceHooks;
use super::query::{QueryParams, RequestContext};
use super::resource::EntityResource;
use super::response::{ItemResponse, ListResponse, NoContent};

type Shared<E, S, H> = State<Arc<EntityResource<E, S, H>>>;
type RawPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// Build the router for one entity resource
pub fn entity_router<E, S, H>(resource: Arc<EntityResource<E, S, H>>) -> Router
where
    E: Entity,
    S: EntityStore<E>,
    H: ResourceHooks<E>,
{
    Router::new()
        .route(
            "/",
            get(list::<E, S, H>)
                .post(save::<E, S, H>)
                .delete(delete_all::<E, S, H>),
        )
        .route("/{id}", get(get_one::<E, S, H>).delete(delete_one::<E, S, H>))
        .fallback(unknown_route)
        .with_state(resource)
}

fn context(query: RawPairs, headers: HeaderMap) -> RequestContext {
    let params = match query {
        Ok(Query(pairs)) => QueryParams::from_pairs(pairs),
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Ignoring unparsable query string");
            QueryParams::new()
        }
    };
    RequestContext::from_parts(params, headers)
}

fn bad_path(rejection: PathRejection, operation: ApiOperation) -> ApiError {
    ApiError::bad_request(rejection.body_text()).with_operation(operation)
}

async fn list<E, S, H>(
    State(resource): Shared<E, S, H>,
    query: RawPairs,
    headers: HeaderMap,
) -> Result<ListResponse<E>, ApiError>
where
    E: Entity,
    S: EntityStore<E>,
    H: ResourceHooks<E>,
{
    resource.list(&context(query, headers)).await
}

async fn get_one<E, S, H>(
    State(resource): Shared<E, S, H>,
    id: Result<Path<E::Id>, PathRejection>,
    query: RawPairs,
    headers: HeaderMap,
) -> Result<ItemResponse<E>, ApiError>
where
    E: Entity,
    S: EntityStore<E>,
    H: ResourceHooks<E>,
{
    let ctx = context(query, headers);
    resource.check_access(&ctx, ApiOperation::Get)?;
    let Path(id) = id.map_err(|e| bad_path(e, ApiOperation::Get))?;
    resource.get(&ctx, &id).await.map(ItemResponse::new)
}

async fn save<E, S, H>(
    State(resource): Shared<E, S, H>,
    query: RawPairs,
    headers: HeaderMap,
    body: Result<Json<Vec<E>>, JsonRejection>,
) -> Result<ItemResponse<Vec<E>>, ApiError>
where
    E: Entity,
    S: EntityStore<E>,
    H: ResourceHooks<E>,
{
    let ctx = context(query, headers);
    resource.check_access(&ctx, ApiOperation::Save)?;
    let Json(payloads) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    resource.save(&ctx, payloads).await.map(ItemResponse::new)
}

async fn delete_one<E, S, H>(
    State(resource): Shared<E, S, H>,
    id: Result<Path<E::Id>, PathRejection>,
    query: RawPairs,
    headers: HeaderMap,
) -> Result<NoContent, ApiError>
where
    E: Entity,
    S: EntityStore<E>,
    H: ResourceHooks<E>,
{
    let ctx = context(query, headers);
    resource.check_access(&ctx, ApiOperation::Delete)?;
    let Path(id) = id.map_err(|e| bad_path(e, ApiOperation::Delete))?;
    resource.delete(&ctx, &id).await
}

async fn delete_all<E, S, H>(
    State(resource): Shared<E, S, H>,
    query: RawPairs,
    headers: HeaderMap,
) -> Result<NoContent, ApiError>
where
    E: Entity,
    S: EntityStore<E>,
    H: ResourceHooks<E>,
{
    resource.delete_all(&context(query, headers)).await
}

async fn unknown_route(uri: Uri) -> ApiError {
    ApiError::message(
        ApiOperation::Get,
        ApiErrorKind::NotFound,
        format!("No resource at {}", uri.path()),
    )
}
