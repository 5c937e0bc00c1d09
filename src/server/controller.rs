//! Generic HTTP handlers over any [`CrudService`]
//!
//! Every handler is generic in the entity type and completely
//! entity-agnostic: the router instantiates one copy per exposed entity,
//! all sharing a [`CrudState`].

use crate::config::PaginationConfig;
use crate::core::context::{RequestContext, RequestOrigin};
use crate::core::entity::{ComboOption, Entity};
use crate::core::page::Page;
use crate::core::service::CrudService;
use crate::server::error::ApiError;
use crate::server::principal::PrincipalResolver;
use crate::server::query::{ExistsQuery, ListQuery};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

/// State shared by every handler of one entity's router
pub struct CrudState<E: Entity> {
    pub service: Arc<dyn CrudService<E>>,
    pub resolver: Arc<dyn PrincipalResolver>,
    pub pagination: Arc<PaginationConfig>,
}

impl<E: Entity> Clone for CrudState<E> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            resolver: self.resolver.clone(),
            pagination: self.pagination.clone(),
        }
    }
}

/// Assemble the per-request context: resolved principal plus origin metadata
async fn request_context<E: Entity>(
    state: &CrudState<E>,
    headers: &HeaderMap,
) -> Result<RequestContext, ApiError> {
    let principal = state.resolver.resolve(headers).await?;
    Ok(RequestContext::new(principal).with_origin(origin_from_headers(headers)))
}

fn origin_from_headers(headers: &HeaderMap) -> RequestOrigin {
    // x-forwarded-for may carry a proxy chain; the first hop is the caller.
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown");
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");
    RequestOrigin::new(ip, user_agent)
}

/// GET / — paginated listing
pub async fn list<E: Entity>(
    State(state): State<CrudState<E>>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<Page<E>>, ApiError> {
    let ctx = request_context(&state, &headers).await?;
    let filter = query.filter()?;
    let order = query.order()?;
    let relations = query.relations();
    let page = state
        .service
        .find_all(
            &ctx,
            query.pageable(&state.pagination),
            filter.as_ref(),
            &relations,
            &order,
        )
        .await?;
    Ok(Json(page))
}

/// GET /count — row count for an optional filter
pub async fn count<E: Entity>(
    State(state): State<CrudState<E>>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let ctx = request_context(&state, &headers).await?;
    let filter = query.filter()?;
    let count = state.service.count(&ctx, filter.as_ref()).await?;
    Ok(Json(json!({ "count": count })))
}

/// GET /exists?id= — existence probe
pub async fn exists<E: Entity>(
    State(state): State<CrudState<E>>,
    Query(query): Query<ExistsQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let ctx = request_context(&state, &headers).await?;
    let exists = state.service.exists(&ctx, query.id).await?;
    Ok(Json(json!({ "exists": exists })))
}

/// GET /random — one uniformly drawn row
pub async fn random<E: Entity>(
    State(state): State<CrudState<E>>,
    headers: HeaderMap,
) -> Result<Json<E>, ApiError> {
    let ctx = request_context(&state, &headers).await?;
    let entity = state.service.random(&ctx).await?;
    Ok(Json(entity))
}

/// GET /first — first row matching an optional filter
pub async fn first<E: Entity>(
    State(state): State<CrudState<E>>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<E>, ApiError> {
    let ctx = request_context(&state, &headers).await?;
    let filter = query.filter()?;
    let entity = state.service.first(&ctx, filter.as_ref()).await?;
    Ok(Json(entity))
}

/// GET /combo — paginated (id, name) picker options
pub async fn combo<E: Entity>(
    State(state): State<CrudState<E>>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<Page<ComboOption>>, ApiError> {
    let ctx = request_context(&state, &headers).await?;
    let filter = query.filter()?;
    let order = query.order()?;
    let relations = query.relations();
    let page = state
        .service
        .combo_box(
            &ctx,
            query.pageable(&state.pagination),
            filter.as_ref(),
            &relations,
            &order,
        )
        .await?;
    Ok(Json(page))
}

/// POST / — create from a JSON body
pub async fn create<E: Entity>(
    State(state): State<CrudState<E>>,
    headers: HeaderMap,
    payload: Result<Json<E>, JsonRejection>,
) -> Result<Json<E>, ApiError> {
    let Json(payload) = payload?;
    let ctx = request_context(&state, &headers).await?;
    let created = state.service.create(&ctx, payload).await?;
    Ok(Json(created))
}

/// GET /{id} — fetch one row, optionally preloading relations
pub async fn find_one<E: Entity>(
    State(state): State<CrudState<E>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<E>, ApiError> {
    let ctx = request_context(&state, &headers).await?;
    let relations = query.relations();
    let entity = state.service.find_one(&ctx, id, &relations).await?;
    Ok(Json(entity))
}

/// PUT|PATCH /{id} — full replace; the path id overrides the body id
pub async fn update<E: Entity>(
    State(state): State<CrudState<E>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    payload: Result<Json<E>, JsonRejection>,
) -> Result<Json<E>, ApiError> {
    let Json(mut payload) = payload?;
    payload.set_id(id);
    let ctx = request_context(&state, &headers).await?;
    let updated = state.service.update(&ctx, payload).await?;
    Ok(Json(updated))
}

/// DELETE /{id} — 204 with empty body on success
pub async fn delete<E: Entity + Default>(
    State(state): State<CrudState<E>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let ctx = request_context(&state, &headers).await?;
    let mut payload = E::default();
    payload.set_id(id);
    state.service.delete(&ctx, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{id}/{association}/{target} — link two rows
pub async fn associate<E: Entity>(
    State(state): State<CrudState<E>>,
    Path((id, association, target)): Path<(Uuid, String, Uuid)>,
    headers: HeaderMap,
) -> Result<Json<E>, ApiError> {
    let ctx = request_context(&state, &headers).await?;
    let entity = state
        .service
        .associate(&ctx, id, &association, target)
        .await?;
    Ok(Json(entity))
}

/// DELETE /{id}/{association}/{target} — unlink two rows
pub async fn dissociate<E: Entity>(
    State(state): State<CrudState<E>>,
    Path((id, association, target)): Path<(Uuid, String, Uuid)>,
    headers: HeaderMap,
) -> Result<Json<E>, ApiError> {
    let ctx = request_context(&state, &headers).await?;
    let entity = state
        .service
        .dissociate(&ctx, id, &association, target)
        .await?;
    Ok(Json(entity))
}
