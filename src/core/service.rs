//! The CRUD contract shared by storage adapters, hooked services, and decorators

use crate::core::context::RequestContext;
use crate::core::entity::{ComboOption, Entity};
use crate::core::error::Result;
use crate::core::field::FieldValue;
use crate::core::filter::Filter;
use crate::core::order::OrderBy;
use crate::core::page::{Page, Pageable};
use crate::core::relation::Relation;
use async_trait::async_trait;
use uuid::Uuid;

/// CRUD operations over a single entity type
///
/// Storage adapters implement this directly; `HookedService` and the
/// permission/audit layers implement it by wrapping another implementation.
/// Because every layer speaks the same contract, stacks compose freely and
/// the controller never knows how deep the stack is.
#[async_trait]
pub trait CrudService<E: Entity>: Send + Sync {
    /// Persist a new entity, assigning an id when the payload carries none
    async fn create(&self, ctx: &RequestContext, payload: E) -> Result<E>;

    /// Replace a stored entity wholesale
    async fn update(&self, ctx: &RequestContext, payload: E) -> Result<E>;

    /// Patch a single field of the stored entity identified by the payload
    async fn update_field(
        &self,
        ctx: &RequestContext,
        payload: E,
        field: &str,
        value: FieldValue,
    ) -> Result<E>;

    /// Remove the entity identified by the payload
    async fn delete(&self, ctx: &RequestContext, payload: E) -> Result<()>;

    /// Fetch one entity by id, preloading the named relations
    async fn find_one(&self, ctx: &RequestContext, id: Uuid, relations: &[Relation]) -> Result<E>;

    /// Fetch a page of entities
    ///
    /// Page metadata reports both the unfiltered total and the filtered
    /// count, so implementations run two counts plus the data query.
    async fn find_all(
        &self,
        ctx: &RequestContext,
        pageable: Pageable,
        filter: Option<&Filter>,
        relations: &[Relation],
        order: &[OrderBy],
    ) -> Result<Page<E>>;

    /// Count entities matching the filter
    async fn count(&self, ctx: &RequestContext, filter: Option<&Filter>) -> Result<u64>;

    /// Link a target entity under a named association and return the source
    async fn associate(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        association: &str,
        target_id: Uuid,
    ) -> Result<E>;

    /// Remove a link created by [`associate`](CrudService::associate)
    async fn dissociate(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        association: &str,
        target_id: Uuid,
    ) -> Result<E>;

    /// Whether an entity with this id exists
    async fn exists(&self, ctx: &RequestContext, id: Uuid) -> Result<bool>;

    /// Pick one stored entity uniformly at random
    async fn random(&self, ctx: &RequestContext) -> Result<E>;

    /// The first entity matching the filter, in insertion order
    async fn first(&self, ctx: &RequestContext, filter: Option<&Filter>) -> Result<E>;

    /// A page of (id, display-name) projections for UI pickers
    async fn combo_box(
        &self,
        ctx: &RequestContext,
        pageable: Pageable,
        filter: Option<&Filter>,
        relations: &[Relation],
        order: &[OrderBy],
    ) -> Result<Page<ComboOption>>;
}
