//! Hook-running wrapper around any CRUD service

use crate::core::context::RequestContext;
use crate::core::entity::{ComboOption, Entity};
use crate::core::error::Result;
use crate::core::field::FieldValue;
use crate::core::filter::Filter;
use crate::core::order::OrderBy;
use crate::core::page::{Page, Pageable};
use crate::core::relation::Relation;
use crate::core::service::CrudService;
use crate::service::hooks::{HookFn, HookInput, HookPoint, HookSet};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::slice;
use std::sync::Arc;
use uuid::Uuid;

macro_rules! typed_setters {
    ($( $setter:ident => $point:ident ),* $(,)?) => {
        $(
            pub fn $setter<F>(&mut self, hook: F)
            where
                F: for<'a> Fn(&'a RequestContext, HookInput<'a, E>) -> BoxFuture<'a, Result<()>>
                    + Send
                    + Sync
                    + 'static,
            {
                self.hooks.set(HookPoint::$point, Arc::new(hook));
            }
        )*
    };
}

/// Wraps a CRUD service and runs the installed hooks around every operation
///
/// The orchestration per call is fixed: the Before hook may veto (the inner
/// service is never reached), then exactly one of After (on success) or
/// OnFail (on error) runs. An OnFail error replaces the storage error; an
/// After error propagates even though the operation already completed.
///
/// Hooks are installed while the service is still exclusively owned, at
/// startup. Once wrapped in an `Arc` the table is read-only, which is what
/// makes composed stacks safe to share across requests.
pub struct HookedService<E: Entity> {
    next: Arc<dyn CrudService<E>>,
    hooks: HookSet<E>,
}

impl<E: Entity> HookedService<E> {
    pub fn new(next: Arc<dyn CrudService<E>>) -> Self {
        Self {
            next,
            hooks: HookSet::new(),
        }
    }

    /// The wrapped service
    pub fn inner(&self) -> &Arc<dyn CrudService<E>> {
        &self.next
    }

    /// Install a hook at a point, replacing any previous one
    pub fn set_hook(&mut self, point: HookPoint, hook: HookFn<E>) {
        self.hooks.set(point, hook);
    }

    /// Remove the hook at a point, reporting whether one was installed
    pub fn remove_hook(&mut self, point: HookPoint) -> bool {
        self.hooks.remove(point)
    }

    pub fn has_hook(&self, point: HookPoint) -> bool {
        self.hooks.contains(point)
    }

    pub fn hook(&self, point: HookPoint) -> Option<&HookFn<E>> {
        self.hooks.get(point)
    }

    // Typed convenience setters, one per hook point.
    typed_setters!(
        on_before_create => BeforeCreate,
        on_after_create => AfterCreate,
        on_create_fail => OnCreateFail,
        on_before_update => BeforeUpdate,
        on_after_update => AfterUpdate,
        on_update_fail => OnUpdateFail,
        on_before_delete => BeforeDelete,
        on_after_delete => AfterDelete,
        on_delete_fail => OnDeleteFail,
        on_before_find => BeforeFind,
        on_after_find => AfterFind,
        on_find_fail => OnFindFail,
        on_before_count => BeforeCount,
        on_after_count => AfterCount,
        on_count_fail => OnCountFail,
        on_before_associate => BeforeAssociate,
        on_after_associate => AfterAssociate,
        on_associate_fail => OnAssociateFail,
        on_before_dissociate => BeforeDissociate,
        on_after_dissociate => AfterDissociate,
        on_dissociate_fail => OnDissociateFail,
        on_before_exists => BeforeExists,
        on_after_exists => AfterExists,
        on_exists_fail => OnExistsFail,
        on_before_random => BeforeRandom,
        on_after_random => AfterRandom,
        on_random_fail => OnRandomFail,
        on_before_first => BeforeFirst,
        on_after_first => AfterFirst,
        on_first_fail => OnFirstFail,
        on_before_combo => BeforeCombo,
        on_after_combo => AfterCombo,
        on_combo_fail => OnComboFail,
    );

    async fn run_hook<'a>(
        &'a self,
        point: HookPoint,
        ctx: &'a RequestContext,
        input: HookInput<'a, E>,
    ) -> Result<()> {
        match self.hooks.get(point) {
            Some(hook) => hook(ctx, input).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<E: Entity> CrudService<E> for HookedService<E> {
    async fn create(&self, ctx: &RequestContext, payload: E) -> Result<E> {
        self.run_hook(
            HookPoint::BeforeCreate,
            ctx,
            HookInput::of(slice::from_ref(&payload)),
        )
        .await?;

        match self.next.create(ctx, payload).await {
            Ok(created) => {
                self.run_hook(
                    HookPoint::AfterCreate,
                    ctx,
                    HookInput::of(slice::from_ref(&created)),
                )
                .await?;
                Ok(created)
            }
            Err(err) => {
                self.run_hook(HookPoint::OnCreateFail, ctx, HookInput::failed(&[], &err))
                    .await?;
                Err(err)
            }
        }
    }

    async fn update(&self, ctx: &RequestContext, payload: E) -> Result<E> {
        self.run_hook(
            HookPoint::BeforeUpdate,
            ctx,
            HookInput::of(slice::from_ref(&payload)),
        )
        .await?;

        match self.next.update(ctx, payload).await {
            Ok(updated) => {
                self.run_hook(
                    HookPoint::AfterUpdate,
                    ctx,
                    HookInput::of(slice::from_ref(&updated)),
                )
                .await?;
                Ok(updated)
            }
            Err(err) => {
                self.run_hook(HookPoint::OnUpdateFail, ctx, HookInput::failed(&[], &err))
                    .await?;
                Err(err)
            }
        }
    }

    async fn update_field(
        &self,
        ctx: &RequestContext,
        payload: E,
        field: &str,
        value: FieldValue,
    ) -> Result<E> {
        // Single-field patches run through the update hook triple.
        self.run_hook(
            HookPoint::BeforeUpdate,
            ctx,
            HookInput::of(slice::from_ref(&payload)),
        )
        .await?;

        match self.next.update_field(ctx, payload, field, value).await {
            Ok(updated) => {
                self.run_hook(
                    HookPoint::AfterUpdate,
                    ctx,
                    HookInput::of(slice::from_ref(&updated)),
                )
                .await?;
                Ok(updated)
            }
            Err(err) => {
                self.run_hook(HookPoint::OnUpdateFail, ctx, HookInput::failed(&[], &err))
                    .await?;
                Err(err)
            }
        }
    }

    async fn delete(&self, ctx: &RequestContext, payload: E) -> Result<()> {
        self.run_hook(
            HookPoint::BeforeDelete,
            ctx,
            HookInput::of(slice::from_ref(&payload)),
        )
        .await?;

        let staged = payload.clone();
        match self.next.delete(ctx, payload).await {
            Ok(()) => {
                self.run_hook(
                    HookPoint::AfterDelete,
                    ctx,
                    HookInput::of(slice::from_ref(&staged)),
                )
                .await?;
                Ok(())
            }
            Err(err) => {
                self.run_hook(
                    HookPoint::OnDeleteFail,
                    ctx,
                    HookInput::failed(slice::from_ref(&staged), &err),
                )
                .await?;
                Err(err)
            }
        }
    }

    async fn find_one(&self, ctx: &RequestContext, id: Uuid, relations: &[Relation]) -> Result<E> {
        self.run_hook(HookPoint::BeforeFind, ctx, HookInput::empty())
            .await?;

        match self.next.find_one(ctx, id, relations).await {
            Ok(found) => {
                self.run_hook(
                    HookPoint::AfterFind,
                    ctx,
                    HookInput::of(slice::from_ref(&found)),
                )
                .await?;
                Ok(found)
            }
            Err(err) => {
                self.run_hook(HookPoint::OnFindFail, ctx, HookInput::failed(&[], &err))
                    .await?;
                Err(err)
            }
        }
    }

    async fn find_all(
        &self,
        ctx: &RequestContext,
        pageable: Pageable,
        filter: Option<&Filter>,
        relations: &[Relation],
        order: &[OrderBy],
    ) -> Result<Page<E>> {
        self.run_hook(HookPoint::BeforeFind, ctx, HookInput::empty())
            .await?;

        match self
            .next
            .find_all(ctx, pageable, filter, relations, order)
            .await
        {
            Ok(page) => {
                self.run_hook(HookPoint::AfterFind, ctx, HookInput::of(&page.content))
                    .await?;
                Ok(page)
            }
            Err(err) => {
                self.run_hook(HookPoint::OnFindFail, ctx, HookInput::failed(&[], &err))
                    .await?;
                Err(err)
            }
        }
    }

    async fn count(&self, ctx: &RequestContext, filter: Option<&Filter>) -> Result<u64> {
        self.run_hook(HookPoint::BeforeCount, ctx, HookInput::empty())
            .await?;

        match self.next.count(ctx, filter).await {
            Ok(count) => {
                self.run_hook(HookPoint::AfterCount, ctx, HookInput::empty())
                    .await?;
                Ok(count)
            }
            Err(err) => {
                self.run_hook(HookPoint::OnCountFail, ctx, HookInput::failed(&[], &err))
                    .await?;
                Err(err)
            }
        }
    }

    async fn associate(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        association: &str,
        target_id: Uuid,
    ) -> Result<E> {
        self.run_hook(HookPoint::BeforeAssociate, ctx, HookInput::empty())
            .await?;

        match self.next.associate(ctx, id, association, target_id).await {
            Ok(entity) => {
                self.run_hook(
                    HookPoint::AfterAssociate,
                    ctx,
                    HookInput::of(slice::from_ref(&entity)),
                )
                .await?;
                Ok(entity)
            }
            Err(err) => {
                self.run_hook(
                    HookPoint::OnAssociateFail,
                    ctx,
                    HookInput::failed(&[], &err),
                )
                .await?;
                Err(err)
            }
        }
    }

    async fn dissociate(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        association: &str,
        target_id: Uuid,
    ) -> Result<E> {
        self.run_hook(HookPoint::BeforeDissociate, ctx, HookInput::empty())
            .await?;

        match self.next.dissociate(ctx, id, association, target_id).await {
            Ok(entity) => {
                self.run_hook(
                    HookPoint::AfterDissociate,
                    ctx,
                    HookInput::of(slice::from_ref(&entity)),
                )
                .await?;
                Ok(entity)
            }
            Err(err) => {
                self.run_hook(
                    HookPoint::OnDissociateFail,
                    ctx,
                    HookInput::failed(&[], &err),
                )
                .await?;
                Err(err)
            }
        }
    }

    async fn exists(&self, ctx: &RequestContext, id: Uuid) -> Result<bool> {
        self.run_hook(HookPoint::BeforeExists, ctx, HookInput::empty())
            .await?;

        match self.next.exists(ctx, id).await {
            Ok(found) => {
                self.run_hook(HookPoint::AfterExists, ctx, HookInput::empty())
                    .await?;
                Ok(found)
            }
            Err(err) => {
                self.run_hook(HookPoint::OnExistsFail, ctx, HookInput::failed(&[], &err))
                    .await?;
                Err(err)
            }
        }
    }

    async fn random(&self, ctx: &RequestContext) -> Result<E> {
        self.run_hook(HookPoint::BeforeRandom, ctx, HookInput::empty())
            .await?;

        match self.next.random(ctx).await {
            Ok(entity) => {
                self.run_hook(
                    HookPoint::AfterRandom,
                    ctx,
                    HookInput::of(slice::from_ref(&entity)),
                )
                .await?;
                Ok(entity)
            }
            Err(err) => {
                self.run_hook(HookPoint::OnRandomFail, ctx, HookInput::failed(&[], &err))
                    .await?;
                Err(err)
            }
        }
    }

    async fn first(&self, ctx: &RequestContext, filter: Option<&Filter>) -> Result<E> {
        self.run_hook(HookPoint::BeforeFirst, ctx, HookInput::empty())
            .await?;

        match self.next.first(ctx, filter).await {
            Ok(entity) => {
                self.run_hook(
                    HookPoint::AfterFirst,
                    ctx,
                    HookInput::of(slice::from_ref(&entity)),
                )
                .await?;
                Ok(entity)
            }
            Err(err) => {
                self.run_hook(HookPoint::OnFirstFail, ctx, HookInput::failed(&[], &err))
                    .await?;
                Err(err)
            }
        }
    }

    async fn combo_box(
        &self,
        ctx: &RequestContext,
        pageable: Pageable,
        filter: Option<&Filter>,
        relations: &[Relation],
        order: &[OrderBy],
    ) -> Result<Page<ComboOption>> {
        self.run_hook(HookPoint::BeforeCombo, ctx, HookInput::empty())
            .await?;

        match self
            .next
            .combo_box(ctx, pageable, filter, relations, order)
            .await
        {
            Ok(page) => {
                self.run_hook(HookPoint::AfterCombo, ctx, HookInput::empty())
                    .await?;
                Ok(page)
            }
            Err(err) => {
                self.run_hook(HookPoint::OnComboFail, ctx, HookInput::failed(&[], &err))
                    .await?;
                Err(err)
            }
        }
    }
}
