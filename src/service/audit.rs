//! Hook set recording operation outcomes through an [`AuditSink`]

use crate::core::audit::{AuditAction, AuditOutcome, AuditRecord, AuditSink};
use crate::core::entity::Entity;
use crate::core::service::CrudService;
use crate::service::hooked::HookedService;
use crate::service::hooks::{HookFn, HookPoint};
use std::sync::Arc;

/// Wrap `next` with audit hooks for create, update, delete, find, and
/// associate
///
/// Before-hooks stamp the draft carried by the request context; After and
/// OnFail hooks finish it and persist through `sink`. Successful reads are
/// marked on the draft but never persisted; failed reads are. Dissociate
/// and the query helpers (count, exists, random, first, combo) leave no
/// trail.
pub fn audit_layer<E: Entity>(
    next: Arc<dyn CrudService<E>>,
    sink: Arc<dyn AuditSink>,
) -> HookedService<E> {
    let mut service = HookedService::new(next);

    service.set_hook(
        HookPoint::BeforeCreate,
        stamp_hook::<E>(AuditAction::Create, true),
    );
    service.set_hook(HookPoint::AfterCreate, persist_hook::<E>(sink.clone(), false));
    service.set_hook(HookPoint::OnCreateFail, failure_hook::<E>(sink.clone()));

    service.set_hook(
        HookPoint::BeforeUpdate,
        stamp_hook::<E>(AuditAction::Update, true),
    );
    service.set_hook(HookPoint::AfterUpdate, persist_hook::<E>(sink.clone(), true));
    service.set_hook(HookPoint::OnUpdateFail, failure_hook::<E>(sink.clone()));

    service.set_hook(
        HookPoint::BeforeDelete,
        stamp_hook::<E>(AuditAction::Delete, false),
    );
    service.set_hook(HookPoint::AfterDelete, persist_hook::<E>(sink.clone(), false));
    service.set_hook(HookPoint::OnDeleteFail, failure_hook::<E>(sink.clone()));

    service.set_hook(
        HookPoint::BeforeFind,
        stamp_hook::<E>(AuditAction::Read, false),
    );
    service.set_hook(HookPoint::AfterFind, mark_success_hook::<E>());
    service.set_hook(HookPoint::OnFindFail, failure_hook::<E>(sink.clone()));

    service.set_hook(
        HookPoint::BeforeAssociate,
        stamp_hook::<E>(AuditAction::Associate, false),
    );
    service.set_hook(HookPoint::AfterAssociate, persist_hook::<E>(sink.clone(), false));
    service.set_hook(HookPoint::OnAssociateFail, failure_hook::<E>(sink));

    service
}

/// Stamp the action, entity kind, and (when the input carries a payload)
/// entity id onto the draft; `capture_new_value` also snapshots the payload
fn stamp_hook<E: Entity>(action: AuditAction, capture_new_value: bool) -> HookFn<E> {
    Arc::new(move |ctx, input| {
        Box::pin(async move {
            ctx.with_audit(|draft| {
                draft.action = action;
                draft.entity = E::kind().as_str().to_string();
                if let Some(entity) = input.entity() {
                    draft.entity_id = entity.id();
                    if capture_new_value {
                        draft.new_value = snapshot(entity);
                    }
                }
            });
            Ok(())
        })
    })
}

/// Mark the draft successful and persist it; `capture_prev_value` first
/// snapshots the post-operation row
fn persist_hook<E: Entity>(sink: Arc<dyn AuditSink>, capture_prev_value: bool) -> HookFn<E> {
    Arc::new(move |ctx, input| {
        let sink = sink.clone();
        Box::pin(async move {
            ctx.with_audit(|draft| {
                draft.result = AuditOutcome::Success;
                if capture_prev_value {
                    if let Some(entity) = input.entity() {
                        draft.prev_value = snapshot(entity);
                    }
                }
            });
            sink.record(ctx, AuditRecord::from_context(ctx)).await
        })
    })
}

/// Mark the draft successful without persisting it
fn mark_success_hook<E: Entity>() -> HookFn<E> {
    Arc::new(|ctx, _input| {
        Box::pin(async move {
            ctx.with_audit(|draft| draft.result = AuditOutcome::Success);
            Ok(())
        })
    })
}

/// Mark the draft failed, attach the error message, and persist it
fn failure_hook<E: Entity>(sink: Arc<dyn AuditSink>) -> HookFn<E> {
    Arc::new(move |ctx, input| {
        let sink = sink.clone();
        Box::pin(async move {
            ctx.with_audit(|draft| {
                draft.result = AuditOutcome::Failure;
                if let Some(error) = input.error {
                    draft.message = error.to_string();
                }
            });
            sink.record(ctx, AuditRecord::from_context(ctx)).await
        })
    })
}

/// JSON snapshot of an entity; serialization failures degrade to an empty
/// string rather than poisoning the operation
fn snapshot<E: Entity>(entity: &E) -> String {
    serde_json::to_string(entity).unwrap_or_default()
}
