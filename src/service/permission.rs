//! Permission checks as a hook layer

use crate::core::access::Operation;
use crate::core::entity::Entity;
use crate::core::error::Error;
use crate::core::service::CrudService;
use crate::service::hooked::HookedService;
use crate::service::hooks::{HookFn, HookPoint};
use std::sync::Arc;

/// Wrap a service so every guarded operation checks the acting principal
///
/// Installs Before-hooks for create, find, update, delete, associate, and
/// dissociate. Each hook recomputes the principal's effective grants (direct
/// grants unioned with every role's grants) and vetoes the call with
/// `Error::PermissionDenied` when the (entity-kind, operation) pair is not
/// covered. Denied operations never reach the wrapped service, so the inner
/// layers see nothing.
pub fn permission_layer<E: Entity>(next: Arc<dyn CrudService<E>>) -> HookedService<E> {
    let mut service = HookedService::new(next);
    service.set_hook(HookPoint::BeforeCreate, check::<E>(Operation::Create));
    service.set_hook(HookPoint::BeforeFind, check::<E>(Operation::Read));
    service.set_hook(HookPoint::BeforeUpdate, check::<E>(Operation::Update));
    service.set_hook(HookPoint::BeforeDelete, check::<E>(Operation::Delete));
    service.set_hook(HookPoint::BeforeAssociate, check::<E>(Operation::Associate));
    service.set_hook(HookPoint::BeforeDissociate, check::<E>(Operation::Dissociate));
    service
}

fn check<E: Entity>(operation: Operation) -> HookFn<E> {
    Arc::new(move |ctx, _input| {
        Box::pin(async move {
            if ctx.principal.allows(E::kind(), operation) {
                return Ok(());
            }
            tracing::debug!(
                user = %ctx.principal.user_id,
                entity = %E::kind(),
                operation = %operation,
                "permission denied"
            );
            Err(Error::permission_denied(
                operation,
                E::kind(),
                ctx.principal.user_id,
            ))
        })
    })
}
