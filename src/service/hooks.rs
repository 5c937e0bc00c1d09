//! Hook points and the uniform hook callback shape

use crate::core::context::RequestContext;
use crate::core::error::{Error, Result};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;

/// The closed set of lifecycle hook points
///
/// One Before/After/OnFail triple per operation group. `update_field` shares
/// the update triple and `find_one`/`find_all` share the find triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    BeforeCreate,
    AfterCreate,
    OnCreateFail,
    BeforeUpdate,
    AfterUpdate,
    OnUpdateFail,
    BeforeDelete,
    AfterDelete,
    OnDeleteFail,
    BeforeFind,
    AfterFind,
    OnFindFail,
    BeforeCount,
    AfterCount,
    OnCountFail,
    BeforeAssociate,
    AfterAssociate,
    OnAssociateFail,
    BeforeDissociate,
    AfterDissociate,
    OnDissociateFail,
    BeforeExists,
    AfterExists,
    OnExistsFail,
    BeforeRandom,
    AfterRandom,
    OnRandomFail,
    BeforeFirst,
    AfterFirst,
    OnFirstFail,
    BeforeCombo,
    AfterCombo,
    OnComboFail,
}

/// What a hook gets to look at: the entities in flight and, at OnFail
/// points, the storage error
#[derive(Debug)]
pub struct HookInput<'a, E> {
    pub entities: &'a [E],
    pub error: Option<&'a Error>,
}

impl<'a, E> HookInput<'a, E> {
    /// No entities in flight (count, exists, and the Before side of reads)
    pub fn empty() -> Self {
        Self {
            entities: &[],
            error: None,
        }
    }

    pub fn of(entities: &'a [E]) -> Self {
        Self {
            entities,
            error: None,
        }
    }

    pub fn failed(entities: &'a [E], error: &'a Error) -> Self {
        Self {
            entities,
            error: Some(error),
        }
    }

    /// The single entity in flight, when there is one
    pub fn entity(&self) -> Option<&'a E> {
        self.entities.first()
    }
}

/// Uniform hook callback: borrow the context and input, return a boxed future
pub type HookFn<E> = Arc<
    dyn for<'a> Fn(&'a RequestContext, HookInput<'a, E>) -> BoxFuture<'a, Result<()>>
        + Send
        + Sync,
>;

/// A table of installed hooks, keyed by hook point
///
/// At most one hook per point; setting again replaces. Layering two
/// behaviors on the same point is done by stacking services, not by
/// chaining hooks inside one table.
pub struct HookSet<E> {
    hooks: HashMap<HookPoint, HookFn<E>>,
}

impl<E> HookSet<E> {
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    pub fn set(&mut self, point: HookPoint, hook: HookFn<E>) {
        self.hooks.insert(point, hook);
    }

    /// Remove the hook at a point, reporting whether one was installed
    pub fn remove(&mut self, point: HookPoint) -> bool {
        self.hooks.remove(&point).is_some()
    }

    pub fn get(&self, point: HookPoint) -> Option<&HookFn<E>> {
        self.hooks.get(&point)
    }

    pub fn contains(&self, point: HookPoint) -> bool {
        self.hooks.contains_key(&point)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl<E> Default for HookSet<E> {
    fn default() -> Self {
        Self::new()
    }
}
