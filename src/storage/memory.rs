//! In-process storage adapter backed by ordered tables

use crate::core::context::RequestContext;
use crate::core::entity::{ComboOption, Entity, Record};
use crate::core::error::{Error, Result};
use crate::core::field::{FieldKind, FieldValue};
use crate::core::filter::{Comparator, Filter, LogicalOp};
use crate::core::order::{OrderBy, SortDirection};
use crate::core::page::{Page, Pageable};
use crate::core::relation::Relation;
use crate::core::service::CrudService;
use async_trait::async_trait;
use indexmap::IndexMap;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

type RowTable<E> = IndexMap<Uuid, E>;
type LinkTable = HashMap<String, BTreeSet<(Uuid, Uuid)>>;

/// Repository holding one table of rows plus named association pair sets
///
/// Rows keep insertion order, which defines the unsorted listing order and
/// the `first` row. Clones share the underlying tables.
#[derive(Clone)]
pub struct MemoryRepository<E: Entity> {
    rows: Arc<RwLock<RowTable<E>>>,
    links: Arc<RwLock<LinkTable>>,
}

impl<E: Entity> MemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(IndexMap::new())),
            links: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert rows directly, skipping the service stack; intended for setup code
    pub fn seed(&self, entities: impl IntoIterator<Item = E>) -> Result<()> {
        let mut rows = self.rows_mut()?;
        for mut entity in entities {
            if entity.id().is_nil() {
                entity.set_id(Uuid::new_v4());
            }
            rows.insert(entity.id(), entity);
        }
        Ok(())
    }

    /// Ids linked to `id` under the association `name`, in stable order
    pub fn linked_ids(&self, id: Uuid, name: &str) -> Result<Vec<Uuid>> {
        let links = self
            .links
            .read()
            .map_err(|e| Error::storage(format!("failed to acquire link read lock: {e}")))?;
        Ok(links
            .get(name)
            .map(|pairs| {
                pairs
                    .iter()
                    .filter(|(source, _)| *source == id)
                    .map(|(_, target)| *target)
                    .collect()
            })
            .unwrap_or_default())
    }

    fn rows_ref(&self) -> Result<RwLockReadGuard<'_, RowTable<E>>> {
        self.rows
            .read()
            .map_err(|e| Error::storage(format!("failed to acquire row read lock: {e}")))
    }

    fn rows_mut(&self) -> Result<RwLockWriteGuard<'_, RowTable<E>>> {
        self.rows
            .write()
            .map_err(|e| Error::storage(format!("failed to acquire row write lock: {e}")))
    }

    fn links_mut(&self) -> Result<RwLockWriteGuard<'_, LinkTable>> {
        self.links
            .write()
            .map_err(|e| Error::storage(format!("failed to acquire link write lock: {e}")))
    }

    /// Rows matching the filter, plus the size of the unfiltered universe
    fn filtered_rows(&self, filter: Option<&Filter>) -> Result<(Vec<E>, u64)> {
        let rows = self.rows_ref()?;
        let total = rows.len() as u64;
        let matched = rows
            .values()
            .filter(|row| filter.map_or(true, |f| row_matches(*row, f)))
            .cloned()
            .collect();
        Ok((matched, total))
    }

    fn require(&self, id: Uuid) -> Result<E> {
        let rows = self.rows_ref()?;
        rows.get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(E::kind(), Some(id)))
    }
}

impl<E: Entity> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> CrudService<E> for MemoryRepository<E> {
    async fn create(&self, ctx: &RequestContext, mut payload: E) -> Result<E> {
        ctx.check_deadline()?;
        let mut rows = self.rows_mut()?;
        if payload.id().is_nil() {
            payload.set_id(Uuid::new_v4());
        }
        let id = payload.id();
        if rows.contains_key(&id) {
            return Err(Error::storage(format!("{} row {id} already exists", E::kind())));
        }
        rows.insert(id, payload.clone());
        Ok(payload)
    }

    async fn update(&self, ctx: &RequestContext, payload: E) -> Result<E> {
        ctx.check_deadline()?;
        let mut rows = self.rows_mut()?;
        let id = payload.id();
        if !rows.contains_key(&id) {
            return Err(Error::not_found(E::kind(), Some(id)));
        }
        rows.insert(id, payload.clone());
        Ok(payload)
    }

    async fn update_field(
        &self,
        ctx: &RequestContext,
        payload: E,
        field: &str,
        value: FieldValue,
    ) -> Result<E> {
        ctx.check_deadline()?;
        let schema = E::schema();
        let Some(descriptor) = schema.field(field) else {
            return Err(Error::unknown_field(schema.name, field));
        };
        let mut rows = self.rows_mut()?;
        let id = payload.id();
        let stored = rows
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(E::kind(), Some(id)))?;
        if !stored.set(field, value.clone()) {
            let detail = match value.kind() {
                Some(kind) => format!("cannot assign {kind:?} to a {:?} field", descriptor.kind),
                None => "cannot assign null to a non-nullable field".to_string(),
            };
            return Err(Error::type_mismatch(field, detail));
        }
        Ok(stored.clone())
    }

    async fn delete(&self, ctx: &RequestContext, payload: E) -> Result<()> {
        ctx.check_deadline()?;
        let id = payload.id();
        {
            let mut rows = self.rows_mut()?;
            if rows.shift_remove(&id).is_none() {
                return Err(Error::not_found(E::kind(), Some(id)));
            }
        }
        // Drop link pairs on either side so listings never surface ghost ids.
        let mut links = self.links_mut()?;
        for pairs in links.values_mut() {
            pairs.retain(|(source, target)| *source != id && *target != id);
        }
        Ok(())
    }

    async fn find_one(&self, ctx: &RequestContext, id: Uuid, _relations: &[Relation]) -> Result<E> {
        ctx.check_deadline()?;
        // Rows embed no relation columns; preloads resolve through linked_ids.
        self.require(id)
    }

    async fn find_all(
        &self,
        ctx: &RequestContext,
        pageable: Pageable,
        filter: Option<&Filter>,
        _relations: &[Relation],
        order: &[OrderBy],
    ) -> Result<Page<E>> {
        ctx.check_deadline()?;
        let (mut matched, total) = self.filtered_rows(filter)?;
        let filtered = matched.len() as u64;
        if !order.is_empty() {
            matched.sort_by(|a, b| compare_rows(a, b, order));
        }
        let content: Vec<E> = matched
            .into_iter()
            .skip(pageable.offset())
            .take(pageable.size() as usize)
            .collect();
        Ok(Page::new(content, pageable, total, filtered))
    }

    async fn count(&self, ctx: &RequestContext, filter: Option<&Filter>) -> Result<u64> {
        ctx.check_deadline()?;
        let rows = self.rows_ref()?;
        Ok(rows
            .values()
            .filter(|row| filter.map_or(true, |f| row_matches(*row, f)))
            .count() as u64)
    }

    async fn associate(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        association: &str,
        target_id: Uuid,
    ) -> Result<E> {
        ctx.check_deadline()?;
        let source = self.require(id)?;
        let mut links = self.links_mut()?;
        links
            .entry(association.to_string())
            .or_default()
            .insert((id, target_id));
        Ok(source)
    }

    async fn dissociate(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        association: &str,
        target_id: Uuid,
    ) -> Result<E> {
        ctx.check_deadline()?;
        let source = self.require(id)?;
        let mut links = self.links_mut()?;
        if let Some(pairs) = links.get_mut(association) {
            pairs.remove(&(id, target_id));
        }
        Ok(source)
    }

    async fn exists(&self, ctx: &RequestContext, id: Uuid) -> Result<bool> {
        ctx.check_deadline()?;
        Ok(self.rows_ref()?.contains_key(&id))
    }

    async fn random(&self, ctx: &RequestContext) -> Result<E> {
        ctx.check_deadline()?;
        let rows = self.rows_ref()?;
        if rows.is_empty() {
            return Err(Error::not_found(E::kind(), None));
        }
        // A fresh v4 id supplies the entropy for the draw.
        let index = (Uuid::new_v4().as_u128() % rows.len() as u128) as usize;
        rows.get_index(index)
            .map(|(_, row)| row.clone())
            .ok_or_else(|| Error::not_found(E::kind(), None))
    }

    async fn first(&self, ctx: &RequestContext, filter: Option<&Filter>) -> Result<E> {
        ctx.check_deadline()?;
        let rows = self.rows_ref()?;
        rows.values()
            .find(|row| filter.map_or(true, |f| row_matches(*row, f)))
            .cloned()
            .ok_or_else(|| Error::not_found(E::kind(), None))
    }

    async fn combo_box(
        &self,
        ctx: &RequestContext,
        pageable: Pageable,
        filter: Option<&Filter>,
        _relations: &[Relation],
        order: &[OrderBy],
    ) -> Result<Page<ComboOption>> {
        ctx.check_deadline()?;
        let (mut matched, total) = self.filtered_rows(filter)?;
        let filtered = matched.len() as u64;
        if !order.is_empty() {
            matched.sort_by(|a, b| compare_rows(a, b, order));
        }
        let content: Vec<ComboOption> = matched
            .into_iter()
            .skip(pageable.offset())
            .take(pageable.size() as usize)
            .map(|row| ComboOption::of(&row))
            .collect();
        Ok(Page::new(content, pageable, total, filtered))
    }
}

// --- predicate evaluation ---

/// Evaluate a predicate tree against one row
fn row_matches<E: Record>(row: &E, filter: &Filter) -> bool {
    match filter {
        Filter::Leaf {
            field,
            comparator,
            value,
        } => leaf_matches(row, field, *comparator, value),
        Filter::Composite { op, children } => match op {
            LogicalOp::And => children.iter().all(|child| row_matches(row, child)),
            LogicalOp::Or => children.iter().any(|child| row_matches(row, child)),
            // `not` negates the conjunction of its children; the parser
            // emits exactly one.
            LogicalOp::Not => !children.iter().all(|child| row_matches(row, child)),
        },
    }
}

fn leaf_matches<E: Record>(row: &E, field: &str, comparator: Comparator, raw: &str) -> bool {
    let schema = E::schema();
    let Some(descriptor) = schema.field(field) else {
        return false;
    };
    let Some(actual) = row.get(field) else {
        return false;
    };
    // SQL three-valued logic on missing data: only `is_null` sees a null.
    if actual.is_null() {
        return comparator == Comparator::IsNull;
    }
    match comparator {
        Comparator::IsNull => false,
        Comparator::IsNotNull => true,
        Comparator::Eq => coerced_equals(&actual, descriptor.kind, raw).unwrap_or(false),
        Comparator::Ne => coerced_equals(&actual, descriptor.kind, raw).map_or(false, |hit| !hit),
        Comparator::Gt => ranking(&actual, descriptor.kind, raw) == Some(Ordering::Greater),
        Comparator::Ge => matches!(
            ranking(&actual, descriptor.kind, raw),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Comparator::Lt => ranking(&actual, descriptor.kind, raw) == Some(Ordering::Less),
        Comparator::Le => matches!(
            ranking(&actual, descriptor.kind, raw),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Comparator::Like => text_matches(&actual, raw).unwrap_or(false),
        Comparator::NotLike => text_matches(&actual, raw).map_or(false, |hit| !hit),
        Comparator::In => list_contains(&actual, descriptor.kind, raw),
        Comparator::NotIn => !list_contains(&actual, descriptor.kind, raw),
    }
}

/// `None` when the raw value does not parse as the declared kind
fn coerced_equals(actual: &FieldValue, kind: FieldKind, raw: &str) -> Option<bool> {
    kind.coerce(raw).map(|expected| *actual == expected)
}

fn ranking(actual: &FieldValue, kind: FieldKind, raw: &str) -> Option<Ordering> {
    kind.coerce(raw).and_then(|expected| actual.compare(&expected))
}

/// `None` when the subject is not text or the pattern fails to compile
fn text_matches(actual: &FieldValue, pattern: &str) -> Option<bool> {
    let subject = actual.as_string()?;
    Some(like_pattern(pattern)?.is_match(subject))
}

/// Membership over a comma-separated element list; elements that fail to
/// parse as the declared kind are dropped
fn list_contains(actual: &FieldValue, kind: FieldKind, raw: &str) -> bool {
    raw.split(',')
        .filter_map(|element| kind.coerce(element.trim()))
        .any(|candidate| candidate == *actual)
}

/// Translate a SQL LIKE pattern (`%` any run, `_` one char) into an
/// anchored regex
fn like_pattern(pattern: &str) -> Option<Regex> {
    let mut translated = String::with_capacity(pattern.len() + 2);
    translated.push('^');
    for ch in pattern.chars() {
        match ch {
            '%' => translated.push_str(".*"),
            '_' => translated.push('.'),
            other => translated.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }
    translated.push('$');
    Regex::new(&translated).ok()
}

// --- ordering ---

/// Stable multi-key comparison: later keys break ties left by earlier ones;
/// unknown fields and cross-kind pairs rank equal
fn compare_rows<E: Record>(a: &E, b: &E, order: &[OrderBy]) -> Ordering {
    for clause in order {
        let rank = match (a.get(&clause.field), b.get(&clause.field)) {
            (Some(left), Some(right)) => left.compare(&right).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        };
        let rank = match clause.direction {
            SortDirection::Asc => rank,
            SortDirection::Desc => rank.reverse(),
        };
        if rank != Ordering::Equal {
            return rank;
        }
    }
    Ordering::Equal
}
