//! Record and entity traits

use crate::core::field::{FieldValue, Schema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A shape with a static field-descriptor table
///
/// `Record` is what the mapper, the filter evaluator, and single-field
/// patches operate on. Plain DTOs implement it without being entities.
/// The table lists scalar fields in declaration order; fields outside the
/// table (nested collections, secrets kept off the wire) are invisible to
/// mapping and filtering.
pub trait Record: Send + Sync + 'static {
    /// The descriptor table for this shape
    fn schema() -> Schema;

    /// Read a field by name
    ///
    /// `None` means the schema has no such field; a null value in a
    /// nullable field reads as `Some(FieldValue::Null)`.
    fn get(&self, field: &str) -> Option<FieldValue>;

    /// Write a field by name, returning false when the field is unknown
    /// or the value does not convert to the field's type
    fn set(&mut self, field: &str, value: FieldValue) -> bool;
}

/// The entity-kind tag used for permission scoping and route naming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKind(&'static str);

impl EntityKind {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Something identifiable by a stable unique identifier, a display name,
/// and an entity-kind tag
///
/// The identifier is assigned once, at creation, and never changes; storage
/// adapters assign a fresh v4 id when the payload id is nil.
pub trait Entity: Record + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The kind tag shared by every instance of this type
    fn kind() -> EntityKind;

    /// The stable unique identifier
    fn id(&self) -> Uuid;

    /// Overwrite the identifier (used once, by the storage adapter at creation)
    fn set_id(&mut self, id: Uuid);

    /// Human-readable name shown in pickers and audit messages
    fn display_name(&self) -> &str;
}

/// Minimal (id, display-name) projection of an entity for UI pickers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboOption {
    pub id: Uuid,
    pub name: String,
}

impl ComboOption {
    /// Project an entity down to its picker representation
    pub fn of<E: Entity>(entity: &E) -> Self {
        Self {
            id: entity.id(),
            name: entity.display_name().to_string(),
        }
    }
}
