//! Field values, type tags, and per-shape descriptor tables

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// A polymorphic field value that can hold different types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a UUID if possible
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            FieldValue::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// The type tag of this value, or `None` for null
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            FieldValue::String(_) => Some(FieldKind::Text),
            FieldValue::Integer(_) => Some(FieldKind::Integer),
            FieldValue::Float(_) => Some(FieldKind::Float),
            FieldValue::Boolean(_) => Some(FieldKind::Boolean),
            FieldValue::Uuid(_) => Some(FieldKind::Uuid),
            FieldValue::DateTime(_) => Some(FieldKind::Timestamp),
            FieldValue::Null => None,
        }
    }

    /// Compare two values of the same variant
    ///
    /// Returns `None` when the variants differ or either side is null,
    /// mirroring SQL comparison semantics on missing data.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::String(a), FieldValue::String(b)) => Some(a.cmp(b)),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.partial_cmp(b),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => Some(a.cmp(b)),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Type tag for one field of a record shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
    Uuid,
    Timestamp,
}

impl FieldKind {
    /// Coerce an untyped filter value against this kind
    ///
    /// Returns `None` when the raw string does not parse as the target kind;
    /// callers treat that as a non-matching predicate rather than an error.
    pub fn coerce(&self, raw: &str) -> Option<FieldValue> {
        match self {
            FieldKind::Text => Some(FieldValue::String(raw.to_string())),
            FieldKind::Integer => raw.parse::<i64>().ok().map(FieldValue::Integer),
            FieldKind::Float => raw.parse::<f64>().ok().map(FieldValue::Float),
            FieldKind::Boolean => raw.parse::<bool>().ok().map(FieldValue::Boolean),
            FieldKind::Uuid => Uuid::parse_str(raw).ok().map(FieldValue::Uuid),
            FieldKind::Timestamp => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| FieldValue::DateTime(dt.with_timezone(&Utc))),
        }
    }
}

/// One entry of a shape's descriptor table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
}

impl FieldDescriptor {
    /// Whether two descriptors carry the same underlying type
    pub fn same_type(&self, other: &FieldDescriptor) -> bool {
        self.kind == other.kind && self.nullable == other.nullable
    }
}

/// Static descriptor table for a record shape
///
/// Built once per shape (by `impl_record!`), in field declaration order.
/// All field-existence and type-compatibility checks run against this table
/// instead of runtime type introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// Shape name used in diagnostics, e.g. `UserAccount`
    pub name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl Schema {
    /// Look up a field descriptor by name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether the schema declares a field with this name
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// The declared kind of a field, if present
    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.field(name).map(|f| f.kind)
    }
}

/// Conversion between a native field type and [`FieldValue`]
///
/// Implemented for the scalar types a descriptor table can carry. `Option<T>`
/// marks the field nullable; `None` round-trips through `FieldValue::Null`.
pub trait FieldScalar: Sized {
    const KIND: FieldKind;
    const NULLABLE: bool = false;

    fn into_value(self) -> FieldValue;
    fn from_value(value: FieldValue) -> Option<Self>;
}

impl FieldScalar for String {
    const KIND: FieldKind = FieldKind::Text;

    fn into_value(self) -> FieldValue {
        FieldValue::String(self)
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl FieldScalar for i64 {
    const KIND: FieldKind = FieldKind::Integer;

    fn into_value(self) -> FieldValue {
        FieldValue::Integer(self)
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Integer(i) => Some(i),
            _ => None,
        }
    }
}

impl FieldScalar for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn into_value(self) -> FieldValue {
        FieldValue::Float(self)
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Float(f) => Some(f),
            FieldValue::Integer(i) => Some(i as f64),
            _ => None,
        }
    }
}

impl FieldScalar for bool {
    const KIND: FieldKind = FieldKind::Boolean;

    fn into_value(self) -> FieldValue {
        FieldValue::Boolean(self)
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Boolean(b) => Some(b),
            _ => None,
        }
    }
}

impl FieldScalar for Uuid {
    const KIND: FieldKind = FieldKind::Uuid;

    fn into_value(self) -> FieldValue {
        FieldValue::Uuid(self)
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Uuid(u) => Some(u),
            FieldValue::String(s) => Uuid::parse_str(&s).ok(),
            _ => None,
        }
    }
}

impl FieldScalar for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::Timestamp;

    fn into_value(self) -> FieldValue {
        FieldValue::DateTime(self)
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::DateTime(dt) => Some(dt),
            FieldValue::String(s) => DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        }
    }
}

impl<T: FieldScalar> FieldScalar for Option<T> {
    const KIND: FieldKind = T::KIND;
    const NULLABLE: bool = true;

    fn into_value(self) -> FieldValue {
        match self {
            Some(v) => v.into_value(),
            None => FieldValue::Null,
        }
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}
