//! Eager-load directives

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque name for an eager-load path
///
/// Relations are not validated at parse time; the storage adapter decides
/// what, if anything, a name means. List order does not affect semantics,
/// each relation is loaded independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
}

impl Relation {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Split a comma-separated relation list
///
/// Deliberately permissive: every segment becomes a relation, including the
/// single empty segment produced by an empty input. Callers relying on the
/// historical wire behavior get it unchanged.
pub fn parse_relations(s: &str) -> Vec<Relation> {
    s.split(',').map(Relation::new).collect()
}
