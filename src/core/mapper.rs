//! Declarative field copying between record shapes
//!
//! A [`Mapper`] copies same-named fields from one record shape to another,
//! for example scrubbing sensitive columns off an entity before it leaves
//! the API. All field-name and type checks happen at construction, against
//! the static schemas. Mapping itself cannot fail.

use crate::core::entity::Record;
use crate::core::error::{Error, Result};
use crate::core::field::FieldDescriptor;
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, Clone)]
enum FieldSet {
    All,
    Excluding(Vec<String>),
    Including(Vec<String>),
}

impl FieldSet {
    fn selects(&self, name: &str) -> bool {
        match self {
            FieldSet::All => true,
            FieldSet::Excluding(excluded) => !excluded.iter().any(|f| f == name),
            FieldSet::Including(included) => included.iter().any(|f| f == name),
        }
    }
}

/// Copies field values from records of shape `I` into fresh records of shape `O`
///
/// Fields are matched by name. Fields of `O` that `I` does not provide (or
/// that the field set filters out) keep their `Default` value.
pub struct Mapper<I, O> {
    set: FieldSet,
    _marker: PhantomData<fn(&I) -> O>,
}

impl<I, O> Clone for Mapper<I, O> {
    fn clone(&self) -> Self {
        Self {
            set: self.set.clone(),
            _marker: PhantomData,
        }
    }
}

// Manual impl so `I`/`O` need not be Debug themselves.
impl<I, O> fmt::Debug for Mapper<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper").field("set", &self.set).finish()
    }
}

impl<I: Record, O: Record + Default> Mapper<I, O> {
    /// Map every field shared by name between the two shapes
    ///
    /// Fails with `TypeMismatch` when any shared field disagrees on type.
    pub fn new() -> Result<Self> {
        Self::check_shared(&[])?;
        Ok(Self {
            set: FieldSet::All,
            _marker: PhantomData,
        })
    }

    /// Map every shared field except the listed ones
    ///
    /// Every listed name must exist on both shapes. Shared fields that are
    /// not excluded must still agree on type.
    pub fn excluding(excluded: &[&str]) -> Result<Self> {
        Self::check_named(excluded)?;
        Self::check_shared(excluded)?;
        Ok(Self {
            set: FieldSet::Excluding(excluded.iter().map(|f| f.to_string()).collect()),
            _marker: PhantomData,
        })
    }

    /// Map exactly the listed fields
    ///
    /// Every listed name must exist on both shapes and agree on type.
    pub fn including(included: &[&str]) -> Result<Self> {
        Self::check_named(included)?;
        let input = I::schema();
        let output = O::schema();
        for name in included {
            // both lookups succeed after check_named
            if let (Some(source), Some(target)) = (input.field(name), output.field(name)) {
                Self::check_pair(source, target)?;
            }
        }
        Ok(Self {
            set: FieldSet::Including(included.iter().map(|f| f.to_string()).collect()),
            _marker: PhantomData,
        })
    }

    /// Produce an `O` from `input`, copying the selected fields
    pub fn map(&self, input: &I) -> O {
        let mut output = O::default();
        for descriptor in I::schema().fields {
            if !self.set.selects(descriptor.name) {
                continue;
            }
            if !O::schema().contains(descriptor.name) {
                continue;
            }
            if let Some(value) = input.get(descriptor.name) {
                output.set(descriptor.name, value);
            }
        }
        output
    }

    fn check_named(names: &[&str]) -> Result<()> {
        let input = I::schema();
        let output = O::schema();
        for name in names {
            if !input.contains(name) {
                return Err(Error::unknown_field(input.name, *name));
            }
            if !output.contains(name) {
                return Err(Error::unknown_field(output.name, *name));
            }
        }
        Ok(())
    }

    fn check_shared(skip: &[&str]) -> Result<()> {
        let input = I::schema();
        let output = O::schema();
        for source in input.fields {
            if skip.contains(&source.name) {
                continue;
            }
            if let Some(target) = output.field(source.name) {
                Self::check_pair(source, target)?;
            }
        }
        Ok(())
    }

    fn check_pair(source: &FieldDescriptor, target: &FieldDescriptor) -> Result<()> {
        if source.same_type(target) {
            return Ok(());
        }
        Err(Error::type_mismatch(
            source.name,
            format!(
                "{} declares {}, {} declares {}",
                I::schema().name,
                describe(source),
                O::schema().name,
                describe(target),
            ),
        ))
    }
}

fn describe(descriptor: &FieldDescriptor) -> String {
    if descriptor.nullable {
        format!("nullable {:?}", descriptor.kind)
    } else {
        format!("{:?}", descriptor.kind)
    }
}
