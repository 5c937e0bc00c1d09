//! Macros for reducing boilerplate when defining entities
//!
//! `impl_record!` generates the [`Record`](crate::core::entity::Record)
//! implementation for a struct: the static schema table plus name-based
//! field access. Every listed field type must implement
//! [`FieldScalar`](crate::core::field::FieldScalar).

/// Implement `Record` for a struct by listing its fields
///
/// The schema is built in declaration order, which the mapper and storage
/// adapters rely on for deterministic iteration.
///
/// # Example
/// ```rust,ignore
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// pub struct UserAccount {
///     pub id: Uuid,
///     pub username: String,
///     pub age: i64,
/// }
///
/// impl_record!(UserAccount {
///     id: Uuid,
///     username: String,
///     age: i64,
/// });
/// ```
#[macro_export]
macro_rules! impl_record {
    ($name:ident { $( $field:ident : $ty:ty ),* $(,)? }) => {
        impl $crate::core::entity::Record for $name {
            fn schema() -> $crate::core::field::Schema {
                const FIELDS: &[$crate::core::field::FieldDescriptor] = &[
                    $(
                        $crate::core::field::FieldDescriptor {
                            name: stringify!($field),
                            kind: <$ty as $crate::core::field::FieldScalar>::KIND,
                            nullable: <$ty as $crate::core::field::FieldScalar>::NULLABLE,
                        },
                    )*
                ];
                $crate::core::field::Schema {
                    name: stringify!($name),
                    fields: FIELDS,
                }
            }

            fn get(&self, field: &str) -> Option<$crate::core::field::FieldValue> {
                match field {
                    $(
                        stringify!($field) => Some($crate::core::field::FieldScalar::into_value(
                            self.$field.clone(),
                        )),
                    )*
                    _ => None,
                }
            }

            fn set(&mut self, field: &str, value: $crate::core::field::FieldValue) -> bool {
                match field {
                    $(
                        stringify!($field) => {
                            match <$ty as $crate::core::field::FieldScalar>::from_value(value) {
                                Some(converted) => {
                                    self.$field = converted;
                                    true
                                }
                                None => false,
                            }
                        }
                    )*
                    _ => false,
                }
            }
        }
    };
}
