//! Runtime description of example values.
//!
//! Rust has no reflection, so every type that can serve as a schema example
//! describes itself through [`Example::shape`]. Records list their fields as
//! [`Field`] descriptors; the descriptor captures the field's *declared* kind
//! and nullability at compile time, which is what lets a `None` example still
//! produce a typed schema.
//!
//! ```
//! use example_schema::example::{Example, Field, Shape};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Measure { id: String, owner: Option<String> }
//!
//! impl Example for Measure {
//!     fn shape(&self) -> Shape<'_> {
//!         Shape::Record(vec![
//!             Field::of("id", &self.id),
//!             Field::of("owner", &self.owner)
//!                 .description("Pass null if you don't know the owner"),
//!         ])
//!     }
//! }
//! ```
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::hash::BuildHasher;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::codec::Erased;
use crate::metadata::FieldMetadata;

/// The statically declared category of a type, consulted when the example
/// value itself is null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredKind { String, Integer, Number, Boolean, Array, Unit, Object }

/// What an example value looks like, one level deep.
pub enum Shape<'a> {
    /// No value present (`None`, `()`, JSON null).
    Null,
    /// A string, number or boolean; the codec decides which.
    Scalar,
    Sequence(Vec<&'a dyn Example>),
    /// Key/value pairs. Keys become property names through the codec.
    Map(Vec<(&'a dyn Erased, &'a dyn Example)>),
    Record(Vec<Field<'a>>),
    /// A type with a fixed, finite set of instances. Lists every instance.
    Enum(Vec<&'a dyn Erased>),
}

impl<'a> Shape<'a> {
    /// `Shape::Enum` over a slice of every instance of a fieldless enum.
    pub fn variants<T: Serialize>(all: &'a [T]) -> Self {
        Shape::Enum(all.iter().map(|v| v as &dyn Erased).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Shape::Null)
    }
}

/// A value that can be turned into a schema.
pub trait Example: Erased {
    fn shape(&self) -> Shape<'_>;

    /// Schema `format` this value's type implies (`int64`, `date-time`, ...).
    fn format_hint(&self) -> Option<&'static str> {
        None
    }

    /// Type path used to derive definition names. Wrappers such as `Option`
    /// and `Box` forward to their content.
    fn naming_path(&self) -> &'static str {
        self.type_path()
    }

    /// Object is the last resort for types that do not say otherwise.
    fn declared_kind() -> Option<DeclaredKind>
    where
        Self: Sized,
    {
        Some(DeclaredKind::Object)
    }

    fn declared_nullable() -> bool
    where
        Self: Sized,
    {
        false
    }
}

/// Descriptor for one declared field of a record.
pub struct Field<'a> {
    pub name: &'a str,
    pub value: &'a dyn Example,
    pub nullable: bool,
    pub declared: Option<DeclaredKind>,
    pub metadata: FieldMetadata,
}

impl<'a> Field<'a> {
    pub fn of<T: Example>(name: &'a str, value: &'a T) -> Self {
        Field {
            name,
            value,
            nullable: T::declared_nullable(),
            declared: T::declared_kind(),
            metadata: FieldMetadata::default(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }

    /// Leave this field out of the parent's `required` list.
    pub fn optional(mut self) -> Self {
        self.metadata.required = Some(false);
        self
    }

    pub fn with_metadata(mut self, metadata: FieldMetadata) -> Self {
        self.metadata = std::mem::take(&mut self.metadata).merge(metadata);
        self
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SCALARS
// ————————————————————————————————————————————————————————————————————————————

macro_rules! scalar_example {
    ($kind:ident, $format:expr; $($ty:ty),* $(,)?) => {
        $(
            impl Example for $ty {
                fn shape(&self) -> Shape<'_> { Shape::Scalar }
                fn format_hint(&self) -> Option<&'static str> { $format }
                fn declared_kind() -> Option<DeclaredKind> { Some(DeclaredKind::$kind) }
            }
        )*
    };
}

scalar_example!(String, None; String, char);
scalar_example!(Boolean, None; bool);
scalar_example!(Integer, Some("int32"); i8, i16, i32, u8, u16, u32);
scalar_example!(Integer, Some("int64"); i64, u64, isize, usize);
scalar_example!(Number, Some("float"); f32);
scalar_example!(Number, Some("double"); f64);
scalar_example!(String, Some("date-time");
    chrono::NaiveDateTime, chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::FixedOffset>);
scalar_example!(String, Some("date"); chrono::NaiveDate);
scalar_example!(String, Some("time"); chrono::NaiveTime);

impl Example for &str {
    fn shape(&self) -> Shape<'_> { Shape::Scalar }
    fn declared_kind() -> Option<DeclaredKind> { Some(DeclaredKind::String) }
}

impl Example for () {
    fn shape(&self) -> Shape<'_> { Shape::Null }
    fn declared_kind() -> Option<DeclaredKind> { Some(DeclaredKind::Unit) }
}

// ————————————————————————————————————————————————————————————————————————————
// WRAPPERS
// ————————————————————————————————————————————————————————————————————————————

impl<T: Example + Serialize> Example for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(inner) => inner.shape(),
            None => Shape::Null,
        }
    }
    fn format_hint(&self) -> Option<&'static str> {
        self.as_ref().and_then(|inner| inner.format_hint())
    }
    fn naming_path(&self) -> &'static str {
        match self {
            Some(inner) => inner.naming_path(),
            None => std::any::type_name::<T>(),
        }
    }
    fn declared_kind() -> Option<DeclaredKind> { T::declared_kind() }
    fn declared_nullable() -> bool { true }
}

impl<T: Example + Serialize> Example for Box<T> {
    fn shape(&self) -> Shape<'_> { self.as_ref().shape() }
    fn format_hint(&self) -> Option<&'static str> { self.as_ref().format_hint() }
    fn naming_path(&self) -> &'static str { self.as_ref().naming_path() }
    fn declared_kind() -> Option<DeclaredKind> { T::declared_kind() }
    fn declared_nullable() -> bool { T::declared_nullable() }
}

// ————————————————————————————————————————————————————————————————————————————
// COLLECTIONS
// ————————————————————————————————————————————————————————————————————————————

macro_rules! sequence_example {
    ($($ty:ident),*) => {
        $(
            impl<T: Example + Serialize> Example for $ty<T> {
                fn shape(&self) -> Shape<'_> {
                    Shape::Sequence(self.iter().map(|x| x as &dyn Example).collect())
                }
                fn declared_kind() -> Option<DeclaredKind> { Some(DeclaredKind::Array) }
            }
        )*
    };
}

sequence_example!(Vec, VecDeque, BTreeSet);

impl<K: Serialize, V: Example + Serialize, S: BuildHasher> Example for HashMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(self.iter().map(|(k, v)| (k as &dyn Erased, v as &dyn Example)).collect())
    }
    fn declared_kind() -> Option<DeclaredKind> { Some(DeclaredKind::Object) }
}

impl<K: Serialize, V: Example + Serialize> Example for BTreeMap<K, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(self.iter().map(|(k, v)| (k as &dyn Erased, v as &dyn Example)).collect())
    }
    fn declared_kind() -> Option<DeclaredKind> { Some(DeclaredKind::Object) }
}

impl<K: Serialize, V: Example + Serialize, S> Example for IndexMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(self.iter().map(|(k, v)| (k as &dyn Erased, v as &dyn Example)).collect())
    }
    fn declared_kind() -> Option<DeclaredKind> { Some(DeclaredKind::Object) }
}

/// Untyped JSON: objects are maps, and a null carries no declared type.
impl Example for Value {
    fn shape(&self) -> Shape<'_> {
        match self {
            Value::Null => Shape::Null,
            Value::Bool(_) | Value::Number(_) | Value::String(_) => Shape::Scalar,
            Value::Array(xs) => Shape::Sequence(xs.iter().map(|x| x as &dyn Example).collect()),
            Value::Object(map) => Shape::Map(
                map.iter().map(|(k, v)| (k as &dyn Erased, v as &dyn Example)).collect(),
            ),
        }
    }
    fn declared_kind() -> Option<DeclaredKind> { None }
}
