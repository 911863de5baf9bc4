//! Per-field schema metadata and the strategies that produce it.
//!
//! Strategies compose with [`MetadataSource::then`]: both run, and keys set by
//! the later strategy override the earlier one.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::example::{Example, Field, Shape};
use crate::namer;

/// Known schema keywords a field can carry. Every value is optional;
/// `required` defaults to true when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    /// Consumed by the parent object's `required` list, never rendered.
    #[serde(skip_serializing)]
    pub required: Option<bool>,
}

impl FieldMetadata {
    pub fn described(description: impl Into<String>) -> Self {
        FieldMetadata { description: Some(description.into()), ..Self::default() }
    }

    pub fn formatted(format: impl Into<String>) -> Self {
        FieldMetadata { format: Some(format.into()), ..Self::default() }
    }

    pub fn not_required() -> Self {
        FieldMetadata { required: Some(false), ..Self::default() }
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(true)
    }

    /// Union of both key sets; `later` wins where both are set.
    pub fn merge(self, later: FieldMetadata) -> FieldMetadata {
        FieldMetadata {
            description: later.description.or(self.description),
            format: later.format.or(self.format),
            default: later.default.or(self.default),
            title: later.title.or(self.title),
            multiple_of: later.multiple_of.or(self.multiple_of),
            maximum: later.maximum.or(self.maximum),
            exclusive_maximum: later.exclusive_maximum.or(self.exclusive_maximum),
            minimum: later.minimum.or(self.minimum),
            exclusive_minimum: later.exclusive_minimum.or(self.exclusive_minimum),
            max_length: later.max_length.or(self.max_length),
            min_length: later.min_length.or(self.min_length),
            pattern: later.pattern.or(self.pattern),
            max_items: later.max_items.or(self.max_items),
            min_items: later.min_items.or(self.min_items),
            unique_items: later.unique_items.or(self.unique_items),
            max_properties: later.max_properties.or(self.max_properties),
            min_properties: later.min_properties.or(self.min_properties),
            required: later.required.or(self.required),
        }
    }

    /// Rendered keywords in schema-document order.
    pub fn keywords(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// STRATEGIES
// ————————————————————————————————————————————————————————————————————————————

/// Looks up metadata for `field` (its declared name) on `target`.
pub trait MetadataSource: Send + Sync {
    fn metadata(&self, target: &dyn Example, field: &str) -> FieldMetadata;

    fn then<B: MetadataSource>(self, next: B) -> Chained<Self, B>
    where
        Self: Sized,
    {
        Chained { first: self, next }
    }
}

impl MetadataSource for Box<dyn MetadataSource> {
    fn metadata(&self, target: &dyn Example, field: &str) -> FieldMetadata {
        self.as_ref().metadata(target, field)
    }
}

pub struct Chained<A, B> {
    first: A,
    next: B,
}

impl<A: MetadataSource, B: MetadataSource> MetadataSource for Chained<A, B> {
    fn metadata(&self, target: &dyn Example, field: &str) -> FieldMetadata {
        self.first.metadata(target, field).merge(self.next.metadata(target, field))
    }
}

pub struct NoMetadata;

impl MetadataSource for NoMetadata {
    fn metadata(&self, _: &dyn Example, _: &str) -> FieldMetadata {
        FieldMetadata::default()
    }
}

/// Metadata attached to the record's [`Field`] descriptors.
pub struct Annotations;

impl MetadataSource for Annotations {
    fn metadata(&self, target: &dyn Example, field: &str) -> FieldMetadata {
        with_field(target, field, |f| f.metadata.clone()).unwrap_or_default()
    }
}

/// `format` derived from the field value's Rust type (`int32`, `double`, ...).
pub struct Primitives;

impl MetadataSource for Primitives {
    fn metadata(&self, target: &dyn Example, field: &str) -> FieldMetadata {
        with_field(target, field, |f| f.value.format_hint())
            .flatten()
            .map(FieldMetadata::formatted)
            .unwrap_or_default()
    }
}

/// Metadata supplied from configuration, keyed by `"<TypeName>.<field>"`.
#[derive(Debug, Clone, Default)]
pub struct Configured {
    entries: IndexMap<String, FieldMetadata>,
}

impl Configured {
    pub fn new(entries: IndexMap<String, FieldMetadata>) -> Self {
        Configured { entries }
    }
}

impl MetadataSource for Configured {
    fn metadata(&self, target: &dyn Example, field: &str) -> FieldMetadata {
        let key = format!("{}.{field}", namer::simple_name(target.naming_path()));
        self.entries.get(&key).cloned().unwrap_or_default()
    }
}

fn with_field<R>(target: &dyn Example, name: &str, f: impl FnOnce(&Field<'_>) -> R) -> Option<R> {
    match target.shape() {
        Shape::Record(fields) => fields.iter().find(|x| x.name == name).map(f),
        _ => None,
    }
}
