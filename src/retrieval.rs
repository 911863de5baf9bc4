//! Field resolution: (container, codec field name) → value, nullability and
//! metadata.
use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use serde::ser::{Error as _, SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::example::{Example, Field, Shape};
use crate::metadata::{FieldMetadata, MetadataSource, Primitives};

/// A field as seen by the builder.
pub struct ResolvedField<'a> {
    /// Name as declared on the descriptor (before renaming).
    pub declared_name: String,
    pub value: &'a dyn Example,
    pub is_nullable: bool,
    pub metadata: FieldMetadata,
}

pub trait FieldRetrieval: Send + Sync {
    fn retrieve<'a>(&self, container: &'a dyn Example, name: &str) -> Result<ResolvedField<'a>>;

    /// Metadata for a value that is not a record field (array elements, map
    /// entries), looked up as the `value` field of a [`FieldHolder`].
    fn element_metadata(&self, value: &dyn Example) -> Result<FieldMetadata> {
        let holder = FieldHolder(value);
        Ok(self.retrieve(&holder, FieldHolder::FIELD)?.metadata)
    }
}

/// How declared field names map to encoded property names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldCase {
    #[default]
    AsIs,
    CamelCase,
    SnakeCase,
    KebabCase,
    PascalCase,
}

impl FieldCase {
    pub fn apply(self, name: &str) -> String {
        match self {
            FieldCase::AsIs => name.to_owned(),
            FieldCase::CamelCase => name.to_lower_camel_case(),
            FieldCase::SnakeCase => name.to_snake_case(),
            FieldCase::KebabCase => name.to_kebab_case(),
            FieldCase::PascalCase => name.to_upper_camel_case(),
        }
    }
}

type Renamer = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Finds the descriptor whose (renamed) name matches, and lets null examples
/// through as nullable fields.
pub struct SimpleLookup {
    rename: Renamer,
    metadata: Box<dyn MetadataSource>,
}

impl Default for SimpleLookup {
    fn default() -> Self {
        SimpleLookup::new(FieldCase::AsIs, Primitives)
    }
}

impl SimpleLookup {
    pub fn new(case: FieldCase, metadata: impl MetadataSource + 'static) -> Self {
        SimpleLookup {
            rename: Box::new(move |name: &str| case.apply(name)),
            metadata: Box::new(metadata),
        }
    }

    /// Replace the case rule with an arbitrary declared → encoded name
    /// mapping, for codecs that rename fields one by one.
    pub fn with_renamer(
        mut self,
        rename: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.rename = Box::new(rename);
        self
    }
}

impl FieldRetrieval for SimpleLookup {
    fn retrieve<'a>(&self, container: &'a dyn Example, name: &str) -> Result<ResolvedField<'a>> {
        let fields = match container.shape() {
            Shape::Record(fields) => fields,
            _ => Vec::new(),
        };
        let field = fields
            .into_iter()
            .find(|f| (self.rename)(f.name) == name)
            .ok_or_else(|| SchemaError::FieldNotFound {
                field: name.to_owned(),
                container: container.type_path().to_owned(),
            })?;
        let is_nullable = field.nullable || field.value.shape().is_null();
        Ok(ResolvedField {
            metadata: self.metadata.metadata(container, field.name),
            declared_name: field.name.to_owned(),
            value: field.value,
            is_nullable,
        })
    }

    fn element_metadata(&self, value: &dyn Example) -> Result<FieldMetadata> {
        Ok(self.metadata.metadata(&FieldHolder(value), FieldHolder::FIELD))
    }
}

/// Tries each retrieval in turn; the first that knows the field wins.
pub struct Compose(Vec<Box<dyn FieldRetrieval>>);

impl Compose {
    pub fn of(retrievals: Vec<Box<dyn FieldRetrieval>>) -> Self {
        Compose(retrievals)
    }
}

impl FieldRetrieval for Compose {
    fn retrieve<'a>(&self, container: &'a dyn Example, name: &str) -> Result<ResolvedField<'a>> {
        for retrieval in &self.0 {
            match retrieval.retrieve(container, name) {
                Err(SchemaError::FieldNotFound { .. }) => continue,
                other => return other,
            }
        }
        Err(SchemaError::FieldNotFound {
            field: name.to_owned(),
            container: container.type_path().to_owned(),
        })
    }

    fn element_metadata(&self, value: &dyn Example) -> Result<FieldMetadata> {
        for retrieval in &self.0 {
            match retrieval.element_metadata(value) {
                Err(SchemaError::FieldNotFound { .. }) => continue,
                other => return other,
            }
        }
        Ok(FieldMetadata::default())
    }
}

/// Single-field record wrapping a loose value.
pub struct FieldHolder<'a>(pub &'a dyn Example);

impl FieldHolder<'_> {
    pub const FIELD: &'static str = "value";
}

impl Serialize for FieldHolder<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let node = self.0.to_node().map_err(S::Error::custom)?;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(Self::FIELD, &node)?;
        map.end()
    }
}

impl Example for FieldHolder<'_> {
    fn shape(&self) -> Shape<'_> {
        Shape::Record(vec![Field {
            name: Self::FIELD,
            value: self.0,
            nullable: false,
            declared: None,
            metadata: FieldMetadata::default(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Annotations;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Completed {
        completed_by: String,
        completed_on: Option<i64>,
    }

    impl Example for Completed {
        fn shape(&self) -> Shape<'_> {
            Shape::Record(vec![
                Field::of("completed_by", &self.completed_by).description("user id"),
                Field::of("completed_on", &self.completed_on),
            ])
        }
    }

    fn completed() -> Completed {
        Completed { completed_by: "u1".into(), completed_on: None }
    }

    #[test]
    fn renamed_fields_resolve_with_matching_case() {
        let lookup = SimpleLookup::new(FieldCase::CamelCase, Primitives.then(Annotations));
        let c = completed();
        let f = lookup.retrieve(&c, "completedBy").unwrap();
        assert_eq!(f.declared_name, "completed_by");
        assert!(!f.is_nullable);
        assert_eq!(f.metadata.description.as_deref(), Some("user id"));

        let on = lookup.retrieve(&c, "completedOn").unwrap();
        assert!(on.is_nullable);
    }

    #[test]
    fn unknown_names_are_field_not_found() {
        let c = completed();
        let err = SimpleLookup::default().retrieve(&c, "completedBy").err().unwrap();
        assert!(
            matches!(err, SchemaError::FieldNotFound { ref field, .. } if field == "completedBy")
        );
    }

    #[test]
    fn custom_renamer_matches_per_field_names() {
        let lookup = SimpleLookup::default().with_renamer(|name| match name {
            "completed_by" => "author".to_owned(),
            other => FieldCase::KebabCase.apply(other),
        });
        let c = completed();
        assert_eq!(lookup.retrieve(&c, "author").unwrap().declared_name, "completed_by");
        assert_eq!(lookup.retrieve(&c, "completed-on").unwrap().declared_name, "completed_on");
        assert!(lookup.retrieve(&c, "completed_by").is_err());
    }

    #[test]
    fn compose_falls_through_to_later_lookups() {
        let composed = Compose::of(vec![
            Box::new(SimpleLookup::default()),
            Box::new(SimpleLookup::new(FieldCase::CamelCase, Primitives)),
        ]);
        let c = completed();
        assert!(composed.retrieve(&c, "completedBy").is_ok());
        assert!(composed.retrieve(&c, "completed_by").is_ok());
        assert!(composed.retrieve(&c, "nope").is_err());
    }

    #[test]
    fn holder_exposes_element_metadata() {
        let lookup = SimpleLookup::default();
        assert_eq!(lookup.element_metadata(&7i64).unwrap().format.as_deref(), Some("int64"));
        let holder = FieldHolder(&2.5f32);
        assert_eq!(serde_json::to_string(&holder).unwrap(), r#"{"value":2.5}"#);
    }
}
