//! Generator settings, loadable from JSON.
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Result, SchemaError};
use crate::metadata::FieldMetadata;
use crate::retrieval::FieldCase;

/// What to do when two different definitions share a name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollisionPolicy {
    /// Keep the first definition seen and drop the rest silently.
    #[default]
    FirstWins,
    /// Raise [`SchemaError::DefinitionCollision`].
    Fail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SchemaConfig {
    /// Registry path definitions live under: `$ref` is `#/<prefix>/<name>`.
    pub ref_location_prefix: String,
    /// Emit `example` on primitive nodes.
    pub include_examples: bool,
    /// Leave nullable properties out of `required`.
    pub nullable_is_optional: bool,
    pub on_collision: CollisionPolicy,
    pub max_depth: usize,
    pub field_case: FieldCase,
    /// Extra field metadata keyed by `"<TypeName>.<field>"`.
    pub metadata: IndexMap<String, FieldMetadata>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        SchemaConfig {
            ref_location_prefix: "components/schemas".to_owned(),
            include_examples: true,
            nullable_is_optional: false,
            on_collision: CollisionPolicy::FirstWins,
            max_depth: 128,
            field_case: FieldCase::AsIs,
            metadata: IndexMap::new(),
        }
    }
}

impl SchemaConfig {
    pub fn from_json_str(src: &str) -> Result<Self> {
        from_str_with_path(src)
    }

    pub fn ref_path(&self, name: &str) -> String {
        format!("#/{}/{name}", self.ref_location_prefix)
    }
}

/// Deserialize with JSON-path context in error messages.
fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| SchemaError::Config {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let cfg = SchemaConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg.ref_location_prefix, "components/schemas");
        assert_eq!(cfg.ref_path("Foo"), "#/components/schemas/Foo");
        assert!(cfg.include_examples);
        assert_eq!(cfg.on_collision, CollisionPolicy::FirstWins);
    }

    #[test]
    fn camel_case_keys_and_metadata() {
        let cfg = SchemaConfig::from_json_str(r#"{
            "refLocationPrefix": "definitions",
            "onCollision": "fail",
            "fieldCase": "camelCase",
            "metadata": { "MeasureDto.id": { "description": "identifier", "minLength": 1 } }
        }"#).unwrap();
        assert_eq!(cfg.ref_path("Foo"), "#/definitions/Foo");
        assert_eq!(cfg.on_collision, CollisionPolicy::Fail);
        assert_eq!(cfg.field_case, FieldCase::CamelCase);
        assert_eq!(cfg.metadata["MeasureDto.id"].min_length, Some(1));
    }

    #[test]
    fn errors_carry_the_json_path() {
        let err = SchemaConfig::from_json_str(r#"{"metadata": {"A.b": {"minLength": "x"}}}"#).unwrap_err();
        match err {
            SchemaError::Config { path, .. } => assert_eq!(path, "metadata.A.b.minLength"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
