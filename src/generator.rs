//! Public entry point: example value → schema document + definitions.
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::config::SchemaConfig;
use crate::error::Result;
use crate::example::Example;
use crate::flatten::{self, Flattened};
use crate::inference::Walk;
use crate::metadata::{Annotations, Configured, MetadataSource, Primitives};
use crate::namer::{ModelNamer, Simple};
use crate::retrieval::{FieldRetrieval, SimpleLookup};
use crate::schema::SchemaNode;

/// Result of [`SchemaGenerator::to_schema`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSchema {
    /// Schema of the example itself; a `$ref` for records.
    #[serde(rename = "schema")]
    pub node: Value,
    /// Every distinct named definition the schema refers to, by name.
    pub definitions: IndexMap<String, Value>,
}

pub struct SchemaGenerator {
    retrieval: Box<dyn FieldRetrieval>,
    namer: Box<dyn ModelNamer>,
    config: SchemaConfig,
}

impl Default for SchemaGenerator {
    fn default() -> Self {
        SchemaGenerator::new(SchemaConfig::default())
    }
}

impl SchemaGenerator {
    /// Fields are renamed per `field_case`; metadata comes from primitive
    /// formats, then descriptor annotations, then `config.metadata`.
    pub fn new(config: SchemaConfig) -> Self {
        let metadata = Primitives.then(Annotations).then(Configured::new(config.metadata.clone()));
        SchemaGenerator {
            retrieval: Box::new(SimpleLookup::new(config.field_case, metadata)),
            namer: Box::new(Simple),
            config,
        }
    }

    pub fn with_retrieval(mut self, retrieval: impl FieldRetrieval + 'static) -> Self {
        self.retrieval = Box::new(retrieval);
        self
    }

    pub fn with_namer(mut self, namer: impl ModelNamer + 'static) -> Self {
        self.namer = Box::new(namer);
        self
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// `name` overrides the top-level definition name; `prefix` is prepended
    /// to every definition name.
    pub fn to_schema(
        &self,
        example: &dyn Example,
        name: Option<&str>,
        prefix: Option<&str>,
    ) -> Result<JsonSchema> {
        let tree = self.build_tree(example, name, prefix)?;
        let Flattened { document, definitions } = flatten::flatten(&tree, &self.config)?;
        tracing::debug!(definitions = definitions.len(), "schema generated");
        Ok(JsonSchema { node: document, definitions })
    }

    /// The unflattened node tree.
    pub fn build_tree(
        &self,
        example: &dyn Example,
        name: Option<&str>,
        prefix: Option<&str>,
    ) -> Result<SchemaNode> {
        let mut walk = Walk::new(self.retrieval.as_ref(), self.namer.as_ref(), &self.config);
        walk.build(example, name, true, prefix.unwrap_or_default(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::{Field, Shape};
    use crate::metadata::FieldMetadata;
    use crate::namer::FullPath;
    use crate::retrieval::FieldCase;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Reading {
        sensor_id: String,
        value: f64,
    }

    impl Example for Reading {
        fn shape(&self) -> Shape<'_> {
            Shape::Record(vec![Field::of("sensor_id", &self.sensor_id), Field::of("value", &self.value)])
        }
    }

    fn reading() -> Reading {
        Reading { sensor_id: "s-1".into(), value: 20.5 }
    }

    #[test]
    fn renamed_record_with_configured_metadata() {
        let mut metadata = IndexMap::new();
        let floor = FieldMetadata { minimum: Some((-50).into()), ..Default::default() };
        metadata.insert("Reading.value".to_owned(), floor);
        let config = SchemaConfig { field_case: FieldCase::CamelCase, metadata, ..SchemaConfig::default() };
        let schema = SchemaGenerator::new(config).to_schema(&reading(), None, None).unwrap();

        assert_eq!(schema.node, json!({"$ref": "#/components/schemas/Reading"}));
        assert_eq!(schema.definitions["Reading"], json!({
            "type": "object",
            "required": ["sensorId", "value"],
            "properties": {
                "sensorId": { "type": "string", "example": "s-1" },
                "value": { "type": "number", "format": "double", "minimum": -50, "example": 20.5 }
            }
        }));
    }

    #[test]
    fn custom_namer_changes_definition_names() {
        let config = SchemaConfig { field_case: FieldCase::CamelCase, ..SchemaConfig::default() };
        let generator = SchemaGenerator::new(config).with_namer(FullPath);
        let schema = generator.to_schema(&reading(), None, None).unwrap();
        let name = schema.definitions.keys().next().unwrap();
        assert!(name.ends_with("_Reading"), "{name}");
    }

    #[test]
    fn serializes_as_schema_and_definitions() {
        let schema = SchemaGenerator::default().to_schema(&3u8, None, None).unwrap();
        let encoded = serde_json::to_value(&schema).unwrap();
        assert_eq!(encoded, json!({"schema": {"type": "integer", "example": 3}, "definitions": {}}));
    }
}
