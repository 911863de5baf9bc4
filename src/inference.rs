//! Example → schema node inference.
//!
//! Walks an example value through the codec, classifies every node, and
//! builds a [`SchemaNode`] tree:
//! - arrays unify their element shapes (`arr`),
//! - maps pick a fixed-object, typed or open rendering (`map`),
//! - records become named definitions behind a reference (`obj`),
//! - fixed-instance types become shared enum definitions,
//! - everything else is a primitive.
//!
//! The walk is synchronous and holds no shared state; one [`Walk`] serves a
//! single `to_schema` call.
pub mod arr;
pub mod map;
pub mod obj;

use serde_json::Value;

use crate::classify::{self, ParamKind};
use crate::codec::{self, Erased};
use crate::config::SchemaConfig;
use crate::error::{Result, SchemaError};
use crate::example::{Example, Shape};
use crate::metadata::FieldMetadata;
use crate::namer::ModelNamer;
use crate::retrieval::{FieldRetrieval, ResolvedField};
use crate::schema::{NodeKind, SchemaNode};

const ROOT: &str = "<root>";

pub struct Walk<'g> {
    retrieval: &'g dyn FieldRetrieval,
    namer: &'g dyn ModelNamer,
    config: &'g SchemaConfig,
    /// Definition names whose objects are being built right now.
    in_progress: Vec<String>,
    depth: usize,
}

impl<'g> Walk<'g> {
    pub fn new(
        retrieval: &'g dyn FieldRetrieval,
        namer: &'g dyn ModelNamer,
        config: &'g SchemaConfig,
    ) -> Self {
        Walk { retrieval, namer, config, in_progress: Vec::new(), depth: 0 }
    }

    /// Schema for a top-level value (or an array element).
    pub fn build(
        &mut self,
        value: &dyn Example,
        obj_name: Option<&str>,
        top_level: bool,
        prefix: &str,
        metadata: Option<FieldMetadata>,
    ) -> Result<SchemaNode> {
        let node = codec::as_node(value)?;
        self.value_schema(&node, value, obj_name, top_level, prefix, metadata)
    }

    fn value_schema(
        &mut self,
        node: &Value,
        value: &dyn Example,
        obj_name: Option<&str>,
        top_level: bool,
        prefix: &str,
        metadata: Option<FieldMetadata>,
    ) -> Result<SchemaNode> {
        self.descend()?;
        let param = classify::classify(node, obj_name.unwrap_or(ROOT))?;
        let schema = match param {
            ParamKind::Array => self.array_schema("", node, value, false, None, prefix),
            ParamKind::Object => {
                self.object_or_map(obj_name, node, value, false, top_level, None, prefix)
            }
            _ => match value.shape() {
                Shape::Enum(variants) => {
                    self.enum_schema("", node, value, param, &variants, false, None)
                }
                _ => Ok(primitive("", param, false, node, metadata)),
            },
        };
        self.ascend();
        schema
    }

    /// Schema for one property of a record (or of a top-level named map).
    pub(crate) fn property(
        &mut self,
        field_node: &Value,
        name: &str,
        field: ResolvedField<'_>,
        prefix: &str,
        parent: &dyn Example,
    ) -> Result<SchemaNode> {
        self.descend()?;
        let param = match classify::classify(field_node, name) {
            Ok(param) => param,
            Err(SchemaError::UnresolvableType { .. }) => {
                classify::guess_kind(&field.declared_name, parent)?
            }
            Err(other) => return Err(other),
        };
        let ResolvedField { value, is_nullable, metadata, .. } = field;
        let metadata = Some(metadata);
        let schema = match param {
            ParamKind::Array => {
                self.array_schema(name, field_node, value, is_nullable, metadata, prefix)
            }
            ParamKind::Object if value.shape().is_null() => {
                // nothing to walk: an anonymous object stands in
                let properties = Default::default();
                Ok(SchemaNode::new(name, is_nullable, metadata, NodeKind::Object { properties }))
            }
            ParamKind::Object => self.object_or_map(
                Some(name),
                field_node,
                value,
                is_nullable,
                false,
                metadata,
                prefix,
            ),
            _ => match value.shape() {
                Shape::Enum(variants) => self.enum_schema(
                    name,
                    field_node,
                    value,
                    param,
                    &variants,
                    is_nullable,
                    metadata,
                ),
                _ => Ok(primitive(name, param, is_nullable, field_node, metadata)),
            },
        };
        self.ascend();
        schema
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn object_or_map(
        &mut self,
        obj_name: Option<&str>,
        node: &Value,
        value: &dyn Example,
        is_nullable: bool,
        top_level: bool,
        metadata: Option<FieldMetadata>,
        prefix: &str,
    ) -> Result<SchemaNode> {
        match value.shape() {
            Shape::Map(entries) => self.map_schema(
                obj_name,
                node,
                value,
                &entries,
                is_nullable,
                top_level,
                metadata,
                prefix,
            ),
            _ => {
                self.object_schema(obj_name, node, value, is_nullable, top_level, metadata, prefix)
            }
        }
    }

    /// Enums are always emitted as a shared definition behind a reference.
    #[allow(clippy::too_many_arguments)]
    fn enum_schema(
        &mut self,
        name: &str,
        node: &Value,
        value: &dyn Example,
        param: ParamKind,
        variants: &[&dyn Erased],
        is_nullable: bool,
        metadata: Option<FieldMetadata>,
    ) -> Result<SchemaNode> {
        let enum_name = self.namer.name(value);
        let values = variants
            .iter()
            .map(|v| codec::as_format_string(*v).map(|s| codec::unquoted(&s).to_owned()))
            .collect::<Result<Vec<_>>>()?;
        let kind = NodeKind::Enum { param, values };
        let definition =
            SchemaNode::new(enum_name.clone(), is_nullable, None, kind).with_example(node.clone());
        let target_ref = self.config.ref_path(&enum_name);
        Ok(SchemaNode::new(
            name,
            is_nullable,
            metadata,
            NodeKind::Reference { target_ref, target: Some(Box::new(definition)) },
        ))
    }

    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(SchemaError::DepthExceeded { limit: self.config.max_depth });
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }
}

fn primitive(
    name: &str,
    param: ParamKind,
    is_nullable: bool,
    node: &Value,
    metadata: Option<FieldMetadata>,
) -> SchemaNode {
    let kind = NodeKind::Primitive { param };
    SchemaNode::new(name, is_nullable, metadata, kind).with_example(node.clone())
}
