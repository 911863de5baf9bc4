use indexmap::IndexMap;
use serde_json::Value;

use super::Walk;
use crate::codec;
use crate::error::Result;
use crate::example::Example;
use crate::metadata::FieldMetadata;
use crate::schema::{NodeKind, SchemaNode};

impl Walk<'_> {
    /// A record becomes a named object definition behind a reference.
    ///
    /// Nested records are always named after their type so that every field
    /// holding the same type shares one definition; only the top level honors
    /// an explicit name. A record that is already being built further up the
    /// tree yields a bare reference.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn object_schema(
        &mut self,
        obj_name: Option<&str>,
        node: &Value,
        value: &dyn Example,
        is_nullable: bool,
        top_level: bool,
        metadata: Option<FieldMetadata>,
        prefix: &str,
    ) -> Result<SchemaNode> {
        let type_name = self.namer.name(value);
        let ref_name = match (top_level, obj_name) {
            (true, Some(name)) => name.to_owned(),
            _ => type_name.clone(),
        };
        let node_name = obj_name.map(str::to_owned).unwrap_or(type_name);
        let def_name = format!("{prefix}{ref_name}");
        let target_ref = self.config.ref_path(&def_name);

        if self.in_progress.contains(&def_name) {
            tracing::debug!(definition = %def_name, "recursive reference");
            let kind = NodeKind::Reference { target_ref, target: None };
            return Ok(SchemaNode::new(node_name, is_nullable, metadata, kind));
        }

        self.in_progress.push(def_name.clone());
        let properties = self.properties(node, value, prefix);
        self.in_progress.pop();
        let properties = properties?;

        tracing::trace!(definition = %def_name, properties = properties.len(), "object definition");
        let target = SchemaNode::new(def_name, is_nullable, None, NodeKind::Object { properties })
            .with_example(node.clone());
        Ok(SchemaNode::new(
            node_name,
            is_nullable,
            metadata,
            NodeKind::Reference { target_ref, target: Some(Box::new(target)) },
        ))
    }

    /// One property per encoded field, resolved against the record's
    /// descriptors.
    fn properties(
        &mut self,
        node: &Value,
        value: &dyn Example,
        prefix: &str,
    ) -> Result<IndexMap<String, SchemaNode>> {
        let fields = codec::fields(node);
        let mut properties = IndexMap::with_capacity(fields.len());
        for (name, field_node) in fields {
            let field = self.retrieval.retrieve(value, name)?;
            let schema = self.property(field_node, name, field, prefix, value)?;
            properties.insert(schema.name.clone(), schema);
        }
        Ok(properties)
    }
}
