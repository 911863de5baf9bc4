//! Definition flattening: collect every named definition reachable from the
//! root and keep one per name.
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde_json::Value;

use crate::config::{CollisionPolicy, SchemaConfig};
use crate::error::{Result, SchemaError};
use crate::schema::SchemaNode;

#[derive(Debug, Clone)]
pub struct Flattened {
    /// Schema of the top-level value.
    pub document: Value,
    /// Rendered definitions by name, in discovery order.
    pub definitions: IndexMap<String, Value>,
}

/// The first definition seen for a name wins. Later same-named definitions
/// are dropped, or rejected under [`CollisionPolicy::Fail`] when their shape
/// (ignoring example values) differs.
pub fn flatten(root: &SchemaNode, config: &SchemaConfig) -> Result<Flattened> {
    let mut kept: IndexMap<String, &SchemaNode> = IndexMap::new();
    for definition in root.definitions() {
        match kept.entry(definition.name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(definition);
            }
            Entry::Occupied(first) => {
                let fail = config.on_collision == CollisionPolicy::Fail;
                if fail && !same_shape(first.get(), definition, config) {
                    return Err(SchemaError::DefinitionCollision { name: first.key().clone() });
                }
                tracing::trace!(definition = %first.key(), "duplicate definition dropped");
            }
        }
    }
    let definitions = kept
        .into_iter()
        .map(|(name, definition)| (name, definition.to_document(config)))
        .collect();
    Ok(Flattened { document: root.to_document(config), definitions })
}

/// Example values and the definition's own nullability follow whichever
/// field was seen first, so neither counts as a difference.
fn same_shape(a: &SchemaNode, b: &SchemaNode, config: &SchemaConfig) -> bool {
    let quiet = SchemaConfig { include_examples: false, ..config.clone() };
    let render = |node: &SchemaNode| {
        let mut doc = node.to_document(&quiet);
        if let Some(map) = doc.as_object_mut() {
            map.remove("nullable");
        }
        doc
    };
    render(a) == render(b)
}
