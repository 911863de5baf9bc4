//! Schema node tree produced by the builder, and its rendering to schema
//! documents.
//!
//! Nodes are built bottom-up and never mutated afterwards. Rendering follows
//! schema-document sparsity: `nullable` only when true, `required` only when
//! non-empty, metadata keywords only when set.
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::classify::ParamKind;
use crate::config::SchemaConfig;
use crate::metadata::FieldMetadata;

#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Property or definition name; empty for anonymous nodes.
    pub name: String,
    pub nullable: bool,
    pub example: Option<Value>,
    pub metadata: FieldMetadata,
    pub kind: NodeKind,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Primitive { param: ParamKind },
    Enum { param: ParamKind, values: Vec<String> },
    Array { items: ArrayItems },
    Object { properties: IndexMap<String, SchemaNode> },
    /// Points at a named definition. `target` is `None` when the definition
    /// is still being built further up the tree (a recursive type).
    Reference { target_ref: String, target: Option<Box<SchemaNode>> },
    /// Homogeneous map: every value matches `additional`.
    Map { additional: Box<SchemaNode> },
    /// Heterogeneous map with unconstrained values.
    MapAny,
}

impl SchemaNode {
    pub fn new(
        name: impl Into<String>,
        nullable: bool,
        metadata: Option<FieldMetadata>,
        kind: NodeKind,
    ) -> Self {
        SchemaNode {
            name: name.into(),
            nullable,
            example: None,
            metadata: metadata.unwrap_or_default(),
            kind,
        }
    }

    pub fn with_example(mut self, example: Value) -> Self {
        if !example.is_null() {
            self.example = Some(example);
        }
        self
    }

    pub fn is_required(&self) -> bool {
        self.metadata.is_required()
    }

    /// Sorted names of required properties; `None` unless this is an object
    /// with at least one.
    pub fn required(&self, config: &SchemaConfig) -> Option<Vec<String>> {
        let NodeKind::Object { properties } = &self.kind else {
            return None;
        };
        let mut required: Vec<String> = properties
            .iter()
            .filter(|(_, p)| p.is_required() && !(config.nullable_is_optional && p.nullable))
            .map(|(k, _)| k.clone())
            .collect();
        required.sort();
        if required.is_empty() { None } else { Some(required) }
    }

    /// This node's identity when it appears as an array element.
    pub fn array_item(self) -> ArrayItem {
        let param = match &self.kind {
            NodeKind::Primitive { param } => Some(*param),
            _ => None,
        };
        let items = match &self.kind {
            NodeKind::Array { items } => Some(items.clone()),
            _ => None,
        };
        let target_ref = match &self.kind {
            NodeKind::Reference { target_ref, .. } => Some(target_ref.clone()),
            _ => None,
        };
        let schema = Box::new(self);
        match (param, items, target_ref) {
            (Some(param), _, _) => ArrayItem::NonObject { param, schema },
            (_, Some(items), _) => ArrayItem::Array { items, schema },
            (_, _, Some(target_ref)) => ArrayItem::Ref { target_ref, schema },
            _ => ArrayItem::Inline { schema },
        }
    }

    /// Every named definition reachable from this node, in discovery order.
    /// Duplicates are left for the flattener.
    pub fn definitions(&self) -> Vec<&SchemaNode> {
        match &self.kind {
            NodeKind::Primitive { .. } | NodeKind::Enum { .. } | NodeKind::MapAny => Vec::new(),
            NodeKind::Array { items } => items.definitions(),
            NodeKind::Object { properties } => {
                properties.values().flat_map(|p| p.definitions()).collect()
            }
            NodeKind::Reference { target, .. } => match target {
                Some(target) => {
                    std::iter::once(target.as_ref()).chain(target.definitions()).collect()
                }
                None => Vec::new(),
            },
            NodeKind::Map { additional } => additional.definitions(),
        }
    }

    pub fn to_document(&self, config: &SchemaConfig) -> Value {
        let mut out = Map::new();
        let ty = match &self.kind {
            NodeKind::Primitive { param } | NodeKind::Enum { param, .. } => Some(param.type_name()),
            NodeKind::Array { .. } => Some("array"),
            NodeKind::Object { .. } | NodeKind::Map { .. } | NodeKind::MapAny => Some("object"),
            NodeKind::Reference { .. } => None,
        };
        if let Some(ty) = ty {
            out.insert("type".into(), Value::from(ty));
        }
        if self.nullable {
            out.insert("nullable".into(), Value::Bool(true));
        }
        out.extend(self.metadata.keywords());
        if config.include_examples {
            if let (NodeKind::Primitive { .. }, Some(example)) = (&self.kind, &self.example) {
                out.insert("example".into(), example.clone());
            }
        }
        match &self.kind {
            NodeKind::Primitive { .. } => {}
            NodeKind::Enum { values, .. } => {
                out.insert("enum".into(), values.iter().cloned().map(Value::from).collect());
            }
            NodeKind::Array { items } => {
                out.insert("items".into(), items.to_document(config));
            }
            NodeKind::Object { properties } => {
                if let Some(required) = self.required(config) {
                    out.insert("required".into(), required.into_iter().map(Value::from).collect());
                }
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|(k, p)| (k.clone(), p.to_document(config)))
                    .collect();
                out.insert("properties".into(), Value::Object(props));
            }
            NodeKind::Map { additional } => {
                out.insert("additionalProperties".into(), additional.to_document(config));
            }
            NodeKind::MapAny => {
                out.insert("additionalProperties".into(), Value::Bool(true));
            }
            NodeKind::Reference { target_ref, .. } => {
                out.insert("$ref".into(), Value::from(target_ref.clone()));
            }
        }
        Value::Object(out)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ARRAY ITEMS
// ————————————————————————————————————————————————————————————————————————————

/// One distinct element shape of an array.
#[derive(Debug, Clone)]
pub enum ArrayItem {
    Array { items: ArrayItems, schema: Box<SchemaNode> },
    NonObject { param: ParamKind, schema: Box<SchemaNode> },
    Ref { target_ref: String, schema: Box<SchemaNode> },
    /// Maps and anonymous objects, compared by rendered shape.
    Inline { schema: Box<SchemaNode> },
}

impl PartialEq for ArrayItem {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ArrayItem::Array { items: a, .. }, ArrayItem::Array { items: b, .. }) => a == b,
            (ArrayItem::NonObject { param: a, .. }, ArrayItem::NonObject { param: b, .. }) => {
                a == b
            }
            (ArrayItem::Ref { target_ref: a, .. }, ArrayItem::Ref { target_ref: b, .. }) => a == b,
            (ArrayItem::Inline { schema: a }, ArrayItem::Inline { schema: b }) => {
                let cfg = SchemaConfig { include_examples: false, ..SchemaConfig::default() };
                a.to_document(&cfg) == b.to_document(&cfg)
            }
            _ => false,
        }
    }
}

impl ArrayItem {
    /// Category label; unions are ordered by it.
    pub fn label(&self) -> &'static str {
        match self {
            ArrayItem::Array { .. } => "Array",
            ArrayItem::Inline { .. } => "Inline",
            ArrayItem::NonObject { .. } => "NonObject",
            ArrayItem::Ref { .. } => "Ref",
        }
    }

    pub fn schema(&self) -> &SchemaNode {
        match self {
            ArrayItem::Array { schema, .. }
            | ArrayItem::NonObject { schema, .. }
            | ArrayItem::Ref { schema, .. }
            | ArrayItem::Inline { schema } => schema,
        }
    }

    fn to_document(&self, config: &SchemaConfig) -> Value {
        let mut out = Map::new();
        match self {
            ArrayItem::Array { items, schema } => {
                out.insert("type".into(), Value::from("array"));
                if let Some(format) = &schema.metadata.format {
                    out.insert("format".into(), Value::from(format.clone()));
                }
                out.insert("items".into(), items.to_document(config));
            }
            ArrayItem::NonObject { param, schema } => {
                out.insert("type".into(), Value::from(param.type_name()));
                if let Some(format) = &schema.metadata.format {
                    out.insert("format".into(), Value::from(format.clone()));
                }
            }
            ArrayItem::Ref { target_ref, .. } => {
                out.insert("$ref".into(), Value::from(target_ref.clone()));
            }
            ArrayItem::Inline { schema } => return schema.to_document(config),
        }
        Value::Object(out)
    }
}

#[derive(Debug, Clone, Default)]
pub enum ArrayItems {
    /// No elements observed.
    #[default]
    Empty,
    Single(Box<ArrayItem>),
    /// Distinct shapes, ordered by [`ArrayItem::label`].
    Union(Vec<ArrayItem>),
}

impl PartialEq for ArrayItems {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ArrayItems::Empty, ArrayItems::Empty) => true,
            (ArrayItems::Single(a), ArrayItems::Single(b)) => a == b,
            (ArrayItems::Union(a), ArrayItems::Union(b)) => {
                a.len() == b.len() && a.iter().all(|x| b.contains(x))
            }
            _ => false,
        }
    }
}

impl ArrayItems {
    pub fn into_items(self) -> Vec<ArrayItem> {
        match self {
            ArrayItems::Empty => Vec::new(),
            ArrayItems::Single(item) => vec![*item],
            ArrayItems::Union(items) => items,
        }
    }

    pub fn definitions(&self) -> Vec<&SchemaNode> {
        match self {
            ArrayItems::Empty => Vec::new(),
            ArrayItems::Single(item) => item.schema().definitions(),
            ArrayItems::Union(items) => {
                items.iter().flat_map(|i| i.schema().definitions()).collect()
            }
        }
    }

    pub fn to_document(&self, config: &SchemaConfig) -> Value {
        match self {
            ArrayItems::Empty => Value::Object(Map::new()),
            ArrayItems::Single(item) => item.to_document(config),
            ArrayItems::Union(items) => {
                let one_of: Vec<Value> = items.iter().map(|i| i.to_document(config)).collect();
                serde_json::json!({ "oneOf": one_of })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn primitive(name: &str, param: ParamKind) -> SchemaNode {
        SchemaNode::new(name, false, None, NodeKind::Primitive { param })
    }

    fn object(name: &str, props: Vec<SchemaNode>) -> SchemaNode {
        let properties = props.into_iter().map(|p| (p.name.clone(), p)).collect();
        SchemaNode::new(name, false, None, NodeKind::Object { properties })
    }

    fn reference(name: &str, target: SchemaNode) -> SchemaNode {
        let target_ref = format!("#/components/schemas/{}", target.name);
        let nullable = target.nullable;
        let kind = NodeKind::Reference { target_ref, target: Some(Box::new(target)) };
        SchemaNode::new(name, nullable, None, kind)
    }

    #[test]
    fn required_is_sorted_and_absent_when_empty() {
        let cfg = SchemaConfig::default();
        let string = NodeKind::Primitive { param: ParamKind::String };
        let optional = SchemaNode::new("b", false, Some(FieldMetadata::not_required()), string);
        let obj = object(
            "O",
            vec![primitive("z", ParamKind::String), optional, primitive("a", ParamKind::Integer)],
        );
        assert_eq!(obj.required(&cfg), Some(vec!["a".to_owned(), "z".to_owned()]));

        let open = SchemaNode::new("x", false, Some(FieldMetadata::not_required()), NodeKind::MapAny);
        let none = object("N", vec![open]);
        assert_eq!(none.required(&cfg), None);
        assert!(none.to_document(&cfg).get("required").is_none());
    }

    #[test]
    fn nullable_is_rendered_only_when_true() {
        let cfg = SchemaConfig::default();
        let owner = SchemaNode::new("owner", true, None, NodeKind::Primitive { param: ParamKind::String });
        assert_eq!(owner.to_document(&cfg), json!({"type": "string", "nullable": true}));
        assert_eq!(primitive("id", ParamKind::String).to_document(&cfg), json!({"type": "string"}));
    }

    #[test]
    fn nullable_exemption_is_configurable() {
        let cfg = SchemaConfig { nullable_is_optional: true, ..SchemaConfig::default() };
        let owner = SchemaNode::new("owner", true, None, NodeKind::Primitive { param: ParamKind::String });
        let obj = object("O", vec![primitive("id", ParamKind::String), owner]);
        assert_eq!(obj.required(&cfg), Some(vec!["id".to_owned()]));
    }

    #[test]
    fn references_expose_their_target_and_nested_definitions() {
        let inner = object("Inner", vec![primitive("x", ParamKind::Number)]);
        let outer = object("Outer", vec![reference("inner", inner)]);
        let root = reference("", outer);
        let names: Vec<&str> = root.definitions().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "Inner"]);
    }

    #[test]
    fn primitive_examples_and_metadata_render() {
        let cfg = SchemaConfig::default();
        let integer = NodeKind::Primitive { param: ParamKind::Integer };
        let node = SchemaNode::new("n", false, Some(FieldMetadata::formatted("int64")), integer)
            .with_example(json!(4));
        assert_eq!(node.to_document(&cfg), json!({"type": "integer", "format": "int64", "example": 4}));

        let quiet = SchemaConfig { include_examples: false, ..SchemaConfig::default() };
        assert_eq!(node.to_document(&quiet), json!({"type": "integer", "format": "int64"}));
    }

    #[test]
    fn array_item_identity_ignores_names() {
        let a = primitive("a", ParamKind::String).array_item();
        let b = primitive("b", ParamKind::String).array_item();
        let c = primitive("c", ParamKind::Integer).array_item();
        assert_eq!(a, b);
        assert!(a != c);
    }
}
