use serde_json::Value;

use super::Walk;
use crate::codec;
use crate::error::Result;
use crate::example::{Example, Shape};
use crate::metadata::FieldMetadata;
use crate::schema::{ArrayItem, ArrayItems, NodeKind, SchemaNode};

impl Walk<'_> {
    /// Every non-null element is built as a loose value (with element
    /// metadata from the retrieval chain), then the shapes are unified.
    pub(crate) fn array_schema(
        &mut self,
        name: &str,
        node: &Value,
        value: &dyn Example,
        is_nullable: bool,
        metadata: Option<FieldMetadata>,
        prefix: &str,
    ) -> Result<SchemaNode> {
        let elements = match value.shape() {
            Shape::Sequence(xs) => xs,
            _ => Vec::new(),
        };
        let mut items = Vec::with_capacity(elements.len());
        for (el_node, el) in codec::elements(node).iter().zip(elements) {
            if el_node.is_null() {
                continue;
            }
            let el_metadata = self.retrieval.element_metadata(el)?;
            let schema = self.value_schema(el_node, el, None, false, prefix, Some(el_metadata))?;
            items.push(schema.array_item());
        }
        let items = unify(items);
        Ok(SchemaNode::new(name, is_nullable, metadata, NodeKind::Array { items }))
    }
}

/// Collapse element shapes: none → `Empty`, one distinct → `Single`, more →
/// `Union` ordered by category label (first-seen order within a label).
pub fn unify(items: Vec<ArrayItem>) -> ArrayItems {
    let mut distinct: Vec<ArrayItem> = Vec::new();
    for item in items {
        if !distinct.contains(&item) {
            distinct.push(item);
        }
    }
    match distinct.len() {
        0 => ArrayItems::Empty,
        1 => ArrayItems::Single(Box::new(distinct.remove(0))),
        _ => {
            distinct.sort_by_key(|item| item.label());
            ArrayItems::Union(distinct)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ParamKind;
    use crate::config::SchemaConfig;
    use crate::example::Field;
    use crate::namer::Simple;
    use crate::retrieval::SimpleLookup;
    use pretty_assertions::assert_eq;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct Cat { lives: u8 }

    #[derive(Serialize)]
    struct Dog { good: bool }

    impl Example for Cat {
        fn shape(&self) -> Shape<'_> { Shape::Record(vec![Field::of("lives", &self.lives)]) }
    }

    impl Example for Dog {
        fn shape(&self) -> Shape<'_> { Shape::Record(vec![Field::of("good", &self.good)]) }
    }

    #[derive(Serialize)]
    #[serde(untagged)]
    enum Pet { Cat(Cat), Dog(Dog) }

    impl Example for Pet {
        fn shape(&self) -> Shape<'_> {
            match self {
                Pet::Cat(c) => c.shape(),
                Pet::Dog(d) => d.shape(),
            }
        }
        fn naming_path(&self) -> &'static str {
            match self {
                Pet::Cat(c) => c.naming_path(),
                Pet::Dog(d) => d.naming_path(),
            }
        }
    }

    fn array_doc(value: &dyn Example) -> (Value, Vec<String>) {
        let retrieval = SimpleLookup::default();
        let config = SchemaConfig::default();
        let mut walk = Walk::new(&retrieval, &Simple, &config);
        let tree = walk.build(value, None, false, "", None).unwrap();
        let defs = tree.definitions().iter().map(|d| d.name.clone()).collect();
        (tree.to_document(&config), defs)
    }

    fn prim(param: ParamKind) -> ArrayItem {
        SchemaNode::new("", false, None, NodeKind::Primitive { param }).array_item()
    }

    #[test]
    fn unify_collapses_repeats() {
        assert_eq!(unify(Vec::new()), ArrayItems::Empty);
        let single = unify(vec![prim(ParamKind::String), prim(ParamKind::String)]);
        assert!(matches!(single, ArrayItems::Single(_)));
    }

    #[test]
    fn two_record_types_make_a_two_way_union() {
        let pets = vec![
            Pet::Cat(Cat { lives: 9 }),
            Pet::Dog(Dog { good: true }),
            Pet::Cat(Cat { lives: 7 }),
        ];
        let (doc, defs) = array_doc(&pets);
        assert_eq!(doc, json!({
            "type": "array",
            "items": { "oneOf": [
                { "$ref": "#/components/schemas/Cat" },
                { "$ref": "#/components/schemas/Dog" },
            ]}
        }));
        assert_eq!(defs, vec!["Cat", "Dog"]);
    }

    #[test]
    fn union_order_follows_category_label() {
        let mixed = json!([{"k": 1}, "s", [1], 2]);
        let (doc, _) = array_doc(&mixed);
        let labels: Vec<&str> = doc["items"]["oneOf"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.get("type").and_then(Value::as_str).unwrap_or("ref"))
            .collect();
        // Array, Inline (the map), NonObject string, NonObject integer
        assert_eq!(labels, vec!["array", "object", "string", "integer"]);
    }

    #[test]
    fn nested_arrays_compare_by_item_structure() {
        let nested = json!([[1, 2], [3]]);
        let (doc, _) = array_doc(&nested);
        assert_eq!(doc, json!({
            "type": "array",
            "items": { "type": "array", "items": { "type": "integer" } }
        }));
    }

    #[test]
    fn empty_and_null_only_arrays_have_open_items() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(array_doc(&empty).0, json!({"type": "array", "items": {}}));
        let nulls: Vec<Option<u8>> = vec![None, None];
        assert_eq!(array_doc(&nulls).0, json!({"type": "array", "items": {}}));
    }

    #[test]
    fn element_formats_come_from_the_element_type() {
        let ids: Vec<i64> = vec![1, 2];
        assert_eq!(array_doc(&ids).0, json!({
            "type": "array",
            "items": { "type": "integer", "format": "int64" }
        }));
    }
}
