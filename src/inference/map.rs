use indexmap::IndexMap;
use serde_json::Value;

use super::{arr, primitive, Walk};
use crate::classify::{self, ParamKind};
use crate::codec::{self, Erased};
use crate::error::Result;
use crate::example::Example;
use crate::metadata::FieldMetadata;
use crate::retrieval::ResolvedField;
use crate::schema::{NodeKind, SchemaNode};

impl Walk<'_> {
    /// Pick a rendering for a key/value map from the distinct kinds of its
    /// non-null values:
    ///
    /// 1. one primitive or array kind → typed map of that kind,
    /// 2. top level with a supplied name → named object, one property per key,
    /// 3. several kinds → open map,
    /// 4. one object kind → typed map of a representative value's schema.
    ///
    /// A map with no non-null values is open.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn map_schema(
        &mut self,
        obj_name: Option<&str>,
        node: &Value,
        value: &dyn Example,
        entries: &[(&dyn Erased, &dyn Example)],
        is_nullable: bool,
        top_level: bool,
        metadata: Option<FieldMetadata>,
        prefix: &str,
    ) -> Result<SchemaNode> {
        let name = obj_name.map(str::to_owned).unwrap_or_else(|| self.namer.name(value));
        let keyed = keyed_entries(node, entries)?;

        let mut kinds: Vec<ParamKind> = Vec::new();
        for (key, field_node, _) in &keyed {
            if field_node.is_null() {
                continue;
            }
            let kind = classify::classify(field_node, key)?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        let by_key = non_null_by_key(&keyed);

        if let ([kind], Some((_, first_node, _))) = (kinds.as_slice(), by_key.first()) {
            let additional = match kind {
                ParamKind::Array => Some(self.array_values(&by_key, is_nullable, prefix)?),
                kind if kind.is_primitive() => {
                    Some(primitive("", *kind, is_nullable, first_node, None))
                }
                _ => None,
            };
            if let Some(additional) = additional {
                tracing::debug!(map = %name, kind = kind.type_name(), "typed map");
                let kind = NodeKind::Map { additional: Box::new(additional) };
                return Ok(SchemaNode::new(name, is_nullable, metadata, kind));
            }
        }

        if let (true, Some(obj_name)) = (top_level, obj_name) {
            return self.named_map(obj_name, value, &keyed, is_nullable, metadata, prefix);
        }

        let Some((_, rep_node, rep_value)) = by_key.first().filter(|_| kinds.len() == 1) else {
            tracing::debug!(map = %name, kinds = kinds.len(), "open map");
            return Ok(SchemaNode::new(name, is_nullable, metadata, NodeKind::MapAny));
        };
        let rep_name = self.namer.name(*rep_value);
        let additional = self.object_or_map(
            Some(&rep_name),
            rep_node,
            *rep_value,
            is_nullable,
            false,
            None,
            prefix,
        )?;
        tracing::debug!(map = %name, value = %rep_name, "typed map of objects");
        let kind = NodeKind::Map { additional: Box::new(additional) };
        Ok(SchemaNode::new(name, is_nullable, metadata, kind))
    }

    /// One array schema for every array value of a map: the element shapes
    /// of all values are unified together.
    fn array_values(
        &mut self,
        by_key: &[&(String, &Value, &dyn Example)],
        is_nullable: bool,
        prefix: &str,
    ) -> Result<SchemaNode> {
        let mut items = Vec::new();
        for (_, node, value) in by_key.iter().copied() {
            let schema = self.array_schema("", node, *value, is_nullable, None, prefix)?;
            if let NodeKind::Array { items: each } = schema.kind {
                items.extend(each.into_items());
            }
        }
        let items = arr::unify(items);
        Ok(SchemaNode::new("", is_nullable, None, NodeKind::Array { items }))
    }

    /// Every key becomes a nullable, non-required property of a named
    /// definition.
    fn named_map(
        &mut self,
        obj_name: &str,
        value: &dyn Example,
        keyed: &[(String, &Value, &dyn Example)],
        is_nullable: bool,
        metadata: Option<FieldMetadata>,
        prefix: &str,
    ) -> Result<SchemaNode> {
        let mut sorted: Vec<_> = keyed.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let mut properties = IndexMap::with_capacity(sorted.len());
        for (key, field_node, entry) in sorted {
            let field = ResolvedField {
                declared_name: key.clone(),
                value: *entry,
                is_nullable: true,
                metadata: self
                    .retrieval
                    .element_metadata(*entry)?
                    .merge(FieldMetadata::not_required()),
            };
            let schema = self.property(field_node, key, field, prefix, value)?;
            properties.insert(key.clone(), schema);
        }
        let def_name = format!("{prefix}{obj_name}");
        let target_ref = self.config.ref_path(&def_name);
        let target = SchemaNode::new(def_name, is_nullable, None, NodeKind::Object { properties });
        Ok(SchemaNode::new(
            obj_name,
            is_nullable,
            metadata,
            NodeKind::Reference { target_ref, target: Some(Box::new(target)) },
        ))
    }
}

/// Pair every encoded key with its node and the original entry value.
fn keyed_entries<'v, 'a>(
    node: &'v Value,
    entries: &[(&'a dyn Erased, &'a dyn Example)],
) -> Result<Vec<(String, &'v Value, &'a dyn Example)>> {
    let mut by_key: IndexMap<String, &'a dyn Example> = IndexMap::with_capacity(entries.len());
    for (key, entry) in entries {
        by_key.insert(codec::map_key(*key)?, *entry);
    }
    Ok(codec::fields(node)
        .into_iter()
        .filter_map(|(key, field_node)| {
            by_key.get(key).map(|entry| (key.to_owned(), field_node, *entry))
        })
        .collect())
}

/// Non-null entries in key order, so hash maps render the same on every run.
fn non_null_by_key<'k, 'v, 'a>(
    keyed: &'k [(String, &'v Value, &'a dyn Example)],
) -> Vec<&'k (String, &'v Value, &'a dyn Example)> {
    let mut sorted: Vec<_> = keyed.iter().filter(|(_, n, _)| !n.is_null()).collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted
}
