//! Type classification: encoded shape → schema type, with a fallback to the
//! declared field type when the example is null.
use serde_json::Value;

use crate::codec::{self, JsonKind};
use crate::error::{Result, SchemaError};
use crate::example::{DeclaredKind, Example, Shape};

/// Schema `type` of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind { String, Integer, Number, Boolean, Array, Object, Null }

impl ParamKind {
    pub fn type_name(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
            ParamKind::Array => "array",
            ParamKind::Object => "object",
            ParamKind::Null => "null",
        }
    }

    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            ParamKind::String | ParamKind::Integer | ParamKind::Number | ParamKind::Boolean
        )
    }
}

/// Classify an encoded node. A null node carries no type, so `field` is
/// reported as unresolvable; callers may recover with [`guess_kind`].
pub fn classify(node: &Value, field: &str) -> Result<ParamKind> {
    match codec::kind_of(node) {
        JsonKind::String => Ok(ParamKind::String),
        JsonKind::Integer => Ok(ParamKind::Integer),
        JsonKind::Number => Ok(ParamKind::Number),
        JsonKind::Boolean => Ok(ParamKind::Boolean),
        JsonKind::Array => Ok(ParamKind::Array),
        JsonKind::Object => Ok(ParamKind::Object),
        JsonKind::Null => Err(SchemaError::UnresolvableType { field: field.to_owned() }),
    }
}

/// Kind of a null-valued `field` from the declaration on `parent`.
pub fn guess_kind(field: &str, parent: &dyn Example) -> Result<ParamKind> {
    let declared = match parent.shape() {
        Shape::Record(fields) => fields.iter().find(|f| f.name == field).and_then(|f| f.declared),
        _ => None,
    };
    let declared =
        declared.ok_or_else(|| SchemaError::UnresolvableType { field: field.to_owned() })?;
    tracing::debug!(field, ?declared, "null example, using declared kind");
    Ok(match declared {
        DeclaredKind::String => ParamKind::String,
        DeclaredKind::Integer => ParamKind::Integer,
        DeclaredKind::Number => ParamKind::Number,
        DeclaredKind::Boolean => ParamKind::Boolean,
        DeclaredKind::Array => ParamKind::Array,
        DeclaredKind::Unit => ParamKind::Null,
        DeclaredKind::Object => ParamKind::Object,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::Field;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct Holder {
        count: Option<u32>,
        anything: Value,
        nothing: (),
    }

    impl Example for Holder {
        fn shape(&self) -> Shape<'_> {
            Shape::Record(vec![
                Field::of("count", &self.count),
                Field::of("anything", &self.anything),
                Field::of("nothing", &self.nothing),
            ])
        }
    }

    fn holder() -> Holder {
        Holder { count: None, anything: Value::Null, nothing: () }
    }

    #[test]
    fn observed_shapes_classify_directly() {
        assert_eq!(classify(&json!("a"), "f").unwrap(), ParamKind::String);
        assert_eq!(classify(&json!(2), "f").unwrap(), ParamKind::Integer);
        assert_eq!(classify(&json!(2.5), "f").unwrap(), ParamKind::Number);
        assert_eq!(classify(&json!([]), "f").unwrap(), ParamKind::Array);
        assert_eq!(classify(&json!({}), "f").unwrap(), ParamKind::Object);
    }

    #[test]
    fn null_is_unresolvable_without_declaration() {
        let err = classify(&Value::Null, "owner").unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvableType { ref field } if field == "owner"));
    }

    #[test]
    fn declared_kind_resolves_nulls() {
        let h = holder();
        assert_eq!(guess_kind("count", &h).unwrap(), ParamKind::Integer);
        assert_eq!(guess_kind("nothing", &h).unwrap(), ParamKind::Null);
        assert!(matches!(guess_kind("anything", &h), Err(SchemaError::UnresolvableType { .. })));
        assert!(matches!(guess_kind("missing", &h), Err(SchemaError::UnresolvableType { .. })));
    }
}
