//! The JSON codec seam: every example value is observed through its
//! serde_json encoding. Nothing here knows about schemas.
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Object-safe view of a serializable value.
///
/// Blanket-implemented for every `Serialize` type, so `&dyn Example` can always
/// be encoded and named.
pub trait Erased {
    fn to_node(&self) -> serde_json::Result<Value>;
    /// `std::any::type_name` of the concrete value.
    fn type_path(&self) -> &'static str;
}

impl<T: Serialize + ?Sized> Erased for T {
    fn to_node(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
    fn type_path(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Coarse category of an encoded node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind { String, Integer, Number, Boolean, Array, Object, Null }

pub fn kind_of(node: &Value) -> JsonKind {
    match node {
        Value::Null => JsonKind::Null,
        Value::Bool(_) => JsonKind::Boolean,
        Value::Number(n) if n.is_i64() || n.is_u64() => JsonKind::Integer,
        Value::Number(_) => JsonKind::Number,
        Value::String(_) => JsonKind::String,
        Value::Array(_) => JsonKind::Array,
        Value::Object(_) => JsonKind::Object,
    }
}

/// Fields of an object node in encoding order; empty for anything else.
pub fn fields(node: &Value) -> Vec<(&str, &Value)> {
    match node {
        Value::Object(map) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        _ => Vec::new(),
    }
}

pub fn elements(node: &Value) -> &[Value] {
    match node {
        Value::Array(xs) => xs.as_slice(),
        _ => &[],
    }
}

pub fn as_node<T: Erased + ?Sized>(value: &T) -> Result<Value> {
    Ok(value.to_node()?)
}

/// Canonical JSON text of a value (`"RED"` for a unit enum variant).
pub fn as_format_string(value: &dyn Erased) -> Result<String> {
    Ok(serde_json::to_string(&value.to_node()?)?)
}

/// Strip one pair of surrounding double quotes, if present.
pub fn unquoted(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
}

/// Textual value of `node[key]`: strings come back raw, other scalars as
/// their JSON text. `None` for null, missing keys and non-objects.
pub fn text_value_of(node: &Value, key: &str) -> Option<String> {
    match node.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// The string a map key encodes to when it becomes a JSON property name.
pub fn map_key(key: &dyn Erased) -> Result<String> {
    let node = key.to_node()?;
    let holder = serde_json::json!({ "keyAsString": node });
    Ok(text_value_of(&holder, "keyAsString").unwrap_or_else(|| "null".to_owned()))
}
