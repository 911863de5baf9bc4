//! Errors raised while deriving a schema from an example value.
//!
//! Generation is all-or-nothing per example: every variant aborts the whole
//! `to_schema` call. Duplicate definition names and heterogeneous maps are
//! not errors (unless [`CollisionPolicy::Fail`](crate::config::CollisionPolicy)
//! is configured).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemaError>;

#[derive(Debug, Error)]
pub enum SchemaError {
    /// The codec reported a field that the container's descriptor does not declare.
    #[error("no field `{field}` found on `{container}`")]
    FieldNotFound { field: String, container: String },

    /// A null example whose declared type says nothing about its category.
    #[error("cannot use a null value in a schema: unable to determine a type for `{field}`")]
    UnresolvableType { field: String },

    /// Two structurally different definitions share a name.
    #[error("conflicting definitions named `{name}`")]
    DefinitionCollision { name: String },

    #[error("example nesting exceeds the configured depth of {limit}")]
    DepthExceeded { limit: usize },

    #[error("failed to encode example: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("invalid configuration at {path}: {message}")]
    Config { path: String, message: String },
}
