//! Derive OpenAPI-style JSON Schema documents from example values.
//!
//! An example is any type implementing [`Example`]: it is encoded through
//! serde_json, walked field by field, and turned into a schema for the value
//! plus a flat set of named, de-duplicated definitions.
//!
//! ```
//! use example_schema::{Example, Field, SchemaGenerator, Shape};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Point { x: f64, y: f64 }
//!
//! impl Example for Point {
//!     fn shape(&self) -> Shape<'_> {
//!         Shape::Record(vec![Field::of("x", &self.x), Field::of("y", &self.y)])
//!     }
//! }
//!
//! let schema = SchemaGenerator::default()
//!     .to_schema(&Point { x: 1.0, y: 2.0 }, None, None)
//!     .unwrap();
//! assert_eq!(schema.node["$ref"], "#/components/schemas/Point");
//! assert!(schema.definitions.contains_key("Point"));
//! ```
pub mod classify;
pub mod codec;
pub mod config;
pub mod error;
pub mod example;
pub mod flatten;
pub mod generator;
pub mod inference;
pub mod metadata;
pub mod namer;
pub mod retrieval;
pub mod schema;

pub use config::{CollisionPolicy, SchemaConfig};
pub use error::{Result, SchemaError};
pub use example::{DeclaredKind, Example, Field, Shape};
pub use generator::{JsonSchema, SchemaGenerator};
pub use metadata::{FieldMetadata, MetadataSource};
pub use namer::ModelNamer;
pub use retrieval::{FieldCase, FieldRetrieval};
