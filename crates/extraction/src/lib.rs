//! Path-addressed extraction over structured instances.
//!
//! This crate compiles dot/bracket field paths once, then resolves them
//! against any node-shaped instance (schemaless JSON or a schema-carrying
//! tree) into canonical output cells.
//!
//! # Features
//!
//! - **Compiled paths**: `$.user.tags[0]` parsed once, reused per instance
//! - **Variable tokens**: `${name}` replaced per instance before resolution
//! - **Union narrowing**: declared unions resolved per value
//! - **Wildcard rows**: `$.items[*].id` emits one row per element
//! - **Schema tooling**: leaf enumeration, fingerprint-keyed parse cache
//!
//! # Example
//!
//! ```ignore
//! use extraction::Extractor;
//! use rowforge_config::{ExtractorSettings, FieldSpec};
//! use rowforge_core::{CanonicalType, NoVariables};
//!
//! let fields = [FieldSpec::new("name", "$.user.name", CanonicalType::String)];
//! let extractor = Extractor::new(&fields, &ExtractorSettings::default())?;
//! let doc: serde_json::Value =
//!     serde_json::from_str(r#"{"user": {"name": "Ann"}}"#)?;
//! let row = extractor.resolve_row(&doc, &NoVariables)?;
//! ```

mod cache;
mod coerce;
mod enumerate;
mod expand;
mod extractor;
mod path;
mod resolver;
mod union;

pub use cache::{fingerprint, SchemaCache};
pub use coerce::coerce;
pub use enumerate::enumerate_leaves;
pub use extractor::Extractor;
pub use path::{compile, CompiledPath, PathSegment};
pub use resolver::resolve;
pub use union::resolve_union;
