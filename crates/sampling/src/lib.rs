//! Sampling-based schema discovery for schemaless sources.
//!
//! Walks a bounded sample of documents and folds every primitive leaf it
//! reaches into a path table: array levels collapse into one wildcard
//! entry whose observed index range is tracked per level, repeated visits
//! count occurrences, and type disagreements are flagged. The finalized
//! table becomes a flat field layout ready to feed an extractor.
//!
//! # Example
//!
//! ```ignore
//! use sampling::discover_schema;
//! use serde_json::json;
//!
//! let docs = vec![json!({"a": [1, 2]}), json!({"a": [1, 2, 3]})];
//! let report = discover_schema(docs, 100);
//! assert_eq!(report.fields[0].path, "$.a[0]");
//! ```

mod accumulator;
mod disambiguate;
mod sampler;

pub use accumulator::{DiscoveredPath, SampleAccumulator};
pub use disambiguate::{disambiguate_names, to_field_specs};
pub use sampler::{discover_schema, DiscoveryReport};
