//! Rowforge Core Types
//!
//! This crate defines the value, shape and schema model shared by the
//! extraction and sampling crates. Instances from any document source are
//! seen through the [`Node`] trait; resolved leaves come back as
//! [`CanonicalValue`] scalars; schema-carrying sources describe themselves
//! with [`TypeDecl`].

pub mod canonical;
pub mod errors;
pub mod node;
pub mod schema;
pub mod typed;
pub mod vars;

pub use canonical::{CanonicalType, CanonicalValue, Row};
pub use errors::{ExtractError, ExtractResult};
pub use node::{Member, NativeCategory, Node, NodeShape, Primitive};
pub use schema::{parse_type_decl, FieldDecl, RecordDecl, TypeDecl};
pub use typed::TypedValue;
pub use vars::{MapVariables, NoVariables, VariableProvider};
