use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalType;
use crate::node::NodeShape;

// ============================================================================
// Declared Schema Model
// ============================================================================

/// Declared type of a node in a schema-carrying source.
///
/// Sources that ship a schema alongside their records (self-describing
/// binary formats) hand it to the engine in this form; schemaless document
/// sources never produce one. The JSON text form is the same shape, e.g.
///
/// ```json
/// {"type": "record", "name": "user", "fields": [
///     {"name": "id", "type": {"type": "long"}},
///     {"name": "tags", "type": {"type": "array", "items": {"type": "string"}}}
/// ]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TypeDecl {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    #[serde(rename = "string")]
    Text,
    Fixed { size: usize },
    Enum { name: String, symbols: Vec<String> },
    Array { items: Box<TypeDecl> },
    Map { values: Box<TypeDecl> },
    Record(RecordDecl),
    Union { branches: Vec<TypeDecl> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub decl: TypeDecl,
}

impl RecordDecl {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDecl>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, decl: TypeDecl) -> Self {
        Self {
            name: name.into(),
            decl,
        }
    }
}

impl TypeDecl {
    pub fn is_null(&self) -> bool {
        matches!(self, TypeDecl::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, TypeDecl::Map { .. })
    }

    /// Shape a value of this type presents to the resolver. `None` for
    /// unions, which never dispatch directly (a concrete branch is chosen
    /// first).
    pub fn shape(&self) -> Option<NodeShape> {
        match self {
            TypeDecl::Record(_) => Some(NodeShape::Record),
            TypeDecl::Array { .. } => Some(NodeShape::Array),
            TypeDecl::Map { .. } => Some(NodeShape::Map),
            TypeDecl::Union { .. } => None,
            _ => Some(NodeShape::Primitive),
        }
    }

    /// Canonical output type a leaf of this declared type maps to.
    /// `None` for composites, unions and the null type.
    pub fn leaf_target(&self) -> Option<CanonicalType> {
        match self {
            TypeDecl::Boolean => Some(CanonicalType::Boolean),
            TypeDecl::Text | TypeDecl::Enum { .. } => {
                Some(CanonicalType::String)
            }
            TypeDecl::Int | TypeDecl::Long => Some(CanonicalType::Integer),
            TypeDecl::Float | TypeDecl::Double => Some(CanonicalType::Number),
            TypeDecl::Bytes | TypeDecl::Fixed { .. } => {
                Some(CanonicalType::Binary)
            }
            _ => None,
        }
    }
}

/// Parse a JSON type declaration, as supplied by a schema-carrying source.
pub fn parse_type_decl(text: &str) -> anyhow::Result<TypeDecl> {
    serde_json::from_str(text).context("parsing type declaration")
}
