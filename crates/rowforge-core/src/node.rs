use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::schema::TypeDecl;

// ============================================================================
// Shapes and Primitives
// ============================================================================

/// Shape one instance node presents to the resolver.
///
/// Unions never appear here; union resolution always produces one of these
/// four before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Record,
    Array,
    Map,
    Primitive,
}

/// Category a primitive leaf reports. The coercion matrix is keyed on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeCategory {
    Null,
    Text,
    Integer,
    Float,
    Boolean,
    DateTime,
    Binary,
}

impl NativeCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            NativeCategory::Null => "null",
            NativeCategory::Text => "text",
            NativeCategory::Integer => "integer",
            NativeCategory::Float => "float",
            NativeCategory::Boolean => "boolean",
            NativeCategory::DateTime => "datetime",
            NativeCategory::Binary => "binary",
        }
    }
}

/// Borrowed view of a primitive leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive<'a> {
    Null,
    Text(&'a str),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Binary(&'a [u8]),
}

impl Primitive<'_> {
    pub fn category(&self) -> NativeCategory {
        match self {
            Primitive::Null => NativeCategory::Null,
            Primitive::Text(_) => NativeCategory::Text,
            Primitive::Integer(_) => NativeCategory::Integer,
            Primitive::Float(_) => NativeCategory::Float,
            Primitive::Boolean(_) => NativeCategory::Boolean,
            Primitive::DateTime(_) => NativeCategory::DateTime,
            Primitive::Binary(_) => NativeCategory::Binary,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Primitive::Null)
    }
}

// ============================================================================
// The Node Trait
// ============================================================================

/// Result of a record member lookup.
#[derive(Debug)]
pub enum Member<'a, N> {
    /// The record has no such member at all.
    Absent,
    /// The member exists. Schema-carrying sources also report its declared
    /// type; schemaless sources report `None`.
    Value(&'a N, Option<&'a TypeDecl>),
}

/// One self-describing instance node.
///
/// The resolver and the sampler only ever see source data through this
/// trait; deserialization belongs to the document source. `serde_json::Value`
/// implements it for schemaless documents, [`TypedValue`](crate::TypedValue)
/// for schema-carrying trees.
pub trait Node: Sized {
    fn shape(&self) -> NodeShape;

    /// Declared type carried by the value itself. Self-describing container
    /// values (records, typed arrays, enum symbols, fixed blobs) report it;
    /// everything else reports `None`.
    fn declared(&self) -> Option<&TypeDecl>;

    /// Record member lookup by name.
    fn member(&self, name: &str) -> Member<'_, Self>;

    /// Record members or map entries, in document order.
    fn entries(&self) -> Vec<(&str, &Self)>;

    /// Array length. Zero for anything that is not an array.
    fn array_len(&self) -> usize;

    /// Array element by position.
    fn element(&self, index: usize) -> Option<&Self>;

    /// Map value lookup by literal key.
    fn value_for(&self, key: &str) -> Option<&Self>;

    /// Primitive view of this node; `None` for composites.
    fn primitive(&self) -> Option<Primitive<'_>>;

    /// Canonical textual rendering, used when a whole composite is coerced
    /// to its string form.
    fn render_text(&self) -> String;
}

// ============================================================================
// Schemaless Documents
// ============================================================================

/// Schemaless documents: JSON objects are records (member lookup by name),
/// never maps. The map shape only arises from schema-carrying sources.
impl Node for Value {
    fn shape(&self) -> NodeShape {
        match self {
            Value::Object(_) => NodeShape::Record,
            Value::Array(_) => NodeShape::Array,
            _ => NodeShape::Primitive,
        }
    }

    fn declared(&self) -> Option<&TypeDecl> {
        None
    }

    fn member(&self, name: &str) -> Member<'_, Self> {
        match self.get(name) {
            Some(child) => Member::Value(child, None),
            None => Member::Absent,
        }
    }

    fn entries(&self) -> Vec<(&str, &Self)> {
        match self {
            Value::Object(map) => {
                map.iter().map(|(k, v)| (k.as_str(), v)).collect()
            }
            _ => Vec::new(),
        }
    }

    fn array_len(&self) -> usize {
        self.as_array().map_or(0, Vec::len)
    }

    fn element(&self, index: usize) -> Option<&Self> {
        self.as_array().and_then(|a| a.get(index))
    }

    fn value_for(&self, key: &str) -> Option<&Self> {
        self.get(key)
    }

    fn primitive(&self) -> Option<Primitive<'_>> {
        match self {
            Value::Null => Some(Primitive::Null),
            Value::Bool(b) => Some(Primitive::Boolean(*b)),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => Primitive::Integer(i),
                None => Primitive::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            Value::String(s) => Some(Primitive::Text(s)),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn render_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_json_shapes() {
        assert_eq!(json!({"a": 1}).shape(), NodeShape::Record);
        assert_eq!(json!([1, 2]).shape(), NodeShape::Array);
        assert_eq!(json!("x").shape(), NodeShape::Primitive);
        assert_eq!(json!(null).shape(), NodeShape::Primitive);
    }

    #[test]
    fn test_json_member_absent_vs_null() {
        let doc = json!({"present": null});
        assert!(matches!(doc.member("missing"), Member::Absent));
        match doc.member("present") {
            Member::Value(v, decl) => {
                assert!(decl.is_none());
                assert_eq!(v.primitive(), Some(Primitive::Null));
            }
            Member::Absent => panic!("member should exist"),
        }
    }

    #[test]
    fn test_json_numbers_split_integer_and_float() {
        assert_eq!(json!(42).primitive(), Some(Primitive::Integer(42)));
        assert_eq!(json!(1.5).primitive(), Some(Primitive::Float(1.5)));
    }

    #[test]
    fn test_json_composite_renders_as_json_text() {
        assert_eq!(json!({"a": [1]}).render_text(), r#"{"a":[1]}"#);
        assert_eq!(json!("plain").render_text(), "plain");
    }
}
