use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::node::{Member, Node, NodeShape, Primitive};
use crate::schema::{RecordDecl, TypeDecl};

/// Schema-carrying in-memory instance tree.
///
/// This is the shape self-describing binary records take after
/// deserialization: container values know their own declared type, map
/// values do not (their shape is only recoverable from the declared union
/// they sit in). Schemaless documents use `serde_json::Value` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    DateTime(DateTime<Utc>),
    /// Enumeration symbol carrying its declaration.
    Symbol { decl: TypeDecl, value: String },
    /// Fixed-size blob carrying its declaration.
    Fixed { decl: TypeDecl, bytes: Vec<u8> },
    /// Record with declared member types; `values` is in declaration order.
    Record { decl: TypeDecl, values: Vec<TypedValue> },
    /// Plain key-value map. Deliberately carries no declaration.
    Map(BTreeMap<String, TypedValue>),
    /// List; `decl` present when the source declared the element type.
    Array {
        decl: Option<TypeDecl>,
        items: Vec<TypedValue>,
    },
}

impl TypedValue {
    pub fn record(decl: RecordDecl, values: Vec<TypedValue>) -> Self {
        TypedValue::Record {
            decl: TypeDecl::Record(decl),
            values,
        }
    }

    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, TypedValue)>,
    {
        TypedValue::Map(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )
    }

    pub fn array(items: Vec<TypedValue>) -> Self {
        TypedValue::Array { decl: None, items }
    }

    pub fn typed_array(item_decl: TypeDecl, items: Vec<TypedValue>) -> Self {
        TypedValue::Array {
            decl: Some(TypeDecl::Array {
                items: Box::new(item_decl),
            }),
            items,
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        TypedValue::Text(s.into())
    }

    pub fn symbol(decl: TypeDecl, value: impl Into<String>) -> Self {
        TypedValue::Symbol {
            decl,
            value: value.into(),
        }
    }

    pub fn fixed(size: usize, bytes: Vec<u8>) -> Self {
        TypedValue::Fixed {
            decl: TypeDecl::Fixed { size },
            bytes,
        }
    }

    fn record_decl(&self) -> Option<&RecordDecl> {
        match self {
            TypedValue::Record {
                decl: TypeDecl::Record(rd),
                ..
            } => Some(rd),
            _ => None,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            TypedValue::Null => Value::Null,
            TypedValue::Boolean(b) => Value::Bool(*b),
            TypedValue::Integer(i) => Value::from(*i),
            TypedValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            TypedValue::Text(s) => Value::from(s.as_str()),
            TypedValue::Bytes(b) | TypedValue::Fixed { bytes: b, .. } => {
                Value::from(String::from_utf8_lossy(b).into_owned())
            }
            TypedValue::DateTime(d) => Value::from(d.to_rfc3339()),
            TypedValue::Symbol { value, .. } => Value::from(value.as_str()),
            TypedValue::Record { .. } | TypedValue::Map(_) => Value::Object(
                self.entries()
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
            TypedValue::Array { items, .. } => {
                Value::Array(items.iter().map(TypedValue::to_json).collect())
            }
        }
    }
}

impl Node for TypedValue {
    fn shape(&self) -> NodeShape {
        match self {
            TypedValue::Record { .. } => NodeShape::Record,
            TypedValue::Map(_) => NodeShape::Map,
            TypedValue::Array { .. } => NodeShape::Array,
            _ => NodeShape::Primitive,
        }
    }

    fn declared(&self) -> Option<&TypeDecl> {
        match self {
            TypedValue::Record { decl, .. }
            | TypedValue::Symbol { decl, .. }
            | TypedValue::Fixed { decl, .. } => Some(decl),
            TypedValue::Array { decl, .. } => decl.as_ref(),
            _ => None,
        }
    }

    fn member(&self, name: &str) -> Member<'_, Self> {
        let Some(rd) = self.record_decl() else {
            return Member::Absent;
        };
        let TypedValue::Record { values, .. } = self else {
            return Member::Absent;
        };
        match rd.fields.iter().position(|f| f.name == name) {
            Some(i) => match values.get(i) {
                Some(v) => Member::Value(v, Some(&rd.fields[i].decl)),
                None => Member::Absent,
            },
            None => Member::Absent,
        }
    }

    fn entries(&self) -> Vec<(&str, &Self)> {
        match self {
            TypedValue::Record { values, .. } => self
                .record_decl()
                .map(|rd| {
                    rd.fields
                        .iter()
                        .map(|f| f.name.as_str())
                        .zip(values.iter())
                        .collect()
                })
                .unwrap_or_default(),
            TypedValue::Map(m) => {
                m.iter().map(|(k, v)| (k.as_str(), v)).collect()
            }
            _ => Vec::new(),
        }
    }

    fn array_len(&self) -> usize {
        match self {
            TypedValue::Array { items, .. } => items.len(),
            _ => 0,
        }
    }

    fn element(&self, index: usize) -> Option<&Self> {
        match self {
            TypedValue::Array { items, .. } => items.get(index),
            _ => None,
        }
    }

    fn value_for(&self, key: &str) -> Option<&Self> {
        match self {
            TypedValue::Map(m) => m.get(key),
            _ => None,
        }
    }

    fn primitive(&self) -> Option<Primitive<'_>> {
        match self {
            TypedValue::Null => Some(Primitive::Null),
            TypedValue::Boolean(b) => Some(Primitive::Boolean(*b)),
            TypedValue::Integer(i) => Some(Primitive::Integer(*i)),
            TypedValue::Float(f) => Some(Primitive::Float(*f)),
            TypedValue::Text(s) => Some(Primitive::Text(s)),
            TypedValue::Bytes(b) => Some(Primitive::Binary(b)),
            TypedValue::DateTime(d) => Some(Primitive::DateTime(*d)),
            TypedValue::Symbol { value, .. } => Some(Primitive::Text(value)),
            TypedValue::Fixed { bytes, .. } => Some(Primitive::Binary(bytes)),
            TypedValue::Record { .. }
            | TypedValue::Map(_)
            | TypedValue::Array { .. } => None,
        }
    }

    fn render_text(&self) -> String {
        match self {
            TypedValue::Text(s) => s.clone(),
            TypedValue::Symbol { value, .. } => value.clone(),
            TypedValue::Bytes(b) | TypedValue::Fixed { bytes: b, .. } => {
                String::from_utf8_lossy(b).into_owned()
            }
            TypedValue::DateTime(d) => d.to_rfc3339(),
            TypedValue::Boolean(b) => b.to_string(),
            TypedValue::Integer(i) => i.to_string(),
            TypedValue::Float(f) => f.to_string(),
            TypedValue::Null => "null".to_string(),
            composite => composite.to_json().to_string(),
        }
    }
}
