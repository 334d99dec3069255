use tracing::debug;

use rowforge_config::FieldSpec;
use rowforge_core::{
    CanonicalType, CanonicalValue, ExtractError, ExtractResult, Node,
    NodeShape, Row, TypeDecl, VariableProvider,
};

use crate::path::{compile, CompiledPath};
use crate::resolver::{resolve, resolve_from, resolve_node};

const WILDCARD: &str = "[*]";

/// Row plan for a field set containing `[*]` wildcards.
///
/// A wildcard addresses every element of one array or map level, and an
/// instance emits one row per element. All wildcard fields must agree on
/// the collection; plain fields repeat their value on every emitted row.
#[derive(Debug)]
pub(crate) struct RowExpansion {
    /// Shared path text up to and including the wildcard.
    wildcard_prefix: String,
    /// Compiled path of the collection the wildcard iterates.
    collection: CompiledPath,
    columns: Vec<Column>,
}

#[derive(Debug)]
enum Column {
    Plain {
        path: CompiledPath,
        target: CanonicalType,
    },
    Element {
        /// Remainder below the wildcard; no segments when the element
        /// itself is the leaf.
        suffix: CompiledPath,
        target: CanonicalType,
    },
}

impl RowExpansion {
    /// `None` when no field uses a wildcard; plain per-field resolution
    /// applies then.
    pub(crate) fn build(fields: &[FieldSpec]) -> ExtractResult<Option<Self>> {
        if !fields.iter().any(|f| f.path.contains(WILDCARD)) {
            return Ok(None);
        }

        let mut wildcard_prefix: Option<String> = None;
        let mut columns = Vec::with_capacity(fields.len());
        for field in fields {
            match field.path.find(WILDCARD) {
                None => columns.push(Column::Plain {
                    path: compile(&field.path)?,
                    target: field.target,
                }),
                Some(star) => {
                    let end = star + WILDCARD.len();
                    if field.path[end..].contains(WILDCARD) {
                        return Err(invalid(format!(
                            "path {} has more than one wildcard",
                            field.path
                        )));
                    }
                    let prefix = &field.path[..end];
                    match wildcard_prefix.as_deref() {
                        None => wildcard_prefix = Some(prefix.to_string()),
                        Some(seen) if seen == prefix => {}
                        Some(seen) => {
                            return Err(invalid(format!(
                                "wildcard fields disagree on the \
                                 collection: {seen} vs {prefix}"
                            )));
                        }
                    }
                    columns.push(Column::Element {
                        suffix: compile_suffix(&field.path, &field.path[end..])?,
                        target: field.target,
                    });
                }
            }
        }
        let Some(wildcard_prefix) = wildcard_prefix else {
            return Ok(None);
        };

        let before = &wildcard_prefix[..wildcard_prefix.len() - WILDCARD.len()];
        let collection = compile_collection(before)?;
        debug!(
            prefix = %wildcard_prefix,
            columns = columns.len(),
            "built wildcard expansion plan"
        );
        Ok(Some(Self {
            wildcard_prefix,
            collection,
            columns,
        }))
    }

    /// Rows for one instance, in field order.
    pub(crate) fn rows<N: Node>(
        &self,
        instance: &N,
        vars: &dyn VariableProvider,
        ignore_missing: bool,
    ) -> ExtractResult<Vec<Row>> {
        // plain columns resolve once per instance; element columns start
        // null, which is also the absent-collection row
        let mut template: Row = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            template.push(match column {
                Column::Plain { path, target } => resolve(
                    instance,
                    path.substituted(vars).as_ref(),
                    *target,
                    ignore_missing,
                )?,
                Column::Element { .. } => CanonicalValue::Null,
            });
        }

        let collection = self.collection.substituted(vars);
        let reached = resolve_node(
            instance,
            collection.as_ref(),
            CanonicalType::String,
            ignore_missing,
        )?;
        let Some((node, declared)) = reached else {
            return Ok(vec![template]);
        };

        match node.shape() {
            NodeShape::Record => Err(ExtractError::MalformedPath {
                segment: self.wildcard_prefix.clone(),
                details: "wildcard cannot expand a record".into(),
            }),
            // a scalar where the collection should be reads as absent
            NodeShape::Primitive => Ok(vec![template]),
            NodeShape::Array => {
                let element_declared = match declared {
                    Some(TypeDecl::Array { items }) => Some(items.as_ref()),
                    _ => None,
                };
                let mut rows = Vec::with_capacity(node.array_len());
                for index in 0..node.array_len() {
                    if let Some(element) = node.element(index) {
                        rows.push(self.element_row(
                            element,
                            element_declared,
                            &template,
                            vars,
                            ignore_missing,
                        )?);
                    }
                }
                Ok(rows)
            }
            NodeShape::Map => {
                let value_declared = match declared {
                    Some(TypeDecl::Map { values }) => Some(values.as_ref()),
                    _ => None,
                };
                let mut rows = Vec::new();
                for (_, value) in node.entries() {
                    rows.push(self.element_row(
                        value,
                        value_declared,
                        &template,
                        vars,
                        ignore_missing,
                    )?);
                }
                Ok(rows)
            }
        }
    }

    fn element_row<N: Node>(
        &self,
        element: &N,
        declared: Option<&TypeDecl>,
        template: &Row,
        vars: &dyn VariableProvider,
        ignore_missing: bool,
    ) -> ExtractResult<Row> {
        let mut row = template.clone();
        for (slot, column) in row.iter_mut().zip(&self.columns) {
            if let Column::Element { suffix, target } = column {
                *slot = resolve_from(
                    element,
                    declared,
                    suffix.substituted(vars).segments(),
                    *target,
                    ignore_missing,
                )?;
            }
        }
        Ok(row)
    }
}

fn compile_collection(before_wildcard: &str) -> ExtractResult<CompiledPath> {
    let trimmed = before_wildcard.trim();
    if trimmed.is_empty() || trimmed == "$" {
        return Ok(CompiledPath::root());
    }
    compile(before_wildcard)
}

fn compile_suffix(full_path: &str, rest: &str) -> ExtractResult<CompiledPath> {
    if rest.is_empty() {
        return Ok(CompiledPath::root());
    }
    if rest.starts_with('.') || rest.starts_with('[') {
        return compile(&format!("${rest}"));
    }
    Err(ExtractError::PathSyntax {
        path: full_path.to_string(),
        details: "text after bracket segment".into(),
    })
}

fn invalid(details: String) -> ExtractError {
    ExtractError::InvalidExpansion {
        details: details.into(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use rowforge_core::{FieldDecl, NoVariables, RecordDecl, TypedValue};

    use super::*;

    fn plan(fields: &[FieldSpec]) -> RowExpansion {
        RowExpansion::build(fields)
            .unwrap()
            .expect("expansion fields present")
    }

    fn spec(name: &str, path: &str, target: CanonicalType) -> FieldSpec {
        FieldSpec::new(name, path, target)
    }

    #[test]
    fn test_no_wildcards_builds_nothing() {
        let fields = [spec("a", "$.a", CanonicalType::String)];
        assert!(RowExpansion::build(&fields).unwrap().is_none());
    }

    #[test]
    fn test_one_row_per_element_with_plain_repeat() {
        let fields = [
            spec("order", "$.order", CanonicalType::String),
            spec("id", "$.items[*].id", CanonicalType::Integer),
        ];
        let doc = json!({
            "order": "A1",
            "items": [{"id": 1}, {"id": 2}, {"id": 3}],
        });
        let rows = plan(&fields).rows(&doc, &NoVariables, true).unwrap();
        assert_eq!(
            rows,
            vec![
                vec![
                    CanonicalValue::String("A1".into()),
                    CanonicalValue::Integer(1)
                ],
                vec![
                    CanonicalValue::String("A1".into()),
                    CanonicalValue::Integer(2)
                ],
                vec![
                    CanonicalValue::String("A1".into()),
                    CanonicalValue::Integer(3)
                ],
            ]
        );
    }

    #[test]
    fn test_wildcard_leaf_takes_the_element_itself() {
        let fields = [spec("item", "$.items[*]", CanonicalType::Integer)];
        let doc = json!({"items": [7, 8]});
        let rows = plan(&fields).rows(&doc, &NoVariables, true).unwrap();
        assert_eq!(
            rows,
            vec![
                vec![CanonicalValue::Integer(7)],
                vec![CanonicalValue::Integer(8)],
            ]
        );
    }

    #[test]
    fn test_absent_collection_yields_one_null_row() {
        let fields = [
            spec("order", "$.order", CanonicalType::String),
            spec("id", "$.items[*].id", CanonicalType::Integer),
        ];
        let doc = json!({"order": "A1"});
        let rows = plan(&fields).rows(&doc, &NoVariables, true).unwrap();
        assert_eq!(
            rows,
            vec![vec![
                CanonicalValue::String("A1".into()),
                CanonicalValue::Null
            ]]
        );
    }

    #[test]
    fn test_scalar_at_the_collection_reads_as_absent() {
        let fields = [spec("id", "$.items[*].id", CanonicalType::Integer)];
        let doc = json!({"items": 12});
        let rows = plan(&fields).rows(&doc, &NoVariables, true).unwrap();
        assert_eq!(rows, vec![vec![CanonicalValue::Null]]);
    }

    #[test]
    fn test_empty_collection_yields_no_rows() {
        let fields = [spec("id", "$.items[*].id", CanonicalType::Integer)];
        let doc = json!({"items": []});
        let rows = plan(&fields).rows(&doc, &NoVariables, true).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_wildcard_cannot_expand_a_record() {
        let fields = [spec("id", "$.items[*].id", CanonicalType::Integer)];
        let doc = json!({"items": {"id": 1}});
        let err = plan(&fields).rows(&doc, &NoVariables, true).unwrap_err();
        assert_eq!(err.kind(), "malformed path");
    }

    #[test]
    fn test_disagreeing_prefixes_are_rejected() {
        let fields = [
            spec("a", "$.a[*].x", CanonicalType::String),
            spec("b", "$.b[*].y", CanonicalType::String),
        ];
        let err = RowExpansion::build(&fields).unwrap_err();
        assert_eq!(err.kind(), "invalid expansion");
    }

    #[test]
    fn test_second_wildcard_in_one_path_is_rejected() {
        let fields = [spec("x", "$.a[*].b[*]", CanonicalType::String)];
        let err = RowExpansion::build(&fields).unwrap_err();
        assert_eq!(err.kind(), "invalid expansion");
    }

    #[test]
    fn test_text_after_the_wildcard_bracket_is_rejected() {
        let fields = [spec("x", "$.a[*]x", CanonicalType::String)];
        let err = RowExpansion::build(&fields).unwrap_err();
        assert_eq!(err.kind(), "path syntax error");
    }

    #[test]
    fn test_map_collection_expands_per_entry() {
        let counts = TypedValue::map(vec![
            ("eu", TypedValue::Integer(2)),
            ("us", TypedValue::Integer(5)),
        ]);
        let rec = TypedValue::record(
            RecordDecl::new(
                "root",
                vec![FieldDecl::new(
                    "counts",
                    TypeDecl::Map {
                        values: Box::new(TypeDecl::Long),
                    },
                )],
            ),
            vec![counts],
        );
        let fields = [spec("count", "$.counts[*]", CanonicalType::Integer)];
        let rows = plan(&fields).rows(&rec, &NoVariables, true).unwrap();
        assert_eq!(
            rows,
            vec![
                vec![CanonicalValue::Integer(2)],
                vec![CanonicalValue::Integer(5)],
            ]
        );
    }
}
