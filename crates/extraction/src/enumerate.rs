use rowforge_config::FieldSpec;
use rowforge_core::{CanonicalType, TypeDecl};

/// Every addressable leaf of a declared schema, as ready-made field specs.
///
/// Paths follow the resolver grammar: record members as `.name`, array
/// elements as `[0]` (the first element stands for all of them), map values
/// as a `[*key*]` placeholder the user swaps for a real key. Null-typed
/// leaves are skipped; declared enumerations come back as String fields
/// carrying their symbol list.
pub fn enumerate_leaves(schema: &TypeDecl) -> Vec<FieldSpec> {
    let mut found = Vec::new();
    walk(schema, "$", &mut found);
    found
}

fn walk(decl: &TypeDecl, path: &str, found: &mut Vec<FieldSpec>) {
    match decl {
        TypeDecl::Null => {}
        TypeDecl::Enum { symbols, .. } => {
            found.push(
                FieldSpec::new(basename(path), path, CanonicalType::String)
                    .with_enumerated_values(symbols.clone()),
            );
        }
        TypeDecl::Record(record) => {
            for field in &record.fields {
                walk(&field.decl, &format!("{path}.{}", field.name), found);
            }
        }
        TypeDecl::Array { items } => {
            walk(items, &format!("{path}[0]"), found);
        }
        TypeDecl::Map { values } => {
            walk(values, &format!("{path}[*key*]"), found);
        }
        TypeDecl::Union { branches } => {
            // A lone non-null primitive keeps its own type; two or more are
            // only addressable generically, as text.
            let primitives: Vec<&TypeDecl> = branches
                .iter()
                .filter(|branch| branch.leaf_target().is_some())
                .collect();
            match primitives.as_slice() {
                [] => {}
                [single] => walk(single, path, found),
                _ => found.push(FieldSpec::new(
                    basename(path),
                    path,
                    CanonicalType::String,
                )),
            }
            for branch in branches {
                if branch.leaf_target().is_none() && !branch.is_null() {
                    walk(branch, path, found);
                }
            }
        }
        leaf => {
            if let Some(target) = leaf.leaf_target() {
                found.push(FieldSpec::new(basename(path), path, target));
            }
        }
    }
}

/// Text after the last dot, the whole path when there is none.
fn basename(path: &str) -> &str {
    match path.rfind('.') {
        Some(dot) => &path[dot + 1..],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowforge_core::{FieldDecl, RecordDecl};

    fn user_schema() -> TypeDecl {
        TypeDecl::Record(RecordDecl::new(
            "user",
            vec![
                FieldDecl::new("id", TypeDecl::Long),
                FieldDecl::new(
                    "tags",
                    TypeDecl::Array { items: Box::new(TypeDecl::Text) },
                ),
                FieldDecl::new(
                    "attrs",
                    TypeDecl::Map { values: Box::new(TypeDecl::Double) },
                ),
            ],
        ))
    }

    #[test]
    fn test_record_array_and_map_paths() {
        let specs = enumerate_leaves(&user_schema());
        let rendered: Vec<(&str, &str, CanonicalType)> = specs
            .iter()
            .map(|s| (s.name.as_str(), s.path.as_str(), s.target))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("id", "$.id", CanonicalType::Integer),
                ("tags[0]", "$.tags[0]", CanonicalType::String),
                ("attrs[*key*]", "$.attrs[*key*]", CanonicalType::Number),
            ]
        );
    }

    #[test]
    fn test_enumeration_carries_symbols() {
        let schema = TypeDecl::Record(RecordDecl::new(
            "order",
            vec![FieldDecl::new(
                "state",
                TypeDecl::Enum {
                    name: "state".to_string(),
                    symbols: vec!["OPEN".to_string(), "CLOSED".to_string()],
                },
            )],
        ));
        let specs = enumerate_leaves(&schema);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].target, CanonicalType::String);
        assert_eq!(
            specs[0].enumerated_values.as_deref(),
            Some(&["OPEN".to_string(), "CLOSED".to_string()][..])
        );
    }

    #[test]
    fn test_nullable_union_keeps_branch_type() {
        let schema = TypeDecl::Record(RecordDecl::new(
            "doc",
            vec![FieldDecl::new(
                "score",
                TypeDecl::Union {
                    branches: vec![TypeDecl::Null, TypeDecl::Double],
                },
            )],
        ));
        let specs = enumerate_leaves(&schema);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].path, "$.score");
        assert_eq!(specs[0].target, CanonicalType::Number);
    }

    #[test]
    fn test_multi_primitive_union_collapses_to_string() {
        let schema = TypeDecl::Union {
            branches: vec![TypeDecl::Long, TypeDecl::Text],
        };
        let specs = enumerate_leaves(&schema);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].path, "$");
        assert_eq!(specs[0].name, "$");
        assert_eq!(specs[0].target, CanonicalType::String);
    }

    #[test]
    fn test_union_composites_recurse() {
        let schema = TypeDecl::Union {
            branches: vec![
                TypeDecl::Null,
                TypeDecl::Record(RecordDecl::new(
                    "inner",
                    vec![FieldDecl::new("flag", TypeDecl::Boolean)],
                )),
            ],
        };
        let specs = enumerate_leaves(&schema);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].path, "$.flag");
        assert_eq!(specs[0].target, CanonicalType::Boolean);
    }

    #[test]
    fn test_null_leaves_are_skipped() {
        let schema = TypeDecl::Record(RecordDecl::new(
            "doc",
            vec![
                FieldDecl::new("gone", TypeDecl::Null),
                FieldDecl::new("kept", TypeDecl::Boolean),
            ],
        ));
        let specs = enumerate_leaves(&schema);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].path, "$.kept");
    }
}
