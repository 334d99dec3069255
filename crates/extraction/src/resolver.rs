use std::borrow::Cow;

use rowforge_core::{
    CanonicalType, CanonicalValue, ExtractError, ExtractResult, Member, Node,
    NodeShape, Primitive, TypeDecl,
};

use crate::coerce::coerce;
use crate::path::{CompiledPath, PathSegment};
use crate::union::resolve_union;

/// Resolve one compiled path against one instance.
///
/// A pure function of its inputs: the path is consumed read-only, the
/// instance is never mutated, so concurrent calls over different instances
/// need no coordination. Only three conditions are hard errors: a bracket
/// addressing a record, an index token that is not an integer, and a
/// missing record member with `ignore_missing` off. Every other absence
/// resolves to canonical null.
pub fn resolve<N: Node>(
    instance: &N,
    path: &CompiledPath,
    target: CanonicalType,
    ignore_missing: bool,
) -> ExtractResult<CanonicalValue> {
    resolve_from(instance, None, path.segments(), target, ignore_missing)
}

/// Resolution entered at an arbitrary node with a known declaration, used
/// for wildcard expansion where each element restarts the walk.
pub(crate) fn resolve_from<N: Node>(
    node: &N,
    declared: Option<&TypeDecl>,
    segments: &[PathSegment],
    target: CanonicalType,
    ignore_missing: bool,
) -> ExtractResult<CanonicalValue> {
    if matches!(node.primitive(), Some(Primitive::Null)) {
        return Ok(CanonicalValue::Null);
    }
    let effective = effective_decl(node, declared, target)?;
    match walk(node, effective, segments, target, ignore_missing)? {
        Terminal::Reached(leaf, _) => leaf_value(leaf, target),
        Terminal::Missing => Ok(CanonicalValue::Null),
    }
}

/// Resolve to the terminal node itself instead of a coerced leaf. `None`
/// when the addressed node is absent.
pub(crate) fn resolve_node<'a, N: Node>(
    instance: &'a N,
    path: &CompiledPath,
    target: CanonicalType,
    ignore_missing: bool,
) -> ExtractResult<Option<(&'a N, Option<&'a TypeDecl>)>> {
    match walk(instance, None, path.segments(), target, ignore_missing)? {
        Terminal::Reached(node, decl) => Ok(Some((node, decl))),
        Terminal::Missing => Ok(None),
    }
}

enum Terminal<'a, N> {
    /// Segments fully consumed at this node.
    Reached(&'a N, Option<&'a TypeDecl>),
    /// Resolution ended early on an absent value.
    Missing,
}

fn walk<'a, N: Node>(
    node: &'a N,
    declared: Option<&'a TypeDecl>,
    segments: &[PathSegment],
    target: CanonicalType,
    ignore_missing: bool,
) -> ExtractResult<Terminal<'a, N>> {
    // the reached-leaf check precedes type dispatch in every state; a path
    // may intentionally terminate inside a composite
    let Some((seg, rest)) = segments.split_first() else {
        return Ok(Terminal::Reached(node, declared));
    };

    match node.shape() {
        NodeShape::Record => {
            let name = match seg {
                PathSegment::Field(name) => name,
                PathSegment::Index(_) | PathSegment::Key(_) => {
                    return Err(malformed(
                        seg,
                        "bracket segment cannot address a record",
                    ));
                }
                PathSegment::Root => {
                    return Err(malformed(seg, "root marker inside a path"));
                }
            };
            match node.member(name) {
                Member::Absent => {
                    if ignore_missing {
                        Ok(Terminal::Missing)
                    } else {
                        Err(ExtractError::MissingField {
                            field: name.clone(),
                        })
                    }
                }
                Member::Value(child, member_decl) => step_into(
                    child,
                    member_decl,
                    rest,
                    target,
                    ignore_missing,
                ),
            }
        }
        NodeShape::Array => {
            let index = bracket_index(seg)?;
            match node.element(index) {
                // arrays are ragged across instances; out of range is a
                // normal absence
                None => Ok(Terminal::Missing),
                Some(child) => step_into(
                    child,
                    element_decl(declared),
                    rest,
                    target,
                    ignore_missing,
                ),
            }
        }
        NodeShape::Map => {
            let key: Cow<'_, str> = match seg {
                PathSegment::Key(k) => Cow::Borrowed(k.as_str()),
                PathSegment::Index(i) => Cow::Owned(i.to_string()),
                _ => {
                    return Err(malformed(
                        seg,
                        "map expects a bracket segment",
                    ));
                }
            };
            match node.value_for(&key) {
                None => Ok(Terminal::Missing),
                Some(child) => step_into(
                    child,
                    value_decl(declared),
                    rest,
                    target,
                    ignore_missing,
                ),
            }
        }
        // segments remain below a leaf: the sampled path is deeper than
        // this instance, a normal absence
        NodeShape::Primitive => Ok(Terminal::Missing),
    }
}

fn step_into<'a, N: Node>(
    child: &'a N,
    declared: Option<&'a TypeDecl>,
    rest: &[PathSegment],
    target: CanonicalType,
    ignore_missing: bool,
) -> ExtractResult<Terminal<'a, N>> {
    // a null value ends resolution even when segments remain
    if matches!(child.primitive(), Some(Primitive::Null)) {
        return Ok(Terminal::Missing);
    }
    let effective = effective_decl(child, declared, target)?;
    walk(child, effective, rest, target, ignore_missing)
}

/// Unions never dispatch directly; pick the concrete branch first.
fn effective_decl<'a, N: Node>(
    value: &'a N,
    declared: Option<&'a TypeDecl>,
    target: CanonicalType,
) -> ExtractResult<Option<&'a TypeDecl>> {
    match declared {
        Some(TypeDecl::Union { branches }) => {
            resolve_union(value, branches, target)
        }
        other => Ok(other),
    }
}

pub(crate) fn leaf_value<N: Node>(
    node: &N,
    target: CanonicalType,
) -> ExtractResult<CanonicalValue> {
    match node.primitive() {
        Some(p) => coerce(&p, target),
        None => match target {
            CanonicalType::String => {
                Ok(CanonicalValue::String(node.render_text()))
            }
            CanonicalType::Binary => {
                Ok(CanonicalValue::Binary(node.render_text().into_bytes()))
            }
            other => Err(ExtractError::TypeConversion {
                from: shape_name(node.shape()).into(),
                to: other,
            }),
        },
    }
}

fn element_decl(declared: Option<&TypeDecl>) -> Option<&TypeDecl> {
    match declared {
        Some(TypeDecl::Array { items }) => Some(items),
        _ => None,
    }
}

fn value_decl(declared: Option<&TypeDecl>) -> Option<&TypeDecl> {
    match declared {
        Some(TypeDecl::Map { values }) => Some(values),
        _ => None,
    }
}

fn bracket_index(seg: &PathSegment) -> ExtractResult<usize> {
    match seg {
        PathSegment::Index(i) => Ok(*i),
        PathSegment::Key(k) => k
            .parse::<usize>()
            .map_err(|_| malformed(seg, "array index is not an integer")),
        _ => Err(malformed(seg, "array expects an index segment")),
    }
}

fn malformed(seg: &PathSegment, details: &'static str) -> ExtractError {
    ExtractError::MalformedPath {
        segment: segment_text(seg),
        details: details.into(),
    }
}

fn segment_text(seg: &PathSegment) -> String {
    match seg {
        PathSegment::Root => "$".to_string(),
        PathSegment::Field(s) => s.clone(),
        PathSegment::Index(i) => format!("[{i}]"),
        PathSegment::Key(k) => format!("[{k}]"),
    }
}

fn shape_name(shape: NodeShape) -> &'static str {
    match shape {
        NodeShape::Record => "record",
        NodeShape::Array => "array",
        NodeShape::Map => "map",
        NodeShape::Primitive => "primitive",
    }
}
