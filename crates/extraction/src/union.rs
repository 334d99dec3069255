use rowforge_core::{
    CanonicalType, ExtractError, ExtractResult, Node, NodeShape, TypeDecl,
};

/// Choose the concrete branch for a value declared as a union.
///
/// Policy, in order: a self-describing container value uses its own
/// declaration; a map value uses the union's map branch; a bare scalar with
/// a string target needs no branch at all (`None`, read generically as
/// text); any other scalar assumes a two-branch nullable union and takes
/// the non-null side.
pub fn resolve_union<'a, N: Node>(
    value: &'a N,
    branches: &'a [TypeDecl],
    target: CanonicalType,
) -> ExtractResult<Option<&'a TypeDecl>> {
    if let Some(own) = value.declared() {
        return Ok(Some(own));
    }

    // map values carry no declaration of their own; the union must name
    // their branch
    if value.shape() == NodeShape::Map {
        return match branches.iter().find(|b| b.is_map()) {
            Some(branch) => Ok(Some(branch)),
            None => Err(ExtractError::UnresolvableUnion {
                details: "no map branch declared for a map value".into(),
            }),
        };
    }

    if target == CanonicalType::String {
        return Ok(None);
    }

    nullable_branch(branches).map(Some)
}

/// The non-null side of a two-branch nullable union.
fn nullable_branch(branches: &[TypeDecl]) -> ExtractResult<&TypeDecl> {
    if branches.len() != 2 {
        return Err(ExtractError::UnresolvableUnion {
            details: format!(
                "expected a two-branch nullable union, found {} branches",
                branches.len()
            )
            .into(),
        });
    }
    match (&branches[0], &branches[1]) {
        (TypeDecl::Null, other) | (other, TypeDecl::Null) => Ok(other),
        _ => Err(ExtractError::UnresolvableUnion {
            details: "union of two non-null branches".into(),
        }),
    }
}
