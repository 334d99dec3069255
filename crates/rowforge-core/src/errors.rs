use std::borrow::Cow;

use thiserror::Error;

use crate::canonical::CanonicalType;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Malformed path text, raised while compiling a field specification.
    /// Always fatal to starting a run.
    #[error("path syntax error in '{path}': {details}")]
    PathSyntax {
        path: String,
        details: Cow<'static, str>,
    },

    /// Path/shape mismatch that only shows up against a concrete instance,
    /// e.g. a bracket segment addressing a record.
    #[error("malformed path at '{segment}': {details}")]
    MalformedPath {
        segment: String,
        details: Cow<'static, str>,
    },

    /// Named member absent from a record and the caller did not opt into
    /// leniency.
    #[error("field '{field}' is not a member of the record")]
    MissingField { field: String },

    /// No union branch fits the dynamic value.
    #[error("cannot resolve union: {details}")]
    UnresolvableUnion { details: Cow<'static, str> },

    /// No coercion rule from the native category to the requested target.
    #[error("cannot convert {from} value to {to}")]
    TypeConversion {
        from: Cow<'static, str>,
        to: CanonicalType,
    },

    /// Expansion fields do not share a single `[*]` prefix, or the wildcard
    /// is used more than once in a path.
    #[error("invalid expansion fields: {details}")]
    InvalidExpansion { details: Cow<'static, str> },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ExtractError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::PathSyntax { .. } => "path syntax error",
            ExtractError::MalformedPath { .. } => "malformed path",
            ExtractError::MissingField { .. } => "missing field",
            ExtractError::UnresolvableUnion { .. } => "unresolvable union",
            ExtractError::TypeConversion { .. } => "type conversion error",
            ExtractError::InvalidExpansion { .. } => "invalid expansion",
            ExtractError::Other(_) => "other error",
        }
    }

    pub fn details(&self) -> String {
        match self {
            ExtractError::PathSyntax { details, .. } => details.to_string(),
            ExtractError::MalformedPath { details, .. } => details.to_string(),
            ExtractError::MissingField { field } => field.clone(),
            ExtractError::UnresolvableUnion { details } => details.to_string(),
            ExtractError::TypeConversion { from, to } => {
                format!("{from} -> {to}")
            }
            ExtractError::InvalidExpansion { details } => details.to_string(),
            ExtractError::Other(e) => e.to_string(),
        }
    }
}

pub type ExtractResult<T> = Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let err = ExtractError::MissingField {
            field: "age".into(),
        };
        assert_eq!(err.kind(), "missing field");
        assert_eq!(err.details(), "age");
    }

    #[test]
    fn test_conversion_error_names_both_sides() {
        let err = ExtractError::TypeConversion {
            from: "record".into(),
            to: CanonicalType::Integer,
        };
        assert_eq!(err.to_string(), "cannot convert record value to integer");
    }
}
