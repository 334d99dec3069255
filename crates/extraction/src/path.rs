use std::borrow::Cow;
use std::fmt;

use tracing::debug;

use rowforge_core::vars::substitute_tokens;
use rowforge_core::{ExtractError, ExtractResult, VariableProvider};

// ============================================================================
// Path Segments
// ============================================================================

/// One step of a compiled leaf address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Leading `$`. Only legal as the first step; consumed while compiling
    /// and never stored in a [`CompiledPath`].
    Root,
    /// Named member of a record.
    Field(String),
    /// Fixed position in an array.
    Index(usize),
    /// Textual key into a map. Bracket content that does not parse as a
    /// non-negative integer lands here; the resolver re-reads it against
    /// the node it addresses, since `${variable}` substitution can turn a
    /// key into an index token.
    Key(String),
}

impl PathSegment {
    fn has_variables(&self) -> bool {
        match self {
            PathSegment::Field(s) | PathSegment::Key(s) => s.contains("${"),
            _ => false,
        }
    }
}

// ============================================================================
// Compiled Paths
// ============================================================================

/// An ordered sequence of segments, built once per field specification and
/// reused read-only across instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPath {
    segments: Vec<PathSegment>,
    has_variables: bool,
}

impl CompiledPath {
    /// The path addressing the instance itself, with no segments to walk.
    pub(crate) fn root() -> Self {
        Self {
            segments: Vec::new(),
            has_variables: false,
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn has_variables(&self) -> bool {
        self.has_variables
    }

    /// Per-instance copy with every `${name}` token replaced. Borrows when
    /// the path carries no variables.
    pub fn substituted(&self, vars: &dyn VariableProvider) -> Cow<'_, Self> {
        if !self.has_variables {
            return Cow::Borrowed(self);
        }
        let segments = self
            .segments
            .iter()
            .map(|seg| match seg {
                PathSegment::Field(s) if s.contains("${") => {
                    PathSegment::Field(substitute_tokens(s, vars))
                }
                PathSegment::Key(s) if s.contains("${") => {
                    PathSegment::Key(substitute_tokens(s, vars))
                }
                other => other.clone(),
            })
            .collect();
        Cow::Owned(CompiledPath {
            segments,
            has_variables: false,
        })
    }
}

impl fmt::Display for CompiledPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for seg in &self.segments {
            match seg {
                PathSegment::Root => {}
                PathSegment::Field(s) => write!(f, ".{s}")?,
                PathSegment::Index(i) => write!(f, "[{i}]")?,
                PathSegment::Key(k) => write!(f, "[{k}]")?,
            }
        }
        Ok(())
    }
}

// ============================================================================
// Compilation
// ============================================================================

/// Compile textual path into segments.
///
/// Splits on `.` after protecting balanced `${...}` tokens, drops a leading
/// `$` root marker, strips the `$` off a leading `$[`, and splits bracket
/// chains into one segment per bracket pair.
pub fn compile(path_text: &str) -> ExtractResult<CompiledPath> {
    let trimmed = path_text.trim();
    if trimmed.is_empty() {
        return Err(syntax_error(path_text, "empty path"));
    }

    let cleansed = cleanse_dots(trimmed);
    let mut segments = Vec::new();
    for (i, raw) in cleansed.split('.').enumerate() {
        let mut part = raw;
        if i == 0 {
            if part == "$" {
                continue;
            }
            if part.starts_with("$[") {
                part = &part[1..];
            }
        }
        push_segments(&mut segments, part, path_text)?;
    }

    if segments.is_empty() {
        return Err(syntax_error(path_text, "no segments after root marker"));
    }

    let has_variables = segments.iter().any(PathSegment::has_variables);
    debug!(path = %path_text, segments = segments.len(), "compiled path");
    Ok(CompiledPath {
        segments,
        has_variables,
    })
}

/// Rewrite dots inside balanced `${...}` tokens to `_` so the token
/// survives the split. An unbalanced `${` is left untouched; its dots stay
/// live and the token re-tokenizes into several segments.
fn cleanse_dots(path: &str) -> String {
    if !path.contains("${") {
        return path.to_string();
    }
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(start) = rest.find("${") {
        let token_start = start + 2;
        out.push_str(&rest[..token_start]);
        match rest[token_start..].find('}') {
            Some(len) => {
                let inner = &rest[token_start..token_start + len];
                out.push_str(&inner.replace('.', "_"));
                out.push('}');
                rest = &rest[token_start + len + 1..];
            }
            None => {
                out.push_str(&rest[token_start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

fn push_segments(
    segments: &mut Vec<PathSegment>,
    part: &str,
    path_text: &str,
) -> ExtractResult<()> {
    if part.is_empty() {
        return Err(syntax_error(path_text, "empty segment"));
    }
    match part.find('[') {
        None => segments.push(PathSegment::Field(part.to_string())),
        Some(0) => push_brackets(segments, part, path_text)?,
        Some(pos) => {
            segments.push(PathSegment::Field(part[..pos].to_string()));
            push_brackets(segments, &part[pos..], path_text)?;
        }
    }
    Ok(())
}

fn push_brackets(
    segments: &mut Vec<PathSegment>,
    chain: &str,
    path_text: &str,
) -> ExtractResult<()> {
    let mut rest = chain;
    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return Err(syntax_error(path_text, "text after bracket segment"));
        }
        let close = rest[1..]
            .find(']')
            .ok_or_else(|| syntax_error(path_text, "bracket segment has no closing bracket"))?;
        let content = &rest[1..close + 1];
        if content.is_empty() {
            return Err(syntax_error(path_text, "empty bracket segment"));
        }
        segments.push(match content.parse::<usize>() {
            Ok(i) => PathSegment::Index(i),
            Err(_) => PathSegment::Key(content.to_string()),
        });
        rest = &rest[close + 2..];
    }
    Ok(())
}

fn syntax_error(path: &str, details: &'static str) -> ExtractError {
    ExtractError::PathSyntax {
        path: path.to_string(),
        details: details.into(),
    }
}
