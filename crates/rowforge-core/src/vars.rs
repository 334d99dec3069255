use std::collections::HashMap;

/// Supplies current values for `${name}` tokens in path text.
///
/// Token names are looked up exactly as they appear in the compiled segment.
/// A name that contained dots was rewritten with `_` when the path was
/// compiled, so providers must register such variables under the rewritten
/// name.
pub trait VariableProvider {
    /// Current value for `name`, or `None` when the variable is unset.
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Replace every balanced `${name}` token in `text`.
///
/// Substituted values have their dots neutralized to `_` so a substitution
/// can never re-tokenize a path segment. Unset variables keep their literal
/// token text; an unbalanced `${` is emitted untouched.
pub fn substitute_tokens(text: &str, vars: &dyn VariableProvider) -> String {
    if !text.contains("${") {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match vars.lookup(name) {
                    Some(value) => out.push_str(&value.replace('.', "_")),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Provider backed by a plain name -> value map.
#[derive(Debug, Clone, Default)]
pub struct MapVariables(HashMap<String, String>);

impl MapVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.0.insert(name.into(), value.into());
        self
    }
}

impl From<HashMap<String, String>> for MapVariables {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl VariableProvider for MapVariables {
    fn lookup(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

/// Provider for paths that use no variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariables;

impl VariableProvider for NoVariables {
    fn lookup(&self, _name: &str) -> Option<String> {
        None
    }
}
