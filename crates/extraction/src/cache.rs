use std::collections::HashMap;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::trace;

use rowforge_core::{parse_type_decl, ExtractError, ExtractResult, TypeDecl};

/// Run-scoped cache of parsed type declarations, keyed by a fingerprint of
/// the declaration text.
///
/// The cache is a plain value owned and injected by the caller; there is no
/// process-global state and no eviction. Callers that switch declarations
/// per instance keep one cache per run and drop it with the run.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: HashMap<String, Arc<TypeDecl>>,
    hits: u64,
    misses: u64,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parsed declaration for `text`, parsing at most once per distinct
    /// text.
    pub fn get_or_parse<F>(
        &mut self,
        text: &str,
        parse: F,
    ) -> ExtractResult<Arc<TypeDecl>>
    where
        F: FnOnce(&str) -> ExtractResult<TypeDecl>,
    {
        let key = fingerprint(text);
        if let Some(found) = self.entries.get(&key) {
            self.hits += 1;
            trace!(fingerprint = %key, "schema cache hit");
            return Ok(Arc::clone(found));
        }
        let parsed = Arc::new(parse(text)?);
        self.misses += 1;
        trace!(fingerprint = %key, "schema cache miss");
        self.entries.insert(key, Arc::clone(&parsed));
        Ok(parsed)
    }

    /// [`get_or_parse`](Self::get_or_parse) with the standard JSON
    /// declaration parser.
    pub fn parse_declaration(
        &mut self,
        text: &str,
    ) -> ExtractResult<Arc<TypeDecl>> {
        self.get_or_parse(text, |t| {
            parse_type_decl(t).map_err(ExtractError::from)
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// 16 hex character fingerprint of a declaration text.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_DECL: &str = r#"{"type": "record", "name": "user", "fields": [
        {"name": "id", "type": {"type": "long"}}
    ]}"#;

    #[test]
    fn test_fingerprints_are_short_and_distinct() {
        let a = fingerprint(USER_DECL);
        let b = fingerprint("{\"type\": \"long\"}");
        assert_eq!(a.len(), 16);
        assert_eq!(b.len(), 16);
        assert_ne!(a, b);
        assert_eq!(a, fingerprint(USER_DECL));
    }

    #[test]
    fn test_same_text_parses_once() {
        let mut cache = SchemaCache::new();
        let mut parses = 0;

        for _ in 0..3 {
            let decl = cache
                .get_or_parse(USER_DECL, |t| {
                    parses += 1;
                    parse_type_decl(t).map_err(ExtractError::from)
                })
                .unwrap();
            assert!(matches!(*decl, TypeDecl::Record(_)));
        }

        assert_eq!(parses, 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_parse_failures_are_not_cached() {
        let mut cache = SchemaCache::new();
        assert!(cache.parse_declaration("not json").is_err());
        assert!(cache.is_empty());

        let decl = cache.parse_declaration("{\"type\": \"boolean\"}").unwrap();
        assert_eq!(*decl, TypeDecl::Boolean);
    }
}
