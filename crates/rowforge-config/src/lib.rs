//! Rowforge Configuration
//!
//! Field specifications and engine settings, loadable from YAML:
//!
//! ```yaml
//! fields:
//!   - name: first_tag
//!     path: $.user.tags[0]
//!     type: string
//!   - name: amount
//!     path: $.order.total
//!     type: bigdecimal
//! extractor:
//!   ignore_missing: true
//!   cache_schemas: false
//! sampler:
//!   max_documents: 100
//! ```
//!
//! Field paths may carry `${variable}` tokens that are resolved per
//! instance by the extraction engine, so configuration loading performs no
//! environment expansion of its own.

use std::fs;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use rowforge_core::CanonicalType;

// ============================================================================
// Field Specification
// ============================================================================

/// One output column: a name, the path addressing its leaf, and the
/// canonical type the resolved value is coerced to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Output column name (unique within one extraction).
    pub name: String,

    /// Leaf path, e.g. `$.user.tags[0]`.
    pub path: String,

    /// Canonical target type.
    #[serde(rename = "type", default)]
    pub target: CanonicalType,

    /// Legal values of the column, for declared enumerations. Only
    /// meaningful with the string target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enumerated_values: Option<Vec<String>>,
}

impl FieldSpec {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        target: CanonicalType,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            target,
            enumerated_values: None,
        }
    }

    pub fn with_enumerated_values(mut self, values: Vec<String>) -> Self {
        self.enumerated_values = Some(values);
        self
    }
}

// ============================================================================
// Engine Settings
// ============================================================================

/// Run-time extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    /// When true, a named record member absent from an instance resolves to
    /// null instead of failing the row.
    pub ignore_missing: bool,

    /// Hint for schema-carrying callers to keep parsed schemas in a
    /// run-scoped cache.
    pub cache_schemas: bool,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            ignore_missing: true,
            cache_schemas: false,
        }
    }
}

/// Discovery sampling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerSettings {
    /// Hard cap on the number of documents one discovery pass reads.
    pub max_documents: usize,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self { max_documents: 100 }
    }
}

// ============================================================================
// Extraction Document
// ============================================================================

/// A complete extraction configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSpec {
    pub fields: Vec<FieldSpec>,
    pub extractor: ExtractorSettings,
    pub sampler: SamplerSettings,
}

pub fn from_yaml_str(text: &str) -> Result<ExtractionSpec> {
    let spec: ExtractionSpec =
        serde_yaml::from_str(text).context("parsing extraction yaml")?;
    Ok(spec)
}

pub fn load_from_path(file_path: &str) -> Result<ExtractionSpec> {
    let raw = fs::read_to_string(file_path)
        .with_context(|| format!("reading config {file_path}"))?;
    let spec = from_yaml_str(&raw)?;
    debug!(
        fields = spec.fields.len(),
        ignore_missing = spec.extractor.ignore_missing,
        "loaded extraction config"
    );
    Ok(spec)
}
