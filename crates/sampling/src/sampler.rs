use serde::{Deserialize, Serialize};
use tracing::debug;

use rowforge_config::{FieldSpec, SamplerSettings};
use rowforge_core::Node;

use crate::accumulator::{DiscoveredPath, SampleAccumulator};
use crate::disambiguate::{disambiguate_names, to_field_specs};

/// Outcome of one discovery pass over a document sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    /// Extraction-ready specs, one per discovered path, names unique.
    pub fields: Vec<FieldSpec>,
    /// Per-path detail behind the specs, in path order.
    pub paths: Vec<DiscoveredPath>,
    pub documents_processed: u64,
}

/// Sample up to `max_documents` documents and infer a flat field layout
/// from the leaf paths they expose.
pub fn discover_schema<N: Node>(
    documents: impl IntoIterator<Item = N>,
    max_documents: usize,
) -> DiscoveryReport {
    // zero falls back to the default sample size
    let cap = if max_documents == 0 {
        SamplerSettings::default().max_documents
    } else {
        max_documents
    };

    let mut accumulator = SampleAccumulator::new();
    for document in documents.into_iter().take(cap) {
        accumulator.observe_document(&document);
    }

    let (mut paths, documents_processed) = accumulator.finalize();
    disambiguate_names(&mut paths);
    let fields = to_field_specs(&paths);
    debug!(
        documents = documents_processed,
        paths = paths.len(),
        "discovery pass complete"
    );
    DiscoveryReport {
        fields,
        paths,
        documents_processed,
    }
}
