use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rowforge_core::{CanonicalType, NativeCategory, Node, NodeShape};

/// Observed index span of one array level along a discovered path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IndexRange {
    min: usize,
    max: usize,
}

impl IndexRange {
    fn at(index: usize) -> Self {
        Self {
            min: index,
            max: index,
        }
    }

    fn observe(&mut self, index: usize) {
        self.min = self.min.min(index);
        self.max = self.max.max(index);
    }

    fn union(&mut self, other: IndexRange) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

/// Accumulated observations for one wildcard path key.
#[derive(Debug, Clone)]
struct PathStats {
    category: NativeCategory,
    occurrences: u64,
    disparate: bool,
    /// One range per array level on the path, keyed by level ordinal.
    ranges: BTreeMap<usize, IndexRange>,
}

impl PathStats {
    fn first(category: NativeCategory) -> Self {
        Self {
            category,
            occurrences: 0,
            disparate: false,
            ranges: BTreeMap::new(),
        }
    }
}

/// One discovered leaf path after a sampling pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredPath {
    /// Default output name, the display path's last segment. Unique only
    /// after disambiguation.
    pub name: String,
    /// Resolvable path, each array level pinned to its smallest observed
    /// index.
    pub path: String,
    /// Display path carrying `[min:max]` for levels whose range widened;
    /// `None` when every level stayed on one index.
    pub annotated: Option<String>,
    /// Inferred output type; String when observations disagreed.
    pub target: CanonicalType,
    pub disparate_types: bool,
    /// Leaf visits, not documents: an array path is visited once per
    /// element, so the fraction may exceed 1.
    pub occurrences: u64,
    pub occurrence_fraction: f64,
}

/// Mutable lookup table built during one sampling pass.
///
/// Single writer. Parallel sampling partitions the documents, fills one
/// accumulator per worker and reduces with [`merge`](Self::merge), which
/// is associative and commutative.
#[derive(Debug, Clone, Default)]
pub struct SampleAccumulator {
    table: BTreeMap<String, PathStats>,
    documents: u64,
}

impl SampleAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> u64 {
        self.documents
    }

    pub fn path_count(&self) -> usize {
        self.table.len()
    }

    /// Walk one document top-down, upserting every primitive leaf reached.
    ///
    /// Array levels fold into a `[-]` wildcard in the lookup key while the
    /// concrete element indices feed that key's per-level ranges. Every
    /// element is visited, not just the first; element shape is the main
    /// source of variance in real documents.
    pub fn observe_document<N: Node>(&mut self, document: &N) {
        self.documents += 1;
        let mut key = String::from("$");
        let mut indices = Vec::new();
        match document.shape() {
            NodeShape::Record | NodeShape::Map => {
                self.walk_members(document, &mut key, &mut indices);
            }
            NodeShape::Array => {
                self.walk_elements(document, &mut key, &mut indices);
            }
            // a bare scalar document has no addressable members
            NodeShape::Primitive => {}
        }
    }

    fn walk<N: Node>(
        &mut self,
        node: &N,
        key: &mut String,
        indices: &mut Vec<usize>,
    ) {
        match node.shape() {
            NodeShape::Record | NodeShape::Map => {
                self.walk_members(node, key, indices);
            }
            NodeShape::Array => self.walk_elements(node, key, indices),
            NodeShape::Primitive => self.observe_leaf(node, key, indices),
        }
    }

    fn walk_members<N: Node>(
        &mut self,
        node: &N,
        key: &mut String,
        indices: &mut Vec<usize>,
    ) {
        for (name, child) in node.entries() {
            let mark = key.len();
            key.push('.');
            key.push_str(name);
            self.walk(child, key, indices);
            key.truncate(mark);
        }
    }

    fn walk_elements<N: Node>(
        &mut self,
        node: &N,
        key: &mut String,
        indices: &mut Vec<usize>,
    ) {
        let count = node.array_len();
        // an empty list says nothing about its element shape
        if count == 0 {
            return;
        }
        let mark = key.len();
        key.push_str("[-]");
        for position in 0..count {
            if let Some(element) = node.element(position) {
                indices.push(position);
                self.walk(element, key, indices);
                indices.pop();
            }
        }
        key.truncate(mark);
    }

    fn observe_leaf<N: Node>(
        &mut self,
        node: &N,
        key: &str,
        indices: &[usize],
    ) {
        let Some(primitive) = node.primitive() else {
            return;
        };
        let category = primitive.category();
        let stats = self
            .table
            .entry(key.to_string())
            .or_insert_with(|| PathStats::first(category));
        if stats.category != category {
            stats.disparate = true;
        }
        stats.occurrences += 1;
        for (level, &index) in indices.iter().enumerate() {
            stats
                .ranges
                .entry(level)
                .and_modify(|r| r.observe(index))
                .or_insert_with(|| IndexRange::at(index));
        }
    }

    /// Fold another partial table into this one: range union, occurrence
    /// sum, disparity OR. Differing first-seen categories disagree too.
    pub fn merge(mut self, other: SampleAccumulator) -> SampleAccumulator {
        self.documents += other.documents;
        for (key, theirs) in other.table {
            match self.table.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(theirs);
                }
                Entry::Occupied(mut slot) => {
                    let ours = slot.get_mut();
                    ours.occurrences += theirs.occurrences;
                    ours.disparate |=
                        theirs.disparate || ours.category != theirs.category;
                    for (level, range) in theirs.ranges {
                        ours.ranges
                            .entry(level)
                            .and_modify(|r| r.union(range))
                            .or_insert(range);
                    }
                }
            }
        }
        self
    }

    /// Finalized discovery output, ordered by path key, plus the number of
    /// documents observed.
    pub fn finalize(self) -> (Vec<DiscoveredPath>, u64) {
        let documents = self.documents;
        let paths = self
            .table
            .into_iter()
            .map(|(key, stats)| finalize_path(&key, &stats, documents))
            .collect();
        (paths, documents)
    }
}

fn finalize_path(
    key: &str,
    stats: &PathStats,
    documents: u64,
) -> DiscoveredPath {
    let (path, annotated) = render_paths(key, &stats.ranges);
    let display = annotated.as_deref().unwrap_or(&path);
    let name = basename(display).to_string();
    let target = if stats.disparate {
        CanonicalType::String
    } else {
        inferred_target(stats.category)
    };
    DiscoveredPath {
        name,
        path,
        annotated,
        target,
        disparate_types: stats.disparate,
        occurrences: stats.occurrences,
        occurrence_fraction: stats.occurrences as f64 / documents as f64,
    }
}

/// Rebuild the resolvable path and, when any level widened, the annotated
/// display path from the wildcard key.
fn render_paths(
    key: &str,
    ranges: &BTreeMap<usize, IndexRange>,
) -> (String, Option<String>) {
    let mut resolvable = String::with_capacity(key.len() + 8);
    let mut display = String::with_capacity(key.len() + 8);
    let mut widened = false;
    let mut rest = key;
    let mut level = 0usize;
    while let Some(open) = rest.find("[-]") {
        resolvable.push_str(&rest[..open]);
        display.push_str(&rest[..open]);
        let range = ranges
            .get(&level)
            .copied()
            .unwrap_or(IndexRange { min: 0, max: 0 });
        resolvable.push_str(&format!("[{}]", range.min));
        if range.min == range.max {
            display.push_str(&format!("[{}]", range.min));
        } else {
            widened = true;
            display.push_str(&format!("[{}:{}]", range.min, range.max));
        }
        rest = &rest[open + 3..];
        level += 1;
    }
    resolvable.push_str(rest);
    display.push_str(rest);
    (resolvable, widened.then_some(display))
}

/// Discovery's native mapping. Nulls and text sample as strings; anything
/// with a firmer reading keeps it.
fn inferred_target(category: NativeCategory) -> CanonicalType {
    match category {
        NativeCategory::Integer => CanonicalType::Integer,
        NativeCategory::Float => CanonicalType::Number,
        NativeCategory::Boolean => CanonicalType::Boolean,
        NativeCategory::DateTime => CanonicalType::Date,
        NativeCategory::Binary => CanonicalType::Binary,
        NativeCategory::Null | NativeCategory::Text => CanonicalType::String,
    }
}

/// Text after the last dot, the whole path when there is none.
fn basename(path: &str) -> &str {
    match path.rfind('.') {
        Some(dot) => &path[dot + 1..],
        None => path,
    }
}
