//! End-to-end schema discovery tests.
//!
//! Covers: path folding across documents, range union under partitioned
//! sampling, type disparity, name disambiguation, and feeding a discovery
//! report straight into an extractor.

use pretty_assertions::assert_eq;
use serde_json::json;

use extraction::Extractor;
use rowforge_config::ExtractorSettings;
use rowforge_core::{CanonicalType, CanonicalValue, NoVariables, TypedValue};
use sampling::{discover_schema, DiscoveryReport, SampleAccumulator};

fn growing_array_docs() -> Vec<serde_json::Value> {
    vec![json!({"a": [1, 2]}), json!({"a": [1, 2, 3]})]
}

fn report_for(docs: Vec<serde_json::Value>) -> DiscoveryReport {
    discover_schema(docs, 100)
}

// ==== Path Folding ====

#[test]
fn growing_arrays_fold_into_one_widened_path() {
    let report = report_for(growing_array_docs());
    assert_eq!(report.paths.len(), 1);
    assert_eq!(report.paths[0].path, "$.a[0]");
    assert_eq!(report.paths[0].annotated.as_deref(), Some("$.a[0:2]"));
    assert_eq!(report.paths[0].target, CanonicalType::Integer);
    assert_eq!(report.documents_processed, 2);
}

#[test]
fn document_order_does_not_change_the_report() {
    let forward = report_for(growing_array_docs());
    let mut reversed_docs = growing_array_docs();
    reversed_docs.reverse();
    let reversed = report_for(reversed_docs);
    assert_eq!(forward, reversed);
}

#[test]
fn partitioned_sampling_merges_to_the_sequential_result() {
    let docs = vec![
        json!({"a": [1, 2], "x": 1}),
        json!({"a": [1, 2, 3], "x": "s"}),
        json!({"b": {"deep": [true]}}),
    ];

    let mut sequential = SampleAccumulator::new();
    for doc in &docs {
        sequential.observe_document(doc);
    }
    assert_eq!(sequential.documents(), 3);
    assert_eq!(sequential.path_count(), 3);

    let mut first = SampleAccumulator::new();
    first.observe_document(&docs[0]);
    let mut rest = SampleAccumulator::new();
    rest.observe_document(&docs[1]);
    rest.observe_document(&docs[2]);

    let forward = first.clone().merge(rest.clone());
    let backward = rest.merge(first);

    assert_eq!(forward.finalize(), sequential.clone().finalize());
    assert_eq!(backward.finalize(), sequential.finalize());
}

// ==== Type Disparity ====

#[test]
fn disagreeing_leaf_types_fall_back_to_string() {
    let report = report_for(vec![json!({"x": 1}), json!({"x": "s"})]);
    assert_eq!(report.paths.len(), 1);
    assert!(report.paths[0].disparate_types);
    assert_eq!(report.fields[0].target, CanonicalType::String);
}

#[test]
fn agreeing_floats_keep_a_numeric_target() {
    let report = report_for(vec![json!({"x": 1.5}), json!({"x": 2.5})]);
    assert!(!report.paths[0].disparate_types);
    assert_eq!(report.fields[0].target, CanonicalType::Number);
}

// ==== Name Disambiguation ====

#[test]
fn repeated_basenames_get_numeric_suffixes() {
    let report =
        report_for(vec![json!({"id": 1, "name": "a", "user": {"id": 2}})]);
    let names: Vec<&str> =
        report.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "id_1"]);
    let paths: Vec<&str> =
        report.fields.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["$.id", "$.name", "$.user.id"]);
}

// ==== Extraction Round Trip ====

#[test]
fn discovered_fields_resolve_over_a_sampled_document() {
    let doc = json!({"id": 7, "tags": ["x", "y"]});
    let report = report_for(vec![doc.clone()]);

    let extractor =
        Extractor::new(&report.fields, &ExtractorSettings::default()).unwrap();
    let row = extractor.resolve_row(&doc, &NoVariables).unwrap();

    assert_eq!(
        row,
        vec![
            CanonicalValue::Integer(7),
            CanonicalValue::String("x".to_string()),
        ]
    );
}

// ==== Occurrence Accounting ====

#[test]
fn fractions_count_leaf_visits_per_document() {
    let report = report_for(vec![
        json!({"tags": ["a", "b", "c"], "id": 1}),
        json!({"id": 2}),
    ]);

    let tags = report
        .paths
        .iter()
        .find(|p| p.path == "$.tags[0]")
        .unwrap();
    assert_eq!(tags.occurrences, 3);
    assert_eq!(tags.occurrence_fraction, 1.5);

    let id = report.paths.iter().find(|p| p.path == "$.id").unwrap();
    assert_eq!(id.occurrences, 2);
    assert_eq!(id.occurrence_fraction, 1.0);
}

// ==== Typed Instances ====

#[test]
fn typed_maps_sample_like_records() {
    let doc = TypedValue::map(vec![
        ("count", TypedValue::Integer(3)),
        ("label", TypedValue::text("ok")),
    ]);
    let report = discover_schema(vec![doc], 100);

    let paths: Vec<&str> =
        report.fields.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["$.count", "$.label"]);
    assert_eq!(report.fields[0].target, CanonicalType::Integer);
    assert_eq!(report.fields[1].target, CanonicalType::String);
}
