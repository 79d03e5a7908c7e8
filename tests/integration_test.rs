//! Integration tests exercising the ingest → search → analog-search round
//! trip through the public [`archintel::app::Core`] API, wired with the
//! production `SqliteStore`/`SqliteJobStore` against an in-memory database
//! and a `FakeObjectStore` standing in for the archive's document store.

#![allow(clippy::expect_used)]

use archintel::app::Core;
use archintel::config::Config;
use archintel::embed::FallbackTextEmbedder;
use archintel::orchestrator::{FakeObjectStore, InMemoryJobStore};
use archintel::query::analog::{AnalogRequest, NumericParam};
use archintel::query::rerank::FakeCrossEncoder;
use archintel::store::{Filter, SqliteStore};
use archintel::{JobState, TextEmbedder};
use serde_json::json;
use std::sync::Arc;

type TestCore = Core<FakeObjectStore, SqliteStore, SqliteStore, InMemoryJobStore>;

fn harness() -> (TestCore, Arc<FakeObjectStore>) {
    let objects = Arc::new(FakeObjectStore::new());
    let vector = Arc::new(SqliteStore::in_memory().expect("open in-memory store"));
    let lexical = vector.clone();
    let embedder: Arc<dyn TextEmbedder> = Arc::new(FallbackTextEmbedder::new(16));
    let core = Core::new(
        objects.clone(),
        vector,
        lexical,
        embedder,
        Box::new(FakeCrossEncoder),
        Arc::new(InMemoryJobStore::new()),
        Config::default(),
    );
    (core, objects)
}

fn pump_manifest() -> Vec<u8> {
    serde_json::to_vec(&json!({
        "archive_id": "arc-1",
        "project_id": "proj-1",
        "object_id": "obj-1",
        "phase": "pd",
        "customer": "Acme",
        "language": ["ru"],
        "confidentiality": "internal",
        "default_discipline": "process",
        "documents": [
            {"path": "process/pump.txt", "media_type": "text/plain", "permissions": ["internal"]},
            {"path": "process/valve.txt", "media_type": "text/plain", "permissions": ["internal"]}
        ]
    }))
    .expect("serialize manifest")
}

#[test]
fn test_ingest_reports_monotonic_counters_and_completes() {
    let (core, objects) = harness();
    objects.seed(
        "process/pump.txt",
        "Центробежный насос для перекачки аммиака. Производительность 1000 m3/h, напор 50 m."
            .as_bytes(),
    );
    objects.seed(
        "process/valve.txt",
        "Задвижка клиновая стальная DN100 PN16 для запорной арматуры трубопровода.".as_bytes(),
    );

    let job = core.ingest(&pump_manifest(), 1_000).expect("ingest");
    assert_eq!(job.state, JobState::Completed);
    assert_eq!(job.counters.files_seen, 2);
    assert_eq!(job.counters.files_failed, 0);
    assert!(job.counters.chunks_indexed > 0);
}

#[test]
fn test_ingest_records_per_document_failure_without_aborting() {
    let (core, objects) = harness();
    objects.seed("process/pump.txt", "Центробежный насос.".as_bytes());
    // process/valve.txt is left unseeded, so fetching it fails.

    let job = core.ingest(&pump_manifest(), 1_000).expect("ingest");
    assert_eq!(job.state, JobState::Completed);
    assert_eq!(job.counters.files_failed, 1);
    assert_eq!(job.failures.len(), 1);
    assert_eq!(job.failures[0].path, "process/valve.txt");
}

#[test]
fn test_search_after_ingest_returns_cited_answer() {
    let (core, objects) = harness();
    objects.seed(
        "process/pump.txt",
        "Центробежный насос для перекачки аммиака. Производительность 1000 m3/h, напор 50 m."
            .as_bytes(),
    );
    objects.seed(
        "process/valve.txt",
        "Задвижка клиновая стальная DN100 PN16 для запорной арматуры трубопровода.".as_bytes(),
    );
    core.ingest(&pump_manifest(), 1_000).expect("ingest");

    let outcome = core.search("центробежный насос", Filter::new()).expect("search");
    assert!(!outcome.answer.sources.is_empty());
    assert!(outcome.answer.confidence > 0.0);
    assert_eq!(outcome.failed_collections, 0);
}

#[test]
fn test_search_filtered_by_discipline_excludes_other_archives() {
    let (core, objects) = harness();
    objects.seed("process/pump.txt", "Центробежный насос для перекачки аммиака.".as_bytes());
    objects.seed("process/valve.txt", "Задвижка клиновая стальная.".as_bytes());
    core.ingest(&pump_manifest(), 1_000).expect("ingest");

    let outcome = core
        .search("насос", Filter::new().with_equals("discipline", "electrical"))
        .expect("search");
    assert_eq!(outcome.answer.confidence, 0.0);
    assert!(outcome.answer.sources.is_empty());
}

#[test]
fn test_analog_search_matches_on_equipment_and_parameters() {
    let (core, objects) = harness();
    objects.seed(
        "process/pump.txt",
        "Центробежный насос для перекачки аммиака. Производительность 1000 m3/h, напор 50 m."
            .as_bytes(),
    );
    objects.seed("process/valve.txt", "Задвижка клиновая стальная DN100 PN16.".as_bytes());
    core.ingest(&pump_manifest(), 1_000).expect("ingest");

    let request = AnalogRequest {
        equipment_type: "центробежный насос".to_string(),
        numeric_params: vec![NumericParam {
            name: "flow_rate".to_string(),
            value: 1000.0,
            unit: "m3/h".to_string(),
        }],
        filters: Filter::new(),
        limit: 5,
    };
    let hits = core.analog_search(&request).expect("analog search");
    assert!(!hits.is_empty());
    assert!(hits[0].analog_score > 0.0);
}

#[test]
fn test_job_status_reads_back_after_ingest() {
    let (core, objects) = harness();
    objects.seed("process/pump.txt", "Центробежный насос.".as_bytes());
    objects.seed("process/valve.txt", "Задвижка клиновая стальная.".as_bytes());
    let job = core.ingest(&pump_manifest(), 1_000).expect("ingest");

    let fetched = core.job_status(&job.id).expect("job status");
    assert_eq!(fetched.id, job.id);
    assert_eq!(fetched.archive_id, "arc-1");
    assert_eq!(fetched.state, JobState::Completed);
}

#[test]
fn test_job_status_unknown_id_is_not_found() {
    let (core, _objects) = harness();
    let err = core.job_status("does-not-exist").unwrap_err();
    assert_eq!(err.kind(), archintel::error::ErrorKind::NotFound);
}

#[test]
fn test_ingest_with_invalid_manifest_bytes_fails() {
    let (core, _objects) = harness();
    let err = core.ingest(b"not json", 1_000).unwrap_err();
    assert_eq!(err.kind(), archintel::error::ErrorKind::InvalidInput);
}
