//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats: one function per result shape, a
//! `serde_json::json!` value for the structured formats and a hand-written
//! block for text, plus a single `format_error` every command error path
//! funnels through.

use crate::core::job::{Job, JobState};
use crate::error::{
    ChunkingError, CommandError, EmbedError, Error, IoError, ParseError, QueryError, StorageError,
};
use crate::query::analog::AnalogHit;
use crate::query::engine::QueryOutcome;
use serde_json::json;
use std::fmt::Write as _;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
    /// Newline-delimited JSON (NDJSON) for streaming.
    /// Each record is a single JSON object on its own line.
    Ndjson,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "ndjson" | "jsonl" | "stream" => Self::Ndjson,
            _ => Self::Text,
        }
    }

    /// Returns true if this format is a streaming format.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        matches!(self, Self::Ndjson)
    }
}

fn job_phase_str(job: &Job) -> &'static str {
    use crate::core::job::JobPhase;
    match job.phase {
        JobPhase::Classifying => "classifying",
        JobPhase::Extracting => "extracting",
        JobPhase::Normalising => "normalising",
        JobPhase::Chunking => "chunking",
        JobPhase::Indexing => "indexing",
        JobPhase::Done => "done",
    }
}

fn job_state_str(job: &Job) -> &'static str {
    match job.state {
        JobState::Running => "running",
        JobState::Completed => "completed",
        JobState::Failed => "failed",
    }
}

fn job_json(job: &Job) -> serde_json::Value {
    json!({
        "id": job.id,
        "archive_id": job.archive_id,
        "phase": job_phase_str(job),
        "state": job_state_str(job),
        "counters": {
            "files_seen": job.counters.files_seen,
            "files_parsed": job.counters.files_parsed,
            "files_chunked": job.counters.files_chunked,
            "chunks_embedded": job.counters.chunks_embedded,
            "chunks_indexed": job.counters.chunks_indexed,
            "files_failed": job.counters.files_failed,
        },
        "failures": job.failures.iter().map(|f| json!({"path": f.path, "message": f.message})).collect::<Vec<_>>(),
        "started_at": job.started_at,
        "finished_at": job.finished_at,
        "last_error": job.last_error,
    })
}

/// Formats a [`Job`] (the `ingest` and `job-status` result shape).
#[must_use]
pub fn format_job(job: &Job, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json | OutputFormat::Ndjson => job_json(job).to_string(),
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(out, "job {} ({})", job.id, job.archive_id);
            let _ = writeln!(out, "  phase: {}  state: {}", job_phase_str(job), job_state_str(job));
            let _ = writeln!(
                out,
                "  seen: {}  parsed: {}  chunked: {}  embedded: {}  indexed: {}  failed: {}",
                job.counters.files_seen,
                job.counters.files_parsed,
                job.counters.files_chunked,
                job.counters.chunks_embedded,
                job.counters.chunks_indexed,
                job.counters.files_failed,
            );
            for failure in &job.failures {
                let _ = writeln!(out, "  ! {}: {}", failure.path, failure.message);
            }
            if let Some(error) = &job.last_error {
                let _ = writeln!(out, "  last error: {error}");
            }
            out
        }
    }
}

/// Formats the result of a `search` query, with every answer text backed
/// by its structured citations (`spec.md` §6).
#[must_use]
pub fn format_search_outcome(outcome: &QueryOutcome, query: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json | OutputFormat::Ndjson => json!({
            "query": query,
            "intent": format!("{:?}", outcome.intent).to_lowercase(),
            "failed_collections": outcome.failed_collections,
            "answer": {
                "text": outcome.answer.text,
                "confidence": outcome.answer.confidence,
                "sources": outcome.answer.sources.iter().map(|s| json!({
                    "doc_id": s.doc_id,
                    "doc_family": s.doc_family,
                    "doc_title": s.doc_title,
                    "section": s.section,
                    "clause": s.clause,
                    "relevance_score": s.relevance_score,
                })).collect::<Vec<_>>(),
            },
        })
        .to_string(),
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(out, "{}", outcome.answer.text);
            let _ = writeln!(out, "\nconfidence: {:.2}", outcome.answer.confidence);
            if outcome.failed_collections > 0 {
                let _ = writeln!(out, "({} collection(s) failed during retrieval)", outcome.failed_collections);
            }
            if outcome.answer.sources.is_empty() {
                out
            } else {
                let _ = writeln!(out, "\nsources:");
                for source in &outcome.answer.sources {
                    let label = source
                        .doc_family
                        .as_deref()
                        .zip(source.clause.as_deref())
                        .map(|(family, clause)| format!("{family} {clause}"))
                        .or_else(|| source.doc_title.clone())
                        .unwrap_or_else(|| source.doc_id.clone());
                    let _ = writeln!(out, "  - {label} (score {:.2})", source.relevance_score);
                }
                out
            }
        }
    }
}

/// Formats the results of an `analog-search` (`spec.md` §4.12).
#[must_use]
pub fn format_analog_hits(hits: &[AnalogHit], equipment_type: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json!({
            "equipment_type": equipment_type,
            "hits": hits.iter().map(analog_hit_json).collect::<Vec<_>>(),
        })
        .to_string(),
        OutputFormat::Ndjson => hits
            .iter()
            .map(|hit| analog_hit_json(hit).to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Text => {
            if hits.is_empty() {
                return format!("no analog equipment found for \"{equipment_type}\"\n");
            }
            let mut out = String::new();
            for hit in hits {
                let common = hit.chunk.common();
                let title = common.doc_title.clone().unwrap_or_else(|| common.document_id.clone());
                let _ = writeln!(
                    out,
                    "{title} [{}]  analog={:.2}  final={:.2}  param_sim={:.2}",
                    common.document_id, hit.analog_score, hit.final_score, hit.param_sim,
                );
            }
            out
        }
    }
}

fn analog_hit_json(hit: &AnalogHit) -> serde_json::Value {
    let common = hit.chunk.common();
    json!({
        "document_id": common.document_id,
        "doc_title": common.doc_title,
        "chunk_id": hit.chunk.id().to_hex(),
        "final_score": hit.final_score,
        "param_sim": hit.param_sim,
        "analog_score": hit.analog_score,
    })
}

/// Returns `(code, message)` for an error, matching the taxonomy in
/// [`crate::error`].
fn get_error_details(err: &Error) -> (&'static str, String) {
    match err {
        Error::Storage(e) => ("storage_error", storage_error_message(e)),
        Error::Chunking(e) => ("chunking_error", chunking_error_message(e)),
        Error::Parse(e) => ("parse_error", parse_error_message(e)),
        Error::Embed(e) => ("embed_error", embed_error_message(e)),
        Error::Query(e) => ("query_error", query_error_message(e)),
        Error::Io(e) => ("io_error", io_error_message(e)),
        Error::Command(e) => ("command_error", command_error_message(e)),
        Error::Integrity { message } => ("integrity_error", message.clone()),
        Error::Timeout { elapsed_ms } => ("timeout", format!("deadline exceeded after {elapsed_ms}ms")),
        Error::InvalidState { message } => ("invalid_state", message.clone()),
        Error::Config { message } => ("config_error", message.clone()),
    }
}

fn storage_error_message(e: &StorageError) -> String {
    match e {
        StorageError::Database(msg) => format!("database error: {msg}"),
        StorageError::NotInitialized => "store not initialized; run ingest first".to_string(),
        StorageError::CollectionNotFound { name } => format!("collection not found: {name}"),
        StorageError::ChunkNotFound { id } => format!("chunk not found: {id}"),
        StorageError::IdCollision { id } => format!("chunk id collision: {id}"),
        StorageError::Migration(msg) => format!("migration error: {msg}"),
        StorageError::Transaction(msg) => format!("transaction error: {msg}"),
        StorageError::Serialization(msg) => format!("serialization error: {msg}"),
        StorageError::Unavailable(msg) => format!("store unavailable: {msg}"),
        #[cfg(feature = "usearch-hnsw")]
        StorageError::VectorSearch(msg) => format!("vector search error: {msg}"),
    }
}

fn chunking_error_message(e: &ChunkingError) -> String {
    match e {
        ChunkingError::InvalidUtf8 { offset } => format!("invalid UTF-8 at byte offset {offset}"),
        ChunkingError::ChunkTooLarge { size, max } => format!("chunk size {size} exceeds maximum {max}"),
        ChunkingError::InvalidConfig { reason } => format!("invalid chunk configuration: {reason}"),
        ChunkingError::OverlapTooLarge { overlap, size } => {
            format!("overlap {overlap} must be less than target size {size}")
        }
        ChunkingError::ParallelFailed { reason } => format!("parallel processing failed: {reason}"),
        ChunkingError::Regex(msg) => format!("regex error: {msg}"),
        ChunkingError::UnknownStrategy { name } => format!("unknown chunking strategy: {name}"),
    }
}

fn parse_error_message(e: &ParseError) -> String {
    match e {
        ParseError::UnsupportedMediaType { media_type } => format!("unsupported media type: {media_type}"),
        ParseError::Malformed { path, reason } => format!("malformed document {path}: {reason}"),
        ParseError::NoExtractableText { path, chars } => {
            format!("insufficient extractable text in {path} ({chars} chars)")
        }
    }
}

fn embed_error_message(e: &EmbedError) -> String {
    match e {
        EmbedError::InitFailed(msg) => format!("embedder initialization failed: {msg}"),
        EmbedError::GenerationFailed(msg) => format!("embedding generation failed: {msg}"),
        EmbedError::BatchSizeMismatch { expected, actual } => {
            format!("embedding batch size mismatch: expected {expected}, got {actual}")
        }
    }
}

fn query_error_message(e: &QueryError) -> String {
    match e {
        QueryError::UpstreamFailed(msg) => format!("upstream retrieval call failed: {msg}"),
        QueryError::DeadlineExceeded => "query deadline exceeded".to_string(),
        QueryError::UnknownNumericFact { name } => format!("unknown numeric fact: {name}"),
    }
}

fn io_error_message(e: &IoError) -> String {
    match e {
        IoError::NotFound { key } => format!("object not found: {key}"),
        IoError::FetchFailed { key, reason } => format!("failed to fetch {key}: {reason}"),
        IoError::WriteFailed { key, reason } => format!("failed to write {key}: {reason}"),
        IoError::PathTraversal { path } => format!("path traversal denied: {path}"),
        IoError::Unavailable(msg) => format!("object store unavailable: {msg}"),
        IoError::Generic(msg) => format!("I/O error: {msg}"),
    }
}

fn command_error_message(e: &CommandError) -> String {
    match e {
        CommandError::UnknownCommand(msg) => format!("unknown command: {msg}"),
        CommandError::InvalidArgument(msg) => format!("invalid argument: {msg}"),
        CommandError::MissingArgument(msg) => format!("missing required argument: {msg}"),
        CommandError::ExecutionFailed(msg) => format!("command execution failed: {msg}"),
        CommandError::OutputFormat(msg) => format!("output format error: {msg}"),
    }
}

/// Formats an error for CLI output in the requested format.
#[must_use]
pub fn format_error(err: &Error, format: OutputFormat) -> String {
    let (code, message) = get_error_details(err);
    match format {
        OutputFormat::Json | OutputFormat::Ndjson => json!({
            "error": {
                "code": code,
                "message": message,
                "kind": format!("{:?}", err.kind()),
            }
        })
        .to_string(),
        OutputFormat::Text => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::job::Job;

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("ndjson"), OutputFormat::Ndjson);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("nonsense"), OutputFormat::Text);
    }

    #[test]
    fn test_format_job_text_contains_phase_and_state() {
        let job = Job::new("job-1", "arc-1", 1000);
        let out = format_job(&job, OutputFormat::Text);
        assert!(out.contains("classifying"));
        assert!(out.contains("running"));
    }

    #[test]
    fn test_format_job_json_is_valid() {
        let job = Job::new("job-1", "arc-1", 1000);
        let out = format_job(&job, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["id"], "job-1");
    }

    #[test]
    fn test_format_error_not_found() {
        let err: Error = StorageError::ChunkNotFound { id: "c-1".to_string() }.into();
        let text = format_error(&err, OutputFormat::Text);
        assert!(text.contains("c-1"));

        let json_out = format_error(&err, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json_out).unwrap();
        assert_eq!(value["error"]["code"], "storage_error");
    }

    #[test]
    fn test_format_analog_hits_empty() {
        let out = format_analog_hits(&[], "насос", OutputFormat::Text);
        assert!(out.contains("no analog equipment found"));
    }
}
