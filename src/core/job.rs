//! Job: a stateful ingestion run for one archive.
//!
//! Grounded on `storage/schema.rs`'s migration-tracking row style, generalized
//! from a schema-version counter to the per-archive phase pointer and
//! monotonic counters `spec.md` §3/§4.7 require for resumable ingestion.

use serde::{Deserialize, Serialize};

/// Which step of the ingestion pipeline a job is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobPhase {
    /// Manifest parsed, file list built.
    Classifying,
    /// Fetching and parsing documents.
    Extracting,
    /// Normalising extracted blocks.
    Normalising,
    /// Producing chunks.
    Chunking,
    /// Embedding and writing to the dual index.
    Indexing,
    /// No further work remains.
    Done,
}

/// The terminal state of a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    /// Still in progress.
    Running,
    /// Finished; `counters.failed_files` may still be nonzero (partial
    /// success is not a failure per `spec.md` §4.7).
    Completed,
    /// Could not make progress at all (manifest missing, store unreachable
    /// after retries exhausted).
    Failed,
}

/// Monotonic progress counters, readable at any time per the §4.7 progress
/// contract. Every field only ever increases for the lifetime of a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCounters {
    /// Files enumerated from the manifest.
    pub files_seen: u64,
    /// Files successfully parsed.
    pub files_parsed: u64,
    /// Files that produced at least one chunk.
    pub files_chunked: u64,
    /// Chunks successfully embedded.
    pub chunks_embedded: u64,
    /// Chunks that became visible in the dual index.
    pub chunks_indexed: u64,
    /// Files that failed at any stage.
    pub files_failed: u64,
}

impl JobCounters {
    /// Merges another counter snapshot in, field by field, keeping counters
    /// monotonic under concurrent updates from parallel workers.
    pub fn merge(&mut self, other: &Self) {
        self.files_seen += other.files_seen;
        self.files_parsed += other.files_parsed;
        self.files_chunked += other.files_chunked;
        self.chunks_embedded += other.chunks_embedded;
        self.chunks_indexed += other.chunks_indexed;
        self.files_failed += other.files_failed;
    }
}

/// A per-document failure recorded on the job rather than aborting the
/// archive (§4.2/§4.7 "continue on parser failure").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFailure {
    /// Path of the document that failed.
    pub path: String,
    /// Raw failure message, not interpreted further.
    pub message: String,
}

/// A unit of ingestion work for a single archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Stable job identifier.
    pub id: String,
    /// Archive this job is ingesting.
    pub archive_id: String,
    /// Current phase pointer; drives resume-on-crash.
    pub phase: JobPhase,
    /// Terminal/running state.
    pub state: JobState,
    /// Monotonic progress counters.
    pub counters: JobCounters,
    /// Per-document failures recorded so far.
    pub failures: Vec<DocumentFailure>,
    /// Unix timestamp (seconds) the job was created.
    pub started_at: i64,
    /// Unix timestamp (seconds) the job reached a terminal state, if any.
    pub finished_at: Option<i64>,
    /// The last error encountered, if the job failed outright.
    pub last_error: Option<String>,
}

impl Job {
    /// Creates a new job in the `Classifying` phase.
    #[must_use]
    pub fn new(id: impl Into<String>, archive_id: impl Into<String>, started_at: i64) -> Self {
        Self {
            id: id.into(),
            archive_id: archive_id.into(),
            phase: JobPhase::Classifying,
            state: JobState::Running,
            counters: JobCounters::default(),
            failures: Vec::new(),
            started_at,
            finished_at: None,
            last_error: None,
        }
    }

    /// Advances the phase pointer. Never moves backwards.
    pub fn advance(&mut self, phase: JobPhase) {
        self.phase = phase;
    }

    /// Records a per-document failure without aborting the job.
    pub fn record_failure(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.failures.push(DocumentFailure {
            path: path.into(),
            message: message.into(),
        });
        self.counters.files_failed += 1;
    }

    /// Marks the job completed (possibly with `failures` nonempty — partial
    /// success is still `Completed`, per `spec.md` §4.7).
    pub fn complete(&mut self, finished_at: i64) {
        self.phase = JobPhase::Done;
        self.state = JobState::Completed;
        self.finished_at = Some(finished_at);
    }

    /// Marks the job as unable to make any progress.
    pub fn fail(&mut self, finished_at: i64, error: impl Into<String>) {
        self.state = JobState::Failed;
        self.finished_at = Some(finished_at);
        self.last_error = Some(error.into());
    }

    /// Returns `true` if the job has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.state, JobState::Completed | JobState::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_starts_classifying() {
        let job = Job::new("job-1", "arc-1", 1000);
        assert_eq!(job.phase, JobPhase::Classifying);
        assert_eq!(job.state, JobState::Running);
        assert!(!job.is_terminal());
    }

    #[test]
    fn test_record_failure_does_not_abort() {
        let mut job = Job::new("job-1", "arc-1", 1000);
        job.record_failure("bad.pdf", "malformed PDF");
        job.complete(1100);
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.counters.files_failed, 1);
        assert_eq!(job.failures.len(), 1);
    }

    #[test]
    fn test_fail_sets_last_error() {
        let mut job = Job::new("job-1", "arc-1", 1000);
        job.fail(1050, "manifest missing");
        assert!(job.is_terminal());
        assert_eq!(job.last_error.as_deref(), Some("manifest missing"));
    }

    #[test]
    fn test_counters_merge_is_additive() {
        let mut a = JobCounters {
            files_seen: 2,
            ..Default::default()
        };
        let b = JobCounters {
            files_seen: 3,
            chunks_indexed: 5,
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.files_seen, 5);
        assert_eq!(a.chunks_indexed, 5);
    }
}
