//! Error types for archintel operations.
//!
//! Mirrors the taxonomy every component reports through: a top-level
//! [`Error`] wraps per-subsystem error enums, and [`ErrorKind`] classifies
//! any error into the six kinds the orchestrator and query pipeline act on
//! (retry, abort, or surface as a partial result).

use thiserror::Error;

/// Result type alias for archintel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The six error kinds the rest of the crate branches on.
///
/// `Transient` is the only kind retried internally (see the backoff policy
/// in `orchestrator`). `Integrity` and `InvalidInput` propagate immediately.
/// `Partial` is never constructed directly from an `Error` — it describes a
/// caller-visible degraded result, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-supplied data failed validation; retrying would not help.
    InvalidInput,
    /// A dependency call failed in a way that may succeed on retry.
    Transient,
    /// An invariant the system relies on was violated; fatal to the job.
    Integrity,
    /// A deadline was exceeded before a result could be produced.
    Timeout,
    /// The requested entity does not exist.
    NotFound,
}

/// Comprehensive error types for archintel operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Storage-related errors (vector/lexical index operations).
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Chunking-related errors (text/table/drawing/IFC segmentation).
    #[error("chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    /// Parsing-related errors (format extraction).
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Embedding-related errors (text/image vectorization).
    #[error("embedding error: {0}")]
    Embed(#[from] EmbedError),

    /// Query pipeline errors (rewrite, retrieval, rerank, assembly).
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    /// I/O errors (object-store operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// A fatal invariant violation: the sole `Integrity` producer that does
    /// not already come tagged through a subsystem error.
    #[error("integrity violation: {message}")]
    Integrity {
        /// Description of the violated invariant.
        message: String,
    },

    /// A query or job deadline was exceeded.
    #[error("deadline exceeded after {elapsed_ms}ms")]
    Timeout {
        /// Elapsed time in milliseconds before the deadline fired.
        elapsed_ms: u64,
    },

    /// Invalid state errors.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of the invalid state.
        message: String,
    },

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

impl Error {
    /// Classifies this error into one of the six kinds the orchestrator and
    /// query pipeline branch on, for retry/abort decisions.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Integrity { .. } => ErrorKind::Integrity,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::InvalidState { .. } | Self::Config { .. } | Self::Command(_) => {
                ErrorKind::InvalidInput
            }
            Self::Storage(e) => e.kind(),
            Self::Chunking(_) | Self::Parse(_) => ErrorKind::InvalidInput,
            Self::Embed(e) => e.kind(),
            Self::Query(e) => e.kind(),
            Self::Io(e) => e.kind(),
        }
    }

    /// Returns `true` if retrying the operation that produced this error
    /// may succeed (i.e. it classifies as [`ErrorKind::Transient`]).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transient)
    }

    /// Maps this error to the CLI shim's process exit code (`spec.md` §6):
    /// `2` invalid manifest/input, `3` upstream store unavailable after
    /// retries, `1` anything else unexpected.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::InvalidInput => 2,
            ErrorKind::Transient => 3,
            ErrorKind::Integrity | ErrorKind::Timeout | ErrorKind::NotFound => 1,
        }
    }
}

/// Storage-specific errors for vector/lexical index operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(String),

    /// Storage not initialized.
    #[error("store not initialized; run init first")]
    NotInitialized,

    /// Collection not found.
    #[error("collection not found: {name}")]
    CollectionNotFound {
        /// Name of the missing collection.
        name: String,
    },

    /// Chunk not found by id.
    #[error("chunk not found: {id}")]
    ChunkNotFound {
        /// Chunk id that was not found.
        id: String,
    },

    /// A chunk id collided with an existing chunk whose content hash
    /// differs — this is always fatal, per the determinism invariant.
    #[error("chunk id collision for {id}: existing content hash does not match")]
    IdCollision {
        /// Colliding chunk id.
        id: String,
    },

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Transaction error.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The upstream store was unreachable or returned a server error;
    /// callers should retry with backoff.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Vector search error (feature-gated).
    #[cfg(feature = "usearch-hnsw")]
    #[error("vector search error: {0}")]
    VectorSearch(String),
}

impl StorageError {
    /// Classifies this storage error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotInitialized | Self::CollectionNotFound { .. } | Self::ChunkNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::IdCollision { .. } => ErrorKind::Integrity,
            Self::Unavailable(_) => ErrorKind::Transient,
            Self::Database(_) | Self::Migration(_) | Self::Transaction(_) | Self::Serialization(_) => {
                ErrorKind::InvalidInput
            }
            #[cfg(feature = "usearch-hnsw")]
            Self::VectorSearch(_) => ErrorKind::Transient,
        }
    }
}

/// Chunking-specific errors for text/table/drawing/IFC segmentation.
#[derive(Error, Debug)]
pub enum ChunkingError {
    /// Invalid UTF-8 encountered at specific byte offset.
    #[error("invalid UTF-8 at byte offset {offset}")]
    InvalidUtf8 {
        /// Byte offset where invalid UTF-8 was found.
        offset: usize,
    },

    /// Chunk size exceeds maximum allowed.
    #[error("chunk size {size} exceeds maximum {max}")]
    ChunkTooLarge {
        /// Actual chunk size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Invalid chunk configuration.
    #[error("invalid chunk configuration: {reason}")]
    InvalidConfig {
        /// Reason the configuration is invalid.
        reason: String,
    },

    /// Overlap exceeds chunk size.
    #[error("overlap {overlap} must be less than target size {size}")]
    OverlapTooLarge {
        /// Overlap size.
        overlap: usize,
        /// Target chunk size.
        size: usize,
    },

    /// Parallel processing error.
    #[error("parallel processing failed: {reason}")]
    ParallelFailed {
        /// Reason for failure.
        reason: String,
    },

    /// Regex compilation error.
    #[error("regex error: {0}")]
    Regex(String),

    /// Unknown chunking strategy.
    #[error("unknown chunking strategy: {name}")]
    UnknownStrategy {
        /// Name of the unknown strategy.
        name: String,
    },
}

/// Parser-specific errors for format extraction (C2).
#[derive(Error, Debug)]
pub enum ParseError {
    /// The media type has no registered parser.
    #[error("unsupported media type: {media_type}")]
    UnsupportedMediaType {
        /// The unrecognized media type string.
        media_type: String,
    },

    /// The document's bytes could not be parsed as the declared format.
    #[error("malformed document {path}: {reason}")]
    Malformed {
        /// Path of the document within the archive.
        path: String,
        /// Reason extraction failed.
        reason: String,
    },

    /// Native text extraction yielded too little content and no OCR
    /// fallback was configured.
    #[error("insufficient extractable text in {path} ({chars} chars) and no OCR fallback available")]
    NoExtractableText {
        /// Path of the document within the archive.
        path: String,
        /// Number of characters extracted natively.
        chars: usize,
    },
}

/// Embedding-specific errors for text/image vectorization (C5).
#[derive(Error, Debug)]
pub enum EmbedError {
    /// The embedding backend failed to initialize.
    #[error("embedder initialization failed: {0}")]
    InitFailed(String),

    /// The embedding call itself failed (model inference error).
    #[error("embedding generation failed: {0}")]
    GenerationFailed(String),

    /// A batch produced a different number of vectors than inputs.
    #[error("embedding batch size mismatch: expected {expected}, got {actual}")]
    BatchSizeMismatch {
        /// Number of input texts.
        expected: usize,
        /// Number of vectors returned.
        actual: usize,
    },
}

impl EmbedError {
    /// Classifies this embedding error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InitFailed(_) => ErrorKind::InvalidInput,
            Self::GenerationFailed(_) => ErrorKind::Transient,
            Self::BatchSizeMismatch { .. } => ErrorKind::Integrity,
        }
    }
}

/// Query pipeline errors (rewrite, retrieval, rerank, assembly — C8-C12).
#[derive(Error, Debug)]
pub enum QueryError {
    /// The cross-encoder or an upstream index call failed.
    #[error("upstream retrieval call failed: {0}")]
    UpstreamFailed(String),

    /// The query deadline elapsed before a result could be assembled.
    #[error("query deadline exceeded")]
    DeadlineExceeded,

    /// A filter expression referenced an unknown numeric fact name.
    #[error("unknown numeric fact: {name}")]
    UnknownNumericFact {
        /// Fact name that was not recognized.
        name: String,
    },
}

impl QueryError {
    /// Classifies this query error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UpstreamFailed(_) => ErrorKind::Transient,
            Self::DeadlineExceeded => ErrorKind::Timeout,
            Self::UnknownNumericFact { .. } => ErrorKind::InvalidInput,
        }
    }
}

/// I/O-specific errors for object-store operations (C1).
#[derive(Error, Debug)]
pub enum IoError {
    /// Object not found.
    #[error("object not found: {key}")]
    NotFound {
        /// Object key that was not found.
        key: String,
    },

    /// Failed to fetch an object.
    #[error("failed to fetch {key}: {reason}")]
    FetchFailed {
        /// Object key.
        key: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to write an object.
    #[error("failed to write {key}: {reason}")]
    WriteFailed {
        /// Object key.
        key: String,
        /// Reason for failure.
        reason: String,
    },

    /// Path traversal security error.
    #[error("path traversal denied: {path}")]
    PathTraversal {
        /// Path that was denied.
        path: String,
    },

    /// The object store was unreachable; safe to retry with backoff.
    #[error("object store unavailable: {0}")]
    Unavailable(String),

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

impl IoError {
    /// Classifies this I/O error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unavailable(_) => ErrorKind::Transient,
            Self::PathTraversal { .. } => ErrorKind::Integrity,
            Self::FetchFailed { .. } | Self::WriteFailed { .. } | Self::Generic(_) => {
                ErrorKind::InvalidInput
            }
        }
    }
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Unknown command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    /// Output format error.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

// Implement From traits for standard library and third-party errors.

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Database(err.to_string()))
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<regex::Error> for ChunkingError {
    fn from(err: regex::Error) -> Self {
        Self::Regex(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for ChunkingError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::InvalidUtf8 {
            offset: err.utf8_error().valid_up_to(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidState {
            message: "test error".to_string(),
        };
        assert_eq!(err.to_string(), "invalid state: test error");
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::NotInitialized;
        assert_eq!(err.to_string(), "store not initialized; run init first");

        let err = StorageError::ChunkNotFound {
            id: "c-1".to_string(),
        };
        assert_eq!(err.to_string(), "chunk not found: c-1");
    }

    #[test]
    fn test_id_collision_is_integrity() {
        let err = StorageError::IdCollision {
            id: "c-1".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Integrity);
        let wrapped: Error = err.into();
        assert_eq!(wrapped.kind(), ErrorKind::Integrity);
        assert!(!wrapped.is_retryable());
    }

    #[test]
    fn test_unavailable_is_transient_and_retryable() {
        let err: Error = StorageError::Unavailable("connection reset".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_timeout_is_timeout_kind() {
        let err = Error::Timeout { elapsed_ms: 10_000 };
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_integrity_variant_display() {
        let err = Error::Integrity {
            message: "dual-index visibility invariant violated".to_string(),
        };
        assert!(err.to_string().contains("integrity violation"));
        assert_eq!(err.kind(), ErrorKind::Integrity);
    }

    #[test]
    fn test_chunking_error_display() {
        let err = ChunkingError::InvalidUtf8 { offset: 42 };
        assert_eq!(err.to_string(), "invalid UTF-8 at byte offset 42");

        let err = ChunkingError::OverlapTooLarge {
            overlap: 100,
            size: 50,
        };
        assert_eq!(
            err.to_string(),
            "overlap 100 must be less than target size 50"
        );
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::NoExtractableText {
            path: "drawing.pdf".to_string(),
            chars: 3,
        };
        assert!(err.to_string().contains("drawing.pdf"));
    }

    #[test]
    fn test_embed_error_kinds() {
        assert_eq!(
            EmbedError::BatchSizeMismatch {
                expected: 4,
                actual: 3
            }
            .kind(),
            ErrorKind::Integrity
        );
        assert_eq!(
            EmbedError::GenerationFailed("timeout".to_string()).kind(),
            ErrorKind::Transient
        );
    }

    #[test]
    fn test_query_error_kinds() {
        assert_eq!(QueryError::DeadlineExceeded.kind(), ErrorKind::Timeout);
        assert_eq!(
            QueryError::UnknownNumericFact {
                name: "foo".to_string()
            }
            .kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_io_error_kinds() {
        assert_eq!(
            IoError::NotFound {
                key: "k".to_string()
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            IoError::PathTraversal {
                path: "../etc/passwd".to_string()
            }
            .kind(),
            ErrorKind::Integrity
        );
    }

    #[test]
    fn test_command_error_display() {
        let err = CommandError::MissingArgument("--manifest".to_string());
        assert_eq!(err.to_string(), "missing required argument: --manifest");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_rusqlite() {
        let rusqlite_err = rusqlite::Error::InvalidQuery;
        let err: Error = rusqlite_err.into();
        assert!(matches!(err, Error::Storage(StorageError::Database(_))));
    }

    #[test]
    fn test_from_regex_error_to_chunking_error() {
        let regex_err = regex::Regex::new("[invalid").unwrap_err();
        let err: ChunkingError = regex_err.into();
        assert!(matches!(err, ChunkingError::Regex(_)));
    }

    #[test]
    fn test_from_serde_json_error_to_storage_error() {
        let json_err: serde_json::Error = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: StorageError = json_err.into();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
