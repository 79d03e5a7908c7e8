//! Schema for the SQLite-backed [`super::VectorStore`]/[`super::LexicalStore`]
//! reference implementation.
//!
//! Grounded on `storage::schema::SCHEMA_SQL`'s FTS5 `porter unicode61`
//! virtual-table pattern, generalized from one buffer/chunk schema to a
//! single `points` table partitioned by a `collection` column (rather than
//! four physical tables) — the `(collection, chunk_id)` uniqueness
//! `spec.md` §3 requires for a vector point is expressed as the table's
//! primary key.

/// Current schema version.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Schema for the points table (one row per `(collection, chunk_id)`,
/// `spec.md` §3 "Vector point") and its companion standalone FTS5 table for
/// lexical search. Payloads are stored as the chunk's full JSON
/// serialization so the store never needs to know about variant-specific
/// fields; the columns duplicated alongside it exist purely to make SQL
/// filtering on common-payload fields and numeric ranges possible without
/// deserializing every row.
pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS schema_info (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS points (
    collection TEXT NOT NULL,
    chunk_id TEXT NOT NULL,
    document_id TEXT NOT NULL,
    archive_id TEXT NOT NULL,
    discipline TEXT,
    doc_family TEXT,
    doc_number TEXT,
    confidentiality TEXT NOT NULL,
    content TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    payload TEXT NOT NULL,
    embedding BLOB NOT NULL,
    dims INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (collection, chunk_id)
);

CREATE INDEX IF NOT EXISTS idx_points_archive ON points(collection, archive_id);
CREATE INDEX IF NOT EXISTS idx_points_discipline ON points(collection, discipline);
CREATE INDEX IF NOT EXISTS idx_points_doc_ref ON points(doc_family, doc_number);

CREATE VIRTUAL TABLE IF NOT EXISTS lexical_fts USING fts5(
    content,
    collection UNINDEXED,
    chunk_id UNINDEXED,
    tokenize = 'porter unicode61'
);
";

/// SQL to check if schema is initialized.
pub const CHECK_SCHEMA_SQL: &str = r"
SELECT COUNT(*) FROM sqlite_master
WHERE type='table' AND name='schema_info';
";
