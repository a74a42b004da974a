//! SQLite schema definition

/// SQL schema for the document store. Every statement is idempotent.
pub const SCHEMA_SQL: &str = r#"
-- Documents: one immutable row per stored version
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    doc_key TEXT NOT NULL CHECK (length(doc_key) > 0),
    version INTEGER NOT NULL CHECK (version > 0),
    filename TEXT NOT NULL,
    checksum TEXT NOT NULL UNIQUE,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(doc_key, version)
);

CREATE INDEX IF NOT EXISTS idx_documents_created ON documents(created_at);

-- Rows are append-only
CREATE TRIGGER IF NOT EXISTS documents_no_update
BEFORE UPDATE ON documents
BEGIN
    SELECT RAISE(ABORT, 'documents are append-only');
END;

CREATE TRIGGER IF NOT EXISTS documents_no_delete
BEFORE DELETE ON documents
BEGIN
    SELECT RAISE(ABORT, 'documents are append-only');
END;
"#;
