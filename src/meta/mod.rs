//! Document storage using SQLite
//!
//! One append-only `documents` table holds every stored version. The table's
//! UNIQUE constraints (checksum, and doc_key + version) are the final word on
//! duplicates: `insert` surfaces a breach as `Error::ConstraintViolation`
//! no matter what the resolver decided beforehand.

mod schema;

pub use schema::*;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::resolver::{self, Decision};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteExecutor, SqliteJournalMode, SqlitePool,
    SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::FromRow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A stored document version
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: i64,
    pub doc_key: String,
    pub version: i64,
    pub filename: String,
    pub checksum: String,
    pub content: String,
    pub created_at: String,
}

/// Content waiting to be stored; the store assigns id, version and timestamp
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub doc_key: String,
    pub filename: String,
    pub checksum: String,
    pub content: String,
}

/// Per-key rollup used by `list`
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct DocKeySummary {
    pub doc_key: String,
    pub latest_version: i64,
    pub total_versions: i64,
    pub first_seen: String,
    pub last_seen: String,
}

/// Whole-store statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub doc_key_count: usize,
    pub document_count: usize,
    pub last_ingested_at: Option<String>,
}

/// Result of a transactional ingest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingested {
    Stored(StoredDocument),
    /// The checksum already belongs to the row `id`
    SkippedDuplicateContent {
        doc_key: String,
        version: i64,
        id: i64,
    },
    /// The latest version of the doc key already has this checksum
    SkippedSameAsLatest { doc_key: String, version: i64 },
}

/// Document store handle
#[derive(Clone)]
pub struct DocStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl DocStore {
    /// Connect to the database named by `config.paths.db_file` and make sure
    /// the schema exists
    pub async fn connect(config: &Config) -> Result<Self> {
        let db_path = &config.paths.db_file;
        let unavailable = |reason: String| Error::StorageUnavailable {
            path: db_path.clone(),
            reason,
        };

        // Create parent directory if needed
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(config.storage.busy_timeout());

        debug!("Connecting to SQLite database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.storage.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let store = Self {
            pool,
            path: db_path.clone(),
        };
        store.initialize().await?;
        Ok(store)
    }

    /// Open a database file with default storage settings
    pub async fn open(db_path: &Path) -> Result<Self> {
        let config = Config::default().with_db_file(db_path.to_path_buf());
        Self::connect(&config).await
    }

    /// Create the table, indexes and triggers if they are missing
    pub async fn initialize(&self) -> Result<()> {
        debug!("Ensuring database schema");
        sqlx::query(SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::from(e).on_storage(&self.path))?;
        Ok(())
    }

    /// Resolve and, if needed, insert `new` inside one `BEGIN IMMEDIATE`
    /// transaction so concurrent writers serialize on the database lock.
    /// Dropping the future before it finishes rolls the transaction back.
    pub async fn ingest(&self, new: &NewDocument) -> Result<Ingested> {
        self.ingest_inner(new)
            .await
            .map_err(|e| e.on_storage(&self.path))
    }

    async fn ingest_inner(&self, new: &NewDocument) -> Result<Ingested> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;
        let ingested = resolve_and_insert(&mut *tx, new).await?;
        tx.commit().await?;
        Ok(ingested)
    }

    /// Append a row for `new` as `version`
    pub async fn insert(&self, new: &NewDocument, version: i64) -> Result<StoredDocument> {
        insert_with(&self.pool, new, version)
            .await
            .map_err(|e| e.on_storage(&self.path))
    }

    /// Find the row holding `checksum`, under any doc key
    pub async fn find_by_checksum(&self, checksum: &str) -> Result<Option<StoredDocument>> {
        find_by_checksum_with(&self.pool, checksum).await
    }

    /// Find the highest version stored for `doc_key`
    pub async fn find_latest_version(&self, doc_key: &str) -> Result<Option<StoredDocument>> {
        find_latest_version_with(&self.pool, doc_key).await
    }

    /// Get one specific version
    pub async fn get_version(&self, doc_key: &str, version: i64) -> Result<Option<StoredDocument>> {
        let doc = sqlx::query_as::<_, StoredDocument>(
            "SELECT * FROM documents WHERE doc_key = ? AND version = ?",
        )
        .bind(doc_key)
        .bind(version)
        .fetch_optional(&self.pool)
        .await?;
        Ok(doc)
    }

    /// All versions of `doc_key`, oldest first
    pub async fn list_versions(&self, doc_key: &str) -> Result<Vec<StoredDocument>> {
        let docs = sqlx::query_as::<_, StoredDocument>(
            "SELECT * FROM documents WHERE doc_key = ? ORDER BY version ASC",
        )
        .bind(doc_key)
        .fetch_all(&self.pool)
        .await?;
        Ok(docs)
    }

    /// One summary per doc key, most recently modified first
    pub async fn list_doc_key_summaries(&self) -> Result<Vec<DocKeySummary>> {
        let summaries = sqlx::query_as::<_, DocKeySummary>(
            r#"
            SELECT doc_key,
                   MAX(version) AS latest_version,
                   COUNT(*) AS total_versions,
                   MIN(created_at) AS first_seen,
                   MAX(created_at) AS last_seen
            FROM documents
            GROUP BY doc_key
            ORDER BY last_seen DESC, MAX(id) DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(summaries)
    }

    /// Get global statistics
    pub async fn stats(&self) -> Result<StoreStats> {
        let (doc_keys, documents, last): (i64, i64, Option<String>) = sqlx::query_as(
            "SELECT COUNT(DISTINCT doc_key), COUNT(*), MAX(created_at) FROM documents",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StoreStats {
            doc_key_count: doc_keys as usize,
            document_count: documents as usize,
            last_ingested_at: last,
        })
    }
}

async fn resolve_and_insert(conn: &mut SqliteConnection, new: &NewDocument) -> Result<Ingested> {
    let global_match = find_by_checksum_with(&mut *conn, &new.checksum).await?;
    let latest = find_latest_version_with(&mut *conn, &new.doc_key).await?;

    let decision = resolver::resolve(
        &new.doc_key,
        &new.checksum,
        global_match.as_ref(),
        latest.as_ref(),
    );
    debug!(doc_key = %new.doc_key, ?decision, "Resolved ingest");

    match decision {
        Decision::Insert { version, .. } => insert_with(&mut *conn, new, version)
            .await
            .map(Ingested::Stored),
        Decision::SkipDuplicateContent {
            doc_key,
            version,
            id,
        } => Ok(Ingested::SkippedDuplicateContent {
            doc_key,
            version,
            id,
        }),
        Decision::SkipSameAsLatest { doc_key, version } => {
            Ok(Ingested::SkippedSameAsLatest { doc_key, version })
        }
    }
}

async fn insert_with<'e, E>(executor: E, new: &NewDocument, version: i64) -> Result<StoredDocument>
where
    E: SqliteExecutor<'e>,
{
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

    let result = sqlx::query(
        r#"
        INSERT INTO documents (doc_key, version, filename, checksum, content, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new.doc_key)
    .bind(version)
    .bind(&new.filename)
    .bind(&new.checksum)
    .bind(&new.content)
    .bind(&created_at)
    .execute(executor)
    .await
    .map_err(|e| Error::from_insert(e, &new.doc_key, version))?;

    let doc = StoredDocument {
        id: result.last_insert_rowid(),
        doc_key: new.doc_key.clone(),
        version,
        filename: new.filename.clone(),
        checksum: new.checksum.clone(),
        content: new.content.clone(),
        created_at,
    };
    info!(id = doc.id, doc_key = %doc.doc_key, version, "Stored document");
    Ok(doc)
}

async fn find_by_checksum_with<'e, E>(executor: E, checksum: &str) -> Result<Option<StoredDocument>>
where
    E: SqliteExecutor<'e>,
{
    let doc = sqlx::query_as::<_, StoredDocument>("SELECT * FROM documents WHERE checksum = ?")
        .bind(checksum)
        .fetch_optional(executor)
        .await?;
    Ok(doc)
}

async fn find_latest_version_with<'e, E>(executor: E, doc_key: &str) -> Result<Option<StoredDocument>>
where
    E: SqliteExecutor<'e>,
{
    let doc = sqlx::query_as::<_, StoredDocument>(
        "SELECT * FROM documents WHERE doc_key = ? ORDER BY version DESC LIMIT 1",
    )
    .bind(doc_key)
    .fetch_optional(executor)
    .await?;
    Ok(doc)
}
