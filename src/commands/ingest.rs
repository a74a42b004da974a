//! Store and import commands

use crate::checksum::{compute_checksum, short_checksum};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::meta::{DocStore, Ingested, NewDocument};
use crate::progress::add_progress_bar;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// What happened to one submitted file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IngestOutcome {
    Stored {
        id: i64,
        doc_key: String,
        version: i64,
        filename: String,
        checksum: String,
    },
    SkippedDuplicateContent {
        doc_key: String,
        checksum: String,
        existing_doc_key: String,
        existing_version: i64,
        existing_id: i64,
    },
    SkippedSameAsLatest {
        doc_key: String,
        version: i64,
        checksum: String,
    },
}

impl IngestOutcome {
    fn from_ingested(new: &NewDocument, ingested: Ingested) -> Self {
        match ingested {
            Ingested::Stored(doc) => IngestOutcome::Stored {
                id: doc.id,
                doc_key: doc.doc_key,
                version: doc.version,
                filename: doc.filename,
                checksum: doc.checksum,
            },
            Ingested::SkippedDuplicateContent {
                doc_key,
                version,
                id,
            } => IngestOutcome::SkippedDuplicateContent {
                doc_key: new.doc_key.clone(),
                checksum: new.checksum.clone(),
                existing_doc_key: doc_key,
                existing_version: version,
                existing_id: id,
            },
            Ingested::SkippedSameAsLatest { doc_key, version } => {
                IngestOutcome::SkippedSameAsLatest {
                    doc_key,
                    version,
                    checksum: new.checksum.clone(),
                }
            }
        }
    }

    /// One-line, human-readable description of the outcome
    pub fn describe(&self, checksum_prefix_len: usize) -> String {
        match self {
            IngestOutcome::Stored {
                id,
                doc_key,
                version,
                filename,
                checksum,
            } => format!(
                "✓ Stored {} v{} from {} (id={}, checksum={})",
                doc_key,
                version,
                filename,
                id,
                short_checksum(checksum, checksum_prefix_len)
            ),
            IngestOutcome::SkippedDuplicateContent {
                existing_doc_key,
                existing_version,
                existing_id,
                ..
            } => format!(
                "↷ Skipped: identical content already stored as {} v{} (id={})",
                existing_doc_key, existing_version, existing_id
            ),
            IngestOutcome::SkippedSameAsLatest {
                doc_key,
                version,
                checksum,
            } => format!(
                "↷ Skipped: latest version of '{}' (v{}) already has checksum {}",
                doc_key,
                version,
                short_checksum(checksum, checksum_prefix_len)
            ),
        }
    }
}

/// Pick the doc key: an explicit key wins, otherwise the file name without extension
pub fn derive_doc_key(path: &Path, explicit: Option<&str>) -> Result<String> {
    let key = match explicit {
        Some(key) => key.trim().to_string(),
        None => path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    };

    if key.is_empty() {
        return Err(Error::InvalidDocKey(format!(
            "cannot derive a doc key for {}",
            path.display()
        )));
    }
    Ok(key)
}

/// Read a file and prepare it for storage
pub fn read_document(path: &Path, doc_key: Option<&str>) -> Result<NewDocument> {
    if !path.is_file() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }

    let doc_key = derive_doc_key(path, doc_key)?;
    let bytes = std::fs::read(path)?;
    let checksum = compute_checksum(&bytes);

    let content =
        String::from_utf8(bytes).map_err(|_| Error::InvalidContent(path.to_path_buf()))?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(NewDocument {
        doc_key,
        filename,
        checksum,
        content,
    })
}

/// Store a single file
pub async fn cmd_store(db: &DocStore, path: &Path, doc_key: Option<&str>) -> Result<IngestOutcome> {
    let new = read_document(path, doc_key)?;
    debug!(
        doc_key = %new.doc_key,
        checksum = %new.checksum,
        "Read {} ({} bytes)",
        path.display(),
        new.content.len()
    );

    let ingested = db.ingest(&new).await?;
    Ok(IngestOutcome::from_ingested(&new, ingested))
}

/// A file that could not be imported
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Directory import statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportStats {
    pub files_seen: usize,
    pub stored: usize,
    pub skipped_duplicate_content: usize,
    pub skipped_same_as_latest: usize,
    pub outcomes: Vec<IngestOutcome>,
    pub failures: Vec<ImportFailure>,
}

impl ImportStats {
    fn record(&mut self, outcome: IngestOutcome) {
        match &outcome {
            IngestOutcome::Stored { .. } => self.stored += 1,
            IngestOutcome::SkippedDuplicateContent { .. } => self.skipped_duplicate_content += 1,
            IngestOutcome::SkippedSameAsLatest { .. } => self.skipped_same_as_latest += 1,
        }
        self.outcomes.push(outcome);
    }
}

/// Store every matching file under `dir`, in file-name order, one
/// transaction per file. Failures are collected, not retried.
pub async fn cmd_import_dir(config: &Config, db: &DocStore, dir: &Path) -> Result<ImportStats> {
    if !dir.exists() {
        return Err(Error::InputNotFound(dir.to_path_buf()));
    }
    info!("Importing from {}", dir.display());

    let mut stats = ImportStats::default();
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        match entry {
            Ok(e) if e.file_type().is_file() && config.ingest.accepts(e.path()) => {
                files.push(e.into_path());
            }
            Ok(_) => {}
            Err(e) => {
                let path = e.path().unwrap_or(dir).to_path_buf();
                warn!("Cannot read {}: {}", path.display(), e);
                stats.failures.push(ImportFailure {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }

    stats.files_seen = files.len();
    info!("Found {} files to import", files.len());

    let progress = start_progress_bar(files.len(), "Importing files");

    for path in files {
        match cmd_store(db, &path, None).await {
            Ok(outcome) => {
                debug!(
                    "{}: {}",
                    path.display(),
                    outcome.describe(config.display.checksum_prefix_len)
                );
                stats.record(outcome);
            }
            Err(e) => {
                warn!("Failed to import {}: {}", path.display(), e);
                stats.failures.push(ImportFailure {
                    path,
                    error: e.to_string(),
                });
            }
        }
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message("Import complete");
    }

    info!(
        "Import complete: {} stored, {} duplicates, {} unchanged, {} failed",
        stats.stored,
        stats.skipped_duplicate_content,
        stats.skipped_same_as_latest,
        stats.failures.len()
    );

    Ok(stats)
}

fn start_progress_bar(len: usize, message: &str) -> Option<ProgressBar> {
    if len == 0 {
        return None;
    }

    let pb = add_progress_bar(len as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
    ) {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Print a single store outcome to console
pub fn print_outcome(outcome: &IngestOutcome, checksum_prefix_len: usize) {
    println!("{}", outcome.describe(checksum_prefix_len));
}

/// Print import statistics to console
pub fn print_import_stats(stats: &ImportStats, checksum_prefix_len: usize) {
    for outcome in &stats.outcomes {
        println!("{}", outcome.describe(checksum_prefix_len));
    }
    for failure in &stats.failures {
        println!("✗ {}: {}", failure.path.display(), failure.error);
    }

    println!("\n✓ Import complete");
    println!("  Files found: {}", stats.files_seen);
    println!("  Stored: {}", stats.stored);
    println!("  Skipped (duplicate content): {}", stats.skipped_duplicate_content);
    println!("  Skipped (same as latest): {}", stats.skipped_same_as_latest);
    println!("  Failed: {}", stats.failures.len());
}
