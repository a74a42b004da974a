//! Version resolution
//!
//! Decides, from two store lookups, whether incoming content is a duplicate
//! or which version number it should be stored under. The lookups must come
//! from the same snapshot; `DocStore::ingest` runs them inside the write
//! transaction.

use crate::meta::StoredDocument;
use serde::{Deserialize, Serialize};

/// Outcome of resolving a (doc key, checksum) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// The checksum is already stored somewhere, under any doc key
    SkipDuplicateContent {
        doc_key: String,
        version: i64,
        id: i64,
    },
    /// The latest version of this doc key already has this checksum
    SkipSameAsLatest { doc_key: String, version: i64 },
    /// New content: store it as `version`
    Insert { doc_key: String, version: i64 },
}

impl Decision {
    pub fn is_insert(&self) -> bool {
        matches!(self, Decision::Insert { .. })
    }
}

/// Resolve a decision from the global checksum match and the latest row for
/// `doc_key`.
///
/// The global match is checked first, so byte-identical content is never
/// stored twice even across unrelated doc keys. A global match that is the
/// latest version of `doc_key` itself is reported as `SkipSameAsLatest`.
pub fn resolve(
    doc_key: &str,
    checksum: &str,
    global_match: Option<&StoredDocument>,
    latest: Option<&StoredDocument>,
) -> Decision {
    let (last_version, last_checksum) = latest
        .map(|doc| (doc.version, Some(doc.checksum.as_str())))
        .unwrap_or((0, None));
    let same_as_latest = last_checksum == Some(checksum);

    if let Some(existing) = global_match {
        if !(same_as_latest && existing.doc_key == doc_key) {
            return Decision::SkipDuplicateContent {
                doc_key: existing.doc_key.clone(),
                version: existing.version,
                id: existing.id,
            };
        }
    }

    if same_as_latest {
        return Decision::SkipSameAsLatest {
            doc_key: doc_key.to_string(),
            version: last_version,
        };
    }

    Decision::Insert {
        doc_key: doc_key.to_string(),
        version: last_version + 1,
    }
}
