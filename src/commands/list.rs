//! Listing commands: doc key summaries, versions, and stored content

use crate::checksum::short_checksum;
use crate::error::{Error, Result};
use crate::meta::{DocKeySummary, DocStore, StoredDocument};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One row of the `versions` listing; content is left out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub id: i64,
    pub version: i64,
    pub checksum: String,
    pub filename: String,
    pub created_at: String,
}

impl From<StoredDocument> for VersionInfo {
    fn from(doc: StoredDocument) -> Self {
        Self {
            id: doc.id,
            version: doc.version,
            checksum: doc.checksum,
            filename: doc.filename,
            created_at: doc.created_at,
        }
    }
}

/// List every doc key with its latest version and timestamps
pub async fn cmd_list(db: &DocStore) -> Result<Vec<DocKeySummary>> {
    info!("Listing doc keys");
    db.list_doc_key_summaries().await
}

/// List every version stored for `doc_key`; an unknown key yields an empty list
pub async fn cmd_versions(db: &DocStore, doc_key: &str) -> Result<Vec<VersionInfo>> {
    info!("Listing versions of '{}'", doc_key);
    let docs = db.list_versions(doc_key).await?;
    Ok(docs.into_iter().map(VersionInfo::from).collect())
}

/// Fetch a stored version, the latest one when `version` is `None`
pub async fn cmd_show(db: &DocStore, doc_key: &str, version: Option<i64>) -> Result<StoredDocument> {
    let doc = match version {
        Some(v) => db.get_version(doc_key, v).await?,
        None => db.find_latest_version(doc_key).await?,
    };

    doc.ok_or_else(|| {
        Error::DocumentNotFound(match version {
            Some(v) => format!("{} v{}", doc_key, v),
            None => doc_key.to_string(),
        })
    })
}

/// Print doc key summaries to console
pub fn print_summaries(summaries: &[DocKeySummary]) {
    if summaries.is_empty() {
        println!("No documents stored yet. Use 'docvault store <file>' to add one.");
        return;
    }

    for s in summaries {
        println!(
            "{:20} v{:<3} ({} versions)  first={}  last={}",
            s.doc_key, s.latest_version, s.total_versions, s.first_seen, s.last_seen
        );
    }
}

/// Print the versions of one doc key to console
pub fn print_versions(doc_key: &str, versions: &[VersionInfo], checksum_prefix_len: usize) {
    if versions.is_empty() {
        println!("No versions found for '{}'", doc_key);
        return;
    }

    for v in versions {
        println!(
            "v{:<3}  {}  {:20}  {}",
            v.version,
            short_checksum(&v.checksum, checksum_prefix_len),
            v.filename,
            v.created_at
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::compute_checksum;
    use crate::meta::NewDocument;
    use tempfile::TempDir;

    async fn seeded() -> (DocStore, TempDir) {
        let tmp = TempDir::new().unwrap();
        let db = DocStore::open(&tmp.path().join("test.db")).await.unwrap();
        for (key, content) in [("cfg", r#"{"a":1}"#), ("cfg", r#"{"a":2}"#), ("app", r#"{"b":1}"#)] {
            db.ingest(&NewDocument {
                doc_key: key.to_string(),
                filename: format!("{}.json", key),
                checksum: compute_checksum(content.as_bytes()),
                content: content.to_string(),
            })
            .await
            .unwrap();
        }
        (db, tmp)
    }

    #[tokio::test]
    async fn test_versions_listing() {
        let (db, _tmp) = seeded().await;
        let versions = cmd_versions(&db, "cfg").await.unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].version, 1);
        assert_eq!(versions[0].checksum, compute_checksum(br#"{"a":1}"#));
        assert_eq!(versions[1].version, 2);
    }

    #[tokio::test]
    async fn test_unknown_key_is_empty_not_error() {
        let (db, _tmp) = seeded().await;
        assert!(cmd_versions(&db, "nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_orders_by_recent_activity() {
        let (db, _tmp) = seeded().await;
        let summaries = cmd_list(&db).await.unwrap();
        let keys: Vec<_> = summaries.iter().map(|s| s.doc_key.as_str()).collect();
        assert_eq!(keys, vec!["app", "cfg"]);
    }

    #[tokio::test]
    async fn test_show() {
        let (db, _tmp) = seeded().await;

        let latest = cmd_show(&db, "cfg", None).await.unwrap();
        assert_eq!(latest.version, 2);
        assert_eq!(latest.content, r#"{"a":2}"#);

        let first = cmd_show(&db, "cfg", Some(1)).await.unwrap();
        assert_eq!(first.content, r#"{"a":1}"#);

        assert!(matches!(
            cmd_show(&db, "cfg", Some(9)).await,
            Err(Error::DocumentNotFound(_))
        ));
        assert!(matches!(
            cmd_show(&db, "nope", None).await,
            Err(Error::DocumentNotFound(_))
        ));
    }
}
