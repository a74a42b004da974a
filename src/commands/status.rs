//! Status command implementation

use crate::config::Config;
use crate::error::Result;
use crate::meta::{DocStore, StoreStats};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Status information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub config_path: String,
    pub config_exists: bool,
    pub db_path: String,
    pub db_stats: StoreStats,
}

/// Get system status
pub async fn cmd_status(config: &Config, db: &DocStore) -> Result<StatusInfo> {
    info!("Getting status");

    let db_stats = db.stats().await?;

    Ok(StatusInfo {
        config_path: config.paths.config_file.display().to_string(),
        config_exists: config.paths.config_file.exists(),
        db_path: config.paths.db_file.display().to_string(),
        db_stats,
    })
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    println!("\n📊 docvault Status\n");

    let config_note = if status.config_exists {
        ""
    } else {
        " (not found, using defaults)"
    };
    println!("Configuration: {}{}", status.config_path, config_note);
    println!("Database: {}", status.db_path);
    println!("\nDatabase Stats:");
    println!("  Doc keys: {}", status.db_stats.doc_key_count);
    println!("  Stored versions: {}", status.db_stats.document_count);
    println!(
        "  Last ingested: {}",
        status.db_stats.last_ingested_at.as_deref().unwrap_or("never")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_status_on_fresh_store() {
        let tmp = TempDir::new().unwrap();
        let config = Config::rooted_at(tmp.path().to_path_buf());
        let db = DocStore::connect(&config).await.unwrap();

        let status = cmd_status(&config, &db).await.unwrap();
        assert!(!status.config_exists);
        assert_eq!(status.db_stats.document_count, 0);
        assert!(status.db_path.ends_with("docvault.db"));
    }
}
