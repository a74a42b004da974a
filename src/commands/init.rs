//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use crate::meta::DocStore;
use std::path::PathBuf;
use tracing::info;

/// Write a default config file under `base_dir` and create the database
pub async fn cmd_init(base_dir: PathBuf, force: bool) -> Result<Config> {
    let config = Config::rooted_at(base_dir);

    if config.paths.config_file.exists() && !force {
        return Err(Error::AlreadyInitialized(
            config.paths.config_file.display().to_string(),
        ));
    }

    config.save()?;
    DocStore::connect(&config).await?;

    info!("Initialized docvault at {:?}", config.paths.base_dir);
    Ok(config)
}
