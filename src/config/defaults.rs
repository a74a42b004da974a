//! Default values for configuration

/// Default SQLite busy timeout in seconds
pub fn default_busy_timeout_secs() -> u64 {
    5
}

/// Default connection pool size
pub fn default_max_connections() -> u32 {
    4
}

/// Default file extensions picked up by `import`
pub fn default_ingest_extensions() -> Vec<String> {
    vec!["json".to_string()]
}

/// Default number of checksum hex digits shown in listings
pub fn default_checksum_prefix_len() -> usize {
    12
}

/// Default database file name, placed next to the config file
pub fn default_db_file_name() -> String {
    "docvault.db".to_string()
}
