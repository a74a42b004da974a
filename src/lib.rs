//! docvault: versioned, checksum-deduplicated JSON document storage on SQLite

pub mod checksum;
pub mod commands;
pub mod config;
pub mod error;
pub mod meta;
pub mod progress;
pub mod resolver;
