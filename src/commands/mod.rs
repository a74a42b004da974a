//! CLI commands implementation

pub mod ingest;
pub mod init;
pub mod list;
pub mod status;

pub use ingest::*;
pub use init::*;
pub use list::*;
pub use status::*;
