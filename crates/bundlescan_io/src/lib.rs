//! Infrastructure adapters behind the core capabilities.

mod mounter;
mod sqlite;

pub use mounter::RawOnlyMounter;
pub use sqlite::SqliteSink;
