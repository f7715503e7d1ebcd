pub mod carve;
mod error;
pub mod mount;
pub mod pipeline;
pub mod signature;
pub mod sink;
mod types;

pub use error::{CoreError, Result};
pub use mount::{ArchiveHandle, ArchiveMounter, MountError};
pub use pipeline::{EntryFailure, Outcome, Pipeline};
pub use signature::{SignatureScanner, BUNDLE_SIGNATURE};
pub use sink::MetadataSink;
pub use types::{ArchiveEntry, EntryFlags};
