//! Archive mounter capability.
//!
//! The pipeline consumes archives through these traits; the actual demux
//! backend (native bundle reader, test double, ...) lives behind them.

use crate::error::{CoreError, Result};
use crate::types::ArchiveEntry;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MountError {
    /// The file is not in the archive format. This is the designed fallback
    /// trigger for raw-record handling, not a failure.
    #[error("not a supported archive format")]
    Unsupported,

    #[error(transparent)]
    Other(#[from] CoreError),
}

/// A mounted archive. Releasing the backend resources happens on drop,
/// which the pipeline relies on for all exit paths.
pub trait ArchiveHandle {
    /// Entries in archive-native order.
    fn entries(&self) -> Result<Vec<ArchiveEntry>>;
}

pub trait ArchiveMounter {
    /// Attempts to open `path` as a multi-entry archive.
    ///
    /// Returns [`MountError::Unsupported`] when the file is recognizably not
    /// in the archive format; any other error is a real mount failure.
    fn mount(&self, path: &Path) -> std::result::Result<Box<dyn ArchiveHandle>, MountError>;
}
