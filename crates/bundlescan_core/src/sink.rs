//! Metadata sink capability.

use crate::error::Result;
use std::path::Path;

/// Receives discovered archives and structured records.
///
/// All writes between [`begin`](MetadataSink::begin) and
/// [`end`](MetadataSink::end) belong to one run-wide transaction.
/// `begin_archive`/`end_archive` calls are always paired, even for archives
/// with zero written records.
pub trait MetadataSink {
    /// Starts the run transaction. Failure here is fatal to the whole run.
    fn begin(&mut self) -> Result<()>;

    /// Finalizes the run transaction.
    fn end(&mut self) -> Result<()>;

    /// Opens an archive scope; subsequent records belong to it until
    /// `end_archive`.
    fn begin_archive(&mut self, relative_path: &str, size_bytes: u64) -> Result<()>;

    fn end_archive(&mut self) -> Result<()>;

    /// Writes one structured-record location.
    ///
    /// `relative_path` is the record's path (inside the archive, or relative
    /// to the scan root for standalone records), `access_path` is how the
    /// record can be reached, and `containing_dir` is the directory holding
    /// the file it came from.
    fn write_record(
        &mut self,
        relative_path: &str,
        access_path: &str,
        containing_dir: &Path,
    ) -> Result<()>;
}
