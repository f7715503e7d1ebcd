use bundlescan_core::{ArchiveHandle, ArchiveMounter, MountError};
use std::path::Path;

/// Mounter used when no archive backend is linked in.
///
/// Every mount attempt signals `Unsupported`, so the pipeline treats each
/// signature-bearing file as a single standalone structured record. Real
/// bundle backends plug in through [`ArchiveMounter`] instead.
#[derive(Debug, Default)]
pub struct RawOnlyMounter;

impl ArchiveMounter for RawOnlyMounter {
    fn mount(&self, _path: &Path) -> Result<Box<dyn ArchiveHandle>, MountError> {
        Err(MountError::Unsupported)
    }
}
