//! Per-file classification and archive traversal.
//!
//! For each input file: locate the container signature, carve off any opaque
//! prefix, try to mount the result as an archive, and either traverse its
//! entries or fall back to treating the file as a single raw structured
//! record. Carved temporaries are removed on every exit path.

use crate::carve::carve;
use crate::error::{CoreError, Result};
use crate::mount::{ArchiveMounter, MountError};
use crate::signature::SignatureScanner;
use crate::sink::MetadataSink;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// How a single input file was handled.
#[derive(Debug)]
pub enum Outcome {
    /// No signature anywhere in the file; not part of the container family.
    Skipped,
    /// Not an archive; dispatched as one standalone structured record.
    RawRecord,
    /// Mounted and traversed as a multi-entry archive.
    Archive {
        /// Records successfully written to the sink.
        written: usize,
        /// Per-entry failures; traversal continued past each one.
        failures: Vec<EntryFailure>,
    },
}

#[derive(Debug)]
pub struct EntryFailure {
    pub entry_path: String,
    pub error: CoreError,
}

/// Guard owning a carved temporary file. The file is deleted when the guard
/// drops, whatever happened in between.
struct CarvedFile {
    path: PathBuf,
}

impl CarvedFile {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CarvedFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("failed to remove carved file {}: {e}", self.path.display());
            }
        }
    }
}

/// Carved siblings live next to the source with a `_` suffix. Deterministic
/// on purpose: one run per root at a time.
fn carved_path(src: &Path) -> PathBuf {
    let mut name = src.as_os_str().to_os_string();
    name.push("_");
    PathBuf::from(name)
}

pub struct Pipeline<'a> {
    scanner: SignatureScanner,
    root: &'a Path,
    mounter: &'a dyn ArchiveMounter,
}

impl<'a> Pipeline<'a> {
    /// Pipeline scanning for the default bundle signature.
    #[must_use]
    pub fn new(root: &'a Path, mounter: &'a dyn ArchiveMounter) -> Self {
        Self::with_scanner(SignatureScanner::bundle(), root, mounter)
    }

    #[must_use]
    pub fn with_scanner(
        scanner: SignatureScanner,
        root: &'a Path,
        mounter: &'a dyn ArchiveMounter,
    ) -> Self {
        Self {
            scanner,
            root,
            mounter,
        }
    }

    /// Runs the full classify-and-dispatch sequence for one input file.
    ///
    /// An `Err` here is a per-file recoverable failure; the caller logs it
    /// and moves on. Whatever the result, no carved temporary survives this
    /// call.
    pub fn process_file(&self, path: &Path, sink: &mut dyn MetadataSink) -> Result<Outcome> {
        let offset = match self.scanner.scan_file(path)? {
            None => return Ok(Outcome::Skipped),
            Some(offset) => offset,
        };

        // Guard is created before carving so a partially written temp file
        // is cleaned up when the copy itself fails.
        let carved = if offset > 0 {
            let dest = carved_path(path);
            let guard = CarvedFile::new(dest);
            carve(path, offset, guard.path())?;
            debug!(
                "carved {} at offset {offset} -> {}",
                path.display(),
                guard.path().display()
            );
            Some(guard)
        } else {
            None
        };
        let target = carved.as_ref().map_or(path, CarvedFile::path);

        let relative = self.relative(path);
        let containing_dir = target.parent().unwrap_or(Path::new("")).to_path_buf();

        let handle = match self.mounter.mount(target) {
            Ok(handle) => handle,
            Err(MountError::Unsupported) => {
                // Not a multi-entry archive: the designed fallback, not an
                // error. The file is one raw structured record.
                debug!("{}: not an archive, writing raw record", target.display());
                sink.write_record(&relative, &target.to_string_lossy(), &containing_dir)?;
                return Ok(Outcome::RawRecord);
            }
            Err(MountError::Other(e)) => return Err(e),
        };

        let traversal = (|| -> Result<(usize, Vec<EntryFailure>)> {
            let size_bytes = fs::metadata(target)?.len();
            sink.begin_archive(&relative, size_bytes)?;

            let mut written = 0usize;
            let mut failures = Vec::new();
            for entry in handle.entries()? {
                if !entry.is_record() {
                    continue;
                }
                let access_path = format!("archive:/{}", entry.path);
                match sink.write_record(&entry.path, &access_path, &containing_dir) {
                    Ok(()) => written += 1,
                    Err(error) => failures.push(EntryFailure {
                        entry_path: entry.path,
                        error,
                    }),
                }
            }
            Ok((written, failures))
        })();

        // The archive scope closes and the handle drops no matter how the
        // traversal went.
        let end_result = sink.end_archive();
        drop(handle);

        let (written, failures) = traversal?;
        end_result?;

        Ok(Outcome::Archive { written, failures })
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }
}
