//! Run driver: enumerates input files, sequences the per-file pipeline,
//! reports progress, and owns the run-wide metadata transaction.

use anyhow::{Context, Result};
use bundlescan_core::{ArchiveMounter, MetadataSink, Outcome, Pipeline};
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

#[derive(Debug, Default)]
pub struct RunSummary {
    pub files_seen: usize,
    pub skipped: usize,
    pub raw_records: usize,
    pub archives: usize,
    pub records_written: usize,
    pub entry_failures: usize,
    pub file_failures: usize,
    pub bytes_scanned: u64,
}

/// Runs one full scan.
///
/// Only two failures escape this function: the metadata transaction refusing
/// to begin (nothing is processed) and refusing to finalize. Per-file and
/// per-entry errors are logged to stderr and never abort the run.
pub fn run(
    root: &Path,
    pattern: &str,
    mounter: &dyn ArchiveMounter,
    sink: &mut dyn MetadataSink,
) -> Result<RunSummary> {
    sink.begin()
        .context("failed to begin the metadata transaction")?;

    let start = Instant::now();
    let files = collect_files(root, pattern);
    let pipeline = Pipeline::new(root, mounter);

    // Progress goes to stdout so stderr stays free for errors that must
    // survive scrolling.
    let pb = ProgressBar::with_draw_target(Some(files.len() as u64), ProgressDrawTarget::stdout());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {wide_msg}")
            .expect("invalid progress bar template - this is a bug")
            .progress_chars("##-"),
    );

    let mut summary = RunSummary::default();
    for path in &files {
        summary.files_seen += 1;
        pb.set_message(path.display().to_string());

        match pipeline.process_file(path, sink) {
            Ok(Outcome::Skipped) => summary.skipped += 1,
            Ok(Outcome::RawRecord) => {
                summary.raw_records += 1;
                summary.records_written += 1;
            }
            Ok(Outcome::Archive { written, failures }) => {
                summary.archives += 1;
                summary.records_written += written;
                summary.entry_failures += failures.len();
                for failure in failures {
                    pb.suspend(|| {
                        eprintln!(
                            "error writing entry {} in archive {}: {}",
                            failure.entry_path,
                            path.display(),
                            failure.error
                        );
                    });
                }
            }
            Err(e) => {
                summary.file_failures += 1;
                pb.suspend(|| eprintln!("error processing {}: {e:?}", path.display()));
            }
        }

        if let Ok(meta) = fs::metadata(path) {
            summary.bytes_scanned += meta.len();
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!("Finalizing metadata store...");
    sink.end()
        .context("failed to finalize the metadata transaction")?;

    let elapsed = start.elapsed();
    println!(
        "Scanned {} files ({}): {} skipped, {} raw records, {} archives, {} records written",
        summary.files_seen,
        format_size(summary.bytes_scanned, BINARY),
        summary.skipped,
        summary.raw_records,
        summary.archives,
        summary.records_written,
    );
    if summary.file_failures > 0 || summary.entry_failures > 0 {
        println!(
            "{} file failures, {} entry failures (see stderr)",
            summary.file_failures, summary.entry_failures
        );
    }
    println!("Total time: {:.3} s", elapsed.as_secs_f64());

    Ok(summary)
}

/// Regular files under `root`, recursively, whose name matches `pattern`,
/// in directory-enumeration order.
fn collect_files(root: &Path, pattern: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                eprintln!("error enumerating input files: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if crate::pattern::matches(pattern, &name) {
            files.push(entry.into_path());
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundlescan_core::CoreError;
    use bundlescan_io::{RawOnlyMounter, SqliteSink};
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    /// Sink whose begin always fails; records whether anything else was
    /// attempted afterwards.
    #[derive(Default)]
    struct DeadSink {
        calls_after_begin: usize,
    }

    impl MetadataSink for DeadSink {
        fn begin(&mut self) -> bundlescan_core::Result<()> {
            Err(CoreError::Sink("destination unwritable".into()))
        }

        fn end(&mut self) -> bundlescan_core::Result<()> {
            self.calls_after_begin += 1;
            Ok(())
        }

        fn begin_archive(&mut self, _: &str, _: u64) -> bundlescan_core::Result<()> {
            self.calls_after_begin += 1;
            Ok(())
        }

        fn end_archive(&mut self) -> bundlescan_core::Result<()> {
            self.calls_after_begin += 1;
            Ok(())
        }

        fn write_record(&mut self, _: &str, _: &str, _: &Path) -> bundlescan_core::Result<()> {
            self.calls_after_begin += 1;
            Ok(())
        }
    }

    /// Mounter that fails with a real error for `.bad` files and signals
    /// unsupported-format for everything else.
    struct FlakyMounter;

    impl ArchiveMounter for FlakyMounter {
        fn mount(
            &self,
            path: &Path,
        ) -> std::result::Result<Box<dyn bundlescan_core::ArchiveHandle>, bundlescan_core::MountError>
        {
            // Mounting happens on the carved sibling (`broken.bad_`), so
            // accept the `_`-suffixed extension as well.
            if path.extension().is_some_and(|e| e == "bad" || e == "bad_") {
                Err(bundlescan_core::MountError::Other(CoreError::Mount(
                    "backend crashed".into(),
                )))
            } else {
                Err(bundlescan_core::MountError::Unsupported)
            }
        }
    }

    fn bundle_bytes(prefix: usize) -> Vec<u8> {
        let mut data = vec![0u8; prefix];
        data.extend_from_slice(b"UnityFS");
        data.extend_from_slice(&[7u8; 32]);
        data
    }

    fn count_records(db: &Path) -> i64 {
        let conn = rusqlite::Connection::open(db).unwrap();
        conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn end_to_end_scan_with_sqlite_sink() {
        let root = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let db = out.path().join("meta.db");
        fs::create_dir(root.path().join("sub")).unwrap();
        fs::write(root.path().join("x.bin"), bundle_bytes(4)).unwrap();
        fs::write(root.path().join("sub").join("y.bin"), bundle_bytes(0)).unwrap();
        fs::write(root.path().join("z.bin"), b"no signature").unwrap();

        let mut sink = SqliteSink::new(&db);
        let summary = run(root.path(), "*", &RawOnlyMounter, &mut sink).unwrap();

        assert_eq!(summary.files_seen, 3);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.raw_records, 2);
        assert_eq!(summary.archives, 0);
        assert_eq!(summary.file_failures, 0);

        // No carved temporaries survive the run.
        assert!(!root.path().join("x.bin_").exists());

        assert_eq!(count_records(&db), 2);
    }

    #[test]
    fn fatal_begin_failure_processes_nothing() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("x.bin"), bundle_bytes(4)).unwrap();

        let mut sink = DeadSink::default();
        let result = run(root.path(), "*", &RawOnlyMounter, &mut sink);

        assert!(result.is_err());
        assert_eq!(sink.calls_after_begin, 0);
        assert!(!root.path().join("x.bin_").exists());
    }

    #[test]
    fn per_file_failure_does_not_abort_the_run() {
        let root = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let db = out.path().join("meta.db");
        fs::write(root.path().join("broken.bad"), bundle_bytes(2)).unwrap();
        fs::write(root.path().join("ok.bin"), bundle_bytes(0)).unwrap();

        let mut sink = SqliteSink::new(&db);
        let summary = run(root.path(), "*", &FlakyMounter, &mut sink).unwrap();

        assert_eq!(summary.files_seen, 2);
        assert_eq!(summary.file_failures, 1);
        assert_eq!(summary.raw_records, 1);
        assert_eq!(count_records(&db), 1);
        assert!(!root.path().join("broken.bad_").exists());
    }

    #[test]
    fn pattern_filters_enumeration() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("deep")).unwrap();
        fs::write(root.path().join("a.bundle"), b"").unwrap();
        fs::write(root.path().join("deep/b.bundle"), b"").unwrap();
        fs::write(root.path().join("c.txt"), b"").unwrap();

        let names: BTreeSet<String> = collect_files(root.path(), "*.bundle")
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            BTreeSet::from(["a.bundle".to_string(), "b.bundle".to_string()])
        );
    }
}
