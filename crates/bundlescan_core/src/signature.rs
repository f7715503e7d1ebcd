//! Streaming magic-signature scan.
//!
//! Finds the first occurrence of a fixed byte pattern in a sequential
//! stream without ever seeking backwards. The match state is a single
//! matched-so-far counter: on a mismatch the counter resets and the
//! mismatching byte is consumed, never re-compared. Partial-match bytes
//! are not reused after a restart, so worst-case time is
//! O(stream_len * pattern_len); the signatures involved are a handful of
//! bytes, scanned once per file.

use crate::error::Result;
use memchr::memchr;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const READ_BUF_SIZE: usize = 64 * 1024;

/// The magic identifying the bundle container family.
pub const BUNDLE_SIGNATURE: &[u8] = b"UnityFS";

#[derive(Debug, Clone)]
pub struct SignatureScanner {
    pattern: Vec<u8>,
}

impl SignatureScanner {
    /// # Panics
    ///
    /// Panics if `pattern` is empty.
    #[must_use]
    pub fn new(pattern: &[u8]) -> Self {
        assert!(!pattern.is_empty(), "signature pattern must not be empty");
        Self {
            pattern: pattern.to_vec(),
        }
    }

    /// Scanner for the bundle container signature.
    #[must_use]
    pub fn bundle() -> Self {
        Self::new(BUNDLE_SIGNATURE)
    }

    #[must_use]
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// Returns the zero-based offset of the first signature occurrence,
    /// or `None` if the stream ends without a full match.
    pub fn scan<R: Read>(&self, mut reader: R) -> Result<Option<u64>> {
        let pat = &self.pattern;
        let mut matched = 0usize;
        let mut pos = 0u64;
        let mut buf = vec![0u8; READ_BUF_SIZE];

        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                return Ok(None);
            }
            let chunk = &buf[..n];

            let mut i = 0;
            while i < n {
                if matched == 0 {
                    // Bytes rejected in the initial state carry no match
                    // state, so we can jump straight to the next candidate
                    // first byte.
                    match memchr(pat[0], &chunk[i..n]) {
                        Some(j) => {
                            i += j;
                            pos += j as u64;
                        }
                        None => {
                            pos += (n - i) as u64;
                            break;
                        }
                    }
                }

                if chunk[i] == pat[matched] {
                    matched += 1;
                    if matched == pat.len() {
                        return Ok(Some(pos + 1 - pat.len() as u64));
                    }
                } else {
                    // Restart from scratch; the mismatching byte is consumed
                    // and never re-compared against the pattern head.
                    matched = 0;
                }

                i += 1;
                pos += 1;
            }
        }
    }

    /// Scans a file from the beginning.
    pub fn scan_file(&self, path: impl AsRef<Path>) -> Result<Option<u64>> {
        let file = File::open(path.as_ref())?;
        self.scan(file)
    }
}
