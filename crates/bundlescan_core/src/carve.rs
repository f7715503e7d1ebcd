//! Carve extraction: copy the tail of a source file into a new file.

use crate::error::Result;
use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

/// Writes the bytes of `src` from `offset` to end-of-file into `dest`,
/// creating or truncating `dest`. The source is never modified.
pub fn carve(src: &Path, offset: u64, dest: &Path) -> Result<()> {
    let mut reader = File::open(src)?;
    reader.seek(SeekFrom::Start(offset))?;

    let mut writer = File::create(dest)?;
    io::copy(&mut reader, &mut writer)?;
    writer.flush()?;

    Ok(())
}
