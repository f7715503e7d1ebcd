//! bundlescan - batch container classification and metadata extraction.
//!
//! Recursively scans a directory tree for bundle-family files, carves off
//! opaque prefixes, traverses embedded archives, and routes discovered
//! structured records into a SQLite metadata store.

mod engine;
mod pattern;

use anyhow::Result;
use bundlescan_io::{RawOnlyMounter, SqliteSink};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bundlescan")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Root directory to scan recursively
    path: PathBuf,

    /// Metadata database to create or extend
    #[arg(short, long, default_value = "metadata.db")]
    output: PathBuf,

    /// Glob-style file name filter (* and ?)
    #[arg(short, long, default_value = "*")]
    pattern: String,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    let mut sink = SqliteSink::new(&args.output);
    let mounter = RawOnlyMounter;

    engine::run(&args.path, &args.pattern, &mounter, &mut sink)?;

    Ok(())
}
