//! Batch loading: decode every replay in a folder, skipping and reporting
//! per-file failures instead of aborting the run.
//!
//! Decodes are independent and stateless, so with the `parallel` feature
//! the files are decoded concurrently via Rayon; the report order is the
//! sorted path order either way.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DecodeError, Result};
use crate::replay::Replay;

/// One file that failed to decode, with the error that rejected it.
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: DecodeError,
}

/// Outcome of a batch load. Failures never abort the batch; the caller
/// decides whether a partial result is acceptable.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub replays: Vec<Replay>,
    pub failures: Vec<LoadFailure>,
}

/// Collect the `.osr` files directly under `dir` (case-insensitive
/// extension, sorted by path) and decode them all. Other files and
/// subdirectories are skipped.
pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<LoadReport> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_osr = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("osr"))
            .unwrap_or(false);
        if is_osr && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(load_files(&paths))
}

/// Decode each file independently. A failure lands in the report instead
/// of hiding the rest of the batch.
pub fn load_files(paths: &[PathBuf]) -> LoadReport {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let results: Vec<(PathBuf, Result<Replay>)> = paths
            .par_iter()
            .map(|path| (path.clone(), load_one(path)))
            .collect();
        collect_report(results)
    }

    #[cfg(not(feature = "parallel"))]
    {
        let results: Vec<(PathBuf, Result<Replay>)> = paths
            .iter()
            .map(|path| (path.clone(), load_one(path)))
            .collect();
        collect_report(results)
    }
}

fn load_one(path: &Path) -> Result<Replay> {
    let bytes = fs::read(path)?;
    Replay::from_bytes(&bytes)
}

fn collect_report(results: Vec<(PathBuf, Result<Replay>)>) -> LoadReport {
    let mut report = LoadReport::default();
    for (path, result) in results {
        match result {
            Ok(replay) => report.replays.push(replay),
            Err(error) => report.failures.push(LoadFailure { path, error }),
        }
    }
    report
}
