//! Extraction statistics, per-worker status snapshots and the final report.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

/// Counters for one worker's run.
///
/// Each worker is single-threaded and returns its stats by value; the
/// controller merges them at the end. No process-wide state.
#[derive(Debug, Clone, Default)]
pub struct WorkerStats {
    /// Pages seen in the stream, including skipped ones
    pub pages_seen: u64,
    /// Pages that passed the title and resume filters
    pub pages_extracted: u64,
    /// Revisions of pages that passed the revision-count bounds
    pub revisions_extracted: u64,
    /// Correction pairs emitted
    pub pairs_extracted: u64,
}

impl WorkerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: &WorkerStats) {
        self.pages_seen += other.pages_seen;
        self.pages_extracted += other.pages_extracted;
        self.revisions_extracted += other.revisions_extracted;
        self.pairs_extracted += other.pairs_extracted;
    }

    /// Revisions per second over `elapsed`.
    pub fn rate(&self, elapsed: Duration) -> f64 {
        let seconds = elapsed.as_secs_f64();
        if seconds > 0.0 {
            self.revisions_extracted as f64 / seconds
        } else {
            0.0
        }
    }
}

/// Splits a duration into whole hours, minutes and seconds.
pub fn split_elapsed(elapsed: Duration) -> (u64, u64, u64) {
    let total = elapsed.as_secs();
    (total / 3600, (total % 3600) / 60, total % 60)
}

/// Rewrites the per-worker progress snapshot (`stat_worker_{n}.txt`).
pub fn write_status(
    output_dir: &Path,
    worker_id: usize,
    stats: &WorkerStats,
    elapsed: Duration,
) -> Result<()> {
    let (hours, minutes, seconds) = split_elapsed(elapsed);
    let content = format!(
        "Number of pages extracted: {}.\nRevisions extracted: {}.\nTime elapsed: {}h:{}min:{}s.\nExtraction rate: {:.2} rev/s\n",
        stats.pages_extracted,
        stats.revisions_extracted,
        hours,
        minutes,
        seconds,
        stats.rate(elapsed)
    );
    let path = output_dir.join(format!("stat_worker_{worker_id}.txt"));
    fs::write(&path, content)
        .with_context(|| format!("failed to write status file: {}", path.display()))
}

/// Writes the final extraction report (`report.txt`).
pub fn write_report(
    output_dir: &Path,
    elapsed: Duration,
    files: &[PathBuf],
    min_revisions: usize,
    max_revisions: usize,
    totals: &WorkerStats,
) -> Result<()> {
    let (hours, minutes, seconds) = split_elapsed(elapsed);
    let mut content = format!(
        "Extraction report:\n\nComplete execution time: {}h:{}min:{}s.\nMax_revisions: {}\nMin_revisions: {}\nFiles extracted:",
        hours, minutes, seconds, max_revisions, min_revisions
    );
    for file in files {
        content.push(' ');
        content.push_str(&file.display().to_string());
    }
    content.push_str(&format!(
        "\nNumber of files extracted: {}\nPages extracted: {}\nRevisions extracted: {}\nPairs extracted: {}\n",
        files.len(),
        totals.pages_extracted,
        totals.revisions_extracted,
        totals.pairs_extracted
    ));

    let path = output_dir.join("report.txt");
    fs::write(&path, content)
        .with_context(|| format!("failed to write report file: {}", path.display()))
}
