//! Numbered per-worker checkpoint files.
//!
//! Buffered pairs are flushed to `results_worker_{id}_nb_{seq}.csv` in the
//! output directory. Worker id and sequence number together make every
//! worker's file set disjoint from every other's, so no locking is needed
//! across workers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::SentencePair;

pub struct CheckpointWriter {
    output_dir: PathBuf,
    worker_id: usize,
    sequence: u32,
}

impl CheckpointWriter {
    pub fn new(output_dir: &Path, worker_id: usize) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            worker_id,
            sequence: 0,
        }
    }

    /// Path the next flush will write to.
    pub fn next_path(&self) -> PathBuf {
        self.output_dir.join(format!(
            "results_worker_{}_nb_{}.csv",
            self.worker_id, self.sequence
        ))
    }

    /// Writes `pairs` to the next numbered checkpoint file and advances the
    /// sequence counter. The caller clears its buffer afterwards.
    pub fn flush(&mut self, pairs: &[SentencePair]) -> Result<PathBuf> {
        let path = self.next_path();
        if path.exists() {
            warn!(path = %path.display(), "overwriting an existing checkpoint file");
        }

        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create checkpoint file: {}", path.display()))?;
        for pair in pairs {
            writer
                .serialize(pair)
                .context("failed to serialize sentence pair")?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to flush checkpoint file: {}", path.display()))?;

        self.sequence += 1;
        debug!(
            worker = self.worker_id,
            pairs = pairs.len(),
            path = %path.display(),
            "checkpoint saved"
        );
        Ok(path)
    }
}
