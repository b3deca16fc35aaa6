//! Extraction controller: drives the per-revision pipeline over dump files.
//!
//! One worker owns one dump file. Within a worker everything is sequential
//! (page → revision → diff → buffer), matching the requirement that revisions
//! be diffed in document order. Workers share only the read-only resume set,
//! so the pool needs no locking; a failing worker never affects the others.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{error, info, warn};

use crate::checkpoint::CheckpointWriter;
use crate::config::{
    DEFAULT_CUTOFF, DEFAULT_MAX_REVISIONS, DEFAULT_MIN_REVISIONS, DEFAULT_SAVE_INTERVAL_SECS,
    PROGRESS_INTERVAL, STATUS_INTERVAL,
};
use crate::differ;
use crate::dump::DumpReader;
use crate::models::{Page, SentencePair};
use crate::normalize;
use crate::segment;
use crate::stats::{self, WorkerStats};

/// Reserved namespace prefixes of the French Wikipedia; a page whose title
/// starts with one of these followed by `:` is never extracted.
const RESERVED_TITLE_PREFIXES: &[&str] = &[
    "Média",
    "Spécial",
    "Discussion",
    "Utilisateur",
    "Discussion utilisateur",
    "Wikipédia",
    "Discussion Wikipédia",
    "Fichier",
    "Discussion fichier",
    "MediaWiki",
    "Discussion MediaWiki",
    "Modèle",
    "Discussion modèle",
    "Aide",
    "Discussion aide",
    "Catégorie",
    "Discussion catégorie",
    "Portail",
    "Discussion Portail",
    "Projet",
    "Discussion Projet",
    "Référence",
    "Discussion Référence",
    "TimedText",
    "TimedText talk",
    "Module",
    "Discussion module",
    "Gadget",
    "Discussion gadget",
    "Définition de gadget",
    "Discussion définition de gadget",
    "Sujet",
];

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub min_revisions: usize,
    pub max_revisions: usize,
    /// Combine the revision bounds with OR instead of AND. The historical
    /// combination admits nearly every page; see DESIGN.md.
    pub legacy_revision_bounds: bool,
    pub cutoff: f32,
    pub save_interval: Duration,
    /// Keep dump files instead of deleting them after complete extraction.
    pub keep_sources: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            min_revisions: DEFAULT_MIN_REVISIONS,
            max_revisions: DEFAULT_MAX_REVISIONS,
            legacy_revision_bounds: false,
            cutoff: DEFAULT_CUTOFF,
            save_interval: Duration::from_secs(DEFAULT_SAVE_INTERVAL_SECS),
            keep_sources: false,
        }
    }
}

/// Aggregate result of a full extraction run.
pub struct ExtractionSummary {
    pub totals: WorkerStats,
    pub files: Vec<PathBuf>,
}

pub fn is_reserved_title(title: &str) -> bool {
    RESERVED_TITLE_PREFIXES.iter().any(|prefix| {
        title
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(':'))
    })
}

fn within_bounds(revision_count: usize, opts: &ExtractOptions) -> bool {
    if opts.legacy_revision_bounds {
        revision_count <= opts.max_revisions || revision_count >= opts.min_revisions
    } else {
        revision_count >= opts.min_revisions && revision_count <= opts.max_revisions
    }
}

/// Runs the per-page state machine: the first revision with text becomes the
/// baseline, every later one is diffed against the revision before it.
///
/// Only the previous revision's sentence list survives an iteration; raw
/// revision text is dropped as soon as it has been cleaned and segmented.
fn extract_page(page: Page, opts: &ExtractOptions) -> Vec<SentencePair> {
    let title = page.title;
    let mut pairs = Vec::new();
    let mut baseline: Option<(Vec<String>, Option<String>)> = None;

    for revision in page.revisions {
        let Some(raw_text) = revision.text else {
            // revision without text; the baseline is left untouched
            continue;
        };
        let sentences = segment::split_sentences(&normalize::pre_clean(&raw_text));
        drop(raw_text);

        let Some((old_sentences, old_timestamp)) = baseline.take() else {
            baseline = Some((sentences, revision.timestamp));
            continue;
        };

        for (source, target) in differ::correction_pairs(&old_sentences, &sentences, opts.cutoff) {
            let source = normalize::post_clean(&source);
            let target = normalize::post_clean(&target);
            if target.is_empty() || target == source {
                continue;
            }
            pairs.push(SentencePair {
                source: source.replace('\n', ""),
                target: target.replace('\n', ""),
                title: title.clone(),
                timestamps: format!(
                    "{} {}",
                    old_timestamp.as_deref().unwrap_or(""),
                    revision.timestamp.as_deref().unwrap_or("")
                ),
                comments: revision.comment.clone(),
            });
        }

        baseline = Some((sentences, revision.timestamp));
    }

    pairs
}

/// Extracts one dump file as worker `worker_id`.
///
/// A structural XML failure ends this worker's stream after a final
/// checkpoint flush; the error is logged, not returned, so sibling workers
/// keep running. The source dump is deleted only after clean exhaustion.
pub fn extract_file(
    path: &Path,
    output_dir: &Path,
    worker_id: usize,
    resume: &FxHashSet<String>,
    opts: &ExtractOptions,
    progress: Option<&ProgressBar>,
) -> Result<WorkerStats> {
    info!(worker = worker_id, path = %path.display(), "starting extraction");
    let started = Instant::now();
    let mut stats = WorkerStats::new();
    let mut buffer: Vec<SentencePair> = Vec::new();
    let mut checkpoints = CheckpointWriter::new(output_dir, worker_id);
    let mut save_interval = opts.save_interval;
    let mut clean_exhaustion = true;

    let reader = DumpReader::open(path)?;
    for page in reader {
        let page = match page {
            Ok(page) => page,
            Err(e) => {
                error!(worker = worker_id, path = %path.display(), error = %e, "dump stream failed");
                clean_exhaustion = false;
                break;
            }
        };

        stats.pages_seen += 1;
        if let Some(progress) = progress {
            if stats.pages_seen % PROGRESS_INTERVAL == 0 {
                progress.tick();
            }
        }

        if is_reserved_title(&page.title) || resume.contains(&page.title) {
            continue;
        }
        stats.pages_extracted += 1;

        if within_bounds(page.revisions.len(), opts) {
            stats.revisions_extracted += page.revisions.len() as u64;
            let pairs = extract_page(page, opts);
            stats.pairs_extracted += pairs.len() as u64;
            buffer.extend(pairs);
        }

        if stats.pages_extracted % STATUS_INTERVAL == 0 {
            if let Err(e) = stats::write_status(output_dir, worker_id, &stats, started.elapsed()) {
                warn!(worker = worker_id, error = %e, "failed to write status file");
            }
        }

        if started.elapsed() > save_interval {
            checkpoints
                .flush(&buffer)
                .context("periodic checkpoint flush failed")?;
            buffer.clear();
            save_interval *= 2;
        }
    }

    checkpoints
        .flush(&buffer)
        .context("final checkpoint flush failed")?;
    buffer.clear();

    if let Err(e) = stats::write_status(output_dir, worker_id, &stats, started.elapsed()) {
        warn!(worker = worker_id, error = %e, "failed to write status file");
    }

    if clean_exhaustion && !opts.keep_sources {
        fs::remove_file(path)
            .with_context(|| format!("failed to delete extracted dump: {}", path.display()))?;
        info!(worker = worker_id, path = %path.display(), "extraction complete, source dump deleted");
    }

    Ok(stats)
}

fn is_dump_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.ends_with(".xml") || name.ends_with(".xml.bz2")
}

/// Extracts every dump file in `input_dir` with a pool of at most
/// `min(requested_workers, available cores)` concurrent workers, then writes
/// the final report.
pub fn run_extraction(
    input_dir: &Path,
    output_dir: &Path,
    resume: &FxHashSet<String>,
    requested_workers: usize,
    opts: &ExtractOptions,
) -> Result<ExtractionSummary> {
    let started = Instant::now();

    let mut files: Vec<PathBuf> = fs::read_dir(input_dir)
        .with_context(|| format!("failed to read input directory: {}", input_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_dump_file(path))
        .collect();
    files.sort();
    if files.is_empty() {
        warn!(dir = %input_dir.display(), "no dump files found");
    }

    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let workers = requested_workers.min(cores).max(1);
    if workers < requested_workers {
        info!(
            requested = requested_workers,
            workers, "capping worker count to available cores"
        );
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("failed to build worker pool")?;

    let multi = MultiProgress::new();
    let results: Vec<Result<WorkerStats>> = pool.install(|| {
        files
            .par_iter()
            .enumerate()
            .map(|(worker_id, path)| {
                let spinner = multi.add(ProgressBar::new_spinner());
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                spinner.set_message(name);
                let result = extract_file(path, output_dir, worker_id, resume, opts, Some(&spinner));
                spinner.finish_and_clear();
                result
            })
            .collect()
    });

    let mut totals = WorkerStats::new();
    for (path, result) in files.iter().zip(&results) {
        match result {
            Ok(stats) => totals.merge(stats),
            Err(e) => error!(path = %path.display(), "worker failed: {e:#}"),
        }
    }

    stats::write_report(
        output_dir,
        started.elapsed(),
        &files,
        opts.min_revisions,
        opts.max_revisions,
        &totals,
    )?;

    Ok(ExtractionSummary { totals, files })
}
