//! Resume state: page titles already present in previous result files.
//!
//! Loaded once at startup and shared read-only across workers; pages whose
//! titles are in the set are skipped entirely.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use tracing::{debug, info};

/// Scans every `*.csv` in `dir` and collects the `title` column.
pub fn load_extracted_titles(dir: &Path) -> Result<FxHashSet<String>> {
    let mut titles = FxHashSet::default();

    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read resume directory: {}", dir.display()))?;
    for entry in entries {
        let path = entry.context("failed to read directory entry")?.path();
        if path.extension().is_none_or(|ext| ext != "csv") {
            continue;
        }

        let mut reader = csv::Reader::from_path(&path)
            .with_context(|| format!("failed to open result file: {}", path.display()))?;
        let headers = reader
            .headers()
            .with_context(|| format!("failed to read headers of: {}", path.display()))?;
        let Some(title_index) = headers.iter().position(|h| h == "title") else {
            debug!(path = %path.display(), "skipping file without a title column");
            continue;
        };

        for record in reader.records() {
            let record = record
                .with_context(|| format!("failed to read record from: {}", path.display()))?;
            if let Some(title) = record.get(title_index) {
                titles.insert(title.to_string());
            }
        }
    }

    info!(titles = titles.len(), dir = %dir.display(), "loaded resume state");
    Ok(titles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::CheckpointWriter;
    use crate::models::SentencePair;
    use std::io::Write;
    use tempfile::TempDir;

    fn pair(title: &str) -> SentencePair {
        SentencePair {
            source: "a".to_string(),
            target: "b".to_string(),
            title: title.to_string(),
            timestamps: "t1 t2".to_string(),
            comments: None,
        }
    }

    #[test]
    fn collects_titles_from_all_result_files() {
        let dir = TempDir::new().unwrap();
        let mut first = CheckpointWriter::new(dir.path(), 0);
        let mut second = CheckpointWriter::new(dir.path(), 1);
        first.flush(&[pair("Chat"), pair("Chien")]).unwrap();
        second.flush(&[pair("Chat"), pair("Cheval")]).unwrap();

        let titles = load_extracted_titles(dir.path()).unwrap();
        assert_eq!(titles.len(), 3);
        assert!(titles.contains("Chat"));
        assert!(titles.contains("Chien"));
        assert!(titles.contains("Cheval"));
    }

    #[test]
    fn ignores_non_csv_files() {
        let dir = TempDir::new().unwrap();
        let mut file = fs::File::create(dir.path().join("notes.txt")).unwrap();
        writeln!(file, "title\nPas un CSV").unwrap();

        let titles = load_extracted_titles(dir.path()).unwrap();
        assert!(titles.is_empty());
    }

    #[test]
    fn skips_files_without_title_column() {
        let dir = TempDir::new().unwrap();
        let mut file = fs::File::create(dir.path().join("other.csv")).unwrap();
        writeln!(file, "a,b\n1,2").unwrap();

        let titles = load_extracted_titles(dir.path()).unwrap();
        assert!(titles.is_empty());
    }

    #[test]
    fn empty_checkpoint_files_are_tolerated() {
        let dir = TempDir::new().unwrap();
        let mut writer = CheckpointWriter::new(dir.path(), 0);
        writer.flush(&[]).unwrap();

        let titles = load_extracted_titles(dir.path()).unwrap();
        assert!(titles.is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(load_extracted_titles(Path::new("/nonexistent/resume")).is_err());
    }
}
