//! Integration tests for the Plume revision-mining pipeline.
//!
//! The tests drive the complete data flow: XML (or BZ2) dump input through
//! streaming parse, normalization, segmentation, diffing and checkpointed
//! CSV output. All tests use a shared `sample_xml()` fixture with two pages:
//! a regular article whose second revision fixes a spelling mistake, and a
//! talk page carrying the same edit that must always be skipped.
//!
//! Each test uses its own `TempDir` to avoid cross-test pollution: dump files
//! are deleted on successful extraction, so tests never share inputs.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bzip2::write::BzEncoder;
use bzip2::Compression;
use plume::extract::{extract_file, run_extraction, ExtractOptions};
use plume::resume::load_extracted_titles;
use rustc_hash::FxHashSet;
use tempfile::TempDir;

/// A minimal two-page history dump. "Chat" has two revisions differing in
/// one word ("mamifère" -> "mammifère"); "Discussion:Chat" mirrors the same
/// edit on a reserved namespace.
fn sample_xml() -> &'static str {
    r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/">
  <siteinfo>
    <sitename>Wikipédia</sitename>
  </siteinfo>
  <page>
    <title>Chat</title>
    <ns>0</ns>
    <id>1</id>
    <revision>
      <id>100</id>
      <timestamp>2020-01-01T00:00:00Z</timestamp>
      <contributor><username>A</username><id>7</id></contributor>
      <text>Le chat domestique est un mamifère carnivore. Il vit auprès des humains.</text>
    </revision>
    <revision>
      <id>101</id>
      <timestamp>2020-01-02T00:00:00Z</timestamp>
      <contributor><username>B</username><id>8</id></contributor>
      <comment>Orthographe</comment>
      <text>Le chat domestique est un mammifère carnivore. Il vit auprès des humains.</text>
    </revision>
  </page>
  <page>
    <title>Discussion:Chat</title>
    <ns>1</ns>
    <id>2</id>
    <revision>
      <id>200</id>
      <timestamp>2020-01-01T00:00:00Z</timestamp>
      <text>Le chat domestique est un mamifère carnivore.</text>
    </revision>
    <revision>
      <id>201</id>
      <timestamp>2020-01-02T00:00:00Z</timestamp>
      <text>Le chat domestique est un mammifère carnivore.</text>
    </revision>
  </page>
</mediawiki>"#
}

fn write_xml_dump(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, sample_xml()).unwrap();
    path
}

fn write_bz2_dump(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let file = fs::File::create(&path).unwrap();
    let mut encoder = BzEncoder::new(file, Compression::fast());
    encoder.write_all(sample_xml().as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

/// Options that admit the two-revision fixture pages and never checkpoint on
/// a timer during the test.
fn test_options() -> ExtractOptions {
    ExtractOptions {
        min_revisions: 2,
        max_revisions: 100,
        save_interval: Duration::from_secs(3600),
        ..Default::default()
    }
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

// ---------------------------------------------------------------------------
// Single-file extraction
// ---------------------------------------------------------------------------

#[test]
fn extraction_emits_correction_pair_with_metadata() {
    let dir = TempDir::new().unwrap();
    let dump = write_xml_dump(dir.path(), "frwiki1.xml");
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let stats = extract_file(&dump, &out, 0, &FxHashSet::default(), &test_options(), None).unwrap();

    assert_eq!(stats.pages_seen, 2);
    assert_eq!(stats.pages_extracted, 1);
    assert_eq!(stats.revisions_extracted, 2);
    assert_eq!(stats.pairs_extracted, 1);

    let rows = read_rows(&out.join("results_worker_0_nb_0.csv"));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "Le chat domestique est un mamifère carnivore.");
    assert_eq!(rows[0][1], "Le chat domestique est un mammifère carnivore.");
    assert_eq!(rows[0][2], "Chat");
    assert_eq!(rows[0][3], "2020-01-01T00:00:00Z 2020-01-02T00:00:00Z");
    assert_eq!(rows[0][4], "Orthographe");
}

#[test]
fn source_dump_is_deleted_after_clean_extraction() {
    let dir = TempDir::new().unwrap();
    let dump = write_xml_dump(dir.path(), "frwiki1.xml");
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    extract_file(&dump, &out, 0, &FxHashSet::default(), &test_options(), None).unwrap();
    assert!(!dump.exists());
}

#[test]
fn keep_sources_retains_the_dump() {
    let dir = TempDir::new().unwrap();
    let dump = write_xml_dump(dir.path(), "frwiki1.xml");
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let opts = ExtractOptions {
        keep_sources: true,
        ..test_options()
    };
    extract_file(&dump, &out, 0, &FxHashSet::default(), &opts, None).unwrap();
    assert!(dump.exists());
}

#[test]
fn bz2_dump_extracts_identically() {
    let dir = TempDir::new().unwrap();
    let dump = write_bz2_dump(dir.path(), "frwiki1.xml.bz2");
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let stats = extract_file(&dump, &out, 0, &FxHashSet::default(), &test_options(), None).unwrap();
    assert_eq!(stats.pairs_extracted, 1);

    let rows = read_rows(&out.join("results_worker_0_nb_0.csv"));
    assert_eq!(rows[0][1], "Le chat domestique est un mammifère carnivore.");
}

#[test]
fn reserved_namespace_page_is_always_skipped() {
    let dir = TempDir::new().unwrap();
    let dump = write_xml_dump(dir.path(), "frwiki1.xml");
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    extract_file(&dump, &out, 0, &FxHashSet::default(), &test_options(), None).unwrap();

    let rows = read_rows(&out.join("results_worker_0_nb_0.csv"));
    assert!(rows.iter().all(|row| row[2] == "Chat"));
}

#[test]
fn resume_set_skips_already_extracted_pages() {
    let dir = TempDir::new().unwrap();
    let dump = write_xml_dump(dir.path(), "frwiki1.xml");
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let mut resume = FxHashSet::default();
    resume.insert("Chat".to_string());

    let stats = extract_file(&dump, &out, 0, &resume, &test_options(), None).unwrap();
    assert_eq!(stats.pages_extracted, 0);
    assert_eq!(stats.pairs_extracted, 0);
    // the stream was still exhausted cleanly
    assert!(!dump.exists());
}

#[test]
fn revision_bounds_reject_short_histories_under_and_semantics() {
    let dir = TempDir::new().unwrap();
    let dump = write_xml_dump(dir.path(), "frwiki1.xml");
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let opts = ExtractOptions {
        min_revisions: 5,
        ..test_options()
    };
    let stats = extract_file(&dump, &out, 0, &FxHashSet::default(), &opts, None).unwrap();
    assert_eq!(stats.pairs_extracted, 0);
}

#[test]
fn legacy_bounds_admit_short_histories() {
    let dir = TempDir::new().unwrap();
    let dump = write_xml_dump(dir.path(), "frwiki1.xml");
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let opts = ExtractOptions {
        min_revisions: 5,
        legacy_revision_bounds: true,
        ..test_options()
    };
    let stats = extract_file(&dump, &out, 0, &FxHashSet::default(), &opts, None).unwrap();
    assert_eq!(stats.pairs_extracted, 1);
}

#[test]
fn malformed_dump_flushes_and_keeps_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.xml");
    // truncated mid-page
    fs::write(&path, "<mediawiki><page><title>Chat</title>").unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let stats = extract_file(&path, &out, 0, &FxHashSet::default(), &test_options(), None).unwrap();
    assert_eq!(stats.pairs_extracted, 0);
    // fault isolation: the final checkpoint still exists, the dump survives
    assert!(out.join("results_worker_0_nb_0.csv").exists());
    assert!(path.exists());
}

#[test]
fn worker_checkpoint_files_never_collide() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    for worker_id in 0..2 {
        let dump = write_xml_dump(dir.path(), &format!("frwiki{worker_id}.xml"));
        extract_file(
            &dump,
            &out,
            worker_id,
            &FxHashSet::default(),
            &test_options(),
            None,
        )
        .unwrap();
    }

    assert!(out.join("results_worker_0_nb_0.csv").exists());
    assert!(out.join("results_worker_1_nb_0.csv").exists());
}

// ---------------------------------------------------------------------------
// Directory runs
// ---------------------------------------------------------------------------

#[test]
fn run_extraction_processes_a_directory_and_writes_the_report() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("dumps");
    fs::create_dir(&input).unwrap();
    write_xml_dump(&input, "frwiki1.xml");
    write_bz2_dump(&input, "frwiki2.xml.bz2");
    fs::write(input.join("notes.txt"), "pas un dump").unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let summary =
        run_extraction(&input, &out, &FxHashSet::default(), 2, &test_options()).unwrap();

    assert_eq!(summary.files.len(), 2);
    assert_eq!(summary.totals.pairs_extracted, 2);

    let report = fs::read_to_string(out.join("report.txt")).unwrap();
    assert!(report.contains("frwiki1.xml"));
    assert!(report.contains("frwiki2.xml.bz2"));
    assert!(report.contains("Number of files extracted: 2"));

    // per-worker status snapshots were written on completion
    assert!(out.join("stat_worker_0.txt").exists());
    assert!(out.join("stat_worker_1.txt").exists());
}

#[test]
fn extraction_results_feed_the_resume_set() {
    let dir = TempDir::new().unwrap();
    let first_dump = write_xml_dump(dir.path(), "frwiki1.xml");
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    extract_file(
        &first_dump,
        &out,
        0,
        &FxHashSet::default(),
        &test_options(),
        None,
    )
    .unwrap();

    let resume = load_extracted_titles(&out).unwrap();
    assert!(resume.contains("Chat"));

    // a second pass over the same content extracts nothing new
    let second_dump = write_xml_dump(dir.path(), "frwiki2.xml");
    let stats = extract_file(&second_dump, &out, 1, &resume, &test_options(), None).unwrap();
    assert_eq!(stats.pairs_extracted, 0);
}
