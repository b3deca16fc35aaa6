//! Plume: mining sentence-correction pairs from wiki revision histories
//!
//! This crate streams MediaWiki history dumps and mines pairs of
//! (erroneous sentence, corrected sentence) from consecutive revisions of
//! each page, producing CSV training data for spelling/grammar-correction
//! models:
//!
//! 1. **Stream** -- Pages are read one at a time from plain or bz2 XML dumps;
//!    a page and its revisions are released as soon as they are processed
//! 2. **Normalize** -- Each revision's wikitext is pre-cleaned (sections,
//!    headings, captions, tables, refs, templates) before segmentation;
//!    matched sentences get a full post-clean (links, entities, HTML)
//! 3. **Segment** -- Normalized text is split into sentences
//! 4. **Diff** -- Consecutive revisions' sentence lists are aligned with a
//!    line diff; each changed old sentence is matched to its closest new
//!    counterpart by a similarity ratio
//! 5. **Checkpoint** -- Buffered pairs are flushed periodically to numbered
//!    per-worker CSV files, with the flush interval doubling each time
//!
//! # Architecture
//!
//! The pipeline is designed for very large history dumps:
//!
//! - **Streaming XML parsing** -- Never loads a full dump into memory
//! - **Embarrassingly parallel workers** -- One worker per dump file, no
//!   shared mutable state, disjoint checkpoint files per worker
//! - **Fault isolation** -- A malformed dump stops only its own worker,
//!   after a final checkpoint flush
//! - **Resumable extraction** -- Titles found in previous result files are
//!   skipped on the next run
//!
//! # Key Modules
//!
//! - [`dump`] -- Streaming page/revision parser with BZ2 decompression
//! - [`scanner`] -- Generic nested-delimiter span removal
//! - [`templates`] -- Ordered rule table resolving French wiki templates
//! - [`normalize`] -- Pre- and post-clean wikitext pipelines
//! - [`segment`] -- Sentence segmentation
//! - [`differ`] -- Sentence alignment and similarity matching
//! - [`extract`] -- Extraction controller and worker pool
//! - [`checkpoint`] -- Numbered per-worker CSV checkpoint files
//! - [`resume`] -- Resume-title set from previous results
//! - [`stats`] -- Worker statistics, status snapshots, final report
//! - [`models`] -- Core data types (Page, Revision, SentencePair)
//! - [`config`] -- Default bounds and intervals

pub mod checkpoint;
pub mod config;
pub mod differ;
pub mod dump;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod resume;
pub mod scanner;
pub mod segment;
pub mod stats;
pub mod templates;
