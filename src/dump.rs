//! Streaming reader for MediaWiki history dumps.
//!
//! Pages are yielded one at a time so multi-gigabyte dumps never have to fit
//! in memory; each page carries its revisions in document order. Input may be
//! plain XML or bz2-compressed, chosen by file extension. Element matching
//! uses local names, so namespaced dumps (`<mw:page>` or a default `xmlns`)
//! parse the same as plain ones.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use bzip2::read::BzDecoder;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use crate::models::{Page, Revision};

/// Structural failures of the underlying XML stream. Fatal to the worker
/// reading this dump; other workers are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("XML error")]
    Xml(#[from] quick_xml::Error),
    #[error("unexpected end of file inside a page element")]
    UnexpectedEof,
}

/// Which captured element's character data is being accumulated.
enum Field {
    Title,
    Timestamp,
    Comment,
    Text,
}

pub struct DumpReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
}

impl DumpReader<Box<dyn BufRead>> {
    /// Opens a dump file, decompressing through bz2 when the extension says so.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open dump file: {}", path.display()))?;
        let reader: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "bz2") {
            Box::new(BufReader::new(BzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(Self::new(reader))
    }
}

impl<R: BufRead> DumpReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Reader::from_reader(reader),
            buf: Vec::with_capacity(64 * 1024),
        }
    }

    /// Parses events until the next `</page>`, or `None` at end of stream.
    fn next_page(&mut self) -> Result<Option<Page>, DumpError> {
        let mut page: Option<Page> = None;
        let mut revision: Option<Revision> = None;
        let mut field: Option<Field> = None;
        let mut value = String::new();

        loop {
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"page" => page = Some(Page::default()),
                    b"revision" if page.is_some() => revision = Some(Revision::default()),
                    b"title" if page.is_some() && revision.is_none() => {
                        field = Some(Field::Title);
                        value.clear();
                    }
                    b"timestamp" if revision.is_some() => {
                        field = Some(Field::Timestamp);
                        value.clear();
                    }
                    b"comment" if revision.is_some() => {
                        field = Some(Field::Comment);
                        value.clear();
                    }
                    b"text" if revision.is_some() => {
                        field = Some(Field::Text);
                        value.clear();
                    }
                    _ => {}
                },
                Event::Empty(e) => {
                    if e.local_name().as_ref() == b"text" {
                        if let Some(revision) = revision.as_mut() {
                            revision.text = Some(String::new());
                        }
                    }
                }
                Event::Text(e) => {
                    if field.is_some() {
                        value.push_str(&e.unescape()?);
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"title" | b"timestamp" | b"comment" | b"text" => {
                        if let Some(field) = field.take() {
                            let taken = std::mem::take(&mut value);
                            match (field, page.as_mut(), revision.as_mut()) {
                                (Field::Title, Some(page), _) => page.title = taken,
                                (Field::Timestamp, _, Some(revision)) => {
                                    revision.timestamp = Some(taken)
                                }
                                (Field::Comment, _, Some(revision)) => {
                                    revision.comment = Some(taken)
                                }
                                (Field::Text, _, Some(revision)) => revision.text = Some(taken),
                                _ => {}
                            }
                        }
                    }
                    b"revision" => {
                        if let (Some(page), Some(revision)) = (page.as_mut(), revision.take()) {
                            if revision.timestamp.is_none() {
                                warn!(title = %page.title, "revision without a timestamp");
                            }
                            if revision.text.is_none() {
                                warn!(title = %page.title, "revision without text");
                            }
                            page.revisions.push(revision);
                        }
                    }
                    b"page" => {
                        if let Some(page) = page.take() {
                            self.buf.clear();
                            return Ok(Some(page));
                        }
                    }
                    _ => {}
                },
                Event::Eof => {
                    return if page.is_some() {
                        Err(DumpError::UnexpectedEof)
                    } else {
                        Ok(None)
                    };
                }
                _ => {}
            }
            self.buf.clear();
        }
    }
}

impl<R: BufRead> Iterator for DumpReader<R> {
    type Item = Result<Page, DumpError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_page().transpose()
    }
}
