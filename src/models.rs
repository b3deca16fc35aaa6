use serde::Serialize;

/// One historical version of a page's text.
///
/// All fields are optional because dumps in the wild drop them; a revision
/// without text is skipped by the controller without disturbing the baseline.
#[derive(Debug, Clone, Default)]
pub struct Revision {
    pub text: Option<String>,
    pub timestamp: Option<String>,
    pub comment: Option<String>,
}

/// A page with its full revision history, in document order.
///
/// Document order is the source of truth for "previous vs. current" when
/// diffing consecutive revisions.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub title: String,
    pub revisions: Vec<Revision>,
}

/// One extracted correction pair, serialized as a CSV row.
///
/// `source` (column `X`) is the erroneous sentence, `target` (column `y`) the
/// corrected one. `timestamps` holds the previous and current revision
/// timestamps separated by a space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentencePair {
    #[serde(rename = "X")]
    pub source: String,
    #[serde(rename = "y")]
    pub target: String,
    pub title: String,
    pub timestamps: String,
    pub comments: Option<String>,
}
