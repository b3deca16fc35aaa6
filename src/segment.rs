//! Splitting normalized text into sentences.

use once_cell::sync::Lazy;
use regex::Regex;

/// A sentence starts at an uppercase letter (accented included) or `*` and
/// runs non-greedily through 1-3 terminal punctuation marks. The terminator
/// must be followed by whitespace or end of text; the `regex` crate has no
/// lookahead, so that whitespace is consumed and trimmed off the match (a
/// following sentence can never begin with whitespace).
static SENTENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z*ÀÂÆÇÉÈÊËÎÏÔŒÙÛÜŸ].+?[.!?]{1,3}(\s|$)").unwrap());

/// Returns the sentences of `text` in input order.
pub fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE
        .find_iter(text)
        .map(|m| m.as_str().trim_end().to_string())
        .collect()
}
