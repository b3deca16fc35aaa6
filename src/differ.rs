//! Sentence alignment between two consecutive revisions.
//!
//! A line-oriented diff over the sentence sequences yields the candidates
//! that changed between revisions; a character-level similarity ratio then
//! matches each old candidate to its most likely correction in the new
//! revision.

use similar::{capture_diff_slices, Algorithm, DiffTag, TextDiff};

/// Collects the diff candidates from both sides.
///
/// `removed` holds the old revision's changed and deleted sentences,
/// `added` the new revision's changed sentences. Sentences only present in
/// the new revision are fresh content, not corrections, and are ignored.
pub fn align(old: &[String], new: &[String]) -> (Vec<String>, Vec<String>) {
    let mut removed = Vec::new();
    let mut added = Vec::new();

    for op in capture_diff_slices(Algorithm::Myers, old, new) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Replace => {
                removed.extend_from_slice(&old[old_range]);
                added.extend_from_slice(&new[new_range]);
            }
            DiffTag::Delete => removed.extend_from_slice(&old[old_range]),
            DiffTag::Insert | DiffTag::Equal => {}
        }
    }

    (removed, added)
}

/// Character-level similarity ratio in `[0, 1]` (2M/T, difflib-compatible).
pub fn similarity(a: &str, b: &str) -> f32 {
    TextDiff::from_chars(a, b).ratio()
}

/// The single closest candidate with ratio at least `cutoff`.
///
/// Among equally similar candidates the first in scan order wins.
pub fn best_match<'a>(sentence: &str, candidates: &'a [String], cutoff: f32) -> Option<&'a str> {
    let mut best: Option<(&str, f32)> = None;
    for candidate in candidates {
        let ratio = similarity(sentence, candidate);
        if ratio >= cutoff && best.map_or(true, |(_, best_ratio)| ratio > best_ratio) {
            best = Some((candidate, ratio));
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Emits `(source, target)` candidate pairs for two revisions' sentences.
pub fn correction_pairs(old: &[String], new: &[String], cutoff: f32) -> Vec<(String, String)> {
    let (removed, added) = align(old, new);
    let mut pairs = Vec::new();
    for source in removed {
        if let Some(target) = best_match(&source, &added, cutoff) {
            let target = target.to_string();
            pairs.push((source, target));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn small_edit_produces_one_pair() {
        let old = sentences(&["Le chat dor sur le tapis."]);
        let new = sentences(&["Le chat dort sur le tapis."]);
        let pairs = correction_pairs(&old, &new, 0.7);
        assert_eq!(
            pairs,
            vec![(
                "Le chat dor sur le tapis.".to_string(),
                "Le chat dort sur le tapis.".to_string()
            )]
        );
    }

    #[test]
    fn cutoff_rejects_distant_rewrites() {
        let old = sentences(&["Le chat dort."]);
        let new = sentences(&["Le chat dort paisiblement."]);
        // ratio is 26/39 ≈ 0.667
        assert!(correction_pairs(&old, &new, 0.7).is_empty());
        assert_eq!(correction_pairs(&old, &new, 0.6).len(), 1);
    }

    #[test]
    fn identical_revisions_produce_nothing() {
        let old = sentences(&["Une phrase.", "Une autre."]);
        let (removed, added) = align(&old, &old);
        assert!(removed.is_empty());
        assert!(added.is_empty());
    }

    #[test]
    fn pure_insertion_is_ignored() {
        let old = sentences(&["Une phrase."]);
        let new = sentences(&["Une phrase.", "Une nouveauté."]);
        let (removed, added) = align(&old, &new);
        assert!(removed.is_empty());
        assert!(added.is_empty());
    }

    #[test]
    fn pure_deletion_is_collected_but_unmatched() {
        let old = sentences(&["Une phrase.", "Une disparue."]);
        let new = sentences(&["Une phrase."]);
        let (removed, added) = align(&old, &new);
        assert_eq!(removed, sentences(&["Une disparue."]));
        assert!(added.is_empty());
        assert!(correction_pairs(&old, &new, 0.7).is_empty());
    }

    #[test]
    fn replace_collects_both_sides() {
        let old = sentences(&["Avant.", "Le chat dor."]);
        let new = sentences(&["Avant.", "Le chat dort."]);
        let (removed, added) = align(&old, &new);
        assert_eq!(removed, sentences(&["Le chat dor."]));
        assert_eq!(added, sentences(&["Le chat dort."]));
    }

    #[test]
    fn ties_go_to_the_first_candidate_in_scan_order() {
        let candidates = sentences(&["ax", "xb"]);
        assert_eq!(best_match("ab", &candidates, 0.4), Some("ax"));
    }

    #[test]
    fn similarity_is_symmetric_enough_for_ordering() {
        assert!(similarity("Le chat", "Le chat") > 0.99);
        assert!(similarity("Le chat", "xyz") < 0.3);
    }
}
