//! Wikitext normalization pipelines.
//!
//! `pre_clean` runs on every revision's raw text before sentence
//! segmentation; `post_clean` runs only on the two sentences of a confirmed
//! correction pair. Splitting the work this way keeps the per-revision cost
//! down: the expensive link/entity cleanup is paid per emitted pair, not per
//! revision.

use once_cell::sync::Lazy;
use quick_xml::escape::unescape_with;
use regex::Regex;

use crate::scanner::strip_nested;
use crate::templates;

static FOOTER_SECTIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)==\s*(?:Voir aussi|Notes et références|Further reading|Liens externes|Articles connexes|Lien externe|Données statistiques|Statistiques)\s*==.*",
    )
    .unwrap()
});

static HEADINGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"=+\s?(.*?)=+").unwrap());

/// Single-line `<ref ...>...</ref>` spans in raw wikitext.
static REF_SPANS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<ref.*?>.+?</ref>").unwrap());

/// Escaped `<br/>`, self-closing `<ref/>` and full `<ref>...</ref>` spans.
static REFS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(&lt;br */&gt;|&lt;ref[^/]+/&gt;|&lt;ref.*?&lt;/ref&gt;)").unwrap()
});

static INTER_WIKI_LINKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[[a-z\-]+:[^|\]]+\]\]").unwrap());

static IPA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"( (\(|\[)\{\{IPA[^\}]+\}\}(\)|\])| \{\{IPA[^\}]+\}\})").unwrap()
});

static UNIT_CONVERSION_SHORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{convert\|(\d+)\|([^|]+)\}\}").unwrap());

static UNIT_CONVERSION_LONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{convert\|(\d+)\|([^|]+)\|[^}]+\}\}").unwrap());

static COMMENT_EMPHASIS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)((<|&lt;|&#60;)!--.*?--(>|&gt;|&#62;)|('''|''))").unwrap()
});

static CATEGORY_LINKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[Category:([^\]]+)\]\]").unwrap());

static PIPED_LINKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[[^\]]+\|([^\]]+)\]\]").unwrap());

static LINK_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\[\[|\]\])").unwrap());

static MATH_GALLERY_NOTOC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(__NOTOC__|&lt;gallery&gt;.*?&lt;/gallery&gt;|&lt;math&gt;.*?&lt;/math&gt;)")
        .unwrap()
});

static INDENTATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\n\r]:\s*").unwrap());

static HTML_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

static MULTIPLE_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\n\r][\n\r]+").unwrap());

/// Pre-cleans one revision's raw wikitext before segmentation.
///
/// Footer sections are dropped to end of text, headings removed, image
/// captions / tables excised, single-line ref spans stripped and templates
/// resolved. Template resolution runs twice to pick up one level of
/// template-inside-template nesting; whatever `{{...}}` spans remain
/// (multi-line templates, unresolved placeholders) are removed wholesale.
pub fn pre_clean(text: &str) -> String {
    let text = FOOTER_SECTIONS.replace_all(text, "");
    let text = HEADINGS.replace_all(&text, "");
    let text = strip_nested(&text, "[[File:", [b'[', b'['], [b']', b']']);
    let text = strip_nested(&text, "[[Image:", [b'[', b'['], [b']', b']']);
    let text = strip_nested(&text, "{|", [b'{', b'|'], [b'|', b'}']);
    let text = REF_SPANS.replace_all(&text, "");
    let text = templates::resolve_all(&text);
    let text = templates::resolve_all(&text);
    strip_nested(&text, "{{", [b'{', b'{'], [b'}', b'}'])
}

/// Fully cleans one matched sentence: remaining refs, links, entities and
/// markup leftovers. Applied only to the two sides of a confirmed pair.
pub fn post_clean(text: &str) -> String {
    let text = REFS.replace_all(text, "");
    let text = INTER_WIKI_LINKS.replace_all(&text, " ");
    let text = IPA.replace_all(&text, "");
    let text = UNIT_CONVERSION_SHORT.replace_all(&text, "$1 $2");
    let text = UNIT_CONVERSION_LONG.replace_all(&text, "$1 $2");
    let text = COMMENT_EMPHASIS.replace_all(&text, "");
    let text = CATEGORY_LINKS.replace_all(&text, "");
    let text = PIPED_LINKS.replace_all(&text, "$1");
    let text = LINK_BRACKETS.replace_all(&text, "");
    let text = MATH_GALLERY_NOTOC.replace_all(&text, "");
    let text = INDENTATION.replace_all(&text, "\n");
    let text = unescape_entities(&text);
    let text = unescape_entities(&text);
    let text = HTML_TAGS.replace_all(&text, "");
    let text = MULTIPLE_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Decodes XML/HTML entities; called twice by `post_clean` because dump text
/// is frequently double-escaped. Numeric references are handled by quick-xml
/// itself, named entities by the resolver below. Text with an entity we do
/// not know stays as-is.
fn unescape_entities(text: &str) -> String {
    let resolved = unescape_with(text, |entity| match entity {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        "nbsp" => Some(" "),
        "laquo" => Some("«"),
        "raquo" => Some("»"),
        "agrave" => Some("à"),
        "ccedil" => Some("ç"),
        "eacute" => Some("é"),
        "egrave" => Some("è"),
        "ecirc" => Some("ê"),
        "icirc" => Some("î"),
        "ocirc" => Some("ô"),
        "ucirc" => Some("û"),
        "oelig" => Some("œ"),
        "mdash" => Some("—"),
        "ndash" => Some("–"),
        "hellip" => Some("…"),
        "deg" => Some("°"),
        _ => None,
    });
    match resolved {
        Ok(unescaped) => unescaped.into_owned(),
        Err(_) => text.to_string(),
    }
}
