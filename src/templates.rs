//! Resolution of French wikitext templates into plain text.
//!
//! A template body (the text between one `{{`/`}}` pair, braces excluded) is
//! matched against an ordered rule table; the first rule that recognizes the
//! body produces the replacement. Bodies no rule recognizes resolve to the
//! literal `{{}}` placeholder so downstream consumers can detect unresolved
//! content by substring search instead of catching errors.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Placeholder returned when no rule matches.
pub const UNRESOLVED: &str = "{{}}";

/// Innermost template occurrence: no newline and no nested opening brace.
static TEMPLATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{[^\n{]*?\}\}").unwrap());

/// Replaces every innermost `{{...}}` occurrence with its resolution.
///
/// One application only resolves one nesting level; the normalizer applies
/// this twice before sweeping up leftover brace spans.
pub fn resolve_all(text: &str) -> String {
    TEMPLATE
        .replace_all(text, |caps: &regex::Captures| {
            let whole = caps.get(0).unwrap().as_str();
            resolve(&whole[2..whole.len() - 2])
        })
        .into_owned()
}

type Rule = fn(&str) -> Option<String>;

/// Fixed evaluation order; the first matching rule wins.
const RULES: &[Rule] = &[
    date_rule,
    ordinal_rule,
    formatnum_rule,
    century_rule,
    century_range_rule,
    hours_rule,
    unit_rule,
    reference_marker_rule,
    av_jc_rule,
    incise_rule,
    lang_rule,
    citation_rule,
    roman_numeral_rule,
    comma_rule,
    link_note_rule,
    lang_code_rule,
];

/// Resolves one template body to plain text, or [`UNRESOLVED`].
pub fn resolve(body: &str) -> String {
    for rule in RULES {
        if let Some(out) = rule(body) {
            return out;
        }
    }
    UNRESOLVED.to_string()
}

/// `"I"` becomes `"Ier"`, every other token gets a trailing `"e"`.
fn ordinalize(token: &str) -> String {
    if token == "I" {
        "Ier".to_string()
    } else {
        format!("{token}e")
    }
}

/// Splits on `|`, drops named (`=`) parameters, rejoins with single spaces.
fn join_positional(params: &str) -> String {
    let kept: Vec<&str> = params.split('|').filter(|p| !p.contains('=')).collect();
    kept.join(" ").trim().to_string()
}

static DATE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[Dd]ate-?( de naissance)? ?").unwrap());

fn date_rule(body: &str) -> Option<String> {
    let m = DATE_TAG.find(body)?;
    Some(join_positional(&body[m.end()..]))
}

static ORDINAL_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(?:[0-9]+|[IVXL]+)es?|[1I](?:er|re|e)s?|èmes?|es?$)").unwrap());

/// Bare ordinal/century tokens like `15e`, `XVes`, `1er`, `Ier`. Pipes become
/// spaces and a trailing `" s"` siècle marker is dropped; otherwise the body
/// passes through unchanged.
fn ordinal_rule(body: &str) -> Option<String> {
    if !ORDINAL_TAG.is_match(body) {
        return None;
    }
    let replaced = body.replace('|', " ");
    Some(replaced.strip_suffix(" s").unwrap_or(&replaced).to_string())
}

static FORMATNUM_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[fF]ormatnum ?: ?[0-9.,]+ ?").unwrap());

fn formatnum_rule(body: &str) -> Option<String> {
    if !FORMATNUM_TAG.is_match(body) {
        return None;
    }
    // only the exact lowercase spelling resolves; other casings produce nothing
    Some(
        body.strip_prefix("formatnum:")
            .map(str::to_string)
            .unwrap_or_default(),
    )
}

static CENTURY_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[sS](?:[Aa][vp])?-?(?: [Mm]ini-?)? ?\|").unwrap());

fn century_rule(body: &str) -> Option<String> {
    let m = CENTURY_TAG.find(body)?;
    let tag = &body[..m.end()];
    let mut century = ordinalize(&body[m.end()..]);

    if !tag.contains(" mini") {
        century.push_str(" siècle");
        if tag.starts_with('-') {
            century.push_str(" av. J.-C.");
        } else if tag.contains("sap") {
            century.push_str(" apr. J.-C.");
        }
    }

    Some(century)
}

static CENTURY_RANGE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[sS](?:2|p)-? ?\|").unwrap());

fn century_range_rule(body: &str) -> Option<String> {
    let m = CENTURY_RANGE_TAG.find(body)?;
    let tag = &body[..m.end()];
    let dates: Vec<&str> = body[m.end()..].split('|').collect();
    let mut result = String::new();

    if tag.contains("s2") {
        if dates.len() > 1 {
            result = format!("{} et {} siècles", ordinalize(dates[0]), ordinalize(dates[1]));
        } else {
            debug!(body, "century range template without two dates");
        }
    } else if tag.contains("sp") && dates.len() >= 3 {
        let first = ordinalize(dates[0]);
        let second = ordinalize(dates[2]);

        result = first;
        match dates[1] {
            "ou" => {
                result.push_str(" ou ");
                result.push_str(&second);
            }
            "au" => {
                result.push_str(" au ");
                result.push_str(&second);
            }
            "-" => {
                result.push_str(" - ");
                result.push_str(&second);
            }
            _ => {}
        }
        result.push_str(" siècle");
        if dates.last() == Some(&"s") {
            result.push('s');
        }
    }

    if tag.starts_with('-') {
        result.push_str(" av. J.-C.");
    }
    Some(result)
}

static HOURS_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[hH]eures? ?\|").unwrap());

fn hours_rule(body: &str) -> Option<String> {
    let m = HOURS_TAG.find(body)?;
    let values: Vec<&str> = body[m.end()..]
        .split('|')
        .filter(|v| !v.contains('='))
        .collect();

    let units = ["h", "min", "s"];
    let mut result = String::new();
    for (i, value) in values.iter().enumerate() {
        if !value.is_empty() {
            result.push_str(value);
            result.push(' ');
            result.push_str(units.get(i).copied().unwrap_or(""));
            result.push(' ');
        }
    }
    Some(result.trim_end().to_string())
}

static UNIT_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[Uu]nité(?:/2)?|[Nn]b|[Nn]ombre|[Nn]obr(?: [Rr]omains?)?) ?\|").unwrap()
});

fn unit_rule(body: &str) -> Option<String> {
    let m = UNIT_TAG.find(body)?;
    Some(join_positional(&body[m.end()..]))
}

static REFERENCE_MARKER_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[Nn]°|[Nn]uméros?|p\.|[vV]ol\.|§)").unwrap());

/// `n°`, `numéro`, `p.`, `vol.`, `§`: raw passthrough of the whole body with
/// pipes replaced by spaces, named parameters included.
fn reference_marker_rule(body: &str) -> Option<String> {
    if !REFERENCE_MARKER_TAG.is_match(body) {
        return None;
    }
    Some(body.replace('|', " "))
}

static AV_JC_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[aA]v JC ?").unwrap());

fn av_jc_rule(body: &str) -> Option<String> {
    if !AV_JC_TAG.is_match(body) {
        return None;
    }
    Some("av. J.-C. ".to_string())
}

static INCISE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[Ii]ncise ?\|").unwrap());

fn incise_rule(body: &str) -> Option<String> {
    let m = INCISE_TAG.find(body)?;
    let rest = &body[m.end()..];
    Some(match rest.find('|') {
        Some(pipe) => format!("— {}", &rest[..pipe]),
        None => format!("— {rest} —"),
    })
}

static LANG_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[Ll]ang(?:ue|-.{1,4})?.*?\|").unwrap());

fn lang_rule(body: &str) -> Option<String> {
    let m = LANG_TAG.find(body)?;
    let tag = body[..m.end()].to_lowercase();
    let rest = &body[m.end()..];
    let mut result = String::new();

    if tag == "lang|" || tag == "langue|" {
        // up to four positional segments; pipes past the third are dropped
        let mut segments = [String::new(), String::new(), String::new(), String::new()];
        let mut index = 0;
        for ch in rest.chars() {
            if ch == '|' {
                if index < 3 {
                    index += 1;
                }
            } else {
                segments[index].push(ch);
            }
        }

        let [first, second, third, _] = &segments;
        result = if first == "rtl" || first == "ltr" {
            third.clone()
        } else {
            second.clone()
        };
        if !third.is_empty() && third.contains("trans=") {
            let translation: String = third.chars().skip(6).collect();
            result.push_str(&format!(" ({translation})"));
        }
    } else if tag.contains('-') {
        result.push_str(rest);
    }

    if result.contains("texte=") {
        return Some(result.chars().skip(6).collect());
    }
    Some(result)
}

static CITATION_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[Cc]ita(?:tion)? ?(?: étrangère)?(?: bloc)? ?\|").unwrap());
static CITATION_EDGE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[Dd]ébut|[Ff]in) {1,2}[Cc]ita(?:tion)?").unwrap());

fn citation_rule(body: &str) -> Option<String> {
    let m = CITATION_TAG
        .find(body)
        .or_else(|| CITATION_EDGE_TAG.find(body))?;
    let tag = &body[..m.end()];
    let lowered = tag.to_lowercase();

    if lowered.contains("début") {
        return Some("« ".to_string());
    }
    if lowered.contains("fin") {
        return Some(" »".to_string());
    }

    let rest = &body[m.end()..];
    let quoted = if tag.contains("étrangère") {
        // two segments; prefer the second when the first is a lang= parameter
        let mut split = rest.splitn(3, '|');
        let first = split.next().unwrap_or("");
        let second = split.next().unwrap_or("");
        if first.contains("lang") && first.contains('=') {
            second
        } else {
            first
        }
    } else {
        rest.split('|').next().unwrap_or("")
    };

    if tag.contains("bloc") {
        Some(format!("\n« {quoted} »"))
    } else {
        Some(format!("« {quoted} »"))
    }
}

fn roman_numeral_rule(body: &str) -> Option<String> {
    if !body.is_empty() && body.chars().all(|c| matches!(c, 'I' | 'V' | 'X' | 'L')) {
        Some(body.to_string())
    } else {
        None
    }
}

fn comma_rule(body: &str) -> Option<String> {
    if body == "," {
        Some(String::new())
    } else {
        None
    }
}

static LINK_NOTE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[Ll]ien (?:web|brisé)|[Nn]otes?|[Aa]rticles?) ?\|").unwrap());

fn link_note_rule(body: &str) -> Option<String> {
    if LINK_NOTE_TAG.is_match(body) {
        Some(String::new())
    } else {
        None
    }
}

fn lang_code_rule(body: &str) -> Option<String> {
    LANG_CODES
        .iter()
        .find(|(code, _)| *code == body)
        .map(|(_, display)| display.to_string())
}

/// Language-code templates and their bracketed display forms, matched exactly
/// and in table order.
#[rustfmt::skip]
const LANG_CODES: &[(&str, &str)] = &[
    ("ab", "(ab)"), ("ace", "(ace)"), ("ach", "(ach)"), ("ady", "(ady)"), ("aa", "(aa)"),
    ("af", "(af)"), ("sq", "(sq)"), ("de", "(de)"), ("pdc", "(pdc)"), ("gsw", "(gsw)"),
    ("zgh", "(zgh)"), ("am", "(am)"), ("en", "(en)"), ("en-us", "(en-US)"), ("en-gb", "(en-GB)"),
    ("simple", "(simple)"), ("ar", "(ar)"), ("Ar-Latn", "(ar-Latn)"), ("arz", "(arz)"),
    ("ary", "(ary)"), ("aeb", "(aeb)"), ("an", "(an)"), ("hy", "(hy)"), ("rup", "(rup)"),
    ("as", "(as)"), ("ast", "(ast)"), ("atj", "(atj)"), ("ae", "(ae)"), ("ay", "(ay)"),
    ("az", "(az)"), ("ba", "(ba)"), ("bm", "(bm)"), ("map-bms", "(map-bms)"), ("nds", "(nds)"),
    ("nds-nl", "(nds-NL)"), ("eu", "(eu)"), ("bar", "(bar)"), ("bia", "(bia)"), ("bn", "(bn)"),
    ("bi", "(bi)"), ("bcl", "(bcl)"), ("be", "(be)"), ("be-tarask", "(be-tarask)"), ("bh", "(bh)"),
    ("my", "(my)"), ("bpy", "(bpy)"), ("lang:nb", "(nb)"), ("bs", "(bs)"), ("Bua", "(bua)"),
    ("bxu", "(bxu)"), ("bxm", "(bxm)"), ("bxr", "(bxr)"), ("br", "(br)"), ("bg", "(bg)"),
    ("ks", "(ks)"), ("yue", "(yue)"), ("osp", "(osp)"), ("ca", "(ca)"), ("ceb", "(ceb)"),
    ("ch", "(ch)"), ("shy", "(shy)"), ("cbk", "(cbk)"), ("ny", "(ny)"), ("zh", "(zh)"),
    ("lzh", "(lzh)"), ("zh-hans", "(zh-Hans)"), ("zh-hant", "(zh-Hant)"), ("zh-cn", "(zh-CN)"),
    ("zh-hk", "(zh-HK)"), ("zh-mo", "(zh-MO)"), ("zh-sg", "(zh-SG)"), ("zh-tw", "(zh-TW)"),
    ("si", "(si)"), ("kw", "(kw)"), ("co", "(co)"), ("ko", "(ko)"), ("mus", "(mus)"),
    ("kea", "(kea)"), ("gcf", "(gcf)"), ("ht", "(ht)"), ("lou", "(lou)"), ("crs", "(crs)"),
    ("cpf", "(cpf)"), ("cr", "(cr)"), ("hr", "(hr)"), ("dak", "(dak)"), ("uhn", "(uhn)"),
    ("da", "(da)"), ("prs", "(prs)"), ("dta", "(dta)"), ("dyu", "(dyu)"), ("dz", "(dz)"),
    ("myv", "(myv)"), ("es", "(es)"), ("eo", "(eo)"), ("et", "(et)"), ("Ekk", "(ekk)"),
    ("ext", "(ext)"), ("eto", "(eto)"), ("ee", "(ee)"), ("fo", "(fo)"), ("fj", "(fj)"),
    ("fil", "(fil)"), ("fi", "(fi)"), ("vls", "(vls)"), ("fr", "(fr)"), ("fr1835", "(fr1835)"),
    ("frm", "(frm)"), ("fro", "(fro)"), ("fr-be", "(fr-BE)"), ("frp", "(frp)"), ("fur", "(fur)"),
    ("fy", "(fy)"), ("gag", "(gag)"), ("gd", "(gd)"), ("gl", "(gl)"), ("fra-gal", "(fra-gal)"),
    ("cy", "(cy)"), ("gil", "(gil)"), ("got", "(got)"), ("grc", "(grc)"), ("el", "(el)"),
    ("pnt", "(pnt)"), ("kl", "(kl)"), ("gn", "(gn)"), ("gez", "(gez)"), ("gu", "(gu)"),
    ("ka", "(ka)"), ("hak", "(hak)"), ("ha", "(ha)"), ("mey", "(mey)"), ("hsb", "(hsb)"),
    ("haw", "(haw)"), ("he", "(he)"), ("hz", "(hz)"), ("hi", "(hi)"), ("hif", "(hif)"),
    ("hu", "(hu)"), ("io", "(io)"), ("ig", "(ig)"), ("ilo", "(ilo)"), ("id", "(id)"),
    ("ia", "(ia)"), ("ie", "(ie)"), ("iu", "(iu)"), ("ik", "(ik)"), ("ga", "(ga)"),
    ("is", "(is)"), ("it", "(it)"), ("ja", "(ja)"), ("ja-Latn", "(ja-Latn)"), ("jv", "(jv)"),
    ("nrf", "(nrf)"), ("tmr", "(tmr)"), ("lad", "(lad)"), ("kbd", "(kbd)"), ("kab", "(kab)"),
    ("kn", "(kn)"), ("kaa", "(kaa)"), ("kk", "(kk)"), ("kk-Arab", "(kk-Arab)"),
    ("kk-Cyrl", "(kk-Cyrl)"), ("kk-Latn", "(kk-Latn)"), ("km", "(km)"), ("naq", "(naq)"),
    ("kg", "(kg)"), ("ki", "(ki)"), ("rw", "(rw)"), ("ky", "(ky)"), ("run", "(run)"),
    ("ksh", "(ksh)"), ("ku", "(ku)"), ("kmr", "(kmr)"), ("lld", "(lld)"), ("lo", "(lo)"),
    ("la", "(la)"), ("lv", "(lv)"), ("li", "(li)"), ("ln", "(ln)"), ("lt", "(lt)"),
    ("lob", "(lob)"), ("lmo", "(lmo)"), ("lua", "(lua)"), ("luo", "(luo)"), ("lb", "(lb)"),
    ("mk", "(mk)"), ("mk-Cyrl", "(mk-Cyrl)"), ("mk-Latn", "(mk-Latn)"), ("ms", "(ms)"),
    ("xmm", "(xmm)"), ("ml", "(ml)"), ("mg", "(mg)"), ("mt", "(mt)"), ("dv", "(dv)"),
    ("Cmn", "(cmn)"), ("mnc", "(mnc)"), ("gv", "(gv)"), ("lang:mi", "(mi)"), ("rar", "(rar)"),
    ("lang:mr", "(mr)"), ("mhr", "(mhr)"), ("mrq", "(mrq)"), ("mqm", "(mqm)"), ("mh", "(mh)"),
    ("nan", "(nan)"), ("mwl", "(mwl)"), ("moh", "(moh)"), ("mo", "(ro)"), ("mn", "(mn)"),
    ("mn-Cyrl", "(mn-Cyrl)"), ("mn-Latn", "(mn-Latn)"), ("mn-Mong", "(mn-Mong)"), ("mvf", "(mvf)"),
    ("cnr", "(cnr)"), ("cnr-Cyrl", "(cnr-Cyrl)"), ("cnr-Latn", "(cnr-Latn)"), ("mug", "(mug)"),
    ("mga", "(mga)"), ("nah", "(nah)"), ("nap", "(nap)"), ("na", "(na)"), ("nv", "(nv)"),
    ("nd", "(nd)"), ("nr", "(nr)"), ("nl", "(nl)"), ("nl-be", "(nl-BE)"), ("ne", "(ne)"),
    ("new", "(new)"), ("niu", "(niu)"), ("fra-nor", "(fra-nor)"), ("no", "(no)"), ("nn", "(nn)"),
    ("oc", "(oc)"), ("or", "(or)"), ("om", "(om)"), ("os", "(os)"), ("ug", "(ug)"),
    ("ur", "(ur)"), ("uz", "(uz)"), ("ps", "(ps)"), ("pi", "(pi)"), ("pau", "(pau)"),
    ("pam", "(pam)"), ("pap", "(pap)"), ("prk", "(prk)"), ("pa", "(pa)"), ("fa", "(fa)"),
    ("ff", "(ff)"), ("pcd", "(pcd)"), ("pms", "(pms)"), ("pl", "(pl)"), ("pt", "(pt)"),
    ("pt-br", "(pt-BR)"), ("qu", "(qu)"), ("rap", "(rap)"), ("rm", "(rm)"), ("rmy", "(rmy)"),
    ("ro", "(ro)"), ("ru", "(ru)"), ("ru-Latn", "(ru-Latn)"), ("rue", "(rue)"),
    ("orv-olr", "(orv-olr)"), ("slr", "(slr)"), ("smi", "(smi)"), ("se", "(se)"), ("sm", "(sm)"),
    ("sgs", "(sgs)"), ("sg", "(sg)"), ("sa", "(sa)"), ("sc", "(sc)"), ("sco", "(sco)"),
    ("sr", "(sr)"), ("sh", "(sh)"), ("sn", "(sn)"), ("scn", "(scn)"), ("szl", "(szl)"),
    ("sd", "(sd)"), ("sk", "(sk)"), ("sl", "(sl)"), ("so", "(so)"), ("snk", "(snk)"),
    ("ckb", "(ckb)"), ("nso", "(nso)"), ("st", "(st)"), ("su", "(su)"), ("sv", "(sv)"),
    ("gsw-ch", "(gsw-CH)"), ("sw", "(sw)"), ("syr", "(syr)"), ("tg", "(tg)"), ("tl", "(tl)"),
    ("ty", "(ty)"), ("ber", "(ber)"), ("ta", "(ta)"), ("tt", "(tt)"), ("crh", "(crh)"),
    ("tsg", "(tsg)"), ("cv", "(cv)"), ("cs", "(cs)"), ("ce", "(ce)"), ("te", "(te)"),
    ("tet", "(tet)"), ("th", "(th)"), ("bo", "(bo)"), ("ti", "(ti)"), ("tpi", "(tpi)"),
    ("tokipona", "(tokipona)"), ("to", "(to)"), ("als", "(als)"), ("tyv", "(tyv)"),
    ("ts", "(ts)"), ("tn", "(tn)"), ("tr", "(tr)"), ("ota", "(ota)"), ("tk", "(tk)"),
    ("tvl", "(tvl)"), ("tw", "(tw)"), ("uk", "(uk)"), ("lang:ve", "(ve)"), ("vec", "(vec)"),
    ("ang", "(ang)"), ("sga", "(sga)"), ("vi", "(vi)"), ("lang:non", "(non)"), ("otk", "(otk)"),
    ("vo", "(vo)"), ("vro", "(vro)"), ("wls", "(wls)"), ("wa", "(wa)"), ("war", "(war)"),
    ("woe", "(woe)"), ("wo", "(wo)"), ("wuu", "(wuu)"), ("xh", "(xh)"), ("sjo", "(sjo)"),
    ("yak", "(yak)"), ("ii", "(ii)"), ("yi", "(yi)"), ("yo", "(yo)"), ("zza", "(zza)"),
    ("zea", "(zea)"), ("za", "(za)"), ("zu", "(zu)"),
];
