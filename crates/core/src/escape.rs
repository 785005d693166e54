//! Text normalization between markdown text and LaTeX body content.
//!
//! Two entry points are used by the converter and the postprocessing chain:
//!
//! - [`escape_latex`] runs once over every piece of literal document text.
//! - [`typography`] runs over the whole rendered document, where inline HTML
//!   and entity references that bypassed the converter are still present.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static START_SINGLE_QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(^|\s|")'"#).expect("opening single quote pattern"));
static START_DOUBLE_QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(^|\s|'|`)""#).expect("opening double quote pattern"));
static END_DOUBLE_QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(,|\.|\s|$)"#).expect("closing double quote pattern"));

static ENTITY_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#?[A-Za-z0-9]+;").expect("entity reference pattern"));

/// Entity pairs rewritten to `\enquote{...}`, applied in this order.
static QUOTE_PAIRS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        ("&ldquo;", "&rdquo;"),
        ("&lsquo;", "&rsquo;"),
        ("&ldquo;", "&ldquo;"),
        ("&laquo;", "&raquo;"),
    ]
    .iter()
    .map(|(open, close)| {
        Regex::new(&format!("(?s){open}(.*?){close}")).expect("quote pair pattern")
    })
    .collect()
});

/// Typographic characters carried as named entities through the converter.
const TYPOGRAPHIC_ENTITIES: [(char, &str); 9] = [
    ('\u{201c}', "&ldquo;"),
    ('\u{201d}', "&rdquo;"),
    ('\u{2018}', "&lsquo;"),
    ('\u{2019}', "&rsquo;"),
    ('\u{ab}', "&laquo;"),
    ('\u{bb}', "&raquo;"),
    ('\u{2026}', "&hellip;"),
    ('\u{2013}', "&ndash;"),
    ('\u{2014}', "&mdash;"),
];

/// Ellipsis control sequence; the empty group keeps a following word apart.
pub const DOTS: &str = r"\dots{}";

/// An ampersand the escaper already turned into literal text.
const ESCAPED_AMPERSAND: &str = r"\&";
/// Private-use stand-in for [`ESCAPED_AMPERSAND`] while entity rules run.
const AMPERSAND_GUARD: &str = "\u{e003}";

/// Decodes the four entities markdown emits for reserved HTML characters.
///
/// `&amp;` is decoded last so `&amp;lt;` yields `&lt;` and not `<`.
pub fn decode_basic_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Makes literal document text safe to embed as LaTeX body content.
///
/// Entities are decoded before escaping, so an `&` that arrives as `&amp;`
/// is escaped like any other. Typographic characters come out as named
/// entities for [`typography`] to pair up later.
pub fn escape_latex(text: &str) -> String {
    let out = decode_basic_entities(text)
        .replace('%', r"\%")
        .replace('&', r"\&")
        .replace('#', r"\#");
    let out = START_SINGLE_QUOTE.replace_all(&out, "${1}`");
    let out = START_DOUBLE_QUOTE.replace_all(&out, "${1}``");
    let out = END_DOUBLE_QUOTE.replace_all(&out, "''${1}");
    encode_typographic(&out).into_owned()
}

/// Re-encodes curly quotes, guillemets, ellipsis and dashes as named
/// entities. The markdown parser decodes character references, this puts
/// them back in the form the typography rules match on.
pub fn encode_typographic(text: &str) -> Cow<'_, str> {
    if !text.contains(|c: char| TYPOGRAPHIC_ENTITIES.iter().any(|(ch, _)| *ch == c)) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match TYPOGRAPHIC_ENTITIES.iter().find(|(ch, _)| *ch == c) {
            Some((_, entity)) => out.push_str(entity),
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Applies quote pairing and dash/ellipsis substitution.
///
/// A quote entity is rewritten only when its closing partner follows in the
/// same text; unmatched entities are left for [`decode_entities`]. Entity
/// text behind an escaped `\&` is literal and stays as it is.
pub fn typography(text: &str) -> String {
    skip_escaped_ampersands(text, |text| {
        let mut out = text.to_string();
        for pair in QUOTE_PAIRS.iter() {
            if let Cow::Owned(replaced) = pair.replace_all(&out, r"\enquote{${1}}") {
                out = replaced;
            }
        }
        out.replace("...", DOTS)
            .replace("&hellip;", DOTS)
            .replace("&ndash;", "--")
            .replace("&mdash;", "---")
    })
}

/// Decodes any remaining HTML entity references.
///
/// Only `;`-terminated references are touched, so an escaped `\&` followed
/// by a word is never mistaken for a legacy entity, and `\&copy;` stays
/// literal text.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if text.contains(ESCAPED_AMPERSAND) {
        return Cow::Owned(skip_escaped_ampersands(text, |text| {
            decode_references(text).into_owned()
        }));
    }
    decode_references(text)
}

fn decode_references(text: &str) -> Cow<'_, str> {
    ENTITY_REFERENCE.replace_all(text, |caps: &regex::Captures<'_>| {
        html_escape::decode_html_entities(&caps[0]).into_owned()
    })
}

/// Hides every `\&` from `rewrite` and puts it back afterwards.
fn skip_escaped_ampersands(text: &str, rewrite: impl FnOnce(&str) -> String) -> String {
    if !text.contains(ESCAPED_AMPERSAND) {
        return rewrite(text);
    }
    rewrite(&text.replace(ESCAPED_AMPERSAND, AMPERSAND_GUARD))
        .replace(AMPERSAND_GUARD, ESCAPED_AMPERSAND)
}
