//! Whole-document rewriting passes applied after tree conversion.
//!
//! The chain runs in a fixed order. Each pass takes the entire document and
//! returns the entire document:
//!
//! 1. `unescape`: quote pairing, dashes, ellipsis, entity decoding.
//! 2. `math`: `$$..$$` and `$..$` delimiters and math macro aliases.
//! 3. `image`: blocks holding a lone `<img>` become figures.
//! 4. `table`: `<table>` blocks and pipe tables become tabular environments.
//! 5. `link`: `<a>` anchors become `\href` / `\url`.
//!
//! The image, table and link passes need their passthrough tags verbatim, so
//! `unescape` and `math` only touch text outside markup tags.

/// Image passthrough rewriting.
pub mod image;
/// Anchor passthrough rewriting.
pub mod link;
/// Math delimiter normalization.
pub mod math;
/// Table passthrough and pipe-table rewriting.
pub mod table;
/// Entity and typography normalization.
pub mod unescape;

use once_cell::sync::Lazy;
use regex::Regex;
use texmark_core::TexmarkError;

/// Blocks are separated by a blank line.
pub const BLOCK_SEPARATOR: &str = "\n\n";

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*)?/?>").expect("markup tag pattern")
});
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s([A-Za-z][A-Za-z0-9_:-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("attribute pattern")
});

/// Signature shared by every pass.
pub type PassFn = fn(&str) -> Result<String, TexmarkError>;

/// A named whole-document rewrite.
#[derive(Clone, Copy)]
pub struct Pass {
    /// Name used in logs.
    pub name: &'static str,
    /// The rewrite itself.
    pub run: PassFn,
}

impl std::fmt::Debug for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pass").field("name", &self.name).finish()
    }
}

const STANDARD_PASSES: [Pass; 5] = [
    Pass {
        name: "unescape",
        run: unescape::unescape,
    },
    Pass {
        name: "math",
        run: math::math,
    },
    Pass {
        name: "image",
        run: image::images,
    },
    Pass {
        name: "table",
        run: table::tables,
    },
    Pass {
        name: "link",
        run: link::links,
    },
];

/// The ordered postprocessing chain.
#[derive(Debug, Clone, Copy)]
pub struct Postprocessor {
    passes: &'static [Pass],
}

impl Postprocessor {
    /// The standard chain: unescape, math, image, table, link.
    pub const fn standard() -> Self {
        Self {
            passes: &STANDARD_PASSES,
        }
    }

    /// Passes in execution order.
    pub fn passes(&self) -> &[Pass] {
        self.passes
    }

    /// Runs every pass in order, each consuming the previous one's output.
    pub fn run(&self, text: &str) -> Result<String, TexmarkError> {
        let mut current = text.to_string();
        for pass in self.passes {
            log::debug!("postprocess pass `{}` on {} bytes", pass.name, current.len());
            current = (pass.run)(&current)?;
        }
        Ok(current)
    }
}

impl Default for Postprocessor {
    fn default() -> Self {
        Self::standard()
    }
}

/// Splits on blank lines, lets `rewrite` replace individual blocks, and
/// joins the result back together. `None` keeps a block unchanged.
pub(crate) fn map_blocks<F>(text: &str, mut rewrite: F) -> Result<String, TexmarkError>
where
    F: FnMut(usize, &str) -> Result<Option<String>, TexmarkError>,
{
    let mut blocks = Vec::new();
    for (index, block) in text.split(BLOCK_SEPARATOR).enumerate() {
        match rewrite(index, block)? {
            Some(replacement) => blocks.push(replacement),
            None => blocks.push(block.to_string()),
        }
    }
    Ok(blocks.join(BLOCK_SEPARATOR))
}

/// Applies `rewrite` to the text between markup tags, leaving the tags
/// (and their attribute values) untouched.
pub(crate) fn map_outside_tags<F>(text: &str, mut rewrite: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for tag in MARKUP_TAG.find_iter(text) {
        out.push_str(&rewrite(&text[last..tag.start()]));
        out.push_str(tag.as_str());
        last = tag.end();
    }
    out.push_str(&rewrite(&text[last..]));
    out
}

/// Reads an attribute from a start tag, decoding HTML entities.
pub(crate) fn tag_attribute(tag: &str, name: &str) -> Option<String> {
    ATTRIBUTE
        .captures_iter(tag)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)))
        .map(|value| html_escape::decode_html_entities(value.as_str()).into_owned())
}
