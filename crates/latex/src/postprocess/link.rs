use super::{map_blocks, tag_attribute};
use once_cell::sync::Lazy;
use regex::Regex;
use texmark_core::TexmarkError;

static ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(<a\b[^<>]*>)(.*?)</a>").expect("anchor pattern"));
static ANCHOR_OPENER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<a(?:\s[^<>]*)?>").expect("anchor opener pattern"));

/// Rewrites every `<a href="..">text</a>` span in place. A link whose text
/// equals its target becomes `\url{..}`, any other becomes `\href{..}{..}`.
/// An anchor left without its closing tag is an error.
pub fn links(text: &str) -> Result<String, TexmarkError> {
    map_blocks(text, |index, block| {
        if !block.contains("<a") {
            return Ok(None);
        }
        let mut out = String::with_capacity(block.len());
        let mut last = 0;
        for caps in ANCHOR.captures_iter(block) {
            let (Some(anchor), Some(open), Some(label)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            out.push_str(&block[last..anchor.start()]);
            let label = label.as_str().trim();
            let href = tag_attribute(open.as_str(), "href");
            match href {
                Some(href) if !label.is_empty() => out.push_str(&link_command(&href, label)),
                _ => {
                    return Err(TexmarkError::UnresolvableLink {
                        block: index,
                        anchor: anchor.as_str().to_string(),
                    });
                }
            }
            last = anchor.end();
        }
        out.push_str(&block[last..]);
        if let Some(opener) = ANCHOR_OPENER.find(&out) {
            return Err(TexmarkError::UnresolvableLink {
                block: index,
                anchor: opener.as_str().to_string(),
            });
        }
        Ok(Some(out))
    })
}

fn link_command(href: &str, label: &str) -> String {
    if href == label {
        format!("\\url{{{href}}}")
    } else {
        format!("\\href{{{href}}}{{{label}}}")
    }
}
