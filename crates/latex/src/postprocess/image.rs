use super::{map_blocks, tag_attribute};
use once_cell::sync::Lazy;
use regex::Regex;
use texmark_core::{TexmarkError, decode_entities, typography};

static LONE_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<img\b[^<>]*>$").expect("lone image pattern"));

/// Replaces every block that is exactly one `<img>` tag with a centered
/// figure. Images sharing a block with other content are left as they are.
pub fn images(text: &str) -> Result<String, TexmarkError> {
    map_blocks(text, |_, block| {
        let tag = block.trim();
        if !LONE_IMAGE.is_match(tag) {
            return Ok(None);
        }
        let Some(src) = tag_attribute(tag, "src") else {
            log::warn!("image without `src` left in place: {tag}");
            return Ok(None);
        };
        let alt = tag_attribute(tag, "alt").unwrap_or_default();
        Ok(Some(figure(&src, &alt)))
    })
}

fn figure(src: &str, alt: &str) -> String {
    let mut out = String::from("\\begin{figure}[H]\n\\centering\n");
    out.push_str(&format!("\\includegraphics[max width=\\linewidth]{{{src}}}\n"));
    // The alt text skipped the unescape pass while it was an attribute.
    let caption = decode_entities(&typography(alt)).into_owned();
    if !caption.trim().is_empty() {
        out.push_str(&format!("\\caption{{{}}}\n", caption.trim()));
    }
    out.push_str("\\end{figure}");
    out
}
