use super::map_outside_tags;
use texmark_core::{TexmarkError, decode_entities, typography};

/// Pairs quote entities, substitutes dashes and ellipsis, then decodes the
/// entities that are left. Markup tags are skipped so passthrough attribute
/// values stay intact for the later passes.
pub fn unescape(text: &str) -> Result<String, TexmarkError> {
    Ok(map_outside_tags(text, |segment| {
        decode_entities(&typography(segment)).into_owned()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_prose() {
        assert_eq!(
            unescape("&ldquo;Hi&rdquo; &ndash; wait... &lt;ok&gt;").unwrap(),
            r"\enquote{Hi} -- wait\dots{} <ok>"
        );
    }

    #[test]
    fn leaves_tag_attributes_alone() {
        let tag = r#"<img src="a&amp;b.png" alt="x...y" />"#;
        assert_eq!(unescape(tag).unwrap(), tag);
    }

    #[test]
    fn is_idempotent() {
        let once = unescape("&ldquo;a&rdquo; &mdash; b &amp; c").unwrap();
        assert_eq!(unescape(&once).unwrap(), once);
    }
}
