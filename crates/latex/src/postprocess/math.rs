use super::map_outside_tags;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use texmark_core::TexmarkError;

static DISPLAY_MATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\$([^$]*)\$\$").expect("display math pattern"));
static INLINE_MATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([^$]*)\$").expect("inline math pattern"));

/// Macro aliases rewritten inside math spans.
static ALIASES: Lazy<[(Regex, &'static str); 3]> = Lazy::new(|| {
    [
        (Regex::new(r"\\lt\b").expect("lt alias"), "<"),
        (Regex::new(r" \* ").expect("cdot alias"), r" \cdot "),
        (Regex::new(r"\\del\b").expect("del alias"), r"\partial"),
    ]
});

/// Rewrites `$$..$$` to `\[..\]` and `$..$` to `\(..\)`.
///
/// Delimiters are not nested. Text inside markup tags is left alone, so a
/// dollar sign in a link target or image path stays a dollar sign.
pub fn math(text: &str) -> Result<String, TexmarkError> {
    Ok(map_outside_tags(text, |segment| {
        let display = DISPLAY_MATH.replace_all(segment, |caps: &Captures<'_>| {
            format!(r"\[{}\]", expand_aliases(&caps[1]))
        });
        INLINE_MATH
            .replace_all(&display, |caps: &Captures<'_>| {
                format!(r"\({}\)", expand_aliases(&caps[1]))
            })
            .into_owned()
    }))
}

fn expand_aliases(body: &str) -> String {
    ALIASES
        .iter()
        .fold(body.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_display_and_inline_delimiters() {
        assert_eq!(
            math("see $x^2$ and\n$$\ny = 1\n$$\n").unwrap(),
            "see \\(x^2\\) and\n\\[\ny = 1\n\\]\n"
        );
    }

    #[test]
    fn expands_aliases_inside_math_only() {
        assert_eq!(
            math(r"$a \lt b * c$ and $\del f$").unwrap(),
            r"\(a < b \cdot c\) and \(\partial f\)"
        );
        assert_eq!(math("2 * 3 outside").unwrap(), "2 * 3 outside");
    }

    #[test]
    fn longer_control_words_are_kept() {
        assert_eq!(math(r"$\delta + \ltimes$").unwrap(), r"\(\delta + \ltimes\)");
    }

    #[test]
    fn dollars_inside_tags_are_kept() {
        let text = r#"<a href="http://x.test/$1$">price</a>"#;
        assert_eq!(math(text).unwrap(), text);
    }

    #[test]
    fn is_idempotent() {
        let once = math("$$a * b$$ then $c$").unwrap();
        assert_eq!(math(&once).unwrap(), once);
    }
}
