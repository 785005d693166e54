//! Wraps a converted body in the fixed LaTeX preamble.

use once_cell::sync::Lazy;
use regex::Regex;
use texmark_core::escape_latex;

/// Packages and settings every generated document starts with.
pub const PREAMBLE: &str = r"\documentclass{article}
\usepackage[utf8]{inputenc}
\usepackage{graphicx}
\usepackage[export]{adjustbox}
\usepackage{float}
\usepackage{enumitem}
\usepackage{quoting}
\usepackage{csquotes}
\usepackage{booktabs}
\usepackage{caption}
\usepackage{siunitx}
\sisetup{
  group-separator = {,},
  output-decimal-marker = {.}
}
\usepackage{hyperref}
";

static PLAINTEXT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?plaintext[^>]*>").expect("plaintext marker pattern"));

/// Removes the `<plaintext>` wrapper left by tree conversion.
pub fn strip_markers(body: &str) -> String {
    PLAINTEXT_MARKER.replace_all(body, "").into_owned()
}

/// Produces a complete, compilable document from a postprocessed body.
pub fn assemble(body: &str, author: &str) -> String {
    let body = strip_markers(body);
    format!(
        "{PREAMBLE}\n\\author{{{}}}\n\n\\begin{{document}}\n\n{}\n\n\\end{{document}}\n",
        escape_latex(author),
        body.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markers_case_insensitively() {
        assert_eq!(strip_markers("<plaintext>\n\nx\n\n</PLAINTEXT>"), "\n\nx\n\n");
    }

    #[test]
    fn wraps_body_in_document() {
        let out = assemble("<plaintext>\n\n\\section{A}\n\n</plaintext>", "Ada & co");
        assert!(out.starts_with("\\documentclass{article}\n"));
        assert!(out.contains("\\usepackage{hyperref}\n\n\\author{Ada \\& co}\n"));
        assert!(out.ends_with("\\begin{document}\n\n\\section{A}\n\n\\end{document}\n"));
    }

    #[test]
    fn preamble_loads_packages_used_by_the_passes() {
        for package in ["[export]{adjustbox}", "{float}", "{csquotes}", "{hyperref}"] {
            assert!(PREAMBLE.contains(package), "missing {package}");
        }
    }
}
