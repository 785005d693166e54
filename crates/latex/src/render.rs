//! Tree-to-text conversion from the document tree to LaTeX fragments.
//!
//! Rendering is post-order: a node's own text and its children are rendered
//! first, then the tag rule wraps that subcontent, then the escaped tail is
//! appended. Tables, images and links are re-emitted as small passthrough
//! tags that the postprocessing chain rewrites later.

use crate::postprocess::map_outside_tags;
use html_escape::encode_double_quoted_attribute;
use texmark_core::{Element, Tag, TexmarkError, escape_latex};

/// Widest `colspan` accepted, the same cap browsers apply.
pub const MAX_COLSPAN: usize = 1000;

const MAKETITLE: &str = "
% ----------------------------------------------------------------
\\maketitle
% ----------------------------------------------------------------
";

const HORIZONTAL_RULE: &str = r"\noindent\makebox[\linewidth]{\rule{\linewidth}{0.4pt}}";

/// Renders a whole document and replaces it with the marked plaintext body
/// the postprocessing chain expects.
pub fn render_document(root: Element) -> Result<String, TexmarkError> {
    let rendered = render(&root)?;
    Ok(root.into_plaintext(rendered).to_marked_text())
}

/// Recursively renders a node (and its tail) to LaTeX.
pub fn render(node: &Element) -> Result<String, TexmarkError> {
    let mut subcontent = String::new();
    if let Some(text) = &node.text {
        match node.tag {
            // A hand-written table still goes through the table pass, so its
            // cell text is escaped here like any other document text.
            Tag::Raw if is_table_markup(text) => {
                subcontent.push_str(&map_outside_tags(text, escape_latex));
            }
            Tag::Raw | Tag::Plaintext => subcontent.push_str(text),
            _ => subcontent.push_str(&escape_latex(text)),
        }
    }
    for child in &node.children {
        subcontent.push_str(&render(child)?);
    }

    let mut buffer = render_tag(node, subcontent)?;

    if let Some(tail) = &node.tail {
        buffer.push_str(&escape_latex(tail));
    }
    Ok(buffer)
}

fn render_tag(node: &Element, subcontent: String) -> Result<String, TexmarkError> {
    let out = match &node.tag {
        Tag::H1 => format!("\n\\title{{{subcontent}}}\n{MAKETITLE}"),
        Tag::H2 => format!("\n\n\\section{{{subcontent}}}\n"),
        Tag::H3 => format!("\n\n\\subsection{{{subcontent}}}\n"),
        Tag::H4 => format!("\n\\subsubsection{{{subcontent}}}\n"),
        Tag::Hr => format!("\n{HORIZONTAL_RULE}\n"),
        Tag::Ul => format!("\n\\begin{{itemize}}{subcontent}\n\\end{{itemize}}\n"),
        Tag::Ol => {
            let mut out = String::from("\\begin{enumerate}");
            if let Some(start) = node.get("start") {
                let counter = start
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(|first| first.checked_sub(1))
                    .ok_or_else(|| TexmarkError::malformed_attribute("ol", "start", start))?;
                out.push_str(&format!("\\setcounter{{enumi}}{{{counter}}}"));
            }
            out.push_str(&format!("\n{subcontent}\n\\end{{enumerate}}\n"));
            out
        }
        Tag::Li => format!("\n  \\item {}", subcontent.trim()),
        Tag::Blockquote => format!(
            "\n\\begin{{quotation}}\n{}\n\\end{{quotation}}\n",
            subcontent.trim()
        ),
        Tag::Pre => format!(
            "\n\\begin{{verbatim}}\n{}\n\\end{{verbatim}}\n",
            subcontent.trim()
        ),
        Tag::Q => format!("`{}'", subcontent.trim()),
        Tag::P => format!("\n{}\n", subcontent.trim()),
        Tag::Sup => format!("\\footnote{{{}}}", subcontent.trim()),
        Tag::Strong => format!("\\textbf{{{}}}", subcontent.trim()),
        Tag::Em => format!("\\emph{{{}}}", subcontent.trim()),
        Tag::Table => format!("\n\n<table>{subcontent}</table>\n\n"),
        Tag::Thead | Tag::Tbody | Tag::Tr => {
            let name = node.tag.name();
            format!("<{name}>{subcontent}</{name}>")
        }
        Tag::Th | Tag::Td => {
            let name = node.tag.name();
            match node.get("colspan") {
                Some(colspan) => {
                    let span = parse_colspan(name, colspan)?;
                    format!("<{name} colspan=\"{span}\">{subcontent}</{name}>")
                }
                None => format!("<{name}>{subcontent}</{name}>"),
            }
        }
        Tag::Img => format!(
            "<img src=\"{}\" alt=\"{}\" />",
            encode_double_quoted_attribute(node.get("src").unwrap_or_default()),
            encode_double_quoted_attribute(&escape_latex(node.get("alt").unwrap_or_default())),
        ),
        Tag::A => format!(
            "<a href=\"{}\">{subcontent}</a>",
            encode_double_quoted_attribute(&escape_latex(node.get("href").unwrap_or_default())),
        ),
        Tag::Root | Tag::Raw | Tag::Plaintext | Tag::Other(_) => subcontent,
    };
    Ok(out)
}

/// Parses a `colspan` attribute; zero, non-numeric and spans wider than
/// [`MAX_COLSPAN`] are rejected.
pub fn parse_colspan(tag: &str, value: &str) -> Result<usize, TexmarkError> {
    match value.trim().parse::<usize>() {
        Ok(span) if (1..=MAX_COLSPAN).contains(&span) => Ok(span),
        _ => Err(TexmarkError::malformed_attribute(tag, "colspan", value)),
    }
}

fn is_table_markup(text: &str) -> bool {
    text.trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("<table"))
}
