use super::map_blocks;
use crate::render::parse_colspan;
use lol_html::{RewriteStrSettings, element, rewrite_str, text};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::cell::RefCell;
use texmark_core::TexmarkError;

static PIPE_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\|.*\|$").expect("pipe row pattern"));
static PIPE_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\|?\s*:?-+:?\s*(\|\s*:?-+:?\s*)*\|?$").expect("pipe separator pattern")
});
/// A tag, or failing that a lone `<`.
static TAG_OR_LESS_THAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</?([A-Za-z][A-Za-z0-9-]*)(?:\s[^<>]*)?/?>|<").expect("inline tag pattern")
});
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new("\u{e000}([0-9]+)\u{e001}").expect("placeholder pattern"));

/// Tags that make up the table grid itself.
const STRUCTURAL_TAGS: [&str; 8] = [
    "table", "caption", "thead", "tbody", "tfoot", "tr", "th", "td",
];
/// Inline tags inside cells that later passes still need to see.
const KEPT_INLINE_TAGS: [&str; 2] = ["a", "img"];
/// Inline formatting tags dropped from cells, keeping their content.
const DROPPED_INLINE_TAGS: [&str; 22] = [
    "abbr", "b", "br", "cite", "code", "del", "div", "em", "font", "i", "ins", "kbd", "mark",
    "p", "q", "s", "small", "span", "strong", "sub", "sup", "u",
];
/// Stands in for a `<` that is cell text rather than markup.
const LESS_THAN: &str = "\u{e002}";

/// Rewrites passthrough `<table>` blocks and pipe-table blocks into
/// `tabular` environments.
pub fn tables(text: &str) -> Result<String, TexmarkError> {
    map_blocks(text, |_, block| {
        let stripped = block.trim();
        if stripped.starts_with("<table") && stripped.ends_with("</table>") {
            return html_table(stripped).map(Some);
        }
        if is_pipe_table(stripped) {
            return pipe_table(stripped).map(Some);
        }
        Ok(None)
    })
}

#[derive(Debug)]
enum TableEvent {
    Row,
    Cell {
        header: bool,
        colspan: Option<String>,
    },
    Caption,
    Text(String),
}

#[derive(Debug)]
struct Cell {
    header: bool,
    span: usize,
    content: String,
}

impl Cell {
    fn to_latex(&self) -> String {
        let content = self.content.trim();
        let content = if self.header {
            format!("\\textbf{{{content}}}")
        } else {
            content.to_string()
        };
        if self.span > 1 {
            format!("\\multicolumn{{{}}}{{|c|}}{{{content}}}", self.span)
        } else {
            content
        }
    }
}

/// Converts a `<table>` passthrough block.
///
/// The column specification is as wide as the widest row, counting each
/// cell's `colspan`.
pub fn html_table(block: &str) -> Result<String, TexmarkError> {
    let (protected, inline_tags) = protect_inline_tags(block);
    let events = RefCell::new(Vec::new());

    rewrite_str(
        &protected,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("tr", |_el| {
                    events.borrow_mut().push(TableEvent::Row);
                    Ok(())
                }),
                element!("th, td", |el| {
                    events.borrow_mut().push(TableEvent::Cell {
                        header: el.tag_name().eq_ignore_ascii_case("th"),
                        colspan: el.get_attribute("colspan"),
                    });
                    Ok(())
                }),
                element!("caption", |_el| {
                    events.borrow_mut().push(TableEvent::Caption);
                    Ok(())
                }),
                text!("th, td, caption", |chunk| {
                    if !chunk.as_str().is_empty() {
                        events
                            .borrow_mut()
                            .push(TableEvent::Text(chunk.as_str().to_string()));
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|err| TexmarkError::HtmlRewrite(err.to_string()))?;

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut caption: Option<String> = None;
    let mut in_caption = false;
    for event in events.into_inner() {
        match event {
            TableEvent::Row => {
                rows.push(Vec::new());
                in_caption = false;
            }
            TableEvent::Cell { header, colspan } => {
                let tag = if header { "th" } else { "td" };
                let span = match colspan {
                    Some(value) => parse_colspan(tag, &value)?,
                    None => 1,
                };
                if rows.is_empty() {
                    rows.push(Vec::new());
                }
                if let Some(row) = rows.last_mut() {
                    row.push(Cell {
                        header,
                        span,
                        content: String::new(),
                    });
                }
                in_caption = false;
            }
            TableEvent::Caption => {
                caption.get_or_insert_with(String::new);
                in_caption = true;
            }
            TableEvent::Text(chunk) => {
                if in_caption {
                    caption.get_or_insert_with(String::new).push_str(&chunk);
                } else if let Some(cell) = rows.last_mut().and_then(|row| row.last_mut()) {
                    cell.content.push_str(&chunk);
                }
            }
        }
    }

    for cell in rows.iter_mut().flatten() {
        cell.content = restore_inline_tags(&cell.content, &inline_tags);
    }
    let caption = caption.map(|caption| restore_inline_tags(&caption, &inline_tags));

    let mut maxcols = 1;
    for row in &rows {
        maxcols = maxcols.max(row_width(row)?);
    }

    let body = rows
        .iter()
        .filter(|row| !row.is_empty())
        .map(|row| {
            let cells: Vec<String> = row.iter().map(Cell::to_latex).collect();
            format!("\\hline\n{} \\\\", cells.join(" & "))
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut out = String::from("\\begin{table}[h]\n\\centering\n");
    out.push_str(&format!("\\begin{{tabular}}{{{}}}\n", column_spec(maxcols)));
    out.push_str(&body);
    out.push_str("\n\\hline\n\\end{tabular}\n");
    if let Some(caption) = caption.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        out.push_str(&format!("\\caption{{{caption}}}\n"));
    }
    out.push_str("\\end{table}");
    Ok(out)
}

fn row_width(row: &[Cell]) -> Result<usize, TexmarkError> {
    row.iter().try_fold(0usize, |width, cell| {
        width.checked_add(cell.span).ok_or_else(|| {
            TexmarkError::malformed_attribute("td", "colspan", cell.span.to_string())
        })
    })
}

/// A pipe table needs a `|`-delimited first line and a separator second line.
fn is_pipe_table(block: &str) -> bool {
    let mut lines = block.lines().map(str::trim);
    matches!(
        (lines.next(), lines.next()),
        (Some(header), Some(separator))
            if PIPE_ROW.is_match(header) && PIPE_SEPARATOR.is_match(separator)
    )
}

/// Splits a pipe row on its unescaped `|`; `\|` is a literal pipe.
fn pipe_cells(line: &str) -> Vec<String> {
    let line = line.trim();
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                chars.next();
                current.push('|');
            }
            '|' => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        cells.push(current);
    }
    if line.starts_with('|') && !cells.is_empty() {
        cells.remove(0);
    }
    cells.into_iter().map(|cell| cell.trim().to_string()).collect()
}

/// Converts a pipe-table block. Every body row must have as many cells as
/// the header.
pub fn pipe_table(block: &str) -> Result<String, TexmarkError> {
    let lines: Vec<&str> = block.lines().collect();
    let headers = lines.first().map(|line| pipe_cells(line)).unwrap_or_default();
    let cols = headers.len();

    let mut out = String::from("\\begin{table}[h]\n\\centering\n");
    out.push_str(&format!("\\begin{{tabular}}{{{}}}\n\\hline\n", column_spec(cols)));
    let header_row: Vec<String> = headers
        .iter()
        .map(|header| format!("\\textbf{{{header}}}"))
        .collect();
    out.push_str(&format!("{} \\\\\n\\hline\n", header_row.join(" & ")));

    for (index, line) in lines.iter().enumerate().skip(2) {
        if line.trim().is_empty() {
            continue;
        }
        let cells = pipe_cells(line);
        if cells.len() != cols {
            return Err(TexmarkError::TableShape {
                row: index + 1,
                expected: cols,
                found: cells.len(),
                line: line.to_string(),
            });
        }
        out.push_str(&format!("{} \\\\\n\\hline\n", cells.join(" & ")));
    }
    out.push_str("\\end{tabular}\n\\end{table}");
    Ok(out)
}

fn column_spec(cols: usize) -> String {
    format!("|{}", "l|".repeat(cols))
}

/// Swaps inline tags for private-use placeholders so the HTML rewriter
/// reports them as cell text. Only structural tags reach the rewriter; a
/// `<` that opens no known tag (`x<y`, `n<k and m>j`) is hidden as well.
fn protect_inline_tags(block: &str) -> (String, Vec<String>) {
    let mut inline_tags = Vec::new();
    let protected = TAG_OR_LESS_THAN.replace_all(block, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .map(|name| name.as_str().to_ascii_lowercase())
            .unwrap_or_default();
        if STRUCTURAL_TAGS.contains(&name.as_str()) {
            return caps[0].to_string();
        }
        if KEPT_INLINE_TAGS.contains(&name.as_str()) {
            inline_tags.push(caps[0].to_string());
        } else if DROPPED_INLINE_TAGS.contains(&name.as_str()) {
            inline_tags.push(String::new());
        } else {
            return caps[0].replacen('<', LESS_THAN, 1);
        }
        format!("\u{e000}{}\u{e001}", inline_tags.len() - 1)
    });
    (protected.into_owned(), inline_tags)
}

/// Puts protected `<a>`/`<img>` tags and literal `<` back.
fn restore_inline_tags(chunk: &str, inline_tags: &[String]) -> String {
    PLACEHOLDER
        .replace_all(chunk, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| inline_tags.get(index))
                .cloned()
                .unwrap_or_default()
        })
        .replace(LESS_THAN, "<")
}
