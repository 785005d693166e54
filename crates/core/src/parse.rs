//! Markdown parsing and lowering of the MDAST into the document tree.

use crate::tree::{Element, Tag};
use crate::{SourceLocation, TexmarkError};
use markdown::mdast::{self, Node};
use markdown::message::{Message, Place};
use std::collections::HashMap;

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Parse GFM pipe tables into table nodes. When disabled, pipe tables
    /// stay paragraph text and are picked up by the pipe-table converter.
    pub gfm_tables: bool,
    /// Enable GFM footnotes (`[^id]` references and definitions).
    pub footnotes: bool,
    /// Enable math constructs (`$inline$` and `$$block$$`).
    pub math: bool,
    /// Allow raw HTML nodes in the AST.
    pub raw_html: bool,
    /// Enable YAML/TOML frontmatter parsing (the frontmatter is dropped).
    pub frontmatter: bool,
}

impl ParseOptions {
    /// Defaults used for document conversion.
    pub const fn latex() -> Self {
        Self {
            gfm_tables: true,
            footnotes: true,
            math: true,
            raw_html: true,
            frontmatter: true,
        }
    }

    /// Plain CommonMark: no tables, footnotes or math.
    pub const fn commonmark() -> Self {
        Self {
            gfm_tables: false,
            footnotes: false,
            math: false,
            raw_html: true,
            frontmatter: false,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let constructs = markdown::Constructs {
            frontmatter: self.frontmatter,
            code_indented: true,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            gfm_autolink_literal: true,
            gfm_strikethrough: true,
            gfm_task_list_item: true,
            gfm_table: self.gfm_tables,
            gfm_footnote_definition: self.footnotes,
            gfm_label_start_footnote: self.footnotes,
            math_flow: self.math,
            math_text: self.math,
            ..Default::default()
        };

        markdown::ParseOptions {
            constructs,
            math_text_single_dollar: self.math,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::latex()
    }
}

/// Parse markdown into an MDAST tree.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> Result<Node, TexmarkError> {
    markdown::to_mdast(input, &options.to_markdown()).map_err(|err| {
        TexmarkError::MarkdownAdapter {
            message: err.to_string(),
            location: message_location(&err),
        }
    })
}

/// Parse markdown straight into the document tree.
pub fn parse_document(input: &str, options: &ParseOptions) -> Result<Element, TexmarkError> {
    let mdast = parse_mdast(input, options)?;
    Ok(lower_mdast(&mdast))
}

/// Lowers an MDAST into the document tree.
///
/// Reference links and footnotes are resolved against the definitions found
/// anywhere in the tree; definitions themselves produce no output.
pub fn lower_mdast(root: &Node) -> Element {
    let mut lowering = Lowering::default();
    lowering.collect(root);

    match root {
        Node::Root(root) => lowering.container(Tag::Root, &root.children),
        other => {
            let mut element = Element::new(Tag::Root);
            lowering.append_children(&mut element, std::slice::from_ref(other));
            element
        }
    }
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}

#[derive(Default)]
struct Lowering<'a> {
    definitions: HashMap<&'a str, &'a mdast::Definition>,
    footnotes: HashMap<&'a str, &'a [Node]>,
    /// Footnotes currently being expanded, to stop self-references.
    expanding: Vec<&'a str>,
}

impl<'a> Lowering<'a> {
    fn collect(&mut self, node: &'a Node) {
        match node {
            Node::Definition(def) => {
                self.definitions.entry(def.identifier.as_str()).or_insert(def);
            }
            Node::FootnoteDefinition(def) => {
                self.footnotes
                    .entry(def.identifier.as_str())
                    .or_insert(def.children.as_slice());
            }
            _ => {}
        }

        if let Some(children) = node.children() {
            for child in children {
                self.collect(child);
            }
        }
    }

    fn container(&mut self, tag: Tag, children: &'a [Node]) -> Element {
        let mut element = Element::new(tag);
        self.append_children(&mut element, children);
        element
    }

    fn append_children(&mut self, parent: &mut Element, nodes: &'a [Node]) {
        let block_parent = matches!(parent.tag, Tag::Root | Tag::Blockquote | Tag::Li);
        for node in nodes {
            match node {
                Node::Text(text) => parent.push_text(&text.value),
                // Block-level HTML sits in its own block, like a paragraph.
                Node::Html(html) if block_parent => {
                    parent
                        .children
                        .push(Element::raw(format!("\n{}\n", html.value)));
                }
                other => {
                    if let Some(element) = self.lower(other) {
                        parent.children.push(element);
                    }
                }
            }
        }
    }

    fn lower(&mut self, node: &'a Node) -> Option<Element> {
        let element = match node {
            Node::Root(root) => self.container(Tag::Root, &root.children),
            Node::Paragraph(para) => self.container(Tag::P, &para.children),
            Node::Heading(heading) => {
                let tag = match heading.depth {
                    1 => Tag::H1,
                    2 => Tag::H2,
                    3 => Tag::H3,
                    4 => Tag::H4,
                    depth => Tag::Other(format!("h{depth}")),
                };
                self.container(tag, &heading.children)
            }
            Node::ThematicBreak(_) => Element::new(Tag::Hr),
            Node::List(list) => self.list(list),
            Node::ListItem(item) => self.list_item(item, true),
            Node::Blockquote(quote) => self.container(Tag::Blockquote, &quote.children),
            Node::Code(code) => Element::new(Tag::Pre).with_text(&code.value),
            Node::InlineCode(code) => Element::new(Tag::Other("code".into())).with_text(&code.value),
            Node::Strong(strong) => self.container(Tag::Strong, &strong.children),
            Node::Emphasis(emphasis) => self.container(Tag::Em, &emphasis.children),
            Node::Delete(delete) => self.container(Tag::Other("del".into()), &delete.children),
            Node::Break(_) => Element::new(Tag::Other("br".into())),
            Node::Link(link) => self
                .container(Tag::A, &link.children)
                .with_attr("href", &link.url),
            Node::Image(image) => image_element(&image.url, &image.alt),
            Node::LinkReference(reference) => {
                match self.definitions.get(reference.identifier.as_str()).copied() {
                    Some(def) => self
                        .container(Tag::A, &reference.children)
                        .with_attr("href", &def.url),
                    None => {
                        log::warn!("Unresolved link reference: {}", reference.identifier);
                        self.container(Tag::Other("span".into()), &reference.children)
                    }
                }
            }
            Node::ImageReference(reference) => {
                match self.definitions.get(reference.identifier.as_str()) {
                    Some(def) => image_element(&def.url, &reference.alt),
                    None => {
                        log::warn!("Unresolved image reference: {}", reference.identifier);
                        Element::new(Tag::Other("span".into())).with_text(&reference.alt)
                    }
                }
            }
            Node::FootnoteReference(reference) => return self.footnote(&reference.identifier),
            Node::Table(table) => self.table(table),
            Node::Html(html) => Element::raw(&html.value),
            Node::InlineMath(math) => Element::raw(format!("${}$", math.value)),
            Node::Math(math) => Element::raw(format!("\n$$\n{}\n$$\n", math.value)),
            Node::Text(text) => Element::new(Tag::Other("span".into())).with_text(&text.value),
            Node::Definition(_)
            | Node::FootnoteDefinition(_)
            | Node::Yaml(_)
            | Node::Toml(_) => return None,
            other => match other.children() {
                Some(children) => {
                    log::warn!("Unhandled markdown node kept as passthrough: {:?}", other);
                    self.container(Tag::Other("span".into()), children)
                }
                None => {
                    log::warn!("Unhandled markdown node dropped: {:?}", other);
                    return None;
                }
            },
        };
        Some(element)
    }

    fn list(&mut self, list: &'a mdast::List) -> Element {
        let mut element = if list.ordered {
            Element::new(Tag::Ol)
        } else {
            Element::new(Tag::Ul)
        };
        if list.ordered
            && let Some(start) = list.start
            && start != 1
        {
            element = element.with_attr("start", start.to_string());
        }

        for child in &list.children {
            let item = match child {
                Node::ListItem(item) => Some(self.list_item(item, list.spread)),
                other => self.lower(other),
            };
            if let Some(item) = item {
                element.children.push(item);
            }
        }
        element
    }

    /// Tight list items take their paragraph content directly.
    fn list_item(&mut self, item: &'a mdast::ListItem, spread: bool) -> Element {
        let mut element = Element::new(Tag::Li);
        for child in &item.children {
            match child {
                Node::Paragraph(para) if !spread => {
                    let para = self.container(Tag::P, &para.children);
                    element.absorb(para);
                }
                other => self.append_children(&mut element, std::slice::from_ref(other)),
            }
        }
        element
    }

    fn table(&mut self, table: &'a mdast::Table) -> Element {
        let mut element = Element::new(Tag::Table);
        let mut rows = table.children.iter().filter_map(|node| match node {
            Node::TableRow(row) => Some(row),
            _ => None,
        });

        if let Some(head) = rows.next() {
            let row = self.table_row(head, Tag::Th);
            element.children.push(Element::new(Tag::Thead).with_child(row));
        }

        let mut body = Element::new(Tag::Tbody);
        for row in rows {
            body.children.push(self.table_row(row, Tag::Td));
        }
        if !body.children.is_empty() {
            element.children.push(body);
        }
        element
    }

    fn table_row(&mut self, row: &'a mdast::TableRow, cell_tag: Tag) -> Element {
        let mut element = Element::new(Tag::Tr);
        for cell in &row.children {
            if let Node::TableCell(cell) = cell {
                let cell = self.container(cell_tag.clone(), &cell.children);
                element.children.push(cell);
            }
        }
        element
    }

    /// Expands a footnote reference into a `sup` node holding the
    /// definition's content, paragraphs joined by a space.
    fn footnote(&mut self, identifier: &'a str) -> Option<Element> {
        let Some(children) = self.footnotes.get(identifier).copied() else {
            log::warn!("Footnote reference without definition: {}", identifier);
            return None;
        };
        if self.expanding.contains(&identifier) {
            log::warn!("Footnote refers to itself: {}", identifier);
            return None;
        }

        self.expanding.push(identifier);
        let mut element = Element::new(Tag::Sup);
        for child in children {
            match child {
                Node::Paragraph(para) => {
                    if element.text.is_some() || !element.children.is_empty() {
                        element.push_text(" ");
                    }
                    let para = self.container(Tag::P, &para.children);
                    element.absorb(para);
                }
                other => self.append_children(&mut element, std::slice::from_ref(other)),
            }
        }
        self.expanding.pop();
        Some(element)
    }
}

fn image_element(src: &str, alt: &str) -> Element {
    Element::new(Tag::Img)
        .with_attr("src", src)
        .with_attr("alt", alt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Element {
        parse_document(input, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn heading_and_paragraph_with_tail_text() {
        let root = parse("# Title\n\nHello *world* again");
        assert_eq!(root.tag, Tag::Root);
        assert_eq!(root.children.len(), 2);

        let h1 = &root.children[0];
        assert_eq!(h1.tag, Tag::H1);
        assert_eq!(h1.text.as_deref(), Some("Title"));

        let p = &root.children[1];
        assert_eq!(p.tag, Tag::P);
        assert_eq!(p.text.as_deref(), Some("Hello "));
        assert_eq!(p.children[0].tag, Tag::Em);
        assert_eq!(p.children[0].text.as_deref(), Some("world"));
        assert_eq!(p.children[0].tail.as_deref(), Some(" again"));
    }

    #[test]
    fn ordered_list_start_only_when_not_one() {
        let root = parse("3. three\n4. four\n");
        assert_eq!(root.children[0].tag, Tag::Ol);
        assert_eq!(root.children[0].get("start"), Some("3"));

        let root = parse("1. one\n2. two\n");
        assert_eq!(root.children[0].get("start"), None);
    }

    #[test]
    fn tight_list_items_hold_text_directly() {
        let root = parse("- alpha\n- beta\n");
        let ul = &root.children[0];
        assert_eq!(ul.tag, Tag::Ul);
        assert_eq!(ul.children.len(), 2);
        assert_eq!(ul.children[0].tag, Tag::Li);
        assert_eq!(ul.children[0].text.as_deref(), Some("alpha"));
        assert!(ul.children[0].children.is_empty());
    }

    #[test]
    fn loose_list_items_keep_paragraphs() {
        let root = parse("- alpha\n\n- beta\n");
        let li = &root.children[0].children[0];
        assert_eq!(li.children[0].tag, Tag::P);
    }

    #[test]
    fn links_and_images_carry_attributes() {
        let root = parse("[site](http://x.test) ![Result](fig.png)");
        let p = &root.children[0];
        assert_eq!(p.children[0].tag, Tag::A);
        assert_eq!(p.children[0].get("href"), Some("http://x.test"));
        assert_eq!(p.children[0].text.as_deref(), Some("site"));
        assert_eq!(p.children[1].tag, Tag::Img);
        assert_eq!(p.children[1].get("src"), Some("fig.png"));
        assert_eq!(p.children[1].get("alt"), Some("Result"));
    }

    #[test]
    fn reference_links_resolve_through_definitions() {
        let root = parse("See [docs][d].\n\n[d]: http://docs.test\n");
        assert_eq!(root.children.len(), 1);
        let a = &root.children[0].children[0];
        assert_eq!(a.tag, Tag::A);
        assert_eq!(a.get("href"), Some("http://docs.test"));
    }

    #[test]
    fn footnotes_expand_into_sup() {
        let root = parse("Claim[^1].\n\n[^1]: Source here.\n");
        assert_eq!(root.children.len(), 1);
        let sup = &root.children[0].children[0];
        assert_eq!(sup.tag, Tag::Sup);
        assert_eq!(sup.text.as_deref(), Some("Source here."));
        assert_eq!(sup.tail.as_deref(), Some("."));
    }

    #[test]
    fn tables_split_into_head_and_body() {
        let root = parse("| a | b |\n|---|---|\n| 1 | 2 |\n");
        let table = &root.children[0];
        assert_eq!(table.tag, Tag::Table);
        assert_eq!(table.children[0].tag, Tag::Thead);
        assert_eq!(table.children[0].children[0].children[0].tag, Tag::Th);
        assert_eq!(table.children[1].tag, Tag::Tbody);
        assert_eq!(table.children[1].children[0].children[1].tag, Tag::Td);
        assert_eq!(
            table.children[1].children[0].children[1].text.as_deref(),
            Some("2")
        );
    }

    #[test]
    fn pipe_tables_stay_text_without_gfm_tables() {
        let options = ParseOptions {
            gfm_tables: false,
            ..ParseOptions::default()
        };
        let root = parse_document("| a | b |\n|---|---|\n| 1 | 2 |\n", &options).unwrap();
        assert_eq!(root.children[0].tag, Tag::P);
        assert!(root.children[0].text.as_deref().unwrap().starts_with("| a | b |"));
    }

    #[test]
    fn math_and_inline_html_become_raw() {
        let root = parse("Area $a^2$ is <q>big</q>.\n\n$$\nx + y\n$$\n");
        let p = &root.children[0];
        assert_eq!(p.children[0], Element::raw("$a^2$").with_tail(" is "));
        assert_eq!(p.children[1].text.as_deref(), Some("<q>"));
        assert_eq!(root.children[1], Element::raw("\n$$\nx + y\n$$\n"));
    }

    #[test]
    fn frontmatter_is_dropped() {
        let root = parse("---\ntitle: x\n---\n\nBody\n");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].tag, Tag::P);
    }
}
