//! Document tree produced from the parsed markdown.
//!
//! The tree follows the ElementTree layout: an element owns the text that
//! appears inside it before its first child (`text`) and the text that
//! follows it before the next sibling (`tail`). Tail text is a plain field,
//! so no parent or sibling pointers are needed to walk the document.

use std::collections::BTreeMap;

/// Closed tag vocabulary understood by the LaTeX renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// Document root; renders its children unchanged.
    Root,
    /// Level-1 heading (document title).
    H1,
    /// Level-2 heading.
    H2,
    /// Level-3 heading.
    H3,
    /// Level-4 heading.
    H4,
    /// Horizontal rule.
    Hr,
    /// Unordered list.
    Ul,
    /// Ordered list, optionally carrying a `start` attribute.
    Ol,
    /// List item.
    Li,
    /// Block quotation.
    Blockquote,
    /// Preformatted block.
    Pre,
    /// Inline quotation.
    Q,
    /// Paragraph.
    P,
    /// Footnote content.
    Sup,
    /// Bold text.
    Strong,
    /// Italic text.
    Em,
    /// Table container.
    Table,
    /// Table header section.
    Thead,
    /// Table body section.
    Tbody,
    /// Table row.
    Tr,
    /// Header cell.
    Th,
    /// Body cell.
    Td,
    /// Image with `src` and `alt` attributes.
    Img,
    /// Hyperlink with an `href` attribute.
    A,
    /// Markup that is emitted verbatim (inline HTML, math source).
    Raw,
    /// Synthetic node holding a fully rendered document.
    Plaintext,
    /// Any tag outside the vocabulary; rendered as its children only.
    Other(String),
}

impl Tag {
    /// Resolves a tag name to its vocabulary entry.
    pub fn from_name(name: &str) -> Self {
        match name {
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "h4" => Tag::H4,
            "hr" => Tag::Hr,
            "ul" => Tag::Ul,
            "ol" => Tag::Ol,
            "li" => Tag::Li,
            "blockquote" => Tag::Blockquote,
            "pre" => Tag::Pre,
            "q" => Tag::Q,
            "p" => Tag::P,
            "sup" => Tag::Sup,
            "strong" => Tag::Strong,
            "em" => Tag::Em,
            "table" => Tag::Table,
            "thead" => Tag::Thead,
            "tbody" => Tag::Tbody,
            "tr" => Tag::Tr,
            "th" => Tag::Th,
            "td" => Tag::Td,
            "img" => Tag::Img,
            "a" => Tag::A,
            "plaintext" => Tag::Plaintext,
            other => Tag::Other(other.to_string()),
        }
    }

    /// Returns the tag name as it appears in markup.
    pub fn name(&self) -> &str {
        match self {
            Tag::Root => "div",
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::H4 => "h4",
            Tag::Hr => "hr",
            Tag::Ul => "ul",
            Tag::Ol => "ol",
            Tag::Li => "li",
            Tag::Blockquote => "blockquote",
            Tag::Pre => "pre",
            Tag::Q => "q",
            Tag::P => "p",
            Tag::Sup => "sup",
            Tag::Strong => "strong",
            Tag::Em => "em",
            Tag::Table => "table",
            Tag::Thead => "thead",
            Tag::Tbody => "tbody",
            Tag::Tr => "tr",
            Tag::Th => "th",
            Tag::Td => "td",
            Tag::Img => "img",
            Tag::A => "a",
            Tag::Raw => "raw",
            Tag::Plaintext => "plaintext",
            Tag::Other(name) => name,
        }
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag of this node.
    pub tag: Tag,
    /// Text inside the node before its first child.
    pub text: Option<String>,
    /// Text after the node, before the next sibling.
    pub tail: Option<String>,
    /// Ordered child nodes.
    pub children: Vec<Element>,
    /// String-keyed attributes (`start`, `colspan`, `src`, `alt`, `href`).
    pub attrs: BTreeMap<String, String>,
}

impl Element {
    /// Creates an empty element.
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            text: None,
            tail: None,
            children: Vec::new(),
            attrs: BTreeMap::new(),
        }
    }

    /// Creates a raw element whose text is emitted verbatim.
    pub fn raw(markup: impl Into<String>) -> Self {
        Self::new(Tag::Raw).with_text(markup)
    }

    /// Sets the leading text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the tail text.
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = Some(tail.into());
        self
    }

    /// Sets an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Appends a child.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Returns an attribute value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Appends text at the current end of this element's content.
    ///
    /// Text lands in `text` while there are no children, otherwise in the
    /// tail of the last child.
    pub fn push_text(&mut self, value: &str) {
        let slot = match self.children.last_mut() {
            Some(last) => &mut last.tail,
            None => &mut self.text,
        };
        slot.get_or_insert_with(String::new).push_str(value);
    }

    /// Appends another element's content (text, children, and tail
    /// positioning) at the end of this element.
    pub fn absorb(&mut self, other: Element) {
        if let Some(text) = &other.text {
            self.push_text(text);
        }
        self.children.extend(other.children);
        if let Some(tail) = &other.tail {
            self.push_text(tail);
        }
    }

    /// Replaces a whole rendered tree with the single synthetic node that
    /// carries its output.
    pub fn into_plaintext(self, rendered: impl Into<String>) -> Element {
        Element::new(Tag::Plaintext).with_text(rendered)
    }

    /// Serializes a plaintext node with its marker tags.
    ///
    /// Blank lines separate the markers from the body so that the first and
    /// last blocks of the body stand alone.
    pub fn to_marked_text(&self) -> String {
        let name = self.tag.name();
        format!(
            "<{name}>\n\n{}\n\n</{name}>",
            self.text.as_deref().unwrap_or_default()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_text_fills_text_then_tails() {
        let mut p = Element::new(Tag::P);
        p.push_text("Hello ");
        p.children.push(Element::new(Tag::Em).with_text("world"));
        p.push_text("!");
        p.push_text("!");

        assert_eq!(p.text.as_deref(), Some("Hello "));
        assert_eq!(p.children[0].tail.as_deref(), Some("!!"));
    }

    #[test]
    fn absorb_keeps_order() {
        let inner = Element::new(Tag::P)
            .with_text("a")
            .with_child(Element::new(Tag::Strong).with_text("b").with_tail("c"));
        let mut li = Element::new(Tag::Li);
        li.absorb(inner);
        li.push_text("d");

        assert_eq!(li.text.as_deref(), Some("a"));
        assert_eq!(li.children.len(), 1);
        assert_eq!(li.children[0].tail.as_deref(), Some("cd"));
    }

    #[test]
    fn tag_names_round_trip_through_vocabulary() {
        for name in ["h1", "ol", "td", "img", "a", "sup"] {
            assert_eq!(Tag::from_name(name).name(), name);
        }
        assert_eq!(Tag::from_name("h5"), Tag::Other("h5".into()));
    }

    #[test]
    fn plaintext_serialization_wraps_with_markers() {
        let node = Element::new(Tag::Root).into_plaintext("body");
        assert_eq!(node.to_marked_text(), "<plaintext>\n\nbody\n\n</plaintext>");
    }
}
