use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Optional file path
    pub file: Option<String>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
        }
    }

    /// Create a source location with file information
    pub fn with_file(file: String, line: usize, column: usize) -> Self {
        Self {
            file: Some(file),
            line,
            column,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Errors that can occur while converting a document to LaTeX.
///
/// Every variant is terminal for the conversion that raised it; nothing is
/// written to the output location once one of these is returned.
#[derive(Debug, Error)]
pub enum TexmarkError {
    /// Reading the source or writing the destination failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The source document is not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    MarkdownAdapter {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// A numeric attribute (`start`, `colspan`) did not hold a number.
    #[error("Malformed `{name}` attribute on <{tag}>: {value:?}")]
    MalformedAttribute {
        /// Tag carrying the attribute
        tag: String,
        /// Attribute name
        name: String,
        /// Raw attribute value
        value: String,
    },
    /// A pipe-table body row does not have as many cells as the header.
    #[error("Table row {row} has {found} cells, header has {expected}: {line}")]
    TableShape {
        /// 1-indexed row number within the table block
        row: usize,
        /// Cell count of the header row
        expected: usize,
        /// Cell count of the offending row
        found: usize,
        /// The offending row, verbatim
        line: String,
    },
    /// An anchor tag without visible text or without an `href`.
    #[error("Unresolvable link in block {block}: {anchor}")]
    UnresolvableLink {
        /// 0-indexed block number within the document
        block: usize,
        /// The anchor markup, verbatim
        anchor: String,
    },
    /// The HTML rewriter rejected a passthrough block.
    #[error("HTML rewrite error: {0}")]
    HtmlRewrite(String),
    /// Conversion options could not be loaded.
    #[error("Config error: {0}")]
    Config(String),
}

impl TexmarkError {
    /// Create a parse error with location
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::MarkdownAdapter {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }

    /// Create a malformed attribute error
    pub fn malformed_attribute(
        tag: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::MalformedAttribute {
            tag: tag.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}
