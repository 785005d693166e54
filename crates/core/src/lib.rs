#![deny(missing_docs)]
//! texmark core: document tree, LaTeX entity escaping, and markdown parsing.

/// Core error types.
pub mod error;
/// Entity decoding, LaTeX escaping and typographic substitution.
pub mod escape;
/// Markdown parsing and lowering into the document tree.
pub mod parse;
/// Document tree with text/tail content.
pub mod tree;

pub use error::{SourceLocation, TexmarkError};
pub use escape::{decode_basic_entities, decode_entities, escape_latex, typography};
pub use parse::{ParseOptions, lower_mdast, parse_document, parse_mdast};
pub use tree::{Element, Tag};
