#![deny(missing_docs)]
//! Markdown to LaTeX conversion.
//!
//! A document goes through four stages: markdown parsing into a
//! [`texmark_core::Element`] tree, tree-to-text rendering, the
//! [`Postprocessor`] chain, and preamble assembly.
//!
//! ```
//! use texmark_latex::{ConvertOptions, convert_str};
//!
//! let tex = convert_str("# Title\n\nHello *world*\n", &ConvertOptions::default()).unwrap();
//! assert!(tex.contains("\\title{Title}"));
//! assert!(tex.contains("Hello \\emph{world}"));
//! ```

/// Preamble and document wrapper.
pub mod assemble;
/// Parallel conversion of many documents.
pub mod batch;
/// Conversion options.
pub mod options;
/// Whole-document rewriting passes.
pub mod postprocess;
/// Tree-to-text rendering.
pub mod render;
/// File conversion relative to a root directory.
pub mod workspace;

pub use assemble::{PREAMBLE, assemble};
pub use batch::{BatchJob, BatchOptions, BatchOutcome, BatchResult, BatchStats, convert_batch};
pub use options::ConvertOptions;
pub use postprocess::{Pass, Postprocessor};
pub use render::{render, render_document};
pub use workspace::Workspace;

use texmark_core::{TexmarkError, parse_document};

/// Converts markdown source into a complete LaTeX document in memory.
pub fn convert_str(input: &str, options: &ConvertOptions) -> Result<String, TexmarkError> {
    let root = parse_document(input, &options.parse_options())?;
    let body = render_document(root)?;
    let body = Postprocessor::standard().run(&body)?;
    Ok(assemble(&body, &options.author))
}
