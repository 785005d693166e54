//! Conversion options shared by the library and the CLI.

use serde::{Deserialize, Serialize};
use std::path::Path;
use texmark_core::{ParseOptions, TexmarkError};

/// Options for converting one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Parse GFM pipe tables into table nodes. When off, pipe tables stay
    /// paragraph text and the table pass converts them.
    #[serde(default = "default_true")]
    pub gfm_tables: bool,
    /// Expand footnote references into `\footnote{..}`.
    #[serde(default = "default_true")]
    pub footnotes: bool,
    /// Recognize `$..$` and `$$..$$` math.
    #[serde(default = "default_true")]
    pub math: bool,
    /// Pass raw HTML through untouched.
    #[serde(default = "default_true")]
    pub raw_html: bool,
    /// Value of the `\author{..}` line.
    #[serde(default = "default_author")]
    pub author: String,
}

fn default_true() -> bool {
    true
}

fn default_author() -> String {
    "texmark".to_string()
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            gfm_tables: default_true(),
            footnotes: default_true(),
            math: default_true(),
            raw_html: default_true(),
            author: default_author(),
        }
    }
}

impl ConvertOptions {
    /// Parser settings derived from these options.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            gfm_tables: self.gfm_tables,
            footnotes: self.footnotes,
            math: self.math,
            raw_html: self.raw_html,
            ..ParseOptions::latex()
        }
    }

    /// Parses options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, TexmarkError> {
        serde_json::from_str(json).map_err(|e| TexmarkError::Config(e.to_string()))
    }

    /// Reads options from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, TexmarkError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| TexmarkError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }
}
