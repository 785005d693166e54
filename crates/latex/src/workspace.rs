//! File conversion relative to a working-directory root.

use crate::{ConvertOptions, convert_str};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use texmark_core::TexmarkError;

/// A working-directory root that input and output paths are resolved
/// against. Paths are joined as given; no validation is performed.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    options: ConvertOptions,
}

impl Workspace {
    /// Creates a workspace with default conversion options.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            options: ConvertOptions::default(),
        }
    }

    /// Replaces the conversion options.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The conversion options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Resolves a path against the root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Reads a UTF-8 source document.
    pub fn read_source(&self, input: impl AsRef<Path>) -> Result<String, TexmarkError> {
        let bytes = fs::read(self.resolve(input))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Converts `input` into a complete LaTeX document at `output`.
    ///
    /// The document is built in memory and written through a temporary file
    /// in the destination directory, so a failed conversion leaves no output
    /// behind and an existing output is replaced in one step.
    pub fn convert_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<PathBuf, TexmarkError> {
        let input = input.as_ref();
        let source = self.read_source(input)?;
        let document = convert_str(&source, &self.options)?;

        let target = self.resolve(output);
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(document.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&target).map_err(|e| e.error)?;

        log::debug!(
            "converted {} -> {} ({} bytes)",
            input.display(),
            target.display(),
            document.len()
        );
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_to_root() {
        let workspace = Workspace::new("/work");
        assert_eq!(workspace.resolve("a/b.md"), PathBuf::from("/work/a/b.md"));
    }

    #[test]
    fn converts_a_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("doc.md"), "## Intro\n\n50% done\n").unwrap();
        let workspace = Workspace::new(dir.path());

        let written = workspace.convert_file("doc.md", "doc.tex").unwrap();
        let tex = fs::read_to_string(written).unwrap();
        assert!(tex.contains("\\section{Intro}"));
        assert!(tex.contains("50\\% done"));
        assert!(tex.trim_end().ends_with("\\end{document}"));
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.md"), [0xff, 0xfe, b'a']).unwrap();
        let workspace = Workspace::new(dir.path());
        assert!(matches!(
            workspace.convert_file("bad.md", "bad.tex"),
            Err(TexmarkError::Encoding(_))
        ));
        assert!(!dir.path().join("bad.tex").exists());
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        assert!(matches!(
            workspace.convert_file("nope.md", "nope.tex"),
            Err(TexmarkError::Io(_))
        ));
    }
}
