//! Writing a project tree.
//!
//! The project directory must not exist beforehand; everything inside it is
//! written unconditionally. A failed write aborts the run and leaves what
//! was already written in place.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    markup::{Applied, Injection, MarkupDocument},
};

#[derive(Debug)]
pub struct TemplatePipeline {
    root: PathBuf,
}

impl TemplatePipeline {
    /// Create `root` (and any missing parents) and return a pipeline
    /// writing into it. Fails if `root` already exists.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if root.exists() {
            return Err(Error::AlreadyExists { path: root });
        }
        if let Some(parent) = root.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::create_dir(&root).map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => Error::AlreadyExists { path: root.clone() },
            _ => Error::io(&root, e),
        })?;
        debug!(path = %root.display(), "created project directory");
        Ok(Self { root })
    }

    /// A pipeline over an existing tree, for re-applying edits.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Write `contents` to `relative`, creating parent directories and
    /// replacing any existing file.
    pub fn write_static_file(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(&path, contents).map_err(|e| Error::io(&path, e))?;
        debug!(file = relative, bytes = contents.len(), "wrote file");
        Ok(path)
    }

    /// Like [`Self::write_static_file`] but leaves an existing file alone.
    /// Returns whether the file was written.
    pub fn write_if_absent(&self, relative: &str, contents: &str) -> Result<bool> {
        if self.path(relative).exists() {
            debug!(file = relative, "keeping existing file");
            return Ok(false);
        }
        self.write_static_file(relative, contents)?;
        Ok(true)
    }

    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.path(relative);
        fs::read_to_string(&path).map_err(|e| Error::io(&path, e))
    }

    /// Apply `injections` to the markup file at `relative` and write it back
    /// if anything changed. Safe to call repeatedly with the same edits.
    pub fn mutate_markup(
        &self,
        relative: &str,
        injections: &[Injection],
    ) -> Result<Vec<(&'static str, Applied)>> {
        let mut doc = MarkupDocument::parse(self.read(relative)?);
        let results = doc.apply_all(injections);

        for (marker, applied) in &results {
            match applied {
                Applied::Inserted => debug!(file = relative, marker, "inserted markup"),
                Applied::AlreadyPresent => debug!(file = relative, marker, "markup already present"),
                Applied::NoInsertionPoint => {
                    warn!(file = relative, marker, "no insertion point for markup")
                },
            }
        }

        if results.iter().any(|(_, a)| *a == Applied::Inserted) {
            self.write_static_file(relative, doc.as_str())?;
        }
        Ok(results)
    }

    /// Append a self-contained block to the entry file at `relative`.
    pub fn append_entry_script(&self, relative: &str, snippet: &str) -> Result<()> {
        let path = self.path(relative);
        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;
        file.write_all(snippet.as_bytes())
            .map_err(|e| Error::io(&path, e))?;
        debug!(file = relative, bytes = snippet.len(), "appended entry block");
        Ok(())
    }
}
