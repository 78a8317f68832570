//! The bounded list of Word documents chosen for conversion

use std::fs;
use std::path::{Path, PathBuf};
use crate::error::{Error, Result};

/// Maximum number of documents that can be selected at once
pub const MAX_SELECTION: usize = 5;

/// File extensions accepted as Word documents (compared case-insensitively)
pub const WORD_EXTENSIONS: [&str; 2] = ["docx", "doc"];

/// Ordered, duplicate-free list of selected documents
///
/// Insertion order is the order documents are converted and merged in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    paths: Vec<PathBuf>,
}

/// What happened to a batch passed to [`Selection::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddReport {
    /// Paths appended to the selection
    pub added: usize,
    /// Paths ignored because they were already selected
    pub skipped: usize,
}

impl Selection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a batch of candidate paths
    ///
    /// Candidates already in the list (or repeated within the batch) are
    /// skipped. If the remaining new paths do not fit under
    /// [`MAX_SELECTION`], the whole batch is rejected and the list is left
    /// unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use word2pdf::selection::Selection;
    /// use std::path::PathBuf;
    ///
    /// let mut selection = Selection::new();
    /// let report = selection
    ///     .add(vec![PathBuf::from("a.docx"), PathBuf::from("a.docx")])
    ///     .unwrap();
    /// assert_eq!(report.added, 1);
    /// assert_eq!(selection.len(), 1);
    /// ```
    pub fn add<I>(&mut self, candidates: I) -> Result<AddReport>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut fresh: Vec<PathBuf> = Vec::new();
        let mut skipped = 0;

        for candidate in candidates {
            let key = identity(&candidate);
            if self.contains(&candidate) || fresh.iter().any(|p| identity(p) == key) {
                skipped += 1;
            } else {
                fresh.push(candidate);
            }
        }

        if self.paths.len() + fresh.len() > MAX_SELECTION {
            return Err(Error::SelectionFull {
                capacity: MAX_SELECTION,
                selected: self.paths.len(),
                requested: fresh.len(),
            });
        }

        let added = fresh.len();
        self.paths.extend(fresh);

        Ok(AddReport { added, skipped })
    }

    /// Remove every selected path
    pub fn clear(&mut self) {
        self.paths.clear();
    }

    /// Whether `path` is already selected, possibly spelled differently
    pub fn contains(&self, path: &Path) -> bool {
        let key = identity(path);
        self.paths.iter().any(|p| identity(p) == key)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Selected paths in insertion order
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// Canonical form of an existing file, the path itself otherwise
fn identity(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Check whether a path has a Word document extension
pub fn is_word_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| WORD_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)))
        .unwrap_or(false)
}

/// File name shown for a selected path
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
