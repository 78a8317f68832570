//! Error types for the word2pdf library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the word2pdf library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// Adding the batch would push the selection over its capacity
    #[error("At most {capacity} files can be selected ({selected} selected, {requested} more requested)")]
    SelectionFull {
        capacity: usize,
        selected: usize,
        requested: usize,
    },

    /// A workflow was started with an empty selection
    #[error("No files selected")]
    NothingSelected,

    /// Single conversion was started with more than one file selected
    #[error("Single conversion needs exactly one file, {0} selected")]
    SingleConversionNeedsOne(usize),

    /// Merge was started with fewer than two files selected
    #[error("Merging needs at least two files, {0} selected")]
    MergeNeedsTwo(usize),

    /// Raw failure reported by the external word-processing engine
    #[error("{0}")]
    Engine(String),

    /// A conversion job failed; wraps whatever the engine reported
    #[error("Conversion failed: {}: {message}", .document.display())]
    Conversion { document: PathBuf, message: String },

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// True for invalid user actions that leave all state untouched.
    ///
    /// These are shown as warnings rather than errors.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Error::SelectionFull { .. }
                | Error::NothingSelected
                | Error::SingleConversionNeedsOne(_)
                | Error::MergeNeedsTwo(_)
        )
    }
}
