//! The two user-facing workflows: convert one document, or convert and
//! merge several
//!
//! Both take the selection and options explicitly and return an
//! [`Outcome`] or an [`Error`]; turning either into something the user
//! sees is left to the caller via [`Notice`].

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, info, warn};
use tempfile::{TempDir, TempPath};
use crate::convert::{convert_to_pdf, WordEngine};
use crate::error::{Error, Result};
use crate::pdf::{add_page_numbers, count_pages, merge_pdfs, MergeOptions, StampOptions};
use crate::selection::{display_name, Selection};

/// Options shared by both workflows
#[derive(Debug, Clone, Default)]
pub struct WorkflowOptions {
    /// Stamp page numbers onto the final PDF
    pub page_numbers: bool,
    /// How page numbers are drawn
    pub stamp: StampOptions,
}

/// Successful end of a workflow
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// One document converted
    Converted {
        source: PathBuf,
        destination: PathBuf,
        pages: usize,
    },
    /// Several documents converted and merged
    Merged {
        documents: usize,
        destination: PathBuf,
        pages: usize,
    },
    /// The user declined to pick a destination
    Cancelled,
}

/// Scratch directory holding one intermediate PDF per merged document
///
/// The directory is unique per workflow run and is removed when the
/// workspace is dropped, including on error paths.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn create() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("word2pdf-").tempdir()?;
        debug!("Workspace at {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the intermediate PDF for the `index`-th selected document
    ///
    /// The position prefix keeps same-named documents from different
    /// folders apart.
    pub fn intermediate_path(&self, index: usize, source: &Path) -> PathBuf {
        self.dir.path().join(format!("{:02}-{}.pdf", index + 1, display_name(source)))
    }

    /// Remove the workspace now
    ///
    /// A directory that cannot be removed only earns a warning; the
    /// workflow's output is already complete by then.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Could not remove workspace {}: {}", path.display(), e);
        }
    }
}

/// Convert the single selected document to `destination`
///
/// `destination` is `None` when the user cancelled the save prompt. A
/// destination without an extension gets `.pdf`.
pub fn convert_single(
    engine: &dyn WordEngine,
    selection: &Selection,
    destination: Option<&Path>,
    options: &WorkflowOptions,
) -> Result<Outcome> {
    let source = match selection.paths() {
        [] => return Err(Error::NothingSelected),
        [source] => source,
        many => return Err(Error::SingleConversionNeedsOne(many.len())),
    };

    let Some(destination) = destination else {
        return Ok(Outcome::Cancelled);
    };
    let destination = with_pdf_extension(destination);

    convert_to_pdf(engine, source, &destination)?;

    let pages = if options.page_numbers {
        number_pages_in_place(&destination, &options.stamp)?
    } else {
        count_pages(&destination)?
    };

    info!("Converted {} to {}", source.display(), destination.display());

    Ok(Outcome::Converted {
        source: source.clone(),
        destination,
        pages,
    })
}

/// Convert every selected document and merge them, in selection order,
/// into `destination`
pub fn merge_selection(
    engine: &dyn WordEngine,
    selection: &Selection,
    destination: Option<&Path>,
    options: &WorkflowOptions,
) -> Result<Outcome> {
    if selection.len() < 2 {
        return Err(Error::MergeNeedsTwo(selection.len()));
    }

    let Some(destination) = destination else {
        return Ok(Outcome::Cancelled);
    };
    let destination = with_pdf_extension(destination);

    let workspace = Workspace::create()?;
    let mut intermediates = Vec::with_capacity(selection.len());

    for (index, source) in selection.iter().enumerate() {
        let pdf = workspace.intermediate_path(index, source);
        convert_to_pdf(engine, source, &pdf)?;
        intermediates.push(pdf);
    }

    info!("Merging {} converted documents", intermediates.len());
    let mut pages = merge_pdfs(&MergeOptions {
        input_paths: intermediates,
        output_path: destination.clone(),
    })?;

    if options.page_numbers {
        pages = number_pages_in_place(&destination, &options.stamp)?;
    }

    workspace.close();

    info!("Merged {} documents into {}", selection.len(), destination.display());

    Ok(Outcome::Merged {
        documents: selection.len(),
        destination,
        pages,
    })
}

/// Move `pdf` aside, stamp it back into place, drop the moved copy
fn number_pages_in_place(pdf: &Path, options: &StampOptions) -> Result<usize> {
    let unnumbered = temp_sibling(pdf);
    fs::rename(pdf, &unnumbered)?;

    // Deleted on drop if stamping fails
    let unnumbered = TempPath::from_path(unnumbered);

    let pages = add_page_numbers(&unnumbered, pdf, options)?;
    unnumbered.close()?;

    Ok(pages)
}

/// `<path>.temp`
fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".temp");
    PathBuf::from(name)
}

/// Append `.pdf` when the chosen destination has no extension
pub fn with_pdf_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("pdf")
    }
}

/// Category of a message shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// A message for the user describing how a workflow ended
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: Level::Info, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: Level::Warning, message: message.into() }
    }

    /// Warning for invalid user actions, error for everything else
    pub fn from_error(err: &Error) -> Self {
        let level = if err.is_warning() { Level::Warning } else { Level::Error };
        Self { level, message: err.to_string() }
    }

    /// Nothing is reported for a cancelled workflow
    pub fn from_outcome(outcome: &Outcome) -> Option<Self> {
        match outcome {
            Outcome::Converted { destination, pages, .. } => Some(Self::info(format!(
                "Conversion complete: {} ({} pages)",
                destination.display(),
                pages
            ))),
            Outcome::Merged { documents, destination, pages } => Some(Self::info(format!(
                "Merged {} documents: {} ({} pages)",
                documents,
                destination.display(),
                pages
            ))),
            Outcome::Cancelled => None,
        }
    }

    pub fn from_result(result: &Result<Outcome>) -> Option<Self> {
        match result {
            Ok(outcome) => Self::from_outcome(outcome),
            Err(err) => Some(Self::from_error(err)),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            Level::Info => write!(f, "{}", self.message),
            Level::Warning => write!(f, "Warning: {}", self.message),
            Level::Error => write!(f, "Error: {}", self.message),
        }
    }
}
