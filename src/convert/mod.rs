//! Word document to PDF conversion through an external engine
//!
//! The engine is treated as an opaque process: it is launched once per
//! conversion, asked to open a document, save it as PDF and close it, and is
//! always told to quit afterwards, whether the conversion worked or not.

pub mod office;

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use log::{debug, info};
use crate::error::{Error, Result};

pub use office::OfficeEngine;

/// Output formats an engine can save to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Pdf,
}

impl SaveFormat {
    /// Filter name understood by `soffice --convert-to`
    pub fn filter(self) -> &'static str {
        match self {
            SaveFormat::Pdf => "pdf",
        }
    }
}

/// A word-processing application that can be started on demand
pub trait WordEngine {
    /// Short name used in log messages
    fn name(&self) -> &str;

    /// Start a fresh, invisible instance of the application
    fn launch(&self) -> Result<Box<dyn EngineSession>>;
}

/// One running instance of a [`WordEngine`]
pub trait EngineSession {
    /// Open the document at `document`
    fn open(&mut self, document: &Path) -> Result<()>;

    /// Save the open document to `destination` in `format`
    fn save_as(&mut self, destination: &Path, format: SaveFormat) -> Result<()>;

    /// Close the open document
    fn close(&mut self) -> Result<()>;

    /// Terminate the application
    fn quit(&mut self) -> Result<()>;
}

/// Quits the wrapped session when dropped, ignoring quit failures
struct SessionGuard {
    session: Box<dyn EngineSession>,
}

impl Deref for SessionGuard {
    type Target = dyn EngineSession;

    fn deref(&self) -> &Self::Target {
        self.session.as_ref()
    }
}

impl DerefMut for SessionGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session.as_mut()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Err(e) = self.session.quit() {
            debug!("Ignoring engine quit failure: {}", e);
        }
    }
}

/// Convert `source` to a PDF at `destination` using `engine`
///
/// Both paths are made absolute before they reach the engine. Engine
/// failures come back as [`Error::Conversion`]. There is no retry.
///
/// # Example
///
/// ```no_run
/// use word2pdf::convert::{convert_to_pdf, OfficeEngine};
/// use std::path::Path;
///
/// let engine = OfficeEngine::default();
/// convert_to_pdf(&engine, Path::new("report.docx"), Path::new("report.pdf"))
///     .expect("Failed to convert");
/// ```
pub fn convert_to_pdf(engine: &dyn WordEngine, source: &Path, destination: &Path) -> Result<()> {
    let source = absolute(source)?;
    let destination = absolute(destination)?;

    if !source.exists() {
        return Err(Error::FileNotFound(source));
    }

    info!("Converting {} with {}", source.display(), engine.name());

    run_conversion(engine, &source, &destination).map_err(|e| Error::Conversion {
        document: source.clone(),
        message: e.to_string(),
    })?;

    debug!("Wrote {}", destination.display());
    Ok(())
}

fn run_conversion(engine: &dyn WordEngine, source: &Path, destination: &Path) -> Result<()> {
    let mut session = SessionGuard { session: engine.launch()? };

    session.open(source)?;
    session.save_as(destination, SaveFormat::Pdf)?;
    session.close()?;

    Ok(())
}

/// Resolve `path` against the current directory without touching the filesystem
pub fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}
