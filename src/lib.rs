//! word2pdf library
//!
//! Converts Word documents to PDF through an external word processor and
//! post-processes the results. This library provides functionality to:
//! - Keep a bounded selection of up to five documents
//! - Convert a document to PDF with an external engine (LibreOffice by default)
//! - Merge several PDFs into one
//! - Stamp page numbers onto every page of a PDF
//! - Run the single-conversion and merge workflows end to end
//!
//! # Example
//!
//! ```no_run
//! use word2pdf::convert::OfficeEngine;
//! use word2pdf::selection::Selection;
//! use word2pdf::workflow::{merge_selection, WorkflowOptions};
//! use std::path::{Path, PathBuf};
//!
//! let mut selection = Selection::new();
//! selection.add(vec![PathBuf::from("report1.docx"), PathBuf::from("report2.docx")])?;
//!
//! let options = WorkflowOptions { page_numbers: true, ..Default::default() };
//! merge_selection(&OfficeEngine::default(), &selection, Some(Path::new("reports.pdf")), &options)?;
//! # Ok::<(), word2pdf::Error>(())
//! ```

pub mod error;
pub mod convert;
pub mod layout;
pub mod pdf;
pub mod selection;
pub mod workflow;

// Re-export commonly used items
pub use error::{Error, Result};
