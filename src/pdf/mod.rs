//! PDF manipulation module

pub mod merge;
pub mod metadata;
pub mod stamp;

// Re-export commonly used items
pub use merge::{merge_pdfs, MergeOptions};
pub use metadata::{count_pages, extract_metadata, PdfMetadata};
pub use stamp::{add_page_numbers, create_overlay, StampOptions};
