//! PDF metadata extraction

use std::path::Path;
use lopdf::{Document, Object, ObjectId};
use crate::error::{Error, Result};
use crate::layout::PageBox;

/// Page attributes a page may inherit from its ancestors in the page tree
pub(crate) const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic Parent chains in malformed files
const MAX_TREE_DEPTH: usize = 64;

/// Count pages by reading the Count field from the Pages dictionary
/// This is more reliable than get_pages() which doesn't handle nested page trees
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let catalog_id = doc.trailer.get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| Error::General("No Root reference in trailer".to_string()))?;

    let catalog_dict = doc.get_dictionary(catalog_id)?;

    let pages_id = catalog_dict.get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| Error::General("No Pages reference in catalog".to_string()))?;

    let pages_dict = doc.get_dictionary(pages_id)?;

    match pages_dict.get(b"Count") {
        Ok(Object::Integer(n)) if *n >= 0 => Ok(*n as usize),
        Ok(_) => Err(Error::General("Count is not a valid integer".to_string())),
        Err(_) => Err(Error::General("No Count in Pages".to_string())),
    }
}

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
    /// Producing application (if present)
    pub producer: Option<String>,
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_from_catalog(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    let info = doc.trailer.get(b"Info")
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_dictionary(id))
        .ok();

    let text_entry = |key: &[u8]| -> Option<String> {
        let bytes = info?.get(key).and_then(Object::as_str).ok()?;
        String::from_utf8(bytes.to_vec()).ok()
    };

    Ok(PdfMetadata {
        page_count,
        title: text_entry(b"Title"),
        author: text_entry(b"Author"),
        producer: text_entry(b"Producer"),
    })
}

/// Count the number of pages in a PDF file
///
/// This is a quick operation that reads the Count field from the Pages dictionary.
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_from_catalog(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(page_count)
}

/// Look up a page attribute, walking up the Parent chain if the page
/// does not carry it itself
pub(crate) fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node_id = page_id;

    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(node_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        node_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
    }

    None
}

/// Visible box of a page, falling back to US Letter when the MediaBox is
/// missing or unreadable
pub(crate) fn page_box(doc: &Document, page_id: ObjectId) -> PageBox {
    let media_box = match inherited_attribute(doc, page_id, b"MediaBox") {
        Some(Object::Reference(id)) => doc.get_object(id).ok().cloned(),
        other => other,
    };

    let corners: Option<Vec<f32>> = media_box
        .as_ref()
        .and_then(|obj| obj.as_array().ok())
        .map(|items| items.iter().filter_map(number).collect());

    match corners.as_deref() {
        Some([llx, lly, urx, ury]) => {
            PageBox::from_corners(*llx, *lly, *urx, *ury).unwrap_or_else(PageBox::letter)
        }
        _ => PageBox::letter(),
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
