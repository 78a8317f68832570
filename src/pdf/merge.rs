//! PDF merging functionality using lopdf

use std::collections::BTreeMap;
use std::path::PathBuf;
use chrono::Local;
use lopdf::{Document, Object, ObjectId, Dictionary};
use log::debug;
use crate::error::{Error, Result};
use crate::pdf::metadata::{inherited_attribute, INHERITABLE_ATTRIBUTES};

/// Value written to the merged document's Producer entry
pub const PRODUCER: &str = concat!("word2pdf ", env!("CARGO_PKG_VERSION"));

/// Options for merging PDFs
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Input PDF file paths in the order they should be merged
    pub input_paths: Vec<PathBuf>,
    /// Output PDF file path
    pub output_path: PathBuf,
}

/// Merge multiple PDF files into a single PDF
///
/// Pages are concatenated in input order, each source keeping its own page
/// order. Returns the number of pages written.
///
/// # Example
///
/// ```no_run
/// use word2pdf::pdf::{MergeOptions, merge_pdfs};
/// use std::path::PathBuf;
///
/// let options = MergeOptions {
///     input_paths: vec![
///         PathBuf::from("report1.pdf"),
///         PathBuf::from("report2.pdf"),
///     ],
///     output_path: PathBuf::from("merged.pdf"),
/// };
///
/// merge_pdfs(&options).expect("Failed to merge");
/// ```
pub fn merge_pdfs(options: &MergeOptions) -> Result<usize> {
    if options.input_paths.is_empty() {
        return Err(Error::General("No input files provided".to_string()));
    }

    for path in &options.input_paths {
        if !path.exists() {
            return Err(Error::FileNotFound(path.clone()));
        }
    }

    let mut documents: Vec<Document> = Vec::new();
    for path in &options.input_paths {
        let mut doc = Document::load(path)?;

        if doc.get_pages().is_empty() {
            return Err(Error::EmptyPdf(path.clone()));
        }

        // The source page tree is discarded below, so pull inherited
        // attributes down onto the pages first
        flatten_inherited_attributes(&mut doc);
        debug!("Loaded {} ({} pages)", path.display(), doc.get_pages().len());
        documents.push(doc);
    }

    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        page_ids.extend(doc.get_pages().into_values());
        objects.extend(doc.objects);
    }

    let mut merged_doc = Document::with_version("1.5");
    merged_doc.objects.extend(objects);

    // Keep new_object_id() clear of the IDs we just inserted
    merged_doc.max_id = max_id - 1;

    let pages_id = merged_doc.new_object_id();

    let kids: Vec<Object> = page_ids
        .iter()
        .map(|&id| Object::Reference(id))
        .collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_ids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));

    let catalog_id = merged_doc.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    merged_doc.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged_doc.objects.insert(pages_id, Object::Dictionary(pages_object));
    merged_doc.trailer.set("Root", Object::Reference(catalog_id));

    let info_id = merged_doc.add_object(Object::Dictionary(info_dictionary()));
    merged_doc.trailer.set("Info", Object::Reference(info_id));

    for &page_id in &page_ids {
        if let Ok(Object::Dictionary(dict)) = merged_doc.get_object_mut(page_id) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    // Drop the old catalogs and page tree nodes, nothing points at them now
    merged_doc.prune_objects();

    merged_doc.compress();
    merged_doc.save(&options.output_path)?;

    Ok(page_ids.len())
}

/// Copy inherited page attributes onto every page that lacks them
fn flatten_inherited_attributes(doc: &mut Document) {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for page_id in page_ids {
        let inherited: Vec<(&[u8], Object)> = INHERITABLE_ATTRIBUTES
            .iter()
            .filter_map(|key| inherited_attribute(doc, page_id, key).map(|value| (*key, value)))
            .collect();

        if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
            for (key, value) in inherited {
                if !page.has(key) {
                    page.set(key.to_vec(), value);
                }
            }
        }
    }
}

/// Info dictionary for a freshly merged document
fn info_dictionary() -> Dictionary {
    let now = Local::now();
    let date = format!("D:{}", now.format("%Y%m%d%H%M%S"));

    let mut info = Dictionary::new();
    info.set("Producer", Object::string_literal(PRODUCER));
    info.set("CreationDate", Object::string_literal(date.clone()));
    info.set("ModDate", Object::string_literal(date));
    info
}
