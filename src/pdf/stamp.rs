//! Page numbering by flattening one-page overlays onto each page
//!
//! For every page a tiny standalone PDF is generated that holds nothing but
//! the page's label. That overlay is parsed back, its objects are imported
//! into the target document and its content is appended to the page.

use std::collections::HashMap;
use std::path::Path;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use log::debug;
use crate::error::{Error, Result};
use crate::layout::{label_origin, PageBox};
use crate::pdf::metadata::{inherited_attribute, page_box};

/// Resource name of the overlay font, chosen so it does not clash with
/// the font names word processors emit
const LABEL_FONT: &str = "W2PLabelFont";

/// Options for stamping page numbers
#[derive(Debug, Clone, PartialEq)]
pub struct StampOptions {
    /// Label font size in points
    pub font_size: f32,
    /// Distance of the label baseline above the bottom edge, in points
    pub baseline: f32,
}

impl Default for StampOptions {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            baseline: 30.0,
        }
    }
}

/// Stamp the 1-based page number onto every page of `input_path`
///
/// The result is written to `output_path`; the input is only read. Page
/// count and order are unchanged. Returns the number of pages stamped.
///
/// # Example
///
/// ```no_run
/// use word2pdf::pdf::{add_page_numbers, StampOptions};
/// use std::path::Path;
///
/// add_page_numbers(
///     Path::new("report.pdf"),
///     Path::new("report-numbered.pdf"),
///     &StampOptions::default(),
/// ).expect("Failed to number pages");
/// ```
pub fn add_page_numbers(input_path: &Path, output_path: &Path, options: &StampOptions) -> Result<usize> {
    if !input_path.exists() {
        return Err(Error::FileNotFound(input_path.to_path_buf()));
    }

    let mut doc = Document::load(input_path)?;
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    if page_ids.is_empty() {
        return Err(Error::EmptyPdf(input_path.to_path_buf()));
    }

    for (index, page_id) in page_ids.iter().enumerate() {
        let label = (index + 1).to_string();
        let geometry = page_box(&doc, *page_id);

        let overlay_bytes = create_overlay(&label, &geometry, options)?;
        let overlay = Document::load_mem(&overlay_bytes)?;

        flatten_overlay(&mut doc, *page_id, &overlay)?;
    }

    debug!("Stamped {} pages of {}", page_ids.len(), input_path.display());

    // The overlays' own catalogs and page trees are unreachable now
    doc.prune_objects();
    doc.compress();
    doc.save(output_path)?;

    Ok(page_ids.len())
}

/// Build a one-page PDF the size of `page` carrying only `label`
pub fn create_overlay(label: &str, page: &PageBox, options: &StampOptions) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    let font_id = doc.add_object(Object::Dictionary(font));

    let mut fonts = Dictionary::new();
    fonts.set(LABEL_FONT, Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));

    let (x, y) = label_origin(page, label, options.font_size, options.baseline);
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(LABEL_FONT.as_bytes().to_vec()), Object::Real(options.font_size)]),
            Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
            Operation::new("Tj", vec![Object::string_literal(label)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(pages_id));
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));
    page_dict.set("MediaBox", Object::Array(vec![
        Object::Real(page.left),
        Object::Real(page.bottom),
        Object::Real(page.left + page.width),
        Object::Real(page.bottom + page.height),
    ]));
    let page_id = doc.add_object(Object::Dictionary(page_dict));

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
    pages.set("Count", Object::Integer(1));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Merge the single page of `overlay` on top of `page_id`
fn flatten_overlay(doc: &mut Document, page_id: ObjectId, overlay: &Document) -> Result<()> {
    let overlay_page_id = overlay.get_pages()
        .into_values()
        .next()
        .ok_or_else(|| Error::General("Overlay has no page".to_string()))?;

    // Import all overlay objects above the target's current max ID
    let id_offset = doc.max_id;
    let id_map: HashMap<ObjectId, ObjectId> = overlay.objects
        .keys()
        .map(|old_id| (*old_id, (old_id.0 + id_offset, old_id.1)))
        .collect();

    for (old_id, object) in overlay.objects.iter() {
        doc.objects.insert(id_map[old_id], renumber_object_references(object, &id_map));
    }
    doc.max_id = id_map.values().map(|id| id.0).max().unwrap_or(id_offset).max(id_offset);

    let (overlay_contents, overlay_resources) = page_content_and_resources(overlay, overlay_page_id, &id_map)?;

    // Resolve everything we need from the page before borrowing it mutably
    let mut resources = effective_resources(doc, page_id);
    merge_resources(doc, &mut resources, &overlay_resources);

    let existing: Vec<Object> = doc.get_page_contents(page_id)
        .into_iter()
        .map(Object::Reference)
        .collect();

    // Isolate the original graphics state so a leftover CTM or colour
    // cannot move or hide the label
    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));

    let mut contents = Vec::with_capacity(existing.len() + overlay_contents.len() + 2);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(restore_id));
    contents.extend(overlay_contents);

    let page = doc.get_dictionary_mut(page_id)?;
    page.set("Contents", Object::Array(contents));
    page.set("Resources", Object::Dictionary(resources));

    Ok(())
}

/// Renumber all object references in an object
fn renumber_object_references(object: &Object, id_map: &HashMap<ObjectId, ObjectId>) -> Object {
    match object {
        Object::Reference(old_id) => {
            Object::Reference(id_map.get(old_id).copied().unwrap_or(*old_id))
        }
        Object::Array(arr) => {
            Object::Array(arr.iter().map(|obj| renumber_object_references(obj, id_map)).collect())
        }
        Object::Dictionary(dict) => Object::Dictionary(renumber_dictionary(dict, id_map)),
        Object::Stream(stream) => {
            let mut new_stream = stream.clone();
            new_stream.dict = renumber_dictionary(&stream.dict, id_map);
            Object::Stream(new_stream)
        }
        _ => object.clone(),
    }
}

fn renumber_dictionary(dict: &Dictionary, id_map: &HashMap<ObjectId, ObjectId>) -> Dictionary {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), renumber_object_references(value, id_map));
    }
    new_dict
}

/// Content references and resources of an overlay page, with remapped IDs
fn page_content_and_resources(
    overlay: &Document,
    page_id: ObjectId,
    id_map: &HashMap<ObjectId, ObjectId>,
) -> Result<(Vec<Object>, Dictionary)> {
    let page = overlay.get_dictionary(page_id)?;

    let contents = match page.get(b"Contents").map(|c| renumber_object_references(c, id_map)) {
        Ok(Object::Array(arr)) => arr,
        Ok(other) => vec![other],
        Err(_) => vec![],
    };

    let resources = match page.get(b"Resources") {
        Ok(Object::Dictionary(dict)) => renumber_dictionary(dict, id_map),
        Ok(Object::Reference(id)) => overlay.get_dictionary(*id)
            .map(|dict| renumber_dictionary(dict, id_map))
            .unwrap_or_else(|_| Dictionary::new()),
        _ => Dictionary::new(),
    };

    Ok((contents, resources))
}

/// A direct copy of the resources the page currently uses, own or inherited
fn effective_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    match inherited_attribute(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => dict,
        Some(Object::Reference(id)) => doc.get_dictionary(id).cloned().unwrap_or_else(|_| Dictionary::new()),
        _ => Dictionary::new(),
    }
}

/// Merge overlay resources into the page's resources dictionary
fn merge_resources(doc: &Document, resources: &mut Dictionary, overlay_resources: &Dictionary) {
    for (key, value) in overlay_resources.iter() {
        let existing = match resources.get(key) {
            Ok(Object::Dictionary(dict)) => Some(dict.clone()),
            Ok(Object::Reference(id)) => doc.get_dictionary(*id).ok().cloned(),
            _ => None,
        };

        match (existing, value) {
            (Some(mut merged), Object::Dictionary(additions)) => {
                for (name, entry) in additions.iter() {
                    merged.set(name.clone(), entry.clone());
                }
                resources.set(key.clone(), Object::Dictionary(merged));
            }
            // ProcSet arrays and the like: keep what the page already has
            (None, _) if resources.has(key) => {}
            _ => resources.set(key.clone(), value.clone()),
        }
    }
}
