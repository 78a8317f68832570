//! Shared fixtures: generated PDFs and a stand-in conversion engine

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use word2pdf::convert::{EngineSession, SaveFormat, WordEngine};
use word2pdf::{Error, Result};

/// Write a PDF with one page per entry of `bodies`, each page showing its
/// body text. MediaBox and Resources live on the Pages node so pages
/// inherit them, the way many producers lay files out.
pub fn write_pdf(path: &Path, bodies: &[String]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Courier".to_vec()));
    let font_id = doc.add_object(Object::Dictionary(font));

    let mut fonts = Dictionary::new();
    fonts.set("F1", Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));
    let resources_id = doc.add_object(Object::Dictionary(resources));

    let mut kids = Vec::new();
    for body in bodies {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(24)]),
                Operation::new("Td", vec![Object::Integer(72), Object::Integer(700)]),
                Operation::new("Tj", vec![Object::string_literal(body.as_str())]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        kids.push(Object::Reference(doc.add_object(Object::Dictionary(page))));
    }

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(kids.len() as i64));
    pages.set("Kids", Object::Array(kids));
    pages.set("Resources", Object::Reference(resources_id));
    pages.set("MediaBox", Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ]));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc.compress();
    doc.save(path).unwrap();
}

/// Bodies "<prefix> p1" .. "<prefix> pN"
pub fn bodies(prefix: &str, pages: usize) -> Vec<String> {
    (1..=pages).map(|n| format!("{} p{}", prefix, n)).collect()
}

/// Every string shown with Tj on each page, in page order
pub fn page_texts(path: &Path) -> Vec<Vec<String>> {
    let doc = Document::load(path).unwrap();

    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
            content.operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| op.operands.first())
                .filter_map(|obj| obj.as_str().ok())
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .collect()
        })
        .collect()
}

/// What the fake engine was asked to do
#[derive(Debug, Default)]
pub struct EngineLog {
    pub launches: usize,
    pub quits: usize,
    pub opened: Vec<PathBuf>,
    pub saved: Vec<PathBuf>,
}

/// Stand-in for a word processor
///
/// A "document" is a text file containing `pages=N`; converting it writes
/// an N-page PDF whose pages read "<file stem> p1" .. "<file stem> pN".
/// A document containing `corrupt` makes the save step fail; one containing
/// `garbled` "converts" to bytes that are not a PDF.
#[derive(Default)]
pub struct FakeEngine {
    pub log: Rc<RefCell<EngineLog>>,
}

struct FakeSession {
    log: Rc<RefCell<EngineLog>>,
    document: Option<PathBuf>,
}

impl WordEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn launch(&self) -> Result<Box<dyn EngineSession>> {
        self.log.borrow_mut().launches += 1;
        Ok(Box::new(FakeSession { log: Rc::clone(&self.log), document: None }))
    }
}

impl EngineSession for FakeSession {
    fn open(&mut self, document: &Path) -> Result<()> {
        self.log.borrow_mut().opened.push(document.to_path_buf());
        self.document = Some(document.to_path_buf());
        Ok(())
    }

    fn save_as(&mut self, destination: &Path, format: SaveFormat) -> Result<()> {
        assert_eq!(format, SaveFormat::Pdf);
        let document = self.document.clone().ok_or_else(|| Error::Engine("nothing open".to_string()))?;

        let text = fs::read_to_string(&document)?;
        if text.trim() == "garbled" {
            fs::write(destination, b"not a pdf")?;
            self.log.borrow_mut().saved.push(destination.to_path_buf());
            return Ok(());
        }

        let pages: usize = text
            .trim()
            .strip_prefix("pages=")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| Error::Engine("document is corrupt".to_string()))?;

        let stem = document.file_stem().unwrap().to_string_lossy().into_owned();
        write_pdf(destination, &bodies(&stem, pages));
        self.log.borrow_mut().saved.push(destination.to_path_buf());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.document = None;
        Ok(())
    }

    fn quit(&mut self) -> Result<()> {
        self.log.borrow_mut().quits += 1;
        Ok(())
    }
}

/// Create a fake Word document that converts to `pages` pages
pub fn word_document(dir: &Path, name: &str, pages: usize) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("pages={}", pages)).unwrap();
    path
}

/// Create a fake Word document the engine cannot convert
pub fn corrupt_document(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "corrupt").unwrap();
    path
}

/// Create a fake Word document that converts to an unreadable PDF
pub fn garbled_document(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "garbled").unwrap();
    path
}
