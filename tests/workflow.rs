//! End-to-end workflow tests against a stand-in conversion engine

mod common;

use common::{corrupt_document, garbled_document, page_texts, word_document, FakeEngine};
use word2pdf::pdf::count_pages;
use word2pdf::selection::Selection;
use word2pdf::workflow::{convert_single, merge_selection, Level, Notice, Outcome, WorkflowOptions};
use word2pdf::Error;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn numbered() -> WorkflowOptions {
    WorkflowOptions { page_numbers: true, ..Default::default() }
}

fn select(paths: &[PathBuf]) -> Selection {
    let mut selection = Selection::new();
    selection.add(paths.to_vec()).unwrap();
    selection
}

fn labels(path: &Path) -> Vec<String> {
    page_texts(path).into_iter().map(|texts| texts.last().cloned().unwrap()).collect()
}

fn temp_files_next_to(path: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|p| p.extension().map(|e| e == "temp").unwrap_or(false))
        .collect()
}

#[test]
fn test_single_conversion() {
    let dir = TempDir::new().unwrap();
    let source = word_document(dir.path(), "letter.docx", 3);
    let destination = dir.path().join("letter.pdf");
    let engine = FakeEngine::default();

    let outcome = convert_single(&engine, &select(&[source.clone()]), Some(&destination), &WorkflowOptions::default()).unwrap();

    assert_eq!(outcome, Outcome::Converted { source, destination: destination.clone(), pages: 3 });
    assert_eq!(count_pages(&destination).unwrap(), 3);

    let log = engine.log.borrow();
    assert_eq!(log.launches, 1);
    assert_eq!(log.quits, 1);
}

#[test]
fn test_single_conversion_with_page_numbers() {
    let dir = TempDir::new().unwrap();
    let source = word_document(dir.path(), "letter.docx", 3);
    let destination = dir.path().join("letter.pdf");

    convert_single(&FakeEngine::default(), &select(&[source]), Some(&destination), &numbered()).unwrap();

    assert_eq!(labels(&destination), vec!["1", "2", "3"]);
    assert!(temp_files_next_to(&destination).is_empty());
}

#[test]
fn test_single_conversion_adds_pdf_extension() {
    let dir = TempDir::new().unwrap();
    let source = word_document(dir.path(), "letter.docx", 1);

    let outcome = convert_single(
        &FakeEngine::default(),
        &select(&[source]),
        Some(&dir.path().join("letter")),
        &WorkflowOptions::default(),
    )
    .unwrap();

    assert!(matches!(outcome, Outcome::Converted { ref destination, .. } if destination.ends_with("letter.pdf")));
    assert!(dir.path().join("letter.pdf").exists());
}

#[test]
fn test_merge_two_reports_with_page_numbers() {
    let dir = TempDir::new().unwrap();
    let report1 = word_document(dir.path(), "report1.docx", 2);
    let report2 = word_document(dir.path(), "report2.docx", 3);
    let destination = dir.path().join("reports.pdf");
    let engine = FakeEngine::default();

    let outcome = merge_selection(&engine, &select(&[report1, report2]), Some(&destination), &numbered()).unwrap();

    assert_eq!(outcome, Outcome::Merged { documents: 2, destination: destination.clone(), pages: 5 });

    let texts = page_texts(&destination);
    let bodies: Vec<&str> = texts.iter().map(|t| t[0].as_str()).collect();
    assert_eq!(bodies, vec!["report1 p1", "report1 p2", "report2 p1", "report2 p2", "report2 p3"]);
    assert_eq!(labels(&destination), vec!["1", "2", "3", "4", "5"]);

    // One engine per document, each quit; intermediates and workspace gone
    let log = engine.log.borrow();
    assert_eq!(log.launches, 2);
    assert_eq!(log.quits, 2);
    assert_eq!(log.saved.len(), 2);
    for intermediate in &log.saved {
        assert!(!intermediate.exists());
        assert!(!intermediate.parent().unwrap().exists());
    }
    assert!(temp_files_next_to(&destination).is_empty());
}

#[test]
fn test_merge_follows_selection_order() {
    let dir = TempDir::new().unwrap();
    let a = word_document(dir.path(), "a.docx", 1);
    let b = word_document(dir.path(), "b.docx", 1);
    let c = word_document(dir.path(), "c.docx", 1);
    let destination = dir.path().join("out.pdf");

    merge_selection(&FakeEngine::default(), &select(&[c, a, b]), Some(&destination), &WorkflowOptions::default()).unwrap();

    let bodies: Vec<String> = page_texts(&destination).into_iter().map(|t| t.join(" ")).collect();
    assert_eq!(bodies, vec!["c p1", "a p1", "b p1"]);
}

#[test]
fn test_merge_same_named_documents_from_different_folders() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("q1")).unwrap();
    std::fs::create_dir(dir.path().join("q2")).unwrap();
    let first = word_document(&dir.path().join("q1"), "report.docx", 1);
    let second = word_document(&dir.path().join("q2"), "report.docx", 2);
    let destination = dir.path().join("out.pdf");

    let outcome = merge_selection(&FakeEngine::default(), &select(&[first, second]), Some(&destination), &WorkflowOptions::default()).unwrap();

    assert!(matches!(outcome, Outcome::Merged { pages: 3, .. }));
}

#[test]
fn test_failed_conversion_cleans_up() {
    let dir = TempDir::new().unwrap();
    let good = word_document(dir.path(), "good.docx", 2);
    let bad = corrupt_document(dir.path(), "bad.docx");
    let destination = dir.path().join("out.pdf");
    let engine = FakeEngine::default();

    let err = merge_selection(&engine, &select(&[good, bad]), Some(&destination), &numbered()).unwrap_err();

    assert!(matches!(err, Error::Conversion { .. }));
    assert!(err.to_string().starts_with("Conversion failed:"));
    assert!(err.to_string().contains("document is corrupt"));
    assert!(!destination.exists());

    let notice = Notice::from_error(&err);
    assert_eq!(notice.level, Level::Error);

    let log = engine.log.borrow();
    assert_eq!(log.launches, 2);
    assert_eq!(log.quits, 2);
    // The workspace holding the first document's PDF is gone too
    let intermediate = &log.saved[0];
    assert!(!intermediate.parent().unwrap().exists());
}

#[test]
fn test_failed_single_conversion_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let bad = corrupt_document(dir.path(), "bad.docx");
    let destination = dir.path().join("out.pdf");

    let result = convert_single(&FakeEngine::default(), &select(&[bad]), Some(&destination), &numbered());

    assert!(result.is_err());
    assert!(!destination.exists());
    assert!(temp_files_next_to(&destination).is_empty());
}

#[test]
fn test_unreadable_pdf_during_numbering_leaves_nothing_behind() {
    let dir = TempDir::new().unwrap();
    let garbled = garbled_document(dir.path(), "a.docx");
    let destination = dir.path().join("out.pdf");

    let err = convert_single(&FakeEngine::default(), &select(&[garbled]), Some(&destination), &numbered()).unwrap_err();

    assert!(matches!(err, Error::Pdf(_)));
    assert!(!destination.exists());
    assert!(temp_files_next_to(&destination).is_empty());
}

#[test]
fn test_unreadable_pdf_during_merge_leaves_nothing_behind() {
    let dir = TempDir::new().unwrap();
    let good = word_document(dir.path(), "a.docx", 1);
    let garbled = garbled_document(dir.path(), "b.docx");
    let destination = dir.path().join("out.pdf");
    let engine = FakeEngine::default();

    let result = merge_selection(&engine, &select(&[good, garbled]), Some(&destination), &numbered());

    assert!(result.is_err());
    assert!(!destination.exists());
    assert!(temp_files_next_to(&destination).is_empty());

    // Both documents converted, then the workspace went away with them
    let log = engine.log.borrow();
    assert_eq!(log.saved.len(), 2);
    assert!(!log.saved[0].parent().unwrap().exists());
}

#[test]
fn test_selection_limits_are_warnings_without_side_effects() {
    let dir = TempDir::new().unwrap();
    let a = word_document(dir.path(), "a.docx", 1);
    let b = word_document(dir.path(), "b.docx", 1);
    let destination = dir.path().join("out.pdf");
    let engine = FakeEngine::default();

    let single = convert_single(&engine, &select(&[a.clone(), b]), Some(&destination), &WorkflowOptions::default());
    let merge = merge_selection(&engine, &select(&[a]), Some(&destination), &WorkflowOptions::default());

    for result in [single, merge] {
        let notice = Notice::from_result(&result).unwrap();
        assert_eq!(notice.level, Level::Warning);
    }
    assert_eq!(engine.log.borrow().launches, 0);
    assert!(!destination.exists());
}
