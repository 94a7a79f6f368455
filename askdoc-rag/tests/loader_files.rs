//! Loader behavior against real files on disk.

use std::fs;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Object, Stream, dictionary};

use askdoc_rag::error::RagError;
use askdoc_rag::load_documents;

/// Build a two-page PDF: page 1 carries text, page 2 is blank.
fn write_two_page_pdf(path: &Path, text: &str) {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![100.into(), 600.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });

    let blank_content = Content { operations: vec![] };
    let blank_id = doc.add_object(Stream::new(dictionary! {}, blank_content.encode().unwrap()));
    let blank_page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => blank_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into(), blank_page_id.into()],
            "Count" => 2,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[test]
fn missing_folder_is_a_loader_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_documents(&dir.path().join("does-not-exist")).unwrap_err();
    assert!(matches!(err, RagError::LoaderError { .. }));
}

#[test]
fn empty_folder_loads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let report = load_documents(dir.path()).unwrap();
    assert!(report.documents.is_empty());
    assert!(report.skipped.is_empty());
}

#[test]
fn pdf_page_and_text_file_yield_two_documents() {
    let dir = tempfile::tempdir().unwrap();
    write_two_page_pdf(&dir.path().join("policy.pdf"), "Hello World!");
    fs::write(dir.path().join("faq.txt"), "Refunds are processed within 30 days.").unwrap();

    let report = load_documents(dir.path()).unwrap();
    assert_eq!(report.documents.len(), 2);

    let pdf_doc = report.documents.iter().find(|d| d.meta.source == "policy.pdf").unwrap();
    assert_eq!(pdf_doc.meta.page, Some(1));
    assert!(pdf_doc.text.contains("Hello World!"));

    let txt_doc = report.documents.iter().find(|d| d.meta.source == "faq.txt").unwrap();
    assert_eq!(txt_doc.meta.page, None);
    assert_eq!(txt_doc.text, "Refunds are processed within 30 days.");
}

#[test]
fn text_encodings_fall_back_in_priority_order() {
    let dir = tempfile::tempdir().unwrap();

    fs::write(dir.path().join("plain.txt"), "utf-8 content").unwrap();

    let mut utf16 = vec![0xFF, 0xFE];
    for unit in "utf-16 content".encode_utf16() {
        utf16.extend_from_slice(&unit.to_le_bytes());
    }
    fs::write(dir.path().join("wide.txt"), &utf16).unwrap();

    // "résumés" in Latin-1 — not valid UTF-8, odd length rules out UTF-16
    fs::write(
        dir.path().join("legacy.txt"),
        [b'r', 0xE9, b's', b'u', b'm', 0xE9, b's'],
    )
    .unwrap();

    let report = load_documents(dir.path()).unwrap();
    assert_eq!(report.documents.len(), 3);

    let text_of = |name: &str| {
        report.documents.iter().find(|d| d.meta.source == name).map(|d| d.text.clone()).unwrap()
    };
    assert_eq!(text_of("plain.txt"), "utf-8 content");
    assert_eq!(text_of("wide.txt"), "utf-16 content");
    assert_eq!(text_of("legacy.txt"), "résumés");
}

#[test]
fn extensionless_files_are_loaded() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("NOTICE"), "extensionless notice text").unwrap();

    let report = load_documents(dir.path()).unwrap();
    assert_eq!(report.documents.len(), 1);
    assert_eq!(report.documents[0].meta.source, "NOTICE");
}

#[test]
fn unsupported_extensions_are_skipped_with_reason() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("archive.zip"), [0x50, 0x4B, 0x03, 0x04]).unwrap();
    fs::write(dir.path().join("kept.txt"), "kept").unwrap();

    let report = load_documents(dir.path()).unwrap();
    assert_eq!(report.documents.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].file, "archive.zip");
    assert_eq!(report.skipped[0].reason, "unsupported file type");
}

#[test]
fn whitespace_only_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("blank.txt"), "  \n\t \n").unwrap();

    let report = load_documents(dir.path()).unwrap();
    assert!(report.documents.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, "no readable text");
}

#[test]
fn one_bad_file_does_not_abort_the_load() {
    let dir = tempfile::tempdir().unwrap();
    // Claims to be a PDF but is not parseable as one
    fs::write(dir.path().join("broken.pdf"), b"not a pdf at all").unwrap();
    fs::write(dir.path().join("good.txt"), "good content").unwrap();

    let report = load_documents(dir.path()).unwrap();
    assert_eq!(report.documents.len(), 1);
    assert_eq!(report.documents[0].meta.source, "good.txt");
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].file, "broken.pdf");
}
