//! Document loading from a local folder.
//!
//! PDFs are extracted page by page; text-like files are decoded with a fixed
//! encoding priority (UTF-8, then UTF-16, then Latin-1) before falling back
//! to lossy UTF-8. One unreadable file never aborts the batch — every skip
//! is recorded in the returned [`LoadReport`].

use std::fs;
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::document::{Document, DocumentMeta};
use crate::error::{RagError, Result};

/// Text-like extensions the loader will attempt to decode. Files with no
/// extension are also attempted.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rst", "log", "csv", "tsv", "json", "yaml", "yml", "ini", "cfg",
    "conf", "html", "htm",
];

/// A file the loader saw but produced no documents from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedFile {
    /// The filename as listed in the folder.
    pub file: String,
    /// Why it was skipped.
    pub reason: String,
}

/// The outcome of a folder load: the documents that were produced, and an
/// account of every file that was not.
///
/// Distinguishes "the folder held nothing loadable" from "loading failed" —
/// the latter is a [`RagError::LoaderError`] from [`load_documents`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    /// Documents produced, one per readable text file or PDF page with
    /// extractable text. Order follows the directory listing; callers must
    /// not depend on it.
    pub documents: Vec<Document>,
    /// Files that produced no documents, with reasons.
    pub skipped: Vec<SkippedFile>,
}

/// Load PDF and text documents from `folder`.
///
/// Per-file failures are isolated: the file is recorded in
/// [`LoadReport::skipped`] and the load continues.
///
/// # Errors
///
/// Returns [`RagError::LoaderError`] if the folder itself is missing or
/// unreadable.
pub fn load_documents(folder: &Path) -> Result<LoadReport> {
    let started = Instant::now();

    let entries = fs::read_dir(folder).map_err(|e| {
        error!(path = %folder.display(), error = %e, "folder not found or unreadable");
        RagError::LoaderError { path: folder.display().to_string(), message: e.to_string() }
    })?;

    let mut report = LoadReport::default();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!(path = %folder.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().into_owned();

        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        if extension == "pdf" {
            load_pdf(&path, &filename, &mut report);
        } else if extension.is_empty() || TEXT_EXTENSIONS.contains(&extension.as_str()) {
            load_text_file(&path, &filename, &mut report);
        } else {
            warn!(file = %filename, "unsupported file type skipped");
            report.skip(&filename, "unsupported file type");
        }
    }

    if report.documents.is_empty() {
        warn!(path = %folder.display(), "no loadable documents found in folder");
    }
    info!(
        documents = report.documents.len(),
        skipped = report.skipped.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "documents loaded"
    );

    Ok(report)
}

impl LoadReport {
    fn skip(&mut self, file: &str, reason: &str) {
        self.skipped.push(SkippedFile { file: file.to_string(), reason: reason.to_string() });
    }
}

/// Extract one document per PDF page with non-empty text. Pages yielding no
/// extractable text are skipped silently; an unparsable file is recorded and
/// the batch continues.
fn load_pdf(path: &Path, filename: &str, report: &mut LoadReport) {
    let pdf = match lopdf::Document::load(path) {
        Ok(pdf) => pdf,
        Err(e) => {
            error!(file = %filename, error = %e, "failed to load PDF");
            report.skip(filename, "failed to parse PDF");
            return;
        }
    };

    let mut pages = 0;
    for page_number in pdf.get_pages().keys() {
        match pdf.extract_text(&[*page_number]) {
            Ok(text) if !text.trim().is_empty() => {
                report
                    .documents
                    .push(Document::new(text, DocumentMeta::page(filename, *page_number)));
                pages += 1;
            }
            Ok(_) => {}
            Err(e) => {
                debug!(file = %filename, page = page_number, error = %e, "no extractable text");
            }
        }
    }

    if pages == 0 {
        warn!(file = %filename, "no readable text found in PDF");
        report.skip(filename, "no extractable text");
    } else {
        info!(file = %filename, pages, "loaded PDF");
    }
}

fn load_text_file(path: &Path, filename: &str, report: &mut LoadReport) {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(file = %filename, error = %e, "failed to read file");
            report.skip(filename, "read failed");
            return;
        }
    };

    match decode_text(&bytes) {
        Some(text) => {
            report.documents.push(Document::new(text, DocumentMeta::file(filename)));
            info!(file = %filename, "loaded text file");
        }
        None => {
            warn!(file = %filename, "no readable text found");
            report.skip(filename, "no readable text");
        }
    }
}

/// Decode file bytes with the fixed encoding priority: strict UTF-8, then
/// UTF-16 (BOM-aware, little-endian default), then Latin-1 (as its
/// windows-1252 superset), then lossy UTF-8 that drops invalid sequences.
///
/// Returns `None` when every attempt yields only whitespace.
fn decode_text(bytes: &[u8]) -> Option<String> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        if !text.trim().is_empty() {
            return Some(text.to_string());
        }
    }

    let utf16 =
        if bytes.starts_with(&[0xFE, 0xFF]) { encoding_rs::UTF_16BE } else { encoding_rs::UTF_16LE };
    let (text, had_errors) = utf16.decode_with_bom_removal(bytes);
    if !had_errors && !text.trim().is_empty() {
        return Some(text.into_owned());
    }

    let (text, had_errors) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
    if !had_errors && !text.trim().is_empty() {
        return Some(text.into_owned());
    }

    let text = String::from_utf8_lossy(bytes);
    if text.trim().is_empty() { None } else { Some(text.into_owned()) }
}
