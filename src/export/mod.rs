//! Export orchestration.
//!
//! The orchestrator drives one export call end to end: authorize the
//! caller against the book's owner, load the book, normalize every
//! chapter body into blocks, hand the blocks to exactly one renderer,
//! and frame the response (content type, attachment filename, payload).
//!
//! The two renderers deliberately keep different shapes. DOCX is a
//! packaged container, so [`DocxExporter`] materializes the whole
//! document and [`ExportOrchestrator::export_docx`] returns a buffer.
//! PDF is a page stream, so [`PdfExporter`] writes into a caller-
//! supplied sink and [`ExportOrchestrator::export_pdf`] returns only
//! the framing. Only their *input* — the block model — is unified.

use std::io::Write;

use log::debug;
use rayon::prelude::*;

use crate::book::Book;
use crate::error::{Error, Result};
use crate::images::ImageResolver;
use crate::markup::{Block, build_blocks, parse};
use crate::store::{Authorizer, BookStore, FileStore};
use crate::util::sanitize_filename;

mod docx;
mod pdf;

pub use docx::{DocxConfig, DocxExporter};
pub use pdf::{PdfConfig, PdfExporter};

/// Which output format an export call produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    WordDocument,
    Pdf,
}

impl RenderTarget {
    pub fn content_type(self) -> &'static str {
        match self {
            RenderTarget::WordDocument => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            RenderTarget::Pdf => "application/pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            RenderTarget::WordDocument => "docx",
            RenderTarget::Pdf => "pdf",
        }
    }
}

/// A fully buffered export (the DOCX path).
#[derive(Debug, Clone)]
pub struct DocumentExport {
    pub content_type: &'static str,
    pub filename: String,
    pub data: Vec<u8>,
}

impl DocumentExport {
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// Framing for a streamed export (the PDF path); the document bytes
/// went to the caller's sink.
#[derive(Debug, Clone)]
pub struct StreamExport {
    pub content_type: &'static str,
    pub filename: String,
    pub bytes_written: u64,
}

impl StreamExport {
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// Normalize every chapter body into its block sequence.
///
/// Chapters are independent, so parsing runs in parallel; the indexed
/// collect keeps the result in chapter order, which is externally
/// observable in the output and must not change.
pub fn chapter_blocks(book: &Book) -> Vec<Vec<Block>> {
    book.chapters
        .par_iter()
        .map(|chapter| build_blocks(&parse(&chapter.body)))
        .collect()
}

/// Drives the authorize → load → normalize → render → frame pipeline.
pub struct ExportOrchestrator<'a> {
    books: &'a dyn BookStore,
    files: &'a dyn FileStore,
    auth: &'a dyn Authorizer,
}

impl<'a> ExportOrchestrator<'a> {
    pub fn new(
        books: &'a dyn BookStore,
        files: &'a dyn FileStore,
        auth: &'a dyn Authorizer,
    ) -> Self {
        Self { books, files, auth }
    }

    /// Export a book as a fully buffered word document.
    pub fn export_docx(&self, book_id: &str, identity: &str) -> Result<DocumentExport> {
        let book = self.load_authorized(book_id, identity)?;
        debug!("exporting book {book_id} as docx");

        let blocks = chapter_blocks(&book);
        let resolver = ImageResolver::new(self.files);
        let data = DocxExporter::new().render(&book, &blocks, &resolver)?;

        debug!("docx export of {book_id} finished ({} bytes)", data.len());
        Ok(DocumentExport {
            content_type: RenderTarget::WordDocument.content_type(),
            filename: export_filename(&book.title, RenderTarget::WordDocument),
            data,
        })
    }

    /// Export a book as a PDF streamed into `sink`.
    ///
    /// Nothing is written to the sink until the caller is authorized
    /// and the book is loaded, so a failed precondition produces zero
    /// payload bytes.
    pub fn export_pdf<W: Write>(
        &self,
        book_id: &str,
        identity: &str,
        sink: &mut W,
    ) -> Result<StreamExport> {
        let book = self.load_authorized(book_id, identity)?;
        debug!("exporting book {book_id} as pdf");

        let blocks = chapter_blocks(&book);
        let resolver = ImageResolver::new(self.files);
        let bytes_written = PdfExporter::new().render(&book, &blocks, &resolver, sink)?;

        debug!("pdf export of {book_id} finished ({bytes_written} bytes)");
        Ok(StreamExport {
            content_type: RenderTarget::Pdf.content_type(),
            filename: export_filename(&book.title, RenderTarget::Pdf),
            bytes_written,
        })
    }

    /// Format-generic dispatch writing either format into `sink`.
    pub fn export_to<W: Write>(
        &self,
        book_id: &str,
        identity: &str,
        target: RenderTarget,
        sink: &mut W,
    ) -> Result<StreamExport> {
        match target {
            RenderTarget::WordDocument => {
                let export = self.export_docx(book_id, identity)?;
                sink.write_all(&export.data)?;
                Ok(StreamExport {
                    content_type: export.content_type,
                    filename: export.filename,
                    bytes_written: export.data.len() as u64,
                })
            }
            RenderTarget::Pdf => self.export_pdf(book_id, identity, sink),
        }
    }

    fn load_authorized(&self, book_id: &str, identity: &str) -> Result<Book> {
        let book = self
            .books
            .get(book_id)
            .ok_or_else(|| Error::BookNotFound(book_id.to_string()))?;
        if !self.auth.owns(identity, &book) {
            return Err(Error::Unauthorized);
        }
        Ok(book)
    }
}

/// Attachment filename for a book title and target format.
fn export_filename(title: &str, target: RenderTarget) -> String {
    format!("{}.{}", sanitize_filename(title), target.extension())
}
