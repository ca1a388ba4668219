//! # bookpress
//!
//! A document export engine for structured books: takes a [`Book`]
//! (title, optional subtitle, author, optional cover image, ordered
//! markdown chapters) and renders it to DOCX or PDF.
//!
//! ## Features
//!
//! - Markdown chapter bodies normalized into a shared [`Block`] model
//!   consumed by both renderers
//! - DOCX output as a fully packaged OOXML document (cover section,
//!   heading styles, embedded images, explicit chapter page breaks)
//! - PDF output streamed page-by-page with automatic wrapping and
//!   pagination
//! - Embedded images resolved, downscaled, and re-encoded; image
//!   failures degrade to "no image" instead of aborting the export
//!
//! ## Quick Start
//!
//! ```
//! use bookpress::{Book, ExportOrchestrator, MemoryBookStore, MemoryFileStore, OwnerAuthorizer};
//!
//! let mut books = MemoryBookStore::new();
//! books.insert(
//!     Book::new("b1", "user-1", "My Guide", "A. Writer")
//!         .with_chapter("Intro", "# Hello\nSome *text*."),
//! );
//! let files = MemoryFileStore::new();
//!
//! let orchestrator = ExportOrchestrator::new(&books, &files, &OwnerAuthorizer);
//!
//! // Word document: fully buffered
//! let docx = orchestrator.export_docx("b1", "user-1").unwrap();
//! assert!(docx.data.starts_with(b"PK"));
//!
//! // PDF: streamed to any `Write` sink
//! let mut sink = Vec::new();
//! let pdf = orchestrator.export_pdf("b1", "user-1", &mut sink).unwrap();
//! assert_eq!(pdf.bytes_written, sink.len() as u64);
//! ```
//!
//! ## Working with the pipeline directly
//!
//! Each stage is usable on its own: [`markup::parse`] tokenizes
//! markdown, [`markup::build_blocks`] normalizes tokens into [`Block`]s,
//! and the exporters in [`export`] render block sequences.

pub mod book;
pub mod docx;
pub mod error;
pub mod export;
pub mod images;
pub mod markup;
pub mod pdf;
pub mod store;
pub(crate) mod util;

pub use book::{Book, BookStatus, Chapter};
pub use error::{Error, Result};
pub use export::{
    DocumentExport, DocxExporter, ExportOrchestrator, PdfExporter, RenderTarget, StreamExport,
};
pub use images::{ImageAsset, ImageResolver};
pub use markup::{Block, Token, build_blocks, parse};
pub use store::{
    Authorizer, BookStore, FileStore, FsFileStore, MemoryBookStore, MemoryFileStore,
    OwnerAuthorizer,
};
