//! Error types for export operations.

use thiserror::Error;

/// Errors that can occur while exporting a book.
///
/// Image problems are deliberately absent from this enum: a missing or
/// corrupt image is recovered inside [`crate::images::ImageResolver`]
/// and never aborts an export.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("book not found: {0}")]
    BookNotFound(String),

    #[error("caller is not the book owner")]
    Unauthorized,

    #[error("render failure: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;
