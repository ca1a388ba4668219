//! Streaming PDF writer.
//!
//! A small imperative page canvas: text and images are drawn at a
//! cursor that flows down the page, new pages open automatically when
//! content would cross the bottom margin, and finished pages are
//! written to the output sink immediately. Only the current page's
//! operations are buffered, so memory stays bounded for very large
//! documents and the sink's own backpressure throttles the writer.
//!
//! The file structure is PDF 1.4: objects as they are produced, then
//! the page tree, catalog, cross-reference table, and trailer from
//! [`writer::PdfWriter::finish`]. Fonts are the base-14 set referenced
//! by name (no embedding) with WinAnsi encoding; images embed as
//! DCTDecode XObjects straight from their JPEG bytes.

mod metrics;
mod writer;

pub use metrics::{char_width, text_width};
pub use writer::{Align, PageConfig, PdfWriter};

/// Base-14 fonts available on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    HelveticaBold,
    Courier,
}

impl Font {
    /// Resource name inside page content streams.
    pub(crate) fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
            Font::Courier => "F3",
        }
    }

    pub(crate) fn base_name(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
            Font::Courier => "Courier",
        }
    }

    /// Reserved object id of the font dictionary.
    pub(crate) fn object_id(self) -> u32 {
        match self {
            Font::Helvetica => 3,
            Font::HelveticaBold => 4,
            Font::Courier => 5,
        }
    }
}
