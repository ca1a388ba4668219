//! PDF renderer.
//!
//! Streams drawing operations onto a page canvas: the title page, a
//! forced page break into the chapters, then each chapter flowed with
//! automatic wrapping and pagination plus one forced break per chapter
//! boundary. Bytes reach the sink as pages complete.

use std::io::Write;

use crate::book::Book;
use crate::error::Result;
use crate::images::{ImageResolver, fit_box};
use crate::markup::Block;
use crate::pdf::{Align, Font, PageConfig, PdfWriter};

/// Configuration for PDF export.
#[derive(Debug, Clone)]
pub struct PdfConfig {
    /// Page geometry and content-stream options.
    pub page: PageConfig,
    /// Maximum width of the cover image on the title page, in points.
    pub cover_width: u32,
    /// Bounding box for a chapter's embedded image, in points.
    pub chapter_image_box: (u32, u32),
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            cover_width: 400,
            chapter_image_box: (350, 200),
        }
    }
}

/// PDF format renderer.
pub struct PdfExporter {
    config: PdfConfig,
}

impl PdfExporter {
    pub fn new() -> Self {
        Self {
            config: PdfConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PdfConfig) -> Self {
        self.config = config;
        self
    }

    /// Render the book as a PDF streamed into `sink`.
    ///
    /// Returns the number of bytes written. The stream is terminated
    /// (trailer written) exactly once even if rendering fails partway;
    /// in that case the original error is returned and the client holds
    /// a truncated but closed document.
    pub fn render<W: Write>(
        &self,
        book: &Book,
        chapter_blocks: &[Vec<Block>],
        images: &ImageResolver<'_>,
        sink: &mut W,
    ) -> Result<u64> {
        let mut writer = PdfWriter::new(sink, self.config.page.clone())?;

        match self.render_body(&mut writer, book, chapter_blocks, images) {
            Ok(()) => Ok(writer.finish()?),
            Err(e) => {
                // Terminate the stream before surfacing the failure.
                let _ = writer.finish();
                Err(e)
            }
        }
    }

    fn render_body<W: Write>(
        &self,
        writer: &mut PdfWriter<W>,
        book: &Book,
        chapter_blocks: &[Vec<Block>],
        images: &ImageResolver<'_>,
    ) -> Result<()> {
        // Title page
        writer.new_page()?;
        writer.draw_text(&book.title, Font::HelveticaBold, 28.0, Align::Center, false)?;
        writer.move_down(0.5, 28.0);
        if let Some(ref subtitle) = book.subtitle {
            writer.draw_text(subtitle, Font::Helvetica, 18.0, Align::Center, false)?;
            writer.move_down(0.5, 18.0);
        }
        writer.draw_text(
            &format!("By {}", book.author),
            Font::Helvetica,
            14.0,
            Align::Center,
            false,
        )?;

        if let Some(ref path) = book.cover_image
            && let Some(asset) = images.resolve(path, self.config.cover_width)
        {
            writer.move_down(1.0, 14.0);
            let max = self.config.cover_width;
            let (w, h) = fit_box(asset.width, asset.height, max, max);
            writer.draw_image(&asset, w as f32, h as f32, Align::Center)?;
        }

        // Chapters, each starting on a fresh page: one forced break
        // into the chapters plus one per chapter boundary, independent
        // of any overflow pagination inside the chapter.
        let (box_w, box_h) = self.config.chapter_image_box;
        for (chapter, blocks) in book.chapters.iter().zip(chapter_blocks) {
            writer.new_page()?;
            writer.draw_text(&chapter.title, Font::HelveticaBold, 18.0, Align::Left, true)?;
            writer.move_down(0.5, 18.0);

            if let Some(Block::ImageRef { path }) = blocks
                .iter()
                .find(|b| matches!(b, Block::ImageRef { .. }))
                && let Some(asset) = images.resolve(path, box_w)
            {
                let (w, h) = fit_box(asset.width, asset.height, box_w, box_h);
                writer.draw_image(&asset, w as f32, h as f32, Align::Center)?;
            }

            for block in blocks {
                match block {
                    Block::Heading { text, .. } => {
                        writer.draw_text(text, Font::HelveticaBold, 14.0, Align::Left, false)?;
                    }
                    Block::Paragraph { text } => {
                        writer.draw_text(text, Font::Helvetica, 12.0, Align::Left, false)?;
                    }
                    Block::CodeBlock { text } => {
                        writer.draw_text(text, Font::Courier, 10.0, Align::Left, false)?;
                    }
                    Block::ImageRef { .. } => {}
                }
                writer.move_down(0.5, 12.0);
            }
        }

        Ok(())
    }
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::new()
    }
}
