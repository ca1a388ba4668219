//! Word-document renderer.
//!
//! Builds a retained document tree from the book and its normalized
//! chapter blocks, then packages it fully in memory. DOCX is a
//! packaged-container format: the whole document exists before the
//! first byte is returned.

use std::io::Cursor;

use crate::book::Book;
use crate::docx::{
    Alignment, DocxDocument, ImageRun, Paragraph, Run, Section, TextRun, write_docx,
};
use crate::error::Result;
use crate::images::{ImageResolver, fit_box};
use crate::markup::Block;

/// Configuration for DOCX export.
#[derive(Debug, Clone)]
pub struct DocxConfig {
    /// Bounding box for the cover image, in pixels.
    pub cover_box: (u32, u32),
    /// Bounding box for a chapter's embedded image, in pixels.
    pub chapter_image_box: (u32, u32),
}

impl Default for DocxConfig {
    fn default() -> Self {
        Self {
            cover_box: (400, 400),
            chapter_image_box: (350, 200),
        }
    }
}

/// DOCX format renderer.
pub struct DocxExporter {
    config: DocxConfig,
}

impl DocxExporter {
    pub fn new() -> Self {
        Self {
            config: DocxConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DocxConfig) -> Self {
        self.config = config;
        self
    }

    /// Render the book to a complete `.docx` byte buffer.
    ///
    /// `chapter_blocks` must parallel `book.chapters`, one block
    /// sequence per chapter, in order.
    pub fn render(
        &self,
        book: &Book,
        chapter_blocks: &[Vec<Block>],
        images: &ImageResolver<'_>,
    ) -> Result<Vec<u8>> {
        let mut doc = DocxDocument::default();
        doc.add_section(self.cover_section(book, images));
        doc.add_section(self.chapters_section(book, chapter_blocks, images));

        let mut buffer = Cursor::new(Vec::new());
        write_docx(&doc, &mut buffer)?;
        Ok(buffer.into_inner())
    }

    fn cover_section(&self, book: &Book, images: &ImageResolver<'_>) -> Section {
        let mut cover = Section::default();
        let (box_w, box_h) = self.config.cover_box;

        if let Some(ref path) = book.cover_image
            && let Some(asset) = images.resolve(path, box_w)
        {
            let (w, h) = fit_box(asset.width, asset.height, box_w, box_h);
            cover.add(
                Paragraph::default()
                    .with_run(Run::Image(ImageRun {
                        data: asset.data,
                        width_px: w,
                        height_px: h,
                    }))
                    .with_alignment(Alignment::Center)
                    .with_spacing_after(400),
            );
        }

        cover.add(
            Paragraph::default()
                .with_run(Run::Text(TextRun::new(book.title.as_str()).bold().size(56)))
                .with_alignment(Alignment::Center)
                .with_spacing_after(200),
        );

        if let Some(ref subtitle) = book.subtitle {
            cover.add(
                Paragraph::default()
                    .with_run(Run::Text(TextRun::new(subtitle.as_str()).italics().size(28)))
                    .with_alignment(Alignment::Center)
                    .with_spacing_after(200),
            );
        }

        cover.add(
            Paragraph::default()
                .with_run(Run::Text(TextRun::new(format!("By {}", book.author)).size(24)))
                .with_alignment(Alignment::Center)
                .with_spacing_after(600),
        );

        cover.add(Paragraph::page_break());
        cover
    }

    fn chapters_section(
        &self,
        book: &Book,
        chapter_blocks: &[Vec<Block>],
        images: &ImageResolver<'_>,
    ) -> Section {
        let mut section = Section::default();
        let (box_w, box_h) = self.config.chapter_image_box;
        let last = book.chapters.len().saturating_sub(1);

        for (i, (chapter, blocks)) in book.chapters.iter().zip(chapter_blocks).enumerate() {
            section.add(
                Paragraph::styled("Heading1", chapter.title.as_str()).with_spacing_after(200),
            );

            // The chapter's image (if any) goes right after the title,
            // before any body text.
            if let Some(Block::ImageRef { path }) = blocks
                .iter()
                .find(|b| matches!(b, Block::ImageRef { .. }))
                && let Some(asset) = images.resolve(path, box_w)
            {
                let (w, h) = fit_box(asset.width, asset.height, box_w, box_h);
                section.add(
                    Paragraph::default()
                        .with_run(Run::Image(ImageRun {
                            data: asset.data,
                            width_px: w,
                            height_px: h,
                        }))
                        .with_alignment(Alignment::Center)
                        .with_spacing_after(200),
                );
            }

            for block in blocks {
                match block {
                    Block::Heading { level, text } => {
                        section.add(
                            Paragraph::styled(format!("Heading{level}"), text.as_str())
                                .with_spacing_after(200),
                        );
                    }
                    Block::Paragraph { text } => {
                        section.add(
                            Paragraph::default()
                                .with_run(Run::Text(TextRun::new(text.as_str())))
                                .with_spacing_after(200),
                        );
                    }
                    Block::CodeBlock { text } => {
                        section.add(
                            Paragraph::default()
                                .with_run(Run::Text(
                                    TextRun::new(text.as_str()).font("Courier New").size(20),
                                ))
                                .with_spacing_after(200),
                        );
                    }
                    // Already placed after the chapter title.
                    Block::ImageRef { .. } => {}
                }
            }

            if i < last {
                section.add(Paragraph::page_break());
            }
        }

        section
    }
}

impl Default for DocxExporter {
    fn default() -> Self {
        Self::new()
    }
}
