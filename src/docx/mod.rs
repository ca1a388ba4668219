//! Minimal OOXML word-processing document model.
//!
//! The DOCX renderer assembles a retained document tree (sections of
//! paragraphs of runs) and [`writer`] serializes the whole tree into a
//! complete OPC package in one pass. This mirrors the format itself:
//! a `.docx` file is a zip container of XML parts and must be
//! materialized as a finished package, not streamed.

pub mod writer;

pub use writer::write_docx;

/// A complete word-processing document: an ordered list of sections.
#[derive(Debug, Clone, Default)]
pub struct DocxDocument {
    pub sections: Vec<Section>,
}

impl DocxDocument {
    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }
}

/// A document section. Sections start on a new page.
#[derive(Debug, Clone, Default)]
pub struct Section {
    pub children: Vec<Paragraph>,
}

impl Section {
    pub fn add(&mut self, paragraph: Paragraph) {
        self.children.push(paragraph);
    }
}

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// A paragraph: optional named style plus a list of runs.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    /// Paragraph style id, e.g. `Heading1`.
    pub style: Option<String>,
    pub alignment: Option<Alignment>,
    /// Spacing after the paragraph, in twentieths of a point.
    pub spacing_after: Option<u32>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// A plain paragraph holding a single unstyled text run.
    pub fn text(text: impl Into<String>) -> Self {
        Self::default().with_run(Run::Text(TextRun::new(text)))
    }

    /// A paragraph using a named style, e.g. a heading.
    pub fn styled(style: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            style: Some(style.into()),
            ..Self::default()
        }
        .with_run(Run::Text(TextRun::new(text)))
    }

    /// A paragraph holding only an explicit page break.
    pub fn page_break() -> Self {
        Self::default().with_run(Run::PageBreak)
    }

    pub fn with_run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn with_spacing_after(mut self, twentieths: u32) -> Self {
        self.spacing_after = Some(twentieths);
        self
    }
}

/// Paragraph content: text, an inline image, or an explicit page break.
#[derive(Debug, Clone)]
pub enum Run {
    Text(TextRun),
    Image(ImageRun),
    PageBreak,
}

/// A text run with character formatting.
#[derive(Debug, Clone, Default)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italics: bool,
    /// Font size in half-points.
    pub size: Option<u32>,
    /// Font family override, e.g. `Courier New`.
    pub font: Option<String>,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italics(mut self) -> Self {
        self.italics = true;
        self
    }

    pub fn size(mut self, half_points: u32) -> Self {
        self.size = Some(half_points);
        self
    }

    pub fn font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }
}

/// An inline image run. Data must already be JPEG-encoded (the
/// resolver's normalization format).
#[derive(Debug, Clone)]
pub struct ImageRun {
    pub data: Vec<u8>,
    /// Display size in pixels (96 dpi logical units).
    pub width_px: u32,
    pub height_px: u32,
}
