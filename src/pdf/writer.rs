//! Page canvas and object serialization.

use std::io::{self, Write};

use flate2::Compression;
use flate2::write::ZlibEncoder;

use super::{Font, metrics};
use crate::images::ImageAsset;

/// Page geometry and stream options.
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Page width in points. Default is A4.
    pub width: f32,
    /// Page height in points.
    pub height: f32,
    /// Uniform page margin in points.
    pub margin: f32,
    /// FlateDecode-compress page content streams. On by default;
    /// turn off to inspect the raw operator stream.
    pub compress: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin: 72.0,
            compress: true,
        }
    }
}

/// Horizontal placement of drawn content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Reserved object ids: 1 = catalog, 2 = page tree, 3..=5 = fonts.
const RESERVED_OBJECTS: usize = 5;
const CATALOG_ID: u32 = 1;
const PAGES_ID: u32 = 2;

/// Incremental PDF writer over any [`Write`] sink.
///
/// Pages are written as they complete; [`PdfWriter::finish`] emits the
/// page tree, catalog, xref and trailer, exactly once. Dropping the
/// writer without calling `finish` leaves a truncated file.
pub struct PdfWriter<W: Write> {
    sink: CountingWriter<W>,
    config: PageConfig,
    /// Byte offset of each written object, indexed by id − 1.
    offsets: Vec<u64>,
    page_ids: Vec<u32>,
    /// Operator stream of the page currently being drawn.
    content: Vec<u8>,
    /// XObjects referenced by the current page: (object id, image number).
    page_images: Vec<(u32, u32)>,
    image_count: u32,
    cursor_y: f32,
    page_open: bool,
    finished: bool,
}

impl<W: Write> PdfWriter<W> {
    /// Create a writer and emit the file header and font dictionaries.
    pub fn new(sink: W, config: PageConfig) -> io::Result<Self> {
        let mut writer = Self {
            sink: CountingWriter::new(sink),
            config,
            offsets: vec![0; RESERVED_OBJECTS],
            page_ids: Vec::new(),
            content: Vec::new(),
            page_images: Vec::new(),
            image_count: 0,
            cursor_y: 0.0,
            page_open: false,
            finished: false,
        };

        writer.sink.write_all(b"%PDF-1.4\n")?;
        // Binary marker comment so transports treat the file as binary.
        writer.sink.write_all(b"%\xE2\xE3\xCF\xD3\n")?;

        for font in [Font::Helvetica, Font::HelveticaBold, Font::Courier] {
            writer.begin_object(font.object_id())?;
            writeln!(
                writer.sink,
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>\nendobj",
                font.base_name()
            )?;
        }

        Ok(writer)
    }

    /// Usable width between the margins.
    pub fn content_width(&self) -> f32 {
        self.config.width - 2.0 * self.config.margin
    }

    /// Number of pages started so far (including the open one).
    pub fn page_count(&self) -> usize {
        self.page_ids.len() + usize::from(self.page_open)
    }

    /// Close the current page (if any) and start a fresh one with the
    /// cursor at the top margin.
    pub fn new_page(&mut self) -> io::Result<()> {
        if self.page_open {
            self.end_page()?;
        }
        self.content.clear();
        self.page_images.clear();
        self.cursor_y = self.config.height - self.config.margin;
        self.page_open = true;
        Ok(())
    }

    /// Draw text flowed from the cursor, wrapping at the margins and
    /// opening new pages as lines overflow the bottom margin.
    /// Newlines in `text` force line breaks.
    pub fn draw_text(
        &mut self,
        text: &str,
        font: Font,
        size: f32,
        align: Align,
        underline: bool,
    ) -> io::Result<()> {
        let max_width = self.content_width();
        for raw_line in text.split('\n') {
            for line in wrap_line(raw_line, font, size, max_width) {
                self.ensure_room(line_height(size))?;
                let width = metrics::text_width(font, &line, size);
                let x = match align {
                    Align::Left => self.config.margin,
                    Align::Center => self.config.margin + (max_width - width) / 2.0,
                };
                self.cursor_y -= size;
                let y = self.cursor_y;

                let _ = write!(
                    self.content,
                    "BT\n/{} {:.2} Tf\n{:.2} {:.2} Td\n",
                    font.resource_name(),
                    size,
                    x,
                    y
                );
                self.content.push(b'(');
                self.content.extend_from_slice(&encode_winansi(&line));
                self.content.extend_from_slice(b") Tj\nET\n");

                if underline {
                    let rule_y = y - 2.0;
                    let _ = write!(
                        self.content,
                        "0.5 w\n{:.2} {:.2} m {:.2} {:.2} l S\n",
                        x,
                        rule_y,
                        x + width,
                        rule_y
                    );
                }

                self.cursor_y -= size * 0.2;
            }
        }
        Ok(())
    }

    /// Move the cursor down by a number of lines at the given size.
    pub fn move_down(&mut self, lines: f32, size: f32) {
        self.cursor_y -= line_height(size) * lines;
    }

    /// Draw a resolved image at the given display size, writing its
    /// XObject to the sink immediately.
    pub fn draw_image(
        &mut self,
        asset: &ImageAsset,
        display_width: f32,
        display_height: f32,
        align: Align,
    ) -> io::Result<()> {
        self.ensure_room(display_height + 10.0)?;

        let object_id = self.alloc_id();
        self.begin_object(object_id)?;
        writeln!(
            self.sink,
            "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode /Length {} >>\nstream",
            asset.width,
            asset.height,
            asset.data.len()
        )?;
        self.sink.write_all(&asset.data)?;
        self.sink.write_all(b"\nendstream\nendobj\n")?;

        self.image_count += 1;
        let number = self.image_count;
        self.page_images.push((object_id, number));

        let x = match align {
            Align::Left => self.config.margin,
            Align::Center => {
                self.config.margin + (self.content_width() - display_width) / 2.0
            }
        };
        let y = self.cursor_y - display_height;
        let _ = write!(
            self.content,
            "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
            display_width, display_height, x, y, number
        );
        self.cursor_y = y - 10.0;
        Ok(())
    }

    /// Close the document: flush the open page, write the page tree,
    /// catalog, xref table, and trailer. Idempotent; returns the total
    /// number of bytes written to the sink.
    pub fn finish(&mut self) -> io::Result<u64> {
        if self.finished {
            return Ok(self.sink.count());
        }
        if self.page_open {
            self.end_page()?;
        }

        self.begin_object(PAGES_ID)?;
        let kids: String = self
            .page_ids
            .iter()
            .map(|id| format!("{id} 0 R "))
            .collect();
        writeln!(
            self.sink,
            "<< /Type /Pages /Kids [{}] /Count {} >>\nendobj",
            kids.trim_end(),
            self.page_ids.len()
        )?;

        self.begin_object(CATALOG_ID)?;
        writeln!(self.sink, "<< /Type /Catalog /Pages {PAGES_ID} 0 R >>\nendobj")?;

        let xref_offset = self.sink.count();
        let total = self.offsets.len() + 1;
        write!(self.sink, "xref\n0 {total}\n")?;
        self.sink.write_all(b"0000000000 65535 f \n")?;
        for offset in &self.offsets {
            write!(self.sink, "{offset:010} 00000 n \n")?;
        }
        write!(
            self.sink,
            "trailer\n<< /Size {total} /Root {CATALOG_ID} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        )?;

        self.sink.flush()?;
        self.finished = true;
        Ok(self.sink.count())
    }

    /// Open a new page if the next `needed` points would cross the
    /// bottom margin (or no page is open yet).
    fn ensure_room(&mut self, needed: f32) -> io::Result<()> {
        if !self.page_open {
            self.new_page()?;
        } else if self.cursor_y - needed < self.config.margin {
            self.new_page()?;
        }
        Ok(())
    }

    fn alloc_id(&mut self) -> u32 {
        self.offsets.push(0);
        self.offsets.len() as u32
    }

    fn begin_object(&mut self, id: u32) -> io::Result<()> {
        self.offsets[(id - 1) as usize] = self.sink.count();
        writeln!(self.sink, "{id} 0 obj")
    }

    fn end_page(&mut self) -> io::Result<()> {
        let content_id = self.alloc_id();
        let page_id = self.alloc_id();

        let (data, filter) = if self.config.compress {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(6));
            encoder.write_all(&self.content)?;
            (encoder.finish()?, " /Filter /FlateDecode")
        } else {
            (std::mem::take(&mut self.content), "")
        };

        self.begin_object(content_id)?;
        writeln!(self.sink, "<< /Length {}{} >>\nstream", data.len(), filter)?;
        self.sink.write_all(&data)?;
        self.sink.write_all(b"\nendstream\nendobj\n")?;

        self.begin_object(page_id)?;
        let mut resources =
            String::from("/Font << /F1 3 0 R /F2 4 0 R /F3 5 0 R >>");
        if !self.page_images.is_empty() {
            resources.push_str(" /XObject << ");
            for (object_id, number) in &self.page_images {
                resources.push_str(&format!("/Im{number} {object_id} 0 R "));
            }
            resources.push_str(">>");
        }
        writeln!(
            self.sink,
            "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {:.2} {:.2}] /Resources << {} >> /Contents {} 0 R >>\nendobj",
            self.config.width, self.config.height, resources, content_id
        )?;

        self.page_ids.push(page_id);
        self.content.clear();
        self.page_images.clear();
        self.page_open = false;
        Ok(())
    }
}

fn line_height(size: f32) -> f32 {
    size * 1.2
}

/// Greedy word wrap; words wider than a whole line break mid-word.
fn wrap_line(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if metrics::text_width(font, &candidate, size) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if metrics::text_width(font, word, size) <= max_width {
            current = word.to_string();
        } else {
            // Break an overlong word character by character.
            for c in word.chars() {
                let mut piece = current.clone();
                piece.push(c);
                if metrics::text_width(font, &piece, size) > max_width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current.push(c);
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Encode text as a WinAnsi PDF string body, escaping delimiters.
/// Characters without a WinAnsi mapping degrade to `?`.
fn encode_winansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        let byte = match c {
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            '\n' | '\r' | '\t' => b' ',
            c if (c as u32) < 0x100 => c as u8,
            _ => b'?',
        };
        if matches!(byte, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out
}

/// Write adapter that tracks the absolute byte offset, which the xref
/// table needs for every object.
struct CountingWriter<W: Write> {
    inner: W,
    count: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    fn count(&self) -> u64 {
        self.count
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.count += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
