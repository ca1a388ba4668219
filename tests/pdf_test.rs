use std::io::{self, Cursor, Write};

use bookpress::export::{PdfConfig, chapter_blocks};
use bookpress::pdf::PageConfig;
use bookpress::{Book, ImageResolver, MemoryFileStore, PdfExporter};

/// Exporter with uncompressed content streams so the operator text is
/// directly inspectable.
fn exporter() -> PdfExporter {
    PdfExporter::new().with_config(PdfConfig {
        page: PageConfig {
            compress: false,
            ..PageConfig::default()
        },
        ..PdfConfig::default()
    })
}

fn render(book: &Book, files: &MemoryFileStore) -> Vec<u8> {
    let blocks = chapter_blocks(book);
    let resolver = ImageResolver::new(files);
    let mut sink = Vec::new();
    let bytes = exporter()
        .render(book, &blocks, &resolver, &mut sink)
        .expect("pdf render failed");
    assert_eq!(bytes, sink.len() as u64);
    sink
}

fn page_count(pdf: &str) -> usize {
    pdf.matches("/Type /Page /Parent").count()
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

#[test]
fn test_my_guide_scenario() {
    let book = Book::new("b1", "u1", "My Guide", "A. Writer")
        .with_chapter("Intro", "# Hello\nSome *text*.");
    let data = render(&book, &MemoryFileStore::new());
    let pdf = String::from_utf8_lossy(&data).to_string();

    assert!(pdf.starts_with("%PDF-1.4"));
    assert!(pdf.ends_with("%%EOF\n"));

    for expected in [
        "(My Guide) Tj",
        "(By A. Writer) Tj",
        "(Intro) Tj",
        "(Hello) Tj",
        "(Some text.) Tj",
    ] {
        assert!(pdf.contains(expected), "missing {expected}");
    }

    // Title page, then a forced break into the single chapter.
    assert_eq!(page_count(&pdf), 2);

    // Title page content precedes the chapter content.
    let title = pdf.find("(My Guide) Tj").unwrap();
    let chapter = pdf.find("(Intro) Tj").unwrap();
    assert!(title < chapter);

    // The chapter title is underlined (a stroked rule after the text).
    assert!(pdf.contains(" l S\n"));
}

#[test]
fn test_forced_chapter_boundary_breaks() {
    let book = Book::new("b1", "u1", "Guide", "A")
        .with_chapter("First", "one")
        .with_chapter("Second", "two")
        .with_chapter("Third", "three");
    let data = render(&book, &MemoryFileStore::new());
    let pdf = String::from_utf8_lossy(&data);

    // Title page + one page per chapter; no overflow with bodies this
    // short, so every page boundary here is a forced break.
    assert_eq!(page_count(&pdf), 4);

    let first = pdf.find("(First) Tj").unwrap();
    let second = pdf.find("(Second) Tj").unwrap();
    let third = pdf.find("(Third) Tj").unwrap();
    assert!(first < second && second < third);
}

#[test]
fn test_zero_chapters_title_page_only() {
    let book = Book::new("b1", "u1", "Empty Book", "A. Writer").with_subtitle("Soon");
    let data = render(&book, &MemoryFileStore::new());
    let pdf = String::from_utf8_lossy(&data);

    assert_eq!(page_count(&pdf), 1);
    assert!(pdf.contains("(Empty Book) Tj"));
    assert!(pdf.contains("(Soon) Tj"));
    assert!(pdf.contains("(By A. Writer) Tj"));
}

#[test]
fn test_overflow_creates_pages_automatically() {
    let body = "A paragraph of body text that occupies one line.\n\n".repeat(120);
    let book = Book::new("b1", "u1", "Guide", "A").with_chapter("Long", body);
    let data = render(&book, &MemoryFileStore::new());
    let pdf = String::from_utf8_lossy(&data);

    // Automatic pagination on top of the one forced break.
    assert!(page_count(&pdf) > 2, "got {} pages", page_count(&pdf));
}

#[test]
fn test_empty_chapter_body_renders() {
    let book = Book::new("b1", "u1", "Guide", "A").with_chapter("Blank", "");
    let data = render(&book, &MemoryFileStore::new());
    let pdf = String::from_utf8_lossy(&data);

    assert_eq!(page_count(&pdf), 2);
    assert!(pdf.contains("(Blank) Tj"));
}

#[test]
fn test_cover_image_embedded() {
    let mut files = MemoryFileStore::new();
    files.insert("uploads/cover.png", png_bytes(640, 480));
    let book = Book::new("b1", "u1", "Guide", "A").with_cover_image("uploads/cover.png");
    let data = render(&book, &files);
    let pdf = String::from_utf8_lossy(&data);

    assert!(pdf.contains("/Subtype /Image"));
    assert!(pdf.contains("/Filter /DCTDecode"));
    assert!(pdf.contains("/Im1 Do"));
}

#[test]
fn test_unresolvable_image_keeps_text() {
    let book = Book::new("b1", "u1", "Guide", "A")
        .with_chapter("Ch", "![x](uploads/gone.png)\n\nStill here.");
    let data = render(&book, &MemoryFileStore::new());
    let pdf = String::from_utf8_lossy(&data);

    assert!(!pdf.contains("/Subtype /Image"));
    assert!(pdf.contains("(Still here.) Tj"));
}

#[test]
fn test_chapter_image_before_body_text() {
    let mut files = MemoryFileStore::new();
    files.insert("uploads/fig.png", png_bytes(300, 150));
    let book = Book::new("b1", "u1", "Guide", "A")
        .with_chapter("Ch", "![fig](uploads/fig.png)\n\nAfter the figure.");
    let data = render(&book, &files);
    let pdf = String::from_utf8_lossy(&data);

    let image = pdf.find("/Im1 Do").expect("image not drawn");
    let text = pdf.find("(After the figure.) Tj").expect("text not drawn");
    assert!(image < text);
}

#[test]
fn test_export_is_deterministic() {
    let mut files = MemoryFileStore::new();
    files.insert("uploads/cover.png", png_bytes(64, 64));
    let book = Book::new("b1", "u1", "Guide", "A")
        .with_cover_image("uploads/cover.png")
        .with_chapter("Ch", "# H\n\ntext");

    assert_eq!(render(&book, &files), render(&book, &files));
}

#[test]
fn test_compressed_streams_by_default() {
    let book = Book::new("b1", "u1", "Guide", "A").with_chapter("Ch", "hello");
    let blocks = chapter_blocks(&book);
    let files = MemoryFileStore::new();
    let resolver = ImageResolver::new(&files);
    let mut sink = Vec::new();
    PdfExporter::new()
        .render(&book, &blocks, &resolver, &mut sink)
        .unwrap();

    let pdf = String::from_utf8_lossy(&sink);
    assert!(pdf.contains("/Filter /FlateDecode"));
    // Operator text must not be visible in compressed streams.
    assert!(!pdf.contains("(hello) Tj"));
}

/// A sink that fails after a byte limit, standing in for a response
/// channel that closes mid-stream.
struct FailingSink {
    written: usize,
    limit: usize,
}

impl Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written + buf.len() > self.limit {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
        }
        self.written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_closed_sink_surfaces_error_without_hanging() {
    let body = "line\n\n".repeat(500);
    let book = Book::new("b1", "u1", "Guide", "A").with_chapter("Long", body);
    let blocks = chapter_blocks(&book);
    let files = MemoryFileStore::new();
    let resolver = ImageResolver::new(&files);

    let mut sink = FailingSink {
        written: 0,
        limit: 512,
    };
    let result = exporter().render(&book, &blocks, &resolver, &mut sink);
    assert!(result.is_err());
}
