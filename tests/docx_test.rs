use std::io::{Cursor, Read};

use bookpress::export::chapter_blocks;
use bookpress::{Book, DocxExporter, ImageResolver, MemoryFileStore};

fn render(book: &Book, files: &MemoryFileStore) -> Vec<u8> {
    let blocks = chapter_blocks(book);
    let resolver = ImageResolver::new(files);
    DocxExporter::new()
        .render(book, &blocks, &resolver)
        .expect("docx render failed")
}

fn read_part(data: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).expect("not a zip");
    let mut part = archive.by_name(name).unwrap_or_else(|_| panic!("missing part {name}"));
    let mut content = String::new();
    part.read_to_string(&mut content).unwrap();
    content
}

fn has_part(data: &[u8], name: &str) -> bool {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).expect("not a zip");
    archive.by_name(name).is_ok()
}

/// Collect the text content of every `w:t` element, in document order.
fn document_texts(xml: &str) -> Vec<String> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut texts = Vec::new();
    let mut in_text = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"w:t" => in_text = false,
            Ok(Event::Text(e)) if in_text => {
                texts.push(String::from_utf8_lossy(e.as_ref()).to_string());
            }
            Ok(Event::Eof) => break,
            Err(e) => panic!("document.xml parse error: {e}"),
            _ => {}
        }
    }
    texts
}

fn page_breaks(xml: &str) -> usize {
    xml.matches("<w:br w:type=\"page\"/>").count()
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 90, 160]));
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
    let xml = read_part(&data, "word/document.xml");

    let texts = document_texts(&xml);
    for expected in ["My Guide", "By A. Writer", "Intro", "Hello", "Some text."] {
        assert!(
            texts.iter().any(|t| t == expected),
            "missing {expected:?} in {texts:?}"
        );
    }

    // Chapter title and the level-1 heading block both use Heading1.
    assert_eq!(xml.matches("<w:pStyle w:val=\"Heading1\"/>").count(), 2);
    // Single chapter: only the cover's explicit break, none between chapters.
    assert_eq!(page_breaks(&xml), 1);
    // One cover section plus one chapters section.
    assert_eq!(xml.matches("<w:sectPr>").count(), 2);
}

#[test]
fn test_chapter_order_and_breaks() {
    let book = Book::new("b1", "u1", "Guide", "A")
        .with_chapter("First", "one")
        .with_chapter("Second", "two")
        .with_chapter("Third", "three");
    let data = render(&book, &MemoryFileStore::new());
    let xml = read_part(&data, "word/document.xml");

    // Cover break + (chapters − 1) inter-chapter breaks.
    assert_eq!(page_breaks(&xml), 3);

    let first = xml.find("First").unwrap();
    let second = xml.find("Second").unwrap();
    let third = xml.find("Third").unwrap();
    assert!(first < second && second < third);
}

#[test]
fn test_zero_chapters_renders_cover_only() {
    let book = Book::new("b1", "u1", "Empty Book", "A. Writer").with_subtitle("Nothing yet");
    let data = render(&book, &MemoryFileStore::new());
    let xml = read_part(&data, "word/document.xml");

    let texts = document_texts(&xml);
    assert!(texts.iter().any(|t| t == "Empty Book"));
    assert!(texts.iter().any(|t| t == "Nothing yet"));
    assert!(texts.iter().any(|t| t == "By A. Writer"));
    assert_eq!(page_breaks(&xml), 1);
    assert!(!xml.contains("Heading1"));
}

#[test]
fn test_empty_chapter_body_still_renders() {
    let book = Book::new("b1", "u1", "Guide", "A").with_chapter("Blank", "");
    let data = render(&book, &MemoryFileStore::new());
    let xml = read_part(&data, "word/document.xml");

    assert!(document_texts(&xml).iter().any(|t| t == "Blank"));
    // The empty body normalizes to one empty paragraph.
    assert!(xml.contains("<w:t xml:space=\"preserve\"></w:t>"));
}

#[test]
fn test_chapter_image_before_body_text() {
    let mut files = MemoryFileStore::new();
    files.insert("uploads/pic.png", png_bytes(100, 80));
    let book = Book::new("b1", "u1", "Guide", "A")
        .with_chapter("Ch", "![pic](uploads/pic.png)\n\nBody text here.");
    let data = render(&book, &files);

    assert!(has_part(&data, "word/media/image1.jpg"));
    let xml = read_part(&data, "word/document.xml");
    let drawing = xml.find("<w:drawing>").expect("no image in document");
    let body = xml.find("Body text here.").expect("no body text");
    assert!(drawing < body);

    let rels = read_part(&data, "word/_rels/document.xml.rels");
    assert!(rels.contains("media/image1.jpg"));
}

#[test]
fn test_missing_image_renders_text_without_failure() {
    let book = Book::new("b1", "u1", "Guide", "A")
        .with_chapter("Ch", "![pic](uploads/nope.png)\n\nBody text here.");
    let data = render(&book, &MemoryFileStore::new());
    let xml = read_part(&data, "word/document.xml");

    assert!(!xml.contains("<w:drawing>"));
    assert!(document_texts(&xml).iter().any(|t| t == "Body text here."));
}

#[test]
fn test_cover_image_embedded_and_downscaled() {
    let mut files = MemoryFileStore::new();
    files.insert("uploads/cover.png", png_bytes(800, 600));
    let book = Book::new("b1", "u1", "Guide", "A").with_cover_image("uploads/cover.png");
    let data = render(&book, &files);

    assert!(has_part(&data, "word/media/image1.jpg"));
    let xml = read_part(&data, "word/document.xml");
    let drawing = xml.find("<w:drawing>").expect("no cover image");
    let title = xml.find("Guide").expect("no title");
    assert!(drawing < title);
    // 800x600 fit into 400x400 → 400x300 px → 3810000x2857500 EMU.
    assert!(xml.contains("cx=\"3810000\""));
    assert!(xml.contains("cy=\"2857500\""));
}

#[test]
fn test_code_block_monospaced() {
    let book = Book::new("b1", "u1", "Guide", "A")
        .with_chapter("Ch", "```\nlet x = 1;\n```");
    let data = render(&book, &MemoryFileStore::new());
    let xml = read_part(&data, "word/document.xml");

    assert!(xml.contains("Courier New"));
    assert!(document_texts(&xml).iter().any(|t| t == "let x = 1;"));
}

#[test]
fn test_heading_levels_map_to_styles() {
    let book = Book::new("b1", "u1", "Guide", "A")
        .with_chapter("Ch", "## Second\n\n#### Fourth");
    let data = render(&book, &MemoryFileStore::new());
    let xml = read_part(&data, "word/document.xml");

    assert!(xml.contains("<w:pStyle w:val=\"Heading2\"/>"));
    assert!(xml.contains("<w:pStyle w:val=\"Heading4\"/>"));

    let styles = read_part(&data, "word/styles.xml");
    assert!(styles.contains("w:styleId=\"Heading2\""));
    assert!(styles.contains("w:styleId=\"Heading4\""));
}

#[test]
fn test_package_is_well_formed() {
    let book = Book::new("b1", "u1", "Guide", "A").with_chapter("Ch", "text");
    let data = render(&book, &MemoryFileStore::new());

    assert!(data.starts_with(b"PK"));
    for part in [
        "[Content_Types].xml",
        "_rels/.rels",
        "word/document.xml",
        "word/styles.xml",
        "word/_rels/document.xml.rels",
    ] {
        assert!(has_part(&data, part), "missing {part}");
    }
}

#[test]
fn test_export_is_deterministic() {
    let mut files = MemoryFileStore::new();
    files.insert("uploads/cover.png", png_bytes(64, 64));
    let book = Book::new("b1", "u1", "Guide", "A")
        .with_cover_image("uploads/cover.png")
        .with_chapter("Ch", "# H\n\ntext");

    let first = render(&book, &files);
    let second = render(&book, &files);
    assert_eq!(first, second);
}
