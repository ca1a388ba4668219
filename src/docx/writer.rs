//! DOCX package writer.
//!
//! Serializes a [`DocxDocument`] into a complete OPC zip package:
//! content types, package relationships, `word/document.xml`,
//! `word/styles.xml`, and embedded media parts. XML is generated
//! directly; the part inventory is small and fixed.

use std::io::{Seek, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::{Alignment, DocxDocument, Paragraph, Run, TextRun};
use crate::error::Result;

/// EMUs per pixel at 96 dpi (914400 EMU/inch ÷ 96 px/inch).
const EMU_PER_PX: u64 = 9525;

/// Write a [`DocxDocument`] as a complete `.docx` package.
///
/// The destination needs `Seek` because zip central directories are
/// written last; use `Cursor<Vec<u8>>` for an in-memory buffer.
pub fn write_docx<W: Write + Seek>(doc: &DocxDocument, writer: W) -> Result<()> {
    let mut zip = ZipWriter::new(writer);
    let deflated =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let (document_xml, images) = generate_document(doc);

    zip.start_file("[Content_Types].xml", deflated)?;
    zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

    zip.start_file("_rels/.rels", deflated)?;
    zip.write_all(PACKAGE_RELS_XML.as_bytes())?;

    zip.start_file("word/document.xml", deflated)?;
    zip.write_all(document_xml.as_bytes())?;

    zip.start_file("word/styles.xml", deflated)?;
    zip.write_all(generate_styles().as_bytes())?;

    zip.start_file("word/_rels/document.xml.rels", deflated)?;
    zip.write_all(generate_document_rels(images.len()).as_bytes())?;

    for (i, data) in images.iter().enumerate() {
        zip.start_file(format!("word/media/image{}.jpg", i + 1), deflated)?;
        zip.write_all(data)?;
    }

    zip.finish()?;
    Ok(())
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="jpg" ContentType="image/jpeg"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

/// A4 page geometry with one-inch margins, in twentieths of a point.
const SECTION_PROPS: &str = r#"<w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/>"#;

/// Generate `word/document.xml` and collect embedded image data in
/// document order. Image N becomes part `media/image{N+1}.jpg` with
/// relationship `rId{N+2}` (rId1 is the styles part).
fn generate_document(doc: &DocxDocument) -> (String, Vec<Vec<u8>>) {
    let mut xml = String::new();
    let mut images: Vec<Vec<u8>> = Vec::new();

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><w:body>"#,
    );

    let last = doc.sections.len().saturating_sub(1);
    for (i, section) in doc.sections.iter().enumerate() {
        for paragraph in &section.children {
            write_paragraph(&mut xml, paragraph, &mut images);
        }
        if i < last {
            // Intermediate section boundary: an empty paragraph
            // carrying the section properties.
            xml.push_str("<w:p><w:pPr><w:sectPr>");
            xml.push_str(SECTION_PROPS);
            xml.push_str("</w:sectPr></w:pPr></w:p>");
        }
    }

    // Final (or only) section properties close the body.
    xml.push_str("<w:sectPr>");
    xml.push_str(SECTION_PROPS);
    xml.push_str("</w:sectPr>");
    xml.push_str("</w:body></w:document>");

    (xml, images)
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph, images: &mut Vec<Vec<u8>>) {
    xml.push_str("<w:p>");

    let has_props = paragraph.style.is_some()
        || paragraph.alignment.is_some()
        || paragraph.spacing_after.is_some();
    if has_props {
        xml.push_str("<w:pPr>");
        if let Some(ref style) = paragraph.style {
            xml.push_str(&format!("<w:pStyle w:val=\"{}\"/>", escape_xml(style)));
        }
        if let Some(after) = paragraph.spacing_after {
            xml.push_str(&format!("<w:spacing w:after=\"{after}\"/>"));
        }
        if let Some(alignment) = paragraph.alignment {
            let val = match alignment {
                Alignment::Left => "left",
                Alignment::Center => "center",
                Alignment::Right => "right",
            };
            xml.push_str(&format!("<w:jc w:val=\"{val}\"/>"));
        }
        xml.push_str("</w:pPr>");
    }

    for run in &paragraph.runs {
        match run {
            Run::Text(text_run) => write_text_run(xml, text_run),
            Run::PageBreak => xml.push_str("<w:r><w:br w:type=\"page\"/></w:r>"),
            Run::Image(image_run) => {
                images.push(image_run.data.clone());
                let number = images.len();
                write_image_run(xml, number, image_run.width_px, image_run.height_px);
            }
        }
    }

    xml.push_str("</w:p>");
}

fn write_text_run(xml: &mut String, run: &TextRun) {
    xml.push_str("<w:r>");

    let has_props = run.bold || run.italics || run.size.is_some() || run.font.is_some();
    if has_props {
        xml.push_str("<w:rPr>");
        if let Some(ref font) = run.font {
            let font = escape_xml(font);
            xml.push_str(&format!(
                "<w:rFonts w:ascii=\"{font}\" w:hAnsi=\"{font}\"/>"
            ));
        }
        if run.bold {
            xml.push_str("<w:b/>");
        }
        if run.italics {
            xml.push_str("<w:i/>");
        }
        if let Some(size) = run.size {
            xml.push_str(&format!("<w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/>"));
        }
        xml.push_str("</w:rPr>");
    }

    // Newlines inside a run become explicit line breaks; `w:t` text
    // itself must not contain them.
    for (i, line) in run.text.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        xml.push_str(&format!(
            "<w:t xml:space=\"preserve\">{}</w:t>",
            escape_xml(line)
        ));
    }

    xml.push_str("</w:r>");
}

fn write_image_run(xml: &mut String, number: usize, width_px: u32, height_px: u32) {
    let cx = width_px as u64 * EMU_PER_PX;
    let cy = height_px as u64 * EMU_PER_PX;
    let rel = number + 1;

    xml.push_str(&format!(
        concat!(
            "<w:r><w:drawing><wp:inline distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\">",
            "<wp:extent cx=\"{cx}\" cy=\"{cy}\"/>",
            "<wp:docPr id=\"{n}\" name=\"Image {n}\"/>",
            "<a:graphic><a:graphicData uri=\"http://schemas.openxmlformats.org/drawingml/2006/picture\">",
            "<pic:pic><pic:nvPicPr><pic:cNvPr id=\"{n}\" name=\"image{n}.jpg\"/><pic:cNvPicPr/></pic:nvPicPr>",
            "<pic:blipFill><a:blip r:embed=\"rId{rel}\"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>",
            "<pic:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>",
            "<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></pic:spPr>",
            "</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>",
        ),
        cx = cx,
        cy = cy,
        n = number,
        rel = rel,
    ));
}

fn generate_document_rels(image_count: usize) -> String {
    let mut rels = String::new();
    rels.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    rels.push('\n');
    rels.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    rels.push_str(
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    );
    for i in 0..image_count {
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image{}.jpg"/>"#,
            i + 2,
            i + 1
        ));
    }
    rels.push_str("</Relationships>");
    rels
}

/// Heading style sizes in half-points, levels 1 through 6.
const HEADING_SIZES: [u32; 6] = [32, 28, 26, 24, 22, 22];

fn generate_styles() -> String {
    let mut styles = String::new();
    styles.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    styles.push('\n');
    styles.push_str(
        r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
    );
    styles.push_str(
        r#"<w:docDefaults><w:rPrDefault><w:rPr><w:sz w:val="24"/><w:szCs w:val="24"/></w:rPr></w:rPrDefault></w:docDefaults>"#,
    );
    styles.push_str(
        r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#,
    );
    for (i, size) in HEADING_SIZES.iter().enumerate() {
        let level = i + 1;
        styles.push_str(&format!(
            concat!(
                "<w:style w:type=\"paragraph\" w:styleId=\"Heading{level}\">",
                "<w:name w:val=\"heading {level}\"/><w:basedOn w:val=\"Normal\"/>",
                "<w:pPr><w:spacing w:before=\"240\" w:after=\"120\"/><w:outlineLvl w:val=\"{outline}\"/></w:pPr>",
                "<w:rPr><w:b/><w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/></w:rPr>",
                "</w:style>",
            ),
            level = level,
            outline = i,
            size = size,
        ));
    }
    styles.push_str("</w:styles>");
    styles
}

/// Escape XML special characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::{ImageRun, Section};

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<w:p>"), "&lt;w:p&gt;");
        assert_eq!(escape_xml("\"it's\""), "&quot;it&apos;s&quot;");
    }

    #[test]
    fn test_text_run_newlines_become_breaks() {
        let mut xml = String::new();
        write_text_run(&mut xml, &TextRun::new("one\ntwo"));
        assert_eq!(
            xml,
            "<w:r><w:t xml:space=\"preserve\">one</w:t><w:br/><w:t xml:space=\"preserve\">two</w:t></w:r>"
        );
    }

    #[test]
    fn test_section_boundaries() {
        let mut doc = DocxDocument::default();
        let mut cover = Section::default();
        cover.add(Paragraph::text("cover"));
        doc.add_section(cover);
        let mut body = Section::default();
        body.add(Paragraph::text("body"));
        doc.add_section(body);

        let (xml, _) = generate_document(&doc);
        // One mid-body section break plus the closing body properties.
        assert_eq!(xml.matches("<w:sectPr>").count(), 2);
        assert_eq!(xml.matches("<w:pPr><w:sectPr>").count(), 1);
    }

    #[test]
    fn test_image_numbering_and_rels() {
        let mut doc = DocxDocument::default();
        let mut section = Section::default();
        let image = ImageRun {
            data: vec![0xFF, 0xD8, 0xFF],
            width_px: 100,
            height_px: 50,
        };
        section.add(Paragraph::default().with_run(Run::Image(image.clone())));
        section.add(Paragraph::default().with_run(Run::Image(image)));
        doc.add_section(section);

        let (xml, images) = generate_document(&doc);
        assert_eq!(images.len(), 2);
        assert!(xml.contains("r:embed=\"rId2\""));
        assert!(xml.contains("r:embed=\"rId3\""));
        // 100 px → 952500 EMU
        assert!(xml.contains("cx=\"952500\""));

        let rels = generate_document_rels(2);
        assert!(rels.contains("Target=\"media/image1.jpg\""));
        assert!(rels.contains("Target=\"media/image2.jpg\""));
    }

    #[test]
    fn test_styles_cover_all_heading_levels() {
        let styles = generate_styles();
        for level in 1..=6 {
            assert!(styles.contains(&format!("w:styleId=\"Heading{level}\"")));
        }
    }
}
