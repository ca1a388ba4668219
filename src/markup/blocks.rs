//! Token stream → normalized block model.

use super::parser::Token;

/// The normalized, format-agnostic unit of chapter content.
///
/// Both renderers consume this model, so a chapter can never be
/// interpreted differently by the DOCX and PDF paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    CodeBlock { text: String },
    ImageRef { path: String },
}

/// Normalize a token stream into an ordered block sequence.
///
/// Rules:
/// - heading-open / text / heading-close → [`Block::Heading`]
/// - standalone text → [`Block::Paragraph`]
/// - fence → [`Block::CodeBlock`], content verbatim
/// - the first image token becomes one [`Block::ImageRef`]; later image
///   references in the same chapter are dropped (only the first image
///   is rendered — documented behavior, not an accident)
/// - list items flatten to bullet-prefixed paragraphs; nesting is not
///   modeled
/// - an empty or blockless body yields exactly one empty paragraph, so
///   renderers never receive an empty sequence
pub fn build_blocks(tokens: &[Token]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut text = String::new();
    let mut heading: Option<u8> = None;
    let mut in_item = false;
    let mut saw_image = false;

    for token in tokens {
        match token {
            Token::HeadingOpen(level) => {
                flush_paragraph(&mut blocks, &mut text, in_item);
                in_item = false;
                heading = Some(*level);
            }
            Token::HeadingClose => {
                if let Some(level) = heading.take() {
                    blocks.push(Block::Heading {
                        level,
                        text: text.trim().to_string(),
                    });
                    text.clear();
                }
            }
            Token::ParagraphOpen | Token::ParagraphClose => {
                // Inside a list item, paragraph boundaries collapse into
                // the item's single flattened line.
                if !in_item && heading.is_none() {
                    flush_paragraph(&mut blocks, &mut text, false);
                }
            }
            Token::ListItemOpen => {
                flush_paragraph(&mut blocks, &mut text, in_item);
                in_item = true;
            }
            Token::ListItemClose => {
                flush_paragraph(&mut blocks, &mut text, in_item);
                in_item = false;
            }
            Token::Text(s) => text.push_str(s),
            Token::Fence(s) => {
                flush_paragraph(&mut blocks, &mut text, in_item);
                blocks.push(Block::CodeBlock { text: s.clone() });
            }
            Token::Image { path } => {
                if !saw_image {
                    saw_image = true;
                    blocks.push(Block::ImageRef { path: path.clone() });
                }
            }
        }
    }
    flush_paragraph(&mut blocks, &mut text, in_item);

    // Every chapter has at least one renderable block.
    if blocks.is_empty() {
        blocks.push(Block::Paragraph {
            text: String::new(),
        });
    }

    blocks
}

fn flush_paragraph(blocks: &mut Vec<Block>, text: &mut String, as_list_item: bool) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        let rendered = if as_list_item {
            format!("\u{2022} {trimmed}")
        } else {
            trimmed.to_string()
        };
        blocks.push(Block::Paragraph { text: rendered });
    }
    text.clear();
}
