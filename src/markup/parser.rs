//! Markdown → token stream.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// A block-level token distilled from the markdown event stream.
///
/// Inline structure (emphasis, inline code, links) is not modeled:
/// only the text content survives, as [`Token::Text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    HeadingOpen(u8),
    HeadingClose,
    ParagraphOpen,
    ParagraphClose,
    ListItemOpen,
    ListItemClose,
    Text(String),
    /// Fenced or indented code, verbatim.
    Fence(String),
    /// An embedded image reference `![alt](path)`. Alt text is dropped.
    Image { path: String },
}

/// Tokenize a markdown string.
///
/// Total for any input: malformed markup, binary garbage, and
/// unterminated fences all produce a well-formed token stream.
pub fn parse(markdown: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    // Fence content arrives as text events between the code-block
    // open and close; accumulate it into a single token.
    let mut fence: Option<String> = None;
    // Depth > 0 means we are inside image alt text, which is dropped.
    let mut image_depth = 0usize;

    for event in Parser::new_ext(markdown, Options::empty()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                tokens.push(Token::HeadingOpen(heading_rank(level)));
            }
            Event::End(TagEnd::Heading(_)) => tokens.push(Token::HeadingClose),
            Event::Start(Tag::Paragraph) => tokens.push(Token::ParagraphOpen),
            Event::End(TagEnd::Paragraph) => tokens.push(Token::ParagraphClose),
            Event::Start(Tag::Item) => tokens.push(Token::ListItemOpen),
            Event::End(TagEnd::Item) => tokens.push(Token::ListItemClose),
            Event::Start(Tag::CodeBlock(_)) => fence = Some(String::new()),
            Event::End(TagEnd::CodeBlock) => {
                let mut text = fence.take().unwrap_or_default();
                if text.ends_with('\n') {
                    text.pop();
                }
                tokens.push(Token::Fence(text));
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                image_depth += 1;
                tokens.push(Token::Image {
                    path: dest_url.into_string(),
                });
            }
            Event::End(TagEnd::Image) => image_depth = image_depth.saturating_sub(1),
            Event::Text(text) | Event::Code(text) => match fence.as_mut() {
                Some(buf) => buf.push_str(&text),
                None if image_depth == 0 => tokens.push(Token::Text(text.into_string())),
                None => {}
            },
            // Raw HTML degrades to plain text rather than being lost.
            Event::Html(text) | Event::InlineHtml(text) => {
                if fence.is_none() && image_depth == 0 {
                    tokens.push(Token::Text(text.into_string()));
                }
            }
            Event::SoftBreak => {
                if fence.is_none() && image_depth == 0 {
                    tokens.push(Token::Text(" ".to_string()));
                }
            }
            Event::HardBreak => {
                if fence.is_none() && image_depth == 0 {
                    tokens.push(Token::Text("\n".to_string()));
                }
            }
            // Emphasis/link/blockquote delimiters, rules, and anything
            // else carry no text of their own.
            _ => {}
        }
    }

    tokens
}

fn heading_rank(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
