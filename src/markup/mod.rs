//! Markdown tokenization and block normalization.
//!
//! Chapter bodies arrive as markdown text. This module turns them into
//! the normalized [`Block`] model both renderers consume:
//!
//! - [`parse`]: markdown string → flat [`Token`] stream (total — any
//!   input string produces tokens, never an error)
//! - [`build_blocks`]: [`Token`] stream → ordered [`Block`] sequence
//!
//! ## Design Notes
//!
//! The two stages are deliberately separate. Tokenization is a thin,
//! lossy-but-total distillation of the CommonMark event stream: inline
//! emphasis and code degrade to plain text (the markers vanish, the
//! text survives), unparseable spans come through as text, and fenced
//! code is carried verbatim. Normalization then applies the policy
//! decisions — heading assembly, list flattening, the first-image-only
//! rule, the never-empty guarantee — in one place, so the DOCX and PDF
//! renderers cannot drift apart in how they interpret a chapter.

mod blocks;
mod parser;

pub use blocks::{Block, build_blocks};
pub use parser::{Token, parse};
