use serde::{Deserialize, Serialize};

/// A book as the authoring subsystem stores it.
///
/// Export treats this as a read-only snapshot: the engine borrows a
/// `Book` for the duration of one export call and never mutates it.
/// `title` and `author` are validated non-empty upstream, before an
/// export is ever requested.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    /// Identity of the owning user, checked against the export caller.
    pub owner: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub author: String,
    /// Storage-relative path to the cover image, if one was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub status: BookStatus,
}

/// A single chapter. Order within [`Book::chapters`] is significant and
/// preserved in every output format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    /// Markdown-formatted body text. May be empty.
    #[serde(default)]
    pub body: String,
}

/// Authoring lifecycle state. Export does not filter on this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    #[default]
    Draft,
    Published,
}

impl Book {
    pub fn new(
        id: impl Into<String>,
        owner: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            owner: owner.into(),
            title: title.into(),
            author: author.into(),
            ..Default::default()
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_cover_image(mut self, path: impl Into<String>) -> Self {
        self.cover_image = Some(path.into());
        self
    }

    pub fn with_chapter(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.chapters.push(Chapter {
            title: title.into(),
            body: body.into(),
        });
        self
    }

    pub fn with_status(mut self, status: BookStatus) -> Self {
        self.status = status;
        self
    }
}

impl Chapter {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}
