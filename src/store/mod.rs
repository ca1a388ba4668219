//! Collaborator interfaces: book lookup, file storage, ownership.
//!
//! The surrounding application owns persistence and authentication;
//! the export engine sees them only through these traits. The provided
//! implementations cover the two deployment shapes the engine is used
//! in: filesystem-backed storage (the upload directory of the authoring
//! app) and in-memory stores for tests and one-shot CLI runs.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::book::Book;

/// Read-only book lookup by identity.
pub trait BookStore {
    fn get(&self, id: &str) -> Option<Book>;
}

/// Read-only access to stored files (uploads), keyed by
/// storage-relative path. Absent or unreadable files are `None`.
pub trait FileStore {
    fn read(&self, path: &str) -> Option<Vec<u8>>;
}

/// Ownership check for an export request.
pub trait Authorizer {
    fn owns(&self, identity: &str, book: &Book) -> bool;
}

/// Authorizer that compares the caller identity against [`Book::owner`].
pub struct OwnerAuthorizer;

impl Authorizer for OwnerAuthorizer {
    fn owns(&self, identity: &str, book: &Book) -> bool {
        book.owner == identity
    }
}

/// In-memory book store.
#[derive(Debug, Default)]
pub struct MemoryBookStore {
    books: HashMap<String, Book>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, book: Book) {
        self.books.insert(book.id.clone(), book);
    }
}

impl BookStore for MemoryBookStore {
    fn get(&self, id: &str) -> Option<Book> {
        self.books.get(id).cloned()
    }
}

/// In-memory file store.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, data: Vec<u8>) {
        self.files.insert(path.into(), data);
    }
}

impl FileStore for MemoryFileStore {
    fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.files.get(path).cloned()
    }
}

/// File store rooted at a directory. Only storage-relative paths are
/// served; absolute paths and traversal segments are refused here as a
/// second line of defense behind the resolver's own checks.
#[derive(Debug, Clone)]
pub struct FsFileStore {
    root: PathBuf,
}

impl FsFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileStore for FsFileStore {
    fn read(&self, path: &str) -> Option<Vec<u8>> {
        let rel = Path::new(path);
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return None;
        }
        fs::read(self.root.join(rel)).ok()
    }
}
