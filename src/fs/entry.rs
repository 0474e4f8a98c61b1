//! Directory entries and the single-location listing.

use serde::{Deserialize, Serialize};

use crate::path::Location;

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Subdirectory
    Directory,
    /// Regular file
    File,
}

impl EntryKind {
    /// Human-readable noun for notices and logs.
    pub fn noun(&self) -> &'static str {
        match self {
            EntryKind::Directory => "Directory",
            EntryKind::File => "File",
        }
    }
}

/// One child of a location.
///
/// Entries are value objects: a refresh replaces them, nothing patches them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    /// Leaf name, for display only
    pub name: String,
    /// Full path, used for every follow-up operation
    pub path: Location,
    /// Directory or file
    pub kind: EntryKind,
}

impl Entry {
    /// Create a directory entry.
    pub fn directory(name: impl Into<String>, path: Location) -> Self {
        Self {
            name: name.into(),
            path,
            kind: EntryKind::Directory,
        }
    }

    /// Create a file entry.
    pub fn file(name: impl Into<String>, path: Location) -> Self {
        Self {
            name: name.into(),
            path,
            kind: EntryKind::File,
        }
    }

    /// Check if this entry is a directory.
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Check if this entry is a file.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// The entries of exactly one location.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Listing {
    /// Location these entries belong to
    pub location: Location,
    /// Subdirectories, in server order
    pub directories: Vec<Entry>,
    /// Files, in server order
    pub files: Vec<Entry>,
}

impl Listing {
    /// An empty listing for a location.
    pub fn empty(location: Location) -> Self {
        Self {
            location,
            directories: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Check if the listing holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.directories.len() + self.files.len()
    }

    /// Iterate directories first, then files.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.directories.iter().chain(self.files.iter())
    }

    /// Find an entry by its leaf name.
    pub fn find(&self, name: &str) -> Option<&Entry> {
        self.entries().find(|e| e.name == name)
    }
}
