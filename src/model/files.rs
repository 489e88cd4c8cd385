use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Tree,
    Blob,
}

impl FileKind {
    /// Route segment used for the row's click action.
    pub fn action(self) -> &'static str {
        match self {
            FileKind::Tree => "tree",
            FileKind::Blob => "blob",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    pub path: String,

    #[serde(rename = "type")]
    pub kind: FileKind,
}

impl FileEntry {
    pub fn key(&self) -> EntryKey {
        EntryKey(format!("{} {}", self.id, self.name))
    }

    pub fn is_tree(&self) -> bool {
        self.kind == FileKind::Tree
    }
}

/// Row identifier within one listing. Only meaningful for the listing it was
/// produced from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryKey(pub String);

impl EntryKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A listing entry paired with the key it was assigned at load time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListedEntry {
    pub key: EntryKey,
    pub entry: FileEntry,
}

impl From<FileEntry> for ListedEntry {
    fn from(entry: FileEntry) -> Self {
        Self {
            key: entry.key(),
            entry,
        }
    }
}
