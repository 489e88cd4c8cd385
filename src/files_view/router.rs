use crate::links::TREE_ACTION;
use crate::model::{EntryKey, FileKind};

use super::{FilesView, Notice, NoticeKind, ROW_NOT_FOUND};

pub const NAME_HEADER: &str = "Name";

/// Imperative navigation to a generated location.
pub trait Navigator {
    fn push_location(&mut self, url: &str);
}

/// Navigator that only records what was pushed.
#[derive(Clone, Debug, Default)]
pub struct LocationHistory {
    locations: Vec<String>,
}

impl LocationHistory {
    pub fn current(&self) -> Option<&str> {
        self.locations.last().map(String::as_str)
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }
}

impl Navigator for LocationHistory {
    fn push_location(&mut self, url: &str) {
        self.locations.push(url.to_string());
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DivergenceBanner {
    pub ahead: usize,
    pub behind: usize,
    pub default_branch: String,

    /// Present only when the viewer may open merge requests.
    pub merge_request_url: Option<String>,
}

impl DivergenceBanner {
    pub fn text(&self) -> String {
        format!(
            "This branch is {} commit(s) ahead and {} commit(s) behind \"{}\".",
            self.ahead, self.behind, self.default_branch
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRow {
    pub key: EntryKey,
    pub name: String,
    pub kind: FileKind,
}

impl FileRow {
    /// Action marker carried by the row's control.
    pub fn action(&self) -> &'static str {
        self.kind.action()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilesTable {
    pub headers: Vec<&'static str>,
    pub rows: Vec<FileRow>,
    pub show_navigate_up: bool,
    pub waiting: bool,
}

/// Parent of a slash-separated repository path; empty at the top level.
pub fn navigate_up_path(path: &str) -> String {
    let path = path.trim_end_matches('/');
    match path.rsplit_once('/') {
        Some((parent, _)) => parent.to_string(),
        None => String::new(),
    }
}

impl FilesView {
    pub fn banner(&self) -> Option<DivergenceBanner> {
        let identity = self.identity.as_ref()?;
        if !self.divergence.has_changes() {
            return None;
        }

        let merge_request_url = self
            .capabilities
            .can_create_merge_request
            .then(|| {
                self.location
                    .merge_request_url(&identity.effective_branch())
            });

        Some(DivergenceBanner {
            ahead: self.divergence.ahead,
            behind: self.divergence.behind,
            default_branch: identity.default_branch.clone(),
            merge_request_url,
        })
    }

    pub fn table(&self) -> FilesTable {
        let rows = self
            .entries
            .iter()
            .map(|e| FileRow {
                key: e.key.clone(),
                name: e.entry.name.clone(),
                kind: e.entry.kind,
            })
            .collect();

        FilesTable {
            headers: vec![NAME_HEADER],
            rows,
            show_navigate_up: self
                .identity
                .as_ref()
                .is_some_and(|i| !i.path.is_empty()),
            waiting: self.busy,
        }
    }

    /// Where clicking `key` with `action` leads, if the row still exists.
    pub fn click_target(&self, key: &EntryKey, action: &str) -> Option<String> {
        let listed = self.entries.iter().find(|e| &e.key == key)?;
        let branch = self.effective_branch()?;
        let url = if action == TREE_ACTION {
            self.location.tree_url(action, &branch, &listed.entry.path)
        } else {
            self.location.blob_url(action, &branch, &listed.entry.path)
        };
        Some(url)
    }

    /// Handles a click on a row control. Returns whether a location was pushed.
    pub fn click(&mut self, key: &EntryKey, action: &str, navigator: &mut dyn Navigator) -> bool {
        match self.click_target(key, action) {
            Some(url) => {
                tracing::info!(%url, "navigating");
                navigator.push_location(&url);
                true
            }
            None => {
                tracing::warn!(key = %key, "clicked row not in current listing");
                self.notices
                    .push(Notice::error(NoticeKind::RowResolutionFailure, ROW_NOT_FOUND));
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/files_view/router_tests.rs"]
mod tests;
