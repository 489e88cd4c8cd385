//! Fixture-backed project catalog served by the development server.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};

use branchview::access::AccessLevel;
use branchview::model::{BranchComparison, CommitRef, FileEntry, FileKind, ProjectInfo};

const ENTRY_ID_LEN: usize = 16;

#[derive(Clone, Debug, serde::Deserialize)]
pub(super) struct Fixture {
    #[serde(default)]
    pub(super) projects: Vec<FixtureProject>,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub(super) struct FixtureProject {
    pub(super) id: u64,
    pub(super) namespace: String,
    pub(super) slug: String,
    pub(super) default_branch: String,

    /// Access level per bearer token.
    #[serde(default)]
    pub(super) members: HashMap<String, AccessLevel>,

    #[serde(default)]
    pub(super) branches: HashMap<String, FixtureBranch>,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub(super) struct FixtureBranch {
    /// Oldest first.
    #[serde(default)]
    pub(super) commits: Vec<CommitRef>,

    /// Blob paths, slash separated, relative to the repository root.
    #[serde(default)]
    pub(super) files: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum LookupError {
    BranchNotFound(String),
    PathNotFound(String),
}

impl LookupError {
    pub(super) fn message(&self) -> String {
        match self {
            LookupError::BranchNotFound(b) => format!("branch not found: {}", b),
            LookupError::PathNotFound(p) => format!("path not found: {}", p),
        }
    }
}

pub(super) fn load_fixture(path: &Path) -> Result<Fixture> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read fixture {}", path.display()))?;
    let fixture: Fixture = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse fixture {}", path.display()))?;
    fixture.validate()?;
    Ok(fixture)
}

impl Fixture {
    pub(super) fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for p in &self.projects {
            if !seen.insert(p.id) {
                anyhow::bail!("duplicate project id {}", p.id);
            }
            if !p.branches.contains_key(&p.default_branch) {
                anyhow::bail!(
                    "project {}: default branch {:?} has no branch entry",
                    p.id,
                    p.default_branch
                );
            }
        }
        Ok(())
    }

    pub(super) fn into_index(self) -> HashMap<u64, FixtureProject> {
        self.projects.into_iter().map(|p| (p.id, p)).collect()
    }
}

impl FixtureProject {
    pub(super) fn info(&self, access_level: AccessLevel) -> ProjectInfo {
        ProjectInfo {
            id: self.id,
            namespace: self.namespace.clone(),
            slug: self.slug.clone(),
            default_branch: self.default_branch.clone(),
            access_level,
        }
    }

    fn branch(&self, name: &str) -> std::result::Result<&FixtureBranch, LookupError> {
        self.branches
            .get(name)
            .ok_or_else(|| LookupError::BranchNotFound(name.to_string()))
    }

    pub(super) fn list(
        &self,
        branch: &str,
        path: &str,
        recursive: bool,
    ) -> std::result::Result<Vec<FileEntry>, LookupError> {
        let files = &self.branch(branch)?.files;
        list_entries(branch, files, path, recursive)
    }

    pub(super) fn compare(
        &self,
        from: &str,
        to: &str,
    ) -> std::result::Result<BranchComparison, LookupError> {
        let from = &self.branch(from)?.commits;
        let to = &self.branch(to)?.commits;
        Ok(compare_commits(from, to))
    }
}

/// Entries under `path` on a branch: direct children, or the whole subtree when
/// `recursive`. Directories sort before files, each alphabetically by path.
pub(super) fn list_entries(
    branch: &str,
    files: &[String],
    path: &str,
    recursive: bool,
) -> std::result::Result<Vec<FileEntry>, LookupError> {
    let dir = path.trim_matches('/');
    let prefix = if dir.is_empty() {
        String::new()
    } else {
        format!("{}/", dir)
    };

    let mut found = dir.is_empty();
    let mut entries: BTreeMap<String, FileKind> = BTreeMap::new();
    for file in files {
        let file = file.trim_matches('/');
        let Some(rest) = file.strip_prefix(&prefix) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        found = true;

        let parts: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        let depth = if recursive { parts.len() } else { 1 };
        for i in 0..depth.min(parts.len()) {
            let kind = if i + 1 == parts.len() {
                FileKind::Blob
            } else {
                FileKind::Tree
            };
            let full = format!("{}{}", prefix, parts[..=i].join("/"));
            entries.entry(full).or_insert(kind);
        }
    }

    if !found {
        return Err(LookupError::PathNotFound(dir.to_string()));
    }

    let mut out: Vec<FileEntry> = entries
        .into_iter()
        .map(|(path, kind)| FileEntry {
            id: entry_id(branch, &path),
            name: path.rsplit('/').next().unwrap_or(&path).to_string(),
            path,
            kind,
        })
        .collect();
    out.sort_by(|a, b| b.is_tree().cmp(&a.is_tree()).then_with(|| a.path.cmp(&b.path)));
    Ok(out)
}

pub(super) fn compare_commits(from: &[CommitRef], to: &[CommitRef]) -> BranchComparison {
    let from_ids: HashSet<&str> = from.iter().map(|c| c.id.as_str()).collect();
    let to_ids: HashSet<&str> = to.iter().map(|c| c.id.as_str()).collect();
    BranchComparison {
        ahead: to
            .iter()
            .filter(|c| !from_ids.contains(c.id.as_str()))
            .cloned()
            .collect(),
        behind: from
            .iter()
            .filter(|c| !to_ids.contains(c.id.as_str()))
            .cloned()
            .collect(),
    }
}

pub(super) fn entry_id(branch: &str, path: &str) -> String {
    let hex = blake3::hash(format!("{}:{}", branch, path).as_bytes()).to_hex();
    hex.as_str()[..ENTRY_ID_LEN].to_string()
}

#[cfg(test)]
#[path = "../../tests/bin/branchview_server/fixture_tests.rs"]
mod tests;
