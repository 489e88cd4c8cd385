//! Location templates for the files view and their inverse.
//!
//! Generated URLs look like:
//!
//! - `/{namespace}/{slug}/-/merge_requests/new?merge_request[source_branch]={branch}`
//! - `/{namespace}/{slug}/-/{action}/{branch}/{encoded_path}` for directories
//! - `/{namespace}/{slug}/-/{action}/branch/{branch}/path/{encoded_path}` for files
//!
//! Only the path is percent-encoded, so an encoded path never contains `/` and
//! the branch (which may) can be recovered by splitting from the right.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::model::ProjectLocation;

/// Everything `encodeURIComponent` escapes.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const TREE_ACTION: &str = "tree";

pub fn encode_path_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

pub fn decode_path_component(s: &str) -> Option<String> {
    percent_decode_str(s)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

impl ProjectLocation {
    pub fn base(&self) -> String {
        format!("/{}/{}", self.namespace, self.slug)
    }

    pub fn merge_request_url(&self, source_branch: &str) -> String {
        format!(
            "{}/-/merge_requests/new?merge_request[source_branch]={}",
            self.base(),
            source_branch
        )
    }

    pub fn tree_url(&self, action: &str, branch: &str, path: &str) -> String {
        format!(
            "{}/-/{}/{}/{}",
            self.base(),
            action,
            branch,
            encode_path_component(path)
        )
    }

    pub fn blob_url(&self, action: &str, branch: &str, path: &str) -> String {
        format!(
            "{}/-/{}/branch/{}/path/{}",
            self.base(),
            action,
            branch,
            encode_path_component(path)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteKind {
    Tree,
    File { action: String },
}

/// A decoded tree or file location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub location: ProjectLocation,
    pub kind: RouteKind,
    pub branch: String,
    pub path: String,
}

impl Route {
    pub fn parse(url: &str) -> Option<Route> {
        // The branch may contain `?` or `#`; the encoded path never does, so a
        // query or fragment can only follow the last slash.
        let url = match url.rsplit_once('/') {
            Some((head, tail)) => {
                let end = tail.find(['?', '#']).unwrap_or(tail.len());
                &url[..head.len() + 1 + end]
            }
            None => url,
        };
        let (prefix, rest) = url.split_once("/-/")?;
        let mut prefix = prefix.trim_start_matches('/').splitn(2, '/');
        let namespace = prefix.next().filter(|s| !s.is_empty())?;
        let slug = prefix.next().filter(|s| !s.is_empty() && !s.contains('/'))?;
        let location = ProjectLocation::new(namespace, slug);

        let (action, rest) = rest.split_once('/')?;
        if action.is_empty() {
            return None;
        }

        if action == TREE_ACTION {
            let (branch, encoded) = rest.rsplit_once('/')?;
            if branch.is_empty() {
                return None;
            }
            return Some(Route {
                location,
                kind: RouteKind::Tree,
                branch: branch.to_string(),
                path: decode_path_component(encoded)?,
            });
        }

        let rest = rest.strip_prefix("branch/")?;
        let (branch, encoded) = rest.rsplit_once("/path/")?;
        if branch.is_empty() {
            return None;
        }
        Some(Route {
            location,
            kind: RouteKind::File {
                action: action.to_string(),
            },
            branch: branch.to_string(),
            path: decode_path_component(encoded)?,
        })
    }
}

#[cfg(test)]
#[path = "tests/links_tests.rs"]
mod tests;
