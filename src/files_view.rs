//! Repository files view.
//!
//! Decides which branch to show, loads the listing at a path together with the
//! branch's divergence from the default branch, and turns row clicks into
//! locations. The view is a plain state machine: [`FilesView::set_identity`]
//! hands back the [`LoadRequest`]s to run, and their [`LoadCompletion`]s are fed
//! back through [`FilesView::apply`] on the thread that owns the view.
//! [`LoadExecutor`] runs the requests concurrently against a [`FilesBackend`].

use anyhow::Result;

use crate::access::Capabilities;
use crate::model::{
    BranchComparison, DivergenceSummary, FileEntry, ListedEntry, ProjectLocation,
};
use crate::remote::FilesBackend;

mod branch;
pub use self::branch::{NULL_BRANCH, resolve_branch};

mod executor;
pub use self::executor::{LoadExecutor, default_worker_threads, run_to_completion};

mod notices;
pub use self::notices::{
    COMPARISON_FAILED, LISTING_FAILED, NOTICE_TITLE, Notice, NoticeKind, ROW_NOT_FOUND,
};
use self::notices::failure_message;

mod router;
pub use self::router::{
    DivergenceBanner, FileRow, FilesTable, LocationHistory, NAME_HEADER, Navigator,
    navigate_up_path,
};

/// Where the view points. Supplied from outside and replaced as a whole.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewIdentity {
    pub project_id: Option<u64>,
    pub path: String,
    pub requested_branch: Option<String>,
    pub default_branch: String,
}

impl ViewIdentity {
    pub fn new(
        project_id: u64,
        path: impl Into<String>,
        requested_branch: Option<String>,
        default_branch: impl Into<String>,
    ) -> Self {
        Self {
            project_id: Some(project_id),
            path: path.into(),
            requested_branch,
            default_branch: default_branch.into(),
        }
    }

    pub fn effective_branch(&self) -> String {
        resolve_branch(self.requested_branch.as_deref(), &self.default_branch)
    }

    pub fn diverges(&self) -> bool {
        self.effective_branch() != self.default_branch
    }

    pub fn load_key(&self) -> LoadKey {
        LoadKey {
            project_id: self.project_id,
            path: self.path.clone(),
            branch: self.effective_branch(),
            default_branch: self.default_branch.clone(),
        }
    }
}

/// The tuple whose change triggers a reload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadKey {
    pub project_id: Option<u64>,
    pub path: String,
    pub branch: String,
    pub default_branch: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadRequest {
    Listing {
        generation: u64,
        project_id: u64,
        path: String,
        include_subtree: bool,
        branch: String,
    },
    Compare {
        generation: u64,
        project_id: u64,
        base: String,
        head: String,
    },
}

impl LoadRequest {
    pub fn generation(&self) -> u64 {
        match self {
            LoadRequest::Listing { generation, .. } | LoadRequest::Compare { generation, .. } => {
                *generation
            }
        }
    }

    pub fn run(&self, backend: &dyn FilesBackend) -> LoadCompletion {
        match self {
            LoadRequest::Listing {
                generation,
                project_id,
                path,
                include_subtree,
                branch,
            } => LoadCompletion::Listing {
                generation: *generation,
                result: backend.get_listing(*project_id, path, *include_subtree, branch),
            },
            LoadRequest::Compare {
                generation,
                project_id,
                base,
                head,
            } => LoadCompletion::Compare {
                generation: *generation,
                result: backend.compare_branches(*project_id, base, head),
            },
        }
    }
}

#[derive(Debug)]
pub enum LoadCompletion {
    Listing {
        generation: u64,
        result: Result<Vec<FileEntry>>,
    },
    Compare {
        generation: u64,
        result: Result<BranchComparison>,
    },
}

impl LoadCompletion {
    pub fn generation(&self) -> u64 {
        match self {
            LoadCompletion::Listing { generation, .. }
            | LoadCompletion::Compare { generation, .. } => *generation,
        }
    }
}

#[derive(Debug)]
pub struct FilesView {
    location: ProjectLocation,
    capabilities: Capabilities,

    identity: Option<ViewIdentity>,
    key: Option<LoadKey>,

    // Bumped on every trigger; completions from older generations are dropped.
    generation: u64,

    busy: bool,
    entries: Vec<ListedEntry>,
    divergence: DivergenceSummary,
    notices: Vec<Notice>,
}

impl FilesView {
    pub fn new(location: ProjectLocation, capabilities: Capabilities) -> Self {
        Self {
            location,
            capabilities,
            identity: None,
            key: None,
            generation: 0,
            busy: false,
            entries: Vec::new(),
            divergence: DivergenceSummary::default(),
            notices: Vec::new(),
        }
    }

    pub fn location(&self) -> &ProjectLocation {
        &self.location
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn identity(&self) -> Option<&ViewIdentity> {
        self.identity.as_ref()
    }

    pub fn effective_branch(&self) -> Option<String> {
        self.identity.as_ref().map(|i| i.effective_branch())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn entries(&self) -> &[ListedEntry] {
        &self.entries
    }

    pub fn divergence(&self) -> DivergenceSummary {
        self.divergence
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Adopts a new identity. Returns the loads to run, which is empty when the
    /// load key is unchanged.
    pub fn set_identity(&mut self, identity: ViewIdentity) -> Vec<LoadRequest> {
        let key = identity.load_key();
        self.identity = Some(identity);
        if self.key.as_ref() == Some(&key) {
            return Vec::new();
        }
        self.key = Some(key);
        self.trigger()
    }

    /// Reloads the current identity unconditionally.
    pub fn reload(&mut self) -> Vec<LoadRequest> {
        if self.identity.is_none() {
            return Vec::new();
        }
        self.trigger()
    }

    fn trigger(&mut self) -> Vec<LoadRequest> {
        let Some(identity) = self.identity.as_ref() else {
            return Vec::new();
        };

        self.generation += 1;
        let generation = self.generation;
        let branch = identity.effective_branch();
        let mut requests = Vec::new();

        match identity.project_id {
            Some(project_id) => {
                self.busy = true;
                requests.push(LoadRequest::Listing {
                    generation,
                    project_id,
                    path: identity.path.clone(),
                    include_subtree: false,
                    branch: branch.clone(),
                });
                if identity.diverges() {
                    requests.push(LoadRequest::Compare {
                        generation,
                        project_id,
                        base: identity.default_branch.clone(),
                        head: branch.clone(),
                    });
                }
            }
            None => {
                self.busy = false;
            }
        }

        if !identity.diverges() {
            self.divergence = DivergenceSummary::default();
        }

        tracing::debug!(
            generation,
            project_id = ?identity.project_id,
            path = %identity.path,
            branch = %branch,
            requests = requests.len(),
            "files view triggered"
        );
        requests
    }

    /// Applies a finished load. Returns false when the completion belongs to
    /// an older trigger and was discarded.
    pub fn apply(&mut self, completion: LoadCompletion) -> bool {
        if completion.generation() != self.generation {
            tracing::debug!(
                stale = completion.generation(),
                current = self.generation,
                "discarding stale load completion"
            );
            return false;
        }

        match completion {
            LoadCompletion::Listing { result, .. } => {
                match result {
                    Ok(entries) => {
                        self.entries = entries.into_iter().map(ListedEntry::from).collect();
                    }
                    Err(err) => {
                        tracing::warn!("listing failed: {:#}", err);
                        self.notices
                            .push(Notice::error(NoticeKind::ListingFetchFailure, LISTING_FAILED));
                    }
                }
                self.busy = false;
            }
            LoadCompletion::Compare { result, .. } => match result {
                Ok(cmp) => {
                    self.divergence = DivergenceSummary::from_comparison(&cmp);
                }
                Err(err) => {
                    tracing::warn!("branch comparison failed: {:#}", err);
                    let message =
                        failure_message(&err).unwrap_or_else(|| COMPARISON_FAILED.to_string());
                    self.notices
                        .push(Notice::error(NoticeKind::ComparisonFetchFailure, message));
                }
            },
        }
        true
    }
}

#[cfg(test)]
#[path = "tests/files_view/view_tests.rs"]
mod tests;
