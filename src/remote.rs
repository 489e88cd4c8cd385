use std::time::Duration;

use anyhow::{Context, Result};

use crate::model::{BranchComparison, FileEntry, ProjectInfo, RemoteConfig};

mod http_client;
use self::http_client::with_retries;
pub use self::http_client::RemoteStatusError;

mod types;
use self::types::*;

mod files;

/// Request/response operations the files view consumes from its backend.
pub trait FilesBackend: Send + Sync {
    fn get_listing(
        &self,
        project_id: u64,
        path: &str,
        include_subtree: bool,
        branch: &str,
    ) -> Result<Vec<FileEntry>>;

    fn compare_branches(&self, project_id: u64, base: &str, head: &str)
    -> Result<BranchComparison>;

    fn get_project(&self, project_id: u64) -> Result<ProjectInfo>;
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RemoteClient {
    remote: RemoteConfig,
    token: String,
    client: reqwest::blocking::Client,
}

impl RemoteClient {
    pub fn new(remote: RemoteConfig, token: String) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("branchview")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            remote,
            token,
            client,
        })
    }
}

impl FilesBackend for RemoteClient {
    fn get_listing(
        &self,
        project_id: u64,
        path: &str,
        include_subtree: bool,
        branch: &str,
    ) -> Result<Vec<FileEntry>> {
        with_retries("get listing", || {
            self.fetch_listing(project_id, path, include_subtree, branch)
        })
    }

    fn compare_branches(
        &self,
        project_id: u64,
        base: &str,
        head: &str,
    ) -> Result<BranchComparison> {
        with_retries("compare branches", || {
            self.fetch_comparison(project_id, base, head)
        })
    }

    fn get_project(&self, project_id: u64) -> Result<ProjectInfo> {
        with_retries("get project", || self.fetch_project(project_id))
    }
}
