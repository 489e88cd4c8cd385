use super::*;

impl RemoteClient {
    pub(super) fn fetch_project(&self, project_id: u64) -> Result<ProjectInfo> {
        let resp = self
            .client
            .get(self.url(&format!("/projects/{}", project_id)))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .send()
            .context("get project")?;
        let project: ProjectInfo = self
            .ensure_ok(resp, "get project")?
            .json()
            .context("parse project")?;
        Ok(project)
    }

    pub(super) fn fetch_listing(
        &self,
        project_id: u64,
        path: &str,
        include_subtree: bool,
        branch: &str,
    ) -> Result<Vec<FileEntry>> {
        tracing::debug!(project_id, path, branch, "requesting listing");
        let resp = self
            .client
            .get(self.url(&format!("/projects/{}/files", project_id)))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .query(&ListingQuery {
                path,
                recursive: include_subtree,
                reference: branch,
            })
            .send()
            .context("list files")?;
        let entries: Vec<FileEntry> = self
            .ensure_ok(resp, "list files")?
            .json()
            .context("parse files")?;
        Ok(entries)
    }

    pub(super) fn fetch_comparison(
        &self,
        project_id: u64,
        base: &str,
        head: &str,
    ) -> Result<BranchComparison> {
        tracing::debug!(project_id, base, head, "requesting comparison");
        let resp = self
            .client
            .get(self.url(&format!("/projects/{}/compare", project_id)))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .query(&CompareQuery {
                from: base,
                to: head,
            })
            .send()
            .context("compare branches")?;
        let cmp: BranchComparison = self
            .ensure_ok(resp, "compare branches")?
            .json()
            .context("parse comparison")?;
        Ok(cmp)
    }
}
