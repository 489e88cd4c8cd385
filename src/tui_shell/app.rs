use std::sync::Arc;

use time::OffsetDateTime;

use crate::access::Capabilities;
use crate::files_view::{
    FilesView, LoadExecutor, LocationHistory, Navigator, Notice, ViewIdentity, navigate_up_path,
};
use crate::links::{Route, RouteKind, TREE_ACTION};
use crate::model::ProjectInfo;
use crate::remote::FilesBackend;

const STATUS_KEEP_LAST: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum StatusKind {
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub(super) struct StatusLine {
    pub(super) kind: StatusKind,
    pub(super) text: String,
    pub(super) at: OffsetDateTime,
}

pub(super) struct App {
    project: ProjectInfo,
    view: FilesView,
    executor: LoadExecutor,
    history: LocationHistory,

    // Index into the displayed rows; row 0 is ".." when navigating up is possible.
    pub(super) selected: usize,
    pub(super) status: Vec<StatusLine>,
    pub(super) quit: bool,
}

impl App {
    pub(super) fn new(
        backend: Arc<dyn FilesBackend>,
        project: ProjectInfo,
        path: String,
        branch: Option<String>,
    ) -> Self {
        let view = FilesView::new(
            project.location(),
            Capabilities::for_level(project.access_level),
        );
        let identity = ViewIdentity::new(project.id, path, branch, project.default_branch.clone());
        let mut app = Self {
            project,
            view,
            executor: LoadExecutor::new(backend),
            history: LocationHistory::default(),
            selected: 0,
            status: Vec::new(),
            quit: false,
        };
        app.show(identity);
        app
    }

    pub(super) fn view(&self) -> &FilesView {
        &self.view
    }

    pub(super) fn project(&self) -> &ProjectInfo {
        &self.project
    }

    pub(super) fn history(&self) -> &LocationHistory {
        &self.history
    }

    fn show(&mut self, identity: ViewIdentity) {
        let requests = self.view.set_identity(identity);
        if !requests.is_empty() {
            self.selected = 0;
        }
        self.executor.spawn(requests);
    }

    /// Applies finished loads. Returns whether anything changed.
    pub(super) fn tick(&mut self) -> bool {
        let applied = self.executor.pump(&mut self.view);
        let noticed = self.drain_notices();
        self.clamp_selection();
        applied > 0 || noticed
    }

    fn drain_notices(&mut self) -> bool {
        let notices = self.view.take_notices();
        let any = !notices.is_empty();
        for notice in notices {
            self.push_notice(notice);
        }
        any
    }

    pub(super) fn row_count(&self) -> usize {
        let table = self.view.table();
        table.rows.len() + usize::from(table.show_navigate_up)
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.row_count().saturating_sub(1));
    }

    pub(super) fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub(super) fn move_down(&mut self) {
        let max = self.row_count().saturating_sub(1);
        self.selected = (self.selected + 1).min(max);
    }

    /// Opens the selected row.
    pub(super) fn activate(&mut self) {
        let table = self.view.table();
        if table.show_navigate_up && self.selected == 0 {
            self.navigate_up();
            return;
        }

        let idx = self.selected - usize::from(table.show_navigate_up);
        let Some(row) = table.rows.get(idx) else {
            return;
        };
        if self.view.click(&row.key, row.action(), &mut self.history) {
            self.follow_location();
        }
        self.drain_notices();
    }

    pub(super) fn navigate_up(&mut self) {
        let Some(identity) = self.view.identity() else {
            return;
        };
        if identity.path.is_empty() {
            return;
        }
        let parent = navigate_up_path(&identity.path);
        let url = self
            .view
            .location()
            .tree_url(TREE_ACTION, &identity.effective_branch(), &parent);
        self.history.push_location(&url);
        self.follow_location();
    }

    // Pushed locations change what the view shows, the same way a route change would.
    fn follow_location(&mut self) {
        let Some(url) = self.history.current().map(str::to_string) else {
            return;
        };
        let Some(route) = Route::parse(&url) else {
            self.push_error(format!("unrecognized location {}", url));
            return;
        };

        match route.kind {
            RouteKind::Tree => {
                let identity = ViewIdentity::new(
                    self.project.id,
                    route.path,
                    Some(route.branch),
                    self.project.default_branch.clone(),
                );
                self.show(identity);
            }
            RouteKind::File { .. } => {
                self.push_info(format!("file {} @ {}: {}", route.path, route.branch, url));
            }
        }
    }

    pub(super) fn reload(&mut self) {
        let requests = self.view.reload();
        self.executor.spawn(requests);
        self.push_info("reloading".to_string());
    }

    pub(super) fn show_merge_request_link(&mut self) {
        match self.view.banner() {
            Some(banner) => match banner.merge_request_url {
                Some(url) => self.push_info(format!("create merge request: {}", url)),
                None => self.push_info(format!(
                    "creating merge requests requires the {} role (you are {})",
                    Capabilities::MERGE_REQUEST_MIN_ROLE.label(),
                    self.project.access_level.label()
                )),
            },
            None => self.push_info(format!(
                "branch does not diverge from \"{}\"",
                self.project.default_branch
            )),
        }
    }

    pub(super) fn push_info(&mut self, text: String) {
        self.push_status(StatusKind::Info, text);
    }

    pub(super) fn push_error(&mut self, text: String) {
        self.push_status(StatusKind::Error, text);
    }

    fn push_notice(&mut self, notice: Notice) {
        self.status.push(StatusLine {
            kind: StatusKind::Error,
            text: format!("{}: {}", notice.title, notice.message),
            at: notice.at,
        });
        self.trim_status();
    }

    fn push_status(&mut self, kind: StatusKind, text: String) {
        self.status.push(StatusLine {
            kind,
            text,
            at: OffsetDateTime::now_utc(),
        });
        self.trim_status();
    }

    fn trim_status(&mut self) {
        if self.status.len() > STATUS_KEEP_LAST {
            let drop = self.status.len() - STATUS_KEEP_LAST;
            self.status.drain(..drop);
        }
    }
}

#[cfg(test)]
#[path = "../tests/tui_shell/app_tests.rs"]
mod tests;
