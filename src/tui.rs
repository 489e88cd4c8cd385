use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::model::ProjectInfo;
use crate::remote::FilesBackend;

pub struct TuiRunOptions {
    pub backend: Arc<dyn FilesBackend>,
    pub project: ProjectInfo,
    pub path: String,
    pub branch: Option<String>,
    pub log_file: Option<PathBuf>,
}

pub fn run_with_options(opts: TuiRunOptions) -> Result<()> {
    crate::tui_shell::run(opts)
}
