use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use branchview::access::Capabilities;
use branchview::files_view::{
    FilesView, LISTING_FAILED, LoadExecutor, LocationHistory, NoticeKind, ViewIdentity,
    run_to_completion,
};
use branchview::model::{FileEntry, FileKind, ProjectInfo, RemoteConfig};
use branchview::remote::{FilesBackend, RemoteClient};
use branchview::store::{ConfigStore, TOKEN_ENV, resolve_remote};
use branchview::tui::{self, TuiRunOptions};

use crate::{Cli, Commands, RemoteCommands, TargetArgs};

#[derive(Debug, serde::Serialize)]
struct ListingReport<'a> {
    project_id: u64,
    path: &'a str,
    branch: String,
    default_branch: &'a str,
    ahead: usize,
    behind: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    merge_request_url: Option<String>,
    entries: Vec<&'a FileEntry>,
}

pub(crate) fn handle_command(cli: &Cli, root: &Path) -> Result<()> {
    match &cli.command {
        Commands::Remote { command } => handle_remote_command(root, command),
        Commands::Ls { target, json } => {
            let backend = connect(cli, root)?;
            let (mut view, project) = load_view(backend, target)?;
            report_notices(&mut view)?;
            if *json {
                print_listing_json(&view, &project)
            } else {
                print_listing(&view);
                Ok(())
            }
        }
        Commands::Open {
            target,
            entry,
            action,
        } => {
            let backend = connect(cli, root)?;
            let (mut view, _) = load_view(backend, target)?;
            report_notices(&mut view)?;

            let table = view.table();
            let row = table
                .rows
                .iter()
                .find(|r| &r.name == entry)
                .with_context(|| format!("no entry named {:?} at {:?}", entry, target.path))?;
            let action = action.as_deref().unwrap_or(row.action());

            let mut history = LocationHistory::default();
            if !view.click(&row.key, action, &mut history) {
                report_notices(&mut view)?;
                anyhow::bail!("could not open {:?}", entry);
            }
            if let Some(location) = history.current() {
                println!("{}", location);
            }
            Ok(())
        }
        Commands::Browse { target, log_file } => {
            let backend = connect(cli, root)?;
            let project = backend
                .get_project(target.project)
                .with_context(|| format!("load project {}", target.project))?;
            tui::run_with_options(TuiRunOptions {
                backend,
                project,
                path: target.path.clone(),
                branch: target.branch.clone(),
                log_file: log_file.clone(),
            })
        }
    }
}

fn handle_remote_command(root: &Path, command: &RemoteCommands) -> Result<()> {
    match command {
        RemoteCommands::Show { json } => {
            let remote = match ConfigStore::open(root) {
                Ok(store) => store.read_config()?.remote,
                Err(_) => None,
            };
            if *json {
                let v = remote.map(|r| {
                    serde_json::json!({
                        "base_url": r.base_url,
                        "token_configured": r.token.is_some(),
                    })
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&v).context("serialize remote json")?
                );
            } else if let Some(remote) = remote {
                println!("url: {}", remote.base_url);
                println!(
                    "token: {}",
                    if remote.token.is_some() { "(set)" } else { "(unset)" }
                );
            } else {
                println!("No remote configured");
            }
        }
        RemoteCommands::Set { url, token } => {
            let store = ConfigStore::open_or_init(root)?;
            let mut cfg = store.read_config()?;
            cfg.remote = Some(RemoteConfig {
                base_url: url.clone(),
                token: Some(token.clone()),
            });
            store.write_config(&cfg)?;
            println!("Remote configured");
        }
    }
    Ok(())
}

fn connect(cli: &Cli, root: &Path) -> Result<Arc<dyn FilesBackend>> {
    let stored = match ConfigStore::open(root) {
        Ok(store) => store.read_config()?.remote,
        Err(_) => None,
    };
    let (remote, token) = resolve_remote(
        stored,
        cli.url.clone(),
        cli.token.clone(),
        std::env::var(TOKEN_ENV).ok(),
    )?;
    tracing::debug!(url = %remote.base_url, "connecting");
    Ok(Arc::new(RemoteClient::new(remote, token)?))
}

fn load_view(backend: Arc<dyn FilesBackend>, target: &TargetArgs) -> Result<(FilesView, ProjectInfo)> {
    let project = backend
        .get_project(target.project)
        .with_context(|| format!("load project {}", target.project))?;

    let mut view = FilesView::new(
        project.location(),
        Capabilities::for_level(project.access_level),
    );
    let executor = LoadExecutor::new(backend);
    let requests = view.set_identity(ViewIdentity::new(
        project.id,
        target.path.clone(),
        target.branch.clone(),
        project.default_branch.clone(),
    ));
    run_to_completion(&mut view, &executor, requests);
    Ok((view, project))
}

/// Prints queued notices to stderr. A failed listing fails the command.
fn report_notices(view: &mut FilesView) -> Result<()> {
    let mut listing_failed = false;
    for notice in view.take_notices() {
        if notice.kind == NoticeKind::ListingFetchFailure {
            listing_failed = true;
            continue;
        }
        eprintln!("{}: {}", notice.title, notice.message);
    }
    if listing_failed {
        anyhow::bail!(LISTING_FAILED);
    }
    Ok(())
}

fn print_listing(view: &FilesView) {
    if let Some(banner) = view.banner() {
        println!("{}", banner.text());
        if let Some(url) = &banner.merge_request_url {
            println!("Create merge request: {}", url);
        }
        println!();
    }

    let table = view.table();
    println!("{}", table.headers.join("\t"));
    if table.show_navigate_up {
        println!("..");
    }
    for row in &table.rows {
        match row.kind {
            FileKind::Tree => println!("{}/", row.name),
            FileKind::Blob => println!("{}", row.name),
        }
    }
}

fn print_listing_json(view: &FilesView, project: &ProjectInfo) -> Result<()> {
    let identity = view.identity().context("view has no identity")?;
    let divergence = view.divergence();
    let report = ListingReport {
        project_id: project.id,
        path: &identity.path,
        branch: identity.effective_branch(),
        default_branch: &identity.default_branch,
        ahead: divergence.ahead,
        behind: divergence.behind,
        merge_request_url: view.banner().and_then(|b| b.merge_request_url),
        entries: view.entries().iter().map(|e| &e.entry).collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serialize listing json")?
    );
    Ok(())
}
