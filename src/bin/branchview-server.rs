#![allow(clippy::result_large_err)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Extension, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;

use branchview::access::AccessLevel;
use branchview::logging::{self, LogConfig, LogTarget};

#[path = "branchview_server/fixture.rs"]
mod fixture;
use self::fixture::*;
#[path = "branchview_server/http_error.rs"]
mod http_error;
use self::http_error::*;
#[path = "branchview_server/handlers.rs"]
mod handlers;
use self::handlers::*;

#[derive(Clone, Debug)]
struct Caller {
    token: String,
}

struct AppState {
    /// Granted owner access on every project.
    dev_token: String,

    projects: HashMap<u64, FixtureProject>,
}

impl AppState {
    fn knows_token(&self, token: &str) -> bool {
        token == self.dev_token
            || self
                .projects
                .values()
                .any(|p| p.members.contains_key(token))
    }

    fn access_for(&self, token: &str, project: &FixtureProject) -> Option<AccessLevel> {
        if let Some(level) = project.members.get(token) {
            return Some(*level);
        }
        (token == self.dev_token).then_some(AccessLevel::Owner)
    }
}

#[derive(Parser)]
#[command(name = "branchview-server")]
#[command(about = "Fixture-backed files backend (development)", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Write bound address to this file (dev/test convenience)
    #[arg(long)]
    addr_file: Option<PathBuf>,

    /// JSON fixture describing projects, members and branches
    #[arg(long)]
    fixture: PathBuf,

    /// Development bearer token with owner access on every project
    #[arg(long, default_value = "dev")]
    dev_token: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();
    let _log_guard = logging::init(LogConfig {
        target: LogTarget::Stderr,
    })?;

    let fixture = load_fixture(&args.fixture)?;
    tracing::info!(projects = fixture.projects.len(), "loaded fixture");

    let state = Arc::new(AppState {
        dev_token: args.dev_token.clone(),
        projects: fixture.into_index(),
    });

    let authed = Router::new()
        .route("/projects/:id", get(get_project))
        .route("/projects/:id/files", get(list_files))
        .route("/projects/:id/compare", get(compare))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    let app = Router::new()
        .route("/healthz", get(healthz))
        .merge(authed)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("bind {}", args.addr))?;

    let local_addr = listener.local_addr().context("read listener local addr")?;
    eprintln!("branchview-server listening on {}", local_addr);

    if let Some(addr_file) = &args.addr_file {
        std::fs::write(addr_file, local_addr.to_string())
            .with_context(|| format!("write addr file {}", addr_file.display()))?;
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
