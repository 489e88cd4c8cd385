//! Logging setup.
//!
//! Filter priority: `BRANCHVIEW_LOG`, then `RUST_LOG`, then `warn,branchview=info`.
//! Plain commands log to stderr. The interactive browser owns the terminal, so
//! it logs to a file instead (`--log-file`, default `.branchview/logs/branchview-<pid>.log`).

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "BRANCHVIEW_LOG";
const DEFAULT_FILTER: &str = "warn,branchview=info";

pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

pub struct LogConfig {
    pub target: LogTarget,
}

/// Keeps the background file writer alive; drop it last.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
    pub log_file: Option<PathBuf>,
}

pub fn init(config: LogConfig) -> Result<LogGuard> {
    match config.target {
        LogTarget::Stderr => {
            Registry::default()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_filter(create_filter()?),
                )
                .try_init()
                .context("install stderr logger")?;
            Ok(LogGuard {
                _file_guard: None,
                log_file: None,
            })
        }
        LogTarget::File(path) => {
            let (dir, name) = split_log_path(&path);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("create log dir {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(&dir, &name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            Registry::default()
                .with(
                    fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_filter(create_filter()?),
                )
                .try_init()
                .context("install file logger")?;
            Ok(LogGuard {
                _file_guard: Some(guard),
                log_file: Some(dir.join(name)),
            })
        }
    }
}

pub fn default_log_file(root: &Path) -> PathBuf {
    crate::store::ConfigStore::store_dir(root)
        .join("logs")
        .join(format!("branchview-{}.log", std::process::id()))
}

/// Stdout logging for tests; safe to call repeatedly.
pub fn test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new(filter_directives()))
        .with_test_writer()
        .try_init();
}

fn create_filter() -> Result<EnvFilter> {
    EnvFilter::try_new(filter_directives()).context("parse log filter")
}

fn filter_directives() -> String {
    env::var(LOG_ENV)
        .or_else(|_| env::var("RUST_LOG"))
        .unwrap_or_else(|_| DEFAULT_FILTER.to_string())
}

fn split_log_path(path: &Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("branchview-{}.log", std::process::id()));
    (dir, name)
}
