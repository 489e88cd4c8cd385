use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

pub const PROJECT_ID: u64 = 7;
pub const DEVELOPER_TOKEN: &str = "dev-token";
pub const GUEST_TOKEN: &str = "guest-token";

pub struct ServerGuard {
    pub base_url: String,
    pub token: String,
    _data_dir: tempfile::TempDir,
    child: Child,
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Project 7 (`acme/widgets`): `dev` is two commits ahead and one behind `main`.
pub fn sample_fixture() -> serde_json::Value {
    serde_json::json!({
        "projects": [{
            "id": PROJECT_ID,
            "namespace": "acme",
            "slug": "widgets",
            "default_branch": "main",
            "members": {
                DEVELOPER_TOKEN: "developer",
                GUEST_TOKEN: "guest"
            },
            "branches": {
                "main": {
                    "commits": [
                        {"id": "c1", "message": "init"},
                        {"id": "c2", "message": "add lib"},
                        {"id": "c3", "message": "fix readme"}
                    ],
                    "files": ["README.md", "src/lib.rs"]
                },
                "dev": {
                    "commits": [
                        {"id": "c1", "message": "init"},
                        {"id": "c2", "message": "add lib"},
                        {"id": "d1", "message": "start app"},
                        {"id": "d2", "message": "wire app"}
                    ],
                    "files": ["README.md", "src/lib.rs", "src/app/main.rs", "src/app/view.rs"]
                }
            }
        }]
    })
}

pub fn spawn_server() -> Result<ServerGuard> {
    spawn_server_with(&sample_fixture())
}

#[allow(dead_code)]
pub fn spawn_server_with(fixture: &serde_json::Value) -> Result<ServerGuard> {
    let data_dir = tempfile::tempdir().context("create server tempdir")?;

    let token = "dev".to_string();

    let fixture_path = data_dir.path().join("fixture.json");
    std::fs::write(
        &fixture_path,
        serde_json::to_vec_pretty(fixture).context("serialize fixture")?,
    )
    .context("write fixture")?;

    let addr_file = data_dir.path().join("addr.txt");

    let child = Command::new(env!("CARGO_BIN_EXE_branchview-server"))
        .args([
            "--addr",
            "127.0.0.1:0",
            "--addr-file",
            addr_file.to_str().unwrap(),
            "--fixture",
            fixture_path.to_str().unwrap(),
            "--dev-token",
            &token,
        ])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("spawn branchview-server")?;

    let base_url = read_addr_file(&addr_file)?;
    wait_for_healthz(&base_url)?;

    Ok(ServerGuard {
        base_url,
        token,
        _data_dir: data_dir,
        child,
    })
}

fn read_addr_file(addr_file: &Path) -> Result<String> {
    let start = Instant::now();
    loop {
        if start.elapsed() > Duration::from_secs(5) {
            anyhow::bail!("addr file not written at {}", addr_file.display());
        }

        if let Ok(s) = std::fs::read_to_string(addr_file) {
            let s = s.trim();
            if !s.is_empty() {
                return Ok(format!("http://{}", s));
            }
        }
        thread::sleep(Duration::from_millis(10));
    }
}

pub fn wait_for_healthz(base_url: &str) -> Result<()> {
    let client = reqwest::blocking::Client::new();
    let start = Instant::now();
    loop {
        if start.elapsed() > Duration::from_secs(5) {
            anyhow::bail!("server did not become healthy at {}/healthz", base_url);
        }
        match client.get(format!("{}/healthz", base_url)).send() {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            _ => {
                thread::sleep(Duration::from_millis(50));
            }
        }
    }
}

#[allow(dead_code)]
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Runs the CLI against `server` with `token`, from a scratch directory.
#[allow(dead_code)]
pub fn run_branchview(
    cwd: &Path,
    server: &ServerGuard,
    token: &str,
    args: &[&str],
) -> Result<std::process::Output> {
    Command::new(env!("CARGO_BIN_EXE_branchview"))
        .current_dir(cwd)
        .env_remove("BRANCHVIEW_TOKEN")
        .args(["--url", &server.base_url, "--token", token])
        .args(args)
        .output()
        .with_context(|| format!("run branchview {:?}", args))
}

#[allow(dead_code)]
pub fn ensure_ok(label: &str, out: &std::process::Output) -> Result<String> {
    if out.status.success() {
        return Ok(String::from_utf8_lossy(&out.stdout).to_string());
    }
    anyhow::bail!(
        "{} failed\nstdout:\n{}\nstderr:\n{}",
        label,
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    )
}
