use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::model::{RemoteConfig, ViewerConfig};

const STORE_DIR: &str = ".branchview";
const CONFIG_FILE: &str = "config.json";

pub const TOKEN_ENV: &str = "BRANCHVIEW_TOKEN";

/// The `.branchview` directory holding the viewer's configuration.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    pub fn store_dir(root: &Path) -> PathBuf {
        root.join(STORE_DIR)
    }

    pub fn open(root: &Path) -> Result<Self> {
        let dir = Self::store_dir(root);
        if !dir.is_dir() {
            return Err(anyhow!(
                "No {} directory found at {} (run `branchview remote set --url ... --token ...`)",
                STORE_DIR,
                dir.display()
            ));
        }
        Ok(Self { root: dir })
    }

    /// Opens the store under `root`, creating it with a default config if missing.
    pub fn open_or_init(root: &Path) -> Result<Self> {
        let dir = Self::store_dir(root);
        let store = Self { root: dir };
        if !store.config_path().exists() {
            store.write_config(&ViewerConfig::default())?;
        }
        Ok(store)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn read_config(&self) -> Result<ViewerConfig> {
        let bytes = fs::read(self.config_path()).context("read config.json")?;
        let cfg: ViewerConfig = serde_json::from_slice(&bytes).context("parse config.json")?;
        Ok(cfg)
    }

    pub fn write_config(&self, cfg: &ViewerConfig) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(cfg).context("serialize viewer config")?;
        write_atomic(&self.config_path(), &bytes).context("write config.json")?;
        Ok(())
    }
}

/// Resolves the remote to talk to. Flags win over the stored config; the token
/// falls back to `BRANCHVIEW_TOKEN`.
pub fn resolve_remote(
    stored: Option<RemoteConfig>,
    url: Option<String>,
    token: Option<String>,
    env_token: Option<String>,
) -> Result<(RemoteConfig, String)> {
    let stored_token = stored.as_ref().and_then(|r| r.token.clone());
    let base_url = url
        .or_else(|| stored.map(|r| r.base_url))
        .context("no remote configured (run `branchview remote set --url ... --token ...` or pass --url)")?;
    let token = token
        .or(stored_token)
        .or(env_token)
        .filter(|t| !t.is_empty())
        .with_context(|| format!("no token configured (pass --token or set {})", TOKEN_ENV))?;
    Ok((
        RemoteConfig {
            base_url,
            token: None,
        },
        token,
    ))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create parent directories")?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, bytes).with_context(|| format!("write temp file {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
