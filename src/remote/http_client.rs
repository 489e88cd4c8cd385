use std::fmt;

use super::*;

const ATTEMPTS: usize = 3;

/// A non-success response from the backend, carrying the message to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStatusError {
    pub status: u16,
    pub message: String,
}

impl RemoteStatusError {
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

impl fmt::Display for RemoteStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RemoteStatusError {}

pub(super) fn with_retries<T>(label: &str, mut f: impl FnMut() -> Result<T>) -> Result<T> {
    let mut last: Option<anyhow::Error> = None;
    for i in 0..ATTEMPTS {
        match f() {
            Ok(v) => return Ok(v),
            Err(err) => {
                let retryable = err
                    .downcast_ref::<RemoteStatusError>()
                    .is_none_or(|e| !e.is_client_error());
                if !retryable {
                    return Err(err.context(label.to_string()));
                }
                tracing::debug!(attempt = i + 1, "{} failed: {:#}", label, err);
                last = Some(err);
                if i + 1 < ATTEMPTS {
                    std::thread::sleep(std::time::Duration::from_millis(200 * (1 << i)));
                }
            }
        }
    }
    Err(last
        .unwrap_or_else(|| anyhow::anyhow!("unknown error"))
        .context(label.to_string()))
}

impl RemoteClient {
    pub(super) fn ensure_ok(
        &self,
        resp: reqwest::blocking::Response,
        label: &str,
    ) -> Result<reqwest::blocking::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let code = status.as_u16();
        let message = match status {
            reqwest::StatusCode::UNAUTHORIZED => {
                "unauthorized (token invalid/expired; run `branchview remote set --url ... --token ...`)"
                    .to_string()
            }
            reqwest::StatusCode::FORBIDDEN => {
                "forbidden (insufficient permissions for this project)".to_string()
            }
            _ => {
                let body: ErrorBody = resp.json().unwrap_or_default();
                match body.error.filter(|e| !e.trim().is_empty()) {
                    Some(msg) => msg,
                    None if status == reqwest::StatusCode::NOT_FOUND => {
                        "project not found".to_string()
                    }
                    None => format!("{} failed (status {})", label, code),
                }
            }
        };
        Err(RemoteStatusError {
            status: code,
            message,
        }
        .into())
    }

    pub(super) fn auth(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.remote.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
#[path = "../tests/remote/http_client_tests.rs"]
mod tests;
