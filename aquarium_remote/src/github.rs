//! GitHub contents API as a [`ContentStore`].
//!
//! Upsert is two calls: `GET` the file to learn its blob `sha` (a 404 means
//! the file does not exist yet), then `PUT` the new base64 content with that
//! `sha` when present. Both branches end in the same state, so repeating an
//! upsert is harmless.

use crate::error::{RemoteError, Result};
use aquarium_traits::ContentStore;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("aquarium/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct GithubConfig {
    pub api_base: String,
    /// `owner/name`
    pub repo: String,
    pub token: String,
    pub commit_message: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_base", &self.api_base)
            .field("repo", &self.repo)
            .field("commit_message", &self.commit_message)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct ContentsEntry {
    sha: String,
}

/// Body of the contents `PUT` request.
#[derive(Debug, Serialize, PartialEq)]
pub struct UpsertPayload {
    pub message: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

impl UpsertPayload {
    pub fn new(message: &str, content: &str, sha: Option<String>) -> Self {
        Self {
            message: message.to_string(),
            content: BASE64_STANDARD.encode(content.as_bytes()),
            sha,
        }
    }
}

/// `{api_base}/repos/{repo}/contents/{path}` with stray slashes removed.
pub fn contents_url(api_base: &str, repo: &str, path: &str) -> String {
    format!(
        "{}/repos/{}/contents/{}",
        api_base.trim_end_matches('/'),
        repo.trim_matches('/'),
        path.trim_start_matches('/')
    )
}

pub struct GithubStore {
    cfg: GithubConfig,
    agent: ureq::Agent,
}

impl GithubStore {
    pub fn new(cfg: GithubConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(cfg.timeout).build();
        Self { cfg, agent }
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &format!("token {}", self.cfg.token))
            .set("Accept", ACCEPT)
            .set("User-Agent", USER_AGENT)
    }

    /// Current blob sha of `path`, or `None` when the file does not exist.
    pub fn current_sha(&self, path: &str) -> Result<Option<String>> {
        let url = contents_url(&self.cfg.api_base, &self.cfg.repo, path);
        match self.request("GET", &url).call() {
            Ok(resp) => {
                let entry: ContentsEntry = resp
                    .into_json()
                    .map_err(|e| RemoteError::Decode(e.to_string()))?;
                Ok(Some(entry.sha))
            }
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn put(&self, path: &str, content: &str) -> Result<()> {
        let sha = self.current_sha(path)?;
        let created = sha.is_none();
        let url = contents_url(&self.cfg.api_base, &self.cfg.repo, path);
        let payload = UpsertPayload::new(&self.cfg.commit_message, content, sha);
        self.request("PUT", &url).send_json(&payload)?;
        tracing::debug!(repo = %self.cfg.repo, path, created, "github contents updated");
        Ok(())
    }
}

impl ContentStore for GithubStore {
    fn upsert(
        &mut self,
        path: &str,
        content: &str,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.put(path, content).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_token() {
        let cfg = GithubConfig {
            api_base: "https://api.github.com".into(),
            repo: "meali09/aquarium".into(),
            token: "ghp_secret123".into(),
            commit_message: "Update aquarium status".into(),
            timeout: Duration::from_secs(10),
        };
        let shown = format!("{cfg:?}");
        assert!(shown.contains("meali09/aquarium"));
        assert!(!shown.contains("ghp_secret123"));
        assert!(!shown.contains("token"));
    }

    #[test]
    fn url_joins_without_double_slashes() {
        assert_eq!(
            contents_url("https://api.github.com/", "meali09/aquarium", "/data/status.json"),
            "https://api.github.com/repos/meali09/aquarium/contents/data/status.json"
        );
    }

    #[test]
    fn create_payload_omits_sha() {
        let p = UpsertPayload::new("Update aquarium status", "{}", None);
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["content"], "e30=");
        assert!(v.get("sha").is_none());
    }

    #[test]
    fn update_payload_carries_sha() {
        let p = UpsertPayload::new("m", "{\"a\":1}", Some("abc123".into()));
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["sha"], "abc123");
        assert_eq!(
            BASE64_STANDARD.decode(v["content"].as_str().unwrap()).unwrap(),
            b"{\"a\":1}"
        );
    }
}
