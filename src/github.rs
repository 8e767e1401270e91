use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, IntoUrl, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::{StatsError, StatsResult};
use crate::stats::CommitRecord;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// One entry of a user's repository listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RepositoryRef {
    pub name: String,
    pub default_branch: String,
    #[serde(rename = "stargazers_count")]
    pub stars: u64,
    pub languages_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserProfile {
    pub login: String,
    pub avatar_url: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Language name to byte count, in upstream order.
pub type LanguageHistogram = Vec<(String, u64)>;

/// One week of `/stats/commit_activity`. `days[0]` is Sunday.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommitActivityWeek {
    pub total: u64,
    pub days: [u64; 7],
}

#[derive(Debug, Deserialize)]
pub struct CommitEntry {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
    author: Option<CommitSignature>,
}

#[derive(Debug, Deserialize)]
struct CommitSignature {
    date: Option<DateTime<Utc>>,
}

impl CommitEntry {
    /// Entries without an author timestamp carry nothing to sample.
    pub fn into_record(self) -> Option<CommitRecord> {
        let timestamp = self.commit.author?.date?;
        Some(CommitRecord::new(timestamp, self.commit.message))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafKind {
    Blob,
    Tree,
    Commit,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileLeaf {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: LeafKind,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<FileLeaf>,
    #[serde(default)]
    truncated: bool,
}

/// REST client for the hosting provider. Cheap to clone.
#[derive(Clone)]
pub struct GithubClient {
    token: Option<Arc<String>>,
    http: Arc<Client>,
    api_base: Arc<String>,
    raw_base: Arc<String>,
    user_agent: Arc<String>,
    page_size: u32,
}

impl GithubClient {
    pub fn new(config: &EngineConfig) -> StatsResult<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| StatsError::ClientSetup(e.to_string()))?;
        Ok(Self {
            token: config.token.clone().map(Arc::new),
            http: Arc::new(http),
            api_base: Arc::new(config.api_base.trim_end_matches('/').to_string()),
            raw_base: Arc::new(config.raw_base.trim_end_matches('/').to_string()),
            user_agent: Arc::new(config.user_agent.clone()),
            page_size: config.page_size.max(1),
        })
    }

    fn api_url(&self, parts: &[&str]) -> StatsResult<Url> {
        segment_url(&self.api_base, parts)
    }

    fn get(&self, url: impl IntoUrl) -> RequestBuilder {
        let req = self
            .http
            .get(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, GITHUB_ACCEPT);
        match &self.token {
            Some(token) => req.bearer_auth(token.as_str()),
            None => req,
        }
    }

    /// Send a request and reject transport failures and non-2xx statuses.
    async fn send(&self, req: RequestBuilder, what: &str) -> StatsResult<Response> {
        let resp = req
            .send()
            .await
            .map_err(|e| StatsError::UpstreamUnavailable(format!("network error fetching {what}: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let exhausted = resp
            .headers()
            .get(RATE_LIMIT_REMAINING)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0");
        if exhausted && matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS) {
            warn!("GitHub rate limit exhausted while fetching {what}");
            return Err(StatsError::UpstreamUnavailable(format!(
                "rate limit exhausted fetching {what}"
            )));
        }

        Err(StatsError::UpstreamUnavailable(format!(
            "GitHub API returned HTTP {} for {what}",
            status.as_u16()
        )))
    }

    async fn body(resp: Response, what: &str) -> StatsResult<Vec<u8>> {
        resp.bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| StatsError::UpstreamUnavailable(format!("failed reading {what}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> StatsResult<T> {
        let resp = self.send(req, what).await?;
        let body = Self::body(resp, what).await?;
        decode(&body, what)
    }

    /// Fetch successive `page`/`per_page` pages of a listing until a short page.
    ///
    /// All-or-nothing: any failing page fails the whole listing.
    pub async fn paginate<T: DeserializeOwned>(&self, url: Url) -> StatsResult<Vec<T>> {
        let path = url.path().to_string();
        let per_page = self.page_size;
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let req = self
                .get(url.clone())
                .query(&[("per_page", per_page), ("page", page)]);
            let batch: Vec<T> = self
                .get_json(req, &format!("{path} page {page}"))
                .await?;
            let len = batch.len();
            items.extend(batch);
            debug!("{path}: page {page} returned {len} items");

            if len < per_page as usize {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    pub async fn user_profile(&self, username: &str) -> StatsResult<UserProfile> {
        let req = self.get(self.api_url(&["users", username])?);
        self.get_json(req, &format!("profile of {username}")).await
    }

    pub async fn list_repos(&self, username: &str) -> StatsResult<Vec<RepositoryRef>> {
        self.paginate(self.api_url(&["users", username, "repos"])?).await
    }

    /// Language byte histogram from the repository's own `languages_url`.
    pub async fn languages(&self, repo: &RepositoryRef) -> StatsResult<LanguageHistogram> {
        let what = format!("languages of {}", repo.name);
        let raw: Map<String, Value> = self.get_json(self.get(&repo.languages_url), &what).await?;
        raw.into_iter()
            .map(|(lang, bytes)| -> StatsResult<(String, u64)> {
                let bytes = serde_json::from_value::<u64>(bytes).map_err(|source| StatsError::Decode {
                    resource: what.clone(),
                    source,
                })?;
                Ok((lang, bytes))
            })
            .collect()
    }

    /// Weekly commit buckets for the past year.
    ///
    /// The upstream answers 202/204 or a non-array body while statistics are
    /// still being computed or when the repository has no history; both count
    /// as no activity.
    pub async fn commit_activity(&self, owner: &str, repo: &str) -> StatsResult<Vec<CommitActivityWeek>> {
        let what = format!("commit activity of {repo}");
        let req = self.get(self.api_url(&["repos", owner, repo, "stats", "commit_activity"])?);
        let resp = self.send(req, &what).await?;
        if matches!(resp.status(), StatusCode::ACCEPTED | StatusCode::NO_CONTENT) {
            return Ok(Vec::new());
        }

        let body = Self::body(resp, &what).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        match decode::<Value>(&body, &what)? {
            value @ Value::Array(_) => serde_json::from_value(value)
                .map_err(|source| StatsError::Decode { resource: what, source }),
            _ => Ok(Vec::new()),
        }
    }

    /// Most recent commits on the default branch, at most `limit` of them.
    pub async fn recent_commits(&self, owner: &str, repo: &str, limit: u32) -> StatsResult<Vec<CommitRecord>> {
        let req = self
            .get(self.api_url(&["repos", owner, repo, "commits"])?)
            .query(&[("per_page", limit)]);
        let entries: Vec<CommitEntry> = self
            .get_json(req, &format!("commits of {repo}"))
            .await?;
        Ok(entries.into_iter().filter_map(CommitEntry::into_record).collect())
    }

    /// Recursive file tree of `branch`.
    pub async fn tree(&self, owner: &str, repo: &str, branch: &str) -> StatsResult<Vec<FileLeaf>> {
        let req = self
            .get(self.api_url(&["repos", owner, repo, "git", "trees", branch])?)
            .query(&[("recursive", "1")]);
        let resp: TreeResponse = self.get_json(req, &format!("tree of {repo}")).await?;
        if resp.truncated {
            debug!("{repo}: tree listing was truncated upstream; counting what was returned");
        }
        Ok(resp.tree)
    }

    /// Raw text of one file at `branch`.
    pub async fn raw_file(&self, owner: &str, repo: &str, branch: &str, path: &str) -> StatsResult<String> {
        let what = format!("{repo}/{path}");
        let req = self.get(segment_url(&self.raw_base, &[owner, repo, branch, path])?);
        let resp = self.send(req, &what).await?;
        resp.text()
            .await
            .map_err(|e| StatsError::UpstreamUnavailable(format!("failed reading {what}: {e}")))
    }
}

/// `base` followed by `parts` as percent-encoded path segments. Parts are
/// split on `/` first, so nested file paths and branch names stay nested.
fn segment_url(base: &str, parts: &[&str]) -> StatsResult<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| StatsError::ClientSetup(format!("invalid base URL `{base}`: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| StatsError::ClientSetup(format!("base URL `{base}` cannot carry a path")))?
        .pop_if_empty()
        .extend(parts.iter().flat_map(|part| part.split('/')));
    Ok(url)
}

fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> StatsResult<T> {
    serde_json::from_slice(body).map_err(|source| StatsError::Decode {
        resource: what.to_string(),
        source,
    })
}
