use crate::error::{DashboardError, Result};
use chrono::{DateTime, Utc};
use reqwest::{Client, header};
use serde::Deserialize;

pub const GITHUB_API_BASE_URL: &str = "https://api.github.com";
pub const COMMITS_PER_BRANCH: u8 = 3;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const SHORT_SHA_LEN: usize = 7;

/// One branch to follow, shown under `label`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedTarget {
    pub repo: String,
    pub branch: String,
    pub label: String,
}

impl FeedTarget {
    pub fn new(repo: &str, branch: &str, label: &str) -> Self {
        Self {
            repo: repo.to_string(),
            branch: branch.to_string(),
            label: label.to_string(),
        }
    }
}

pub fn default_targets() -> Vec<FeedTarget> {
    vec![
        FeedTarget::new("Project-Epoch/TrinityCore", "only-fixes", "only-fixes"),
        FeedTarget::new("Project-Epoch/TrinityCore", "epoch-core", "epoch-core"),
    ]
}

#[derive(Debug, Deserialize)]
struct ApiCommit {
    sha: String,
    html_url: String,
    commit: ApiCommitDetail,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetail {
    message: String,
    author: ApiAuthor,
}

#[derive(Debug, Deserialize)]
struct ApiAuthor {
    name: String,
    date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEntry {
    /// First line of the commit message
    pub message: String,
    pub author: String,
    pub sha: String,
    pub url: String,
    pub date: DateTime<Utc>,
}

impl CommitEntry {
    pub fn short_sha(&self) -> &str {
        match self.sha.char_indices().nth(SHORT_SHA_LEN) {
            Some((end, _)) => &self.sha[..end],
            None => &self.sha,
        }
    }
}

impl From<ApiCommit> for CommitEntry {
    fn from(c: ApiCommit) -> Self {
        let message = c.commit.message.lines().next().unwrap_or_default().to_string();
        Self {
            message,
            author: c.commit.author.name,
            sha: c.sha,
            url: c.html_url,
            date: c.commit.author.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    Loaded(Vec<CommitEntry>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedGroup {
    pub label: String,
    pub outcome: FeedOutcome,
}

impl FeedGroup {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, FeedOutcome::Failed(_))
    }

    /// Inline placeholder text for a failed group
    pub fn failure_text(&self) -> String {
        format!("Failed to load {} commits.", self.label)
    }
}

#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    base_url: String,
    per_page: u8,
}

impl GithubClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            per_page: COMMITS_PER_BRANCH,
        }
    }

    pub fn with_per_page(mut self, per_page: u8) -> Self {
        self.per_page = per_page;
        self
    }

    /// Most recent commits on one branch, in API order
    pub async fn recent_commits(&self, target: &FeedTarget) -> Result<Vec<CommitEntry>> {
        let url = format!("{}/repos/{}/commits", self.base_url, target.repo);
        let per_page = self.per_page.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[("sha", target.branch.as_str()), ("per_page", per_page.as_str())])
            .header(header::ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Status { url, status });
        }

        let body = response.bytes().await?;
        let commits: Vec<ApiCommit> = serde_json::from_slice(&body)?;
        Ok(commits.into_iter().map(CommitEntry::from).collect())
    }

    /// Fetch every target in order. A failing target only affects its own group.
    pub async fn fetch_feed(&self, targets: &[FeedTarget]) -> Vec<FeedGroup> {
        let mut groups = Vec::with_capacity(targets.len());

        for target in targets {
            let outcome = match self.recent_commits(target).await {
                Ok(commits) => {
                    tracing::debug!(
                        repo = %target.repo,
                        branch = %target.branch,
                        count = commits.len(),
                        "fetched commits"
                    );
                    FeedOutcome::Loaded(commits)
                }
                Err(e) => {
                    tracing::warn!(
                        repo = %target.repo,
                        branch = %target.branch,
                        "failed to fetch commits: {}",
                        e
                    );
                    FeedOutcome::Failed(e.to_string())
                }
            };
            groups.push(FeedGroup {
                label: target.label.clone(),
                outcome,
            });
        }

        groups
    }
}
