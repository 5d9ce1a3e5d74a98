//! One-shot static HTML rendering of both dashboard views.

use crate::config::Settings;
use crate::error::Result;
use crate::localtime::LocalClock;
use crate::palette::Theme;
use crate::sources::github::{FeedGroup, FeedOutcome, GithubClient};
use crate::sources::http_client;
use crate::sources::log_source::StatusLogClient;
use crate::status::{ServiceBoard, ServiceCard};
use askama::Template;

const NEVER_UPDATED: &str = "never";

/// The whole page. Text is escaped by the template engine.
#[derive(Template)]
#[template(path = "snapshot.html")]
pub struct SnapshotTemplate<'a> {
    theme: Theme,
    updated: &'a str,
    show_services: bool,
    cards: &'a [ServiceCard],
    groups: Vec<CommitGroupView>,
}

/// One feed group as shown on the page
struct CommitGroupView {
    label: String,
    failed: bool,
    failure_text: String,
    commits: Vec<CommitView>,
}

struct CommitView {
    message: String,
    author: String,
    url: String,
    short_sha: String,
    date: String,
}

impl CommitGroupView {
    fn new(group: &FeedGroup, clock: &LocalClock) -> Self {
        let commits = match &group.outcome {
            FeedOutcome::Loaded(commits) => commits
                .iter()
                .map(|c| CommitView {
                    message: c.message.clone(),
                    author: c.author.clone(),
                    url: c.url.clone(),
                    short_sha: c.short_sha().to_string(),
                    date: clock.format(c.date),
                })
                .collect(),
            FeedOutcome::Failed(_) => Vec::new(),
        };

        Self {
            label: group.label.clone(),
            failed: group.is_failed(),
            failure_text: group.failure_text(),
            commits,
        }
    }
}

impl<'a> SnapshotTemplate<'a> {
    pub fn new(
        board: Option<&'a ServiceBoard>,
        feed: &[FeedGroup],
        theme: Theme,
        clock: &LocalClock,
    ) -> Self {
        Self {
            theme,
            updated: board.map_or(NEVER_UPDATED, |b| b.refreshed_at.as_str()),
            show_services: board.is_some(),
            cards: board.map(|b| b.cards.as_slice()).unwrap_or_default(),
            groups: feed
                .iter()
                .map(|group| CommitGroupView::new(group, clock))
                .collect(),
        }
    }
}

pub fn render_page(
    board: Option<&ServiceBoard>,
    feed: &[FeedGroup],
    theme: Theme,
    clock: &LocalClock,
) -> Result<String> {
    Ok(SnapshotTemplate::new(board, feed, theme, clock).render()?)
}

/// Fetch both views once and render the page
pub async fn take(settings: &Settings) -> Result<String> {
    let http = http_client(settings.http_timeout)?;
    let log = StatusLogClient::new(http.clone(), settings.log_source.clone());
    let github = GithubClient::new(http, &settings.github_api)
        .with_per_page(settings.commits_per_branch);

    let board = match log.fetch_text().await {
        Ok(text) => Some(ServiceBoard::from_log(&text, &settings.clock)),
        Err(e) => {
            tracing::error!(source = %log.source(), "failed to load status log: {}", e);
            None
        }
    };
    let feed = github.fetch_feed(&settings.feeds).await;

    render_page(board.as_ref(), &feed, settings.theme, &settings.clock)
}
